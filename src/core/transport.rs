use crate::core::rate_limiter::RateLimiter;
use crate::core::signer;
use crate::domain::model::{Credentials, QueryRecord};
use crate::domain::ports::{
    ConfigProvider, HttpBackend, HttpMethod, OutgoingRequest, RawResponse, SavedQueryApi,
};
use crate::utils::error::{ImportError, Result};
use async_trait::async_trait;

pub const SAVED_QUERIES_URI: &str = "/api/v2/saved-queries";
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
pub const HTTP_TOO_MANY_REQUESTS: u16 = 429;

/// Signs, rate limits and sends requests to the server API.
///
/// A request answered with 429 is re-signed and sent once more after
/// twice the limiter interval; whatever the second attempt returns is final.
pub struct SignedTransport<B: HttpBackend> {
    base_url: String,
    credentials: Credentials,
    limiter: RateLimiter,
    backend: B,
}

impl<B: HttpBackend> SignedTransport<B> {
    pub fn new(base_url: &str, credentials: Credentials, limiter: RateLimiter, backend: B) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            limiter,
            backend,
        }
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C, backend: B) -> Self {
        Self::new(
            config.base_url(),
            Credentials::new(config.token_id(), config.token_key()),
            RateLimiter::from_secs_f64(config.rate_limit_seconds()),
            backend,
        )
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn send(
        &mut self,
        method: HttpMethod,
        uri: &str,
        body: Option<Vec<u8>>,
    ) -> Result<serde_json::Value> {
        let mut response = self.send_once(method, uri, body.as_deref()).await?;

        if response.status == HTTP_TOO_MANY_REQUESTS {
            let delay = self.limiter.backoff_delay();
            tracing::warn!(
                "Rate limit hit on {} {}, waiting {:?} before retrying",
                method,
                uri,
                delay
            );
            tokio::time::sleep(delay).await;
            response = self.send_once(method, uri, body.as_deref()).await?;
        }

        into_result(response)
    }

    async fn send_once(
        &mut self,
        method: HttpMethod,
        uri: &str,
        body: Option<&[u8]>,
    ) -> Result<RawResponse> {
        self.limiter.wait_turn().await;

        let signature = signer::sign(
            &self.credentials.token_key,
            method.as_str(),
            uri,
            body,
            &signer::local_now(),
        );

        let mut headers = vec![
            ("User-Agent".to_string(), USER_AGENT.to_string()),
            (
                "Authorization".to_string(),
                format!("bhesignature {}", self.credentials.token_id),
            ),
            ("RequestDate".to_string(), signature.request_date),
            ("Signature".to_string(), signature.signature),
        ];
        if body.is_some() {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }

        let request = OutgoingRequest {
            method,
            url: format!("{}{}", self.base_url, uri),
            headers,
            body: body.map(<[u8]>::to_vec),
        };

        tracing::debug!("Sending {} {}", request.method, request.url);
        let result = self.backend.execute(request).await;
        self.limiter.record_completion();

        if let Ok(response) = &result {
            tracing::debug!("{} {} answered with HTTP {}", method, uri, response.status);
        }
        result
    }
}

fn into_result(response: RawResponse) -> Result<serde_json::Value> {
    if response.is_success() {
        if response.body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        // Non-JSON success bodies are still a completed write; hand them back as text.
        return Ok(serde_json::from_str(&response.body)
            .unwrap_or(serde_json::Value::String(response.body)));
    }

    if response.status == HTTP_TOO_MANY_REQUESTS {
        return Err(ImportError::Throttled {
            body: response.body,
        });
    }

    Err(ImportError::RemoteRejected {
        status: response.status,
        body: response.body,
    })
}

#[async_trait]
impl<B: HttpBackend> SavedQueryApi for SignedTransport<B> {
    async fn create_saved_query(&mut self, record: &QueryRecord) -> Result<serde_json::Value> {
        let body = serde_json::to_vec(record)?;
        self.send(HttpMethod::Post, SAVED_QUERIES_URI, Some(body)).await
    }
}
