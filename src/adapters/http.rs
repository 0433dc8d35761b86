use crate::core::transport::USER_AGENT;
use crate::domain::ports::{HttpBackend, HttpMethod, OutgoingRequest, RawResponse};
use crate::utils::error::{ImportError, Result};
use async_trait::async_trait;
use reqwest::{Client, Method};
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    client: Client,
}

impl ReqwestBackend {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn execute(&self, request: OutgoingRequest) -> Result<RawResponse> {
        let mut builder = self.client.request(to_reqwest_method(request.method), &request.url);
        for (key, value) in request.headers {
            builder = builder.header(key, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(RawResponse { status, body })
    }
}

/// Unsigned GET used by the URL-based query sources.
pub async fn fetch_text<B: HttpBackend + ?Sized>(backend: &B, url: &str) -> Result<String> {
    tracing::debug!("Fetching {}", url);
    let response = backend
        .execute(OutgoingRequest {
            method: HttpMethod::Get,
            url: url.to_string(),
            headers: vec![("User-Agent".to_string(), USER_AGENT.to_string())],
            body: None,
        })
        .await?;

    if !response.is_success() {
        return Err(ImportError::RemoteRejected {
            status: response.status,
            body: response.body,
        });
    }
    Ok(response.body)
}
