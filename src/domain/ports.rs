use crate::domain::model::{FailurePolicy, QueryRecord};
use crate::utils::error::Result;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A single HTTP exchange. Network-level failures come back as `Err`,
/// any answer from the server (whatever the status) as `Ok`.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    async fn execute(&self, request: OutgoingRequest) -> Result<RawResponse>;
}

#[async_trait]
pub trait SavedQueryApi: Send {
    async fn create_saved_query(&mut self, record: &QueryRecord) -> Result<serde_json::Value>;
}

/// One separately fetched piece of a source: a local file, a feed, a repository file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub name: String,
    pub location: String,
}

/// Sources are read entry by entry so records can be submitted before the
/// next entry is fetched.
#[async_trait]
pub trait QuerySource: Send + Sync {
    fn describe(&self) -> String;
    fn failure_policy(&self) -> FailurePolicy;

    /// Failing here means nothing from this source can be imported.
    async fn entries(&self) -> Result<Vec<SourceEntry>>;

    async fn load_entry(&self, entry: &SourceEntry) -> Result<Vec<QueryRecord>>;

    /// Every record of every entry, stopping at the first entry that fails to load.
    async fn load(&self) -> Result<Vec<QueryRecord>> {
        let mut records = Vec::new();
        for entry in self.entries().await? {
            records.extend(self.load_entry(&entry).await?);
        }
        Ok(records)
    }
}

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn token_id(&self) -> &str;
    fn token_key(&self) -> &str;
    fn rate_limit_seconds(&self) -> f64;
    fn timeout_seconds(&self) -> u64;
}
