use serde::Serialize;

pub const DEFAULT_QUERY_NAME: &str = "Unnamed Query";

/// Token pair issued by the server's API key page.
#[derive(Clone)]
pub struct Credentials {
    pub token_id: String,
    pub token_key: Vec<u8>,
}

impl Credentials {
    pub fn new(token_id: impl Into<String>, token_key: impl AsRef<[u8]>) -> Self {
        Self {
            token_id: token_id.into(),
            token_key: token_key.as_ref().to_vec(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("token_id", &self.token_id)
            .field("token_key", &"<redacted>")
            .finish()
    }
}

/// The normalized unit of work, regardless of where it was read from.
/// Serializes to the exact body the saved-queries endpoint expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryRecord {
    pub name: String,
    pub query: String,
    pub description: String,
}

impl QueryRecord {
    pub fn new(
        name: impl Into<String>,
        query: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            query: query.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FailureDetail {
    pub status: Option<u16>,
    pub message: String,
    pub response_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(serde_json::Value),
    Failure(FailureDetail),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportResult {
    pub record: QueryRecord,
    pub outcome: Outcome,
}

impl ImportResult {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success(_))
    }
}

/// How a source wants submission failures handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// First failed submission aborts the rest of the batch.
    StopOnFirst,
    /// Each failure is logged and the next record is still submitted.
    Isolate,
}

#[derive(Debug)]
pub struct BatchReport {
    pub source: String,
    pub results: Vec<ImportResult>,
    pub fatal: Option<crate::utils::error::ImportError>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }
}
