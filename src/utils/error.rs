use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("File not found: {path}")]
    NotFound { path: String },

    #[error("Rate limited by remote service (HTTP 429): {body}")]
    Throttled { body: String },

    #[error("Remote service rejected request (HTTP {status}): {body}")]
    RemoteRejected { status: u16, body: String },

    #[error("Transport unavailable: {0}")]
    TransportUnavailable(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Unsupported document from {origin}: {reason}")]
    UnsupportedDocument { origin: String, reason: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration value: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Network,
    Remote,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ImportError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ImportError::ConfigError { .. }
            | ImportError::MissingConfigError { .. }
            | ImportError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            ImportError::NotFound { .. } | ImportError::UnsupportedDocument { .. } => {
                ErrorCategory::Input
            }
            ImportError::TransportUnavailable(_) => ErrorCategory::Network,
            ImportError::Throttled { .. } | ImportError::RemoteRejected { .. } => {
                ErrorCategory::Remote
            }
            ImportError::IoError(_) | ImportError::SerializationError(_) => {
                ErrorCategory::Internal
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ImportError::Throttled { .. } => ErrorSeverity::Medium,
            ImportError::TransportUnavailable(_) => ErrorSeverity::Medium,
            ImportError::RemoteRejected { status, .. } if *status >= 500 => ErrorSeverity::Medium,
            ImportError::RemoteRejected { .. } => ErrorSeverity::High,
            ImportError::NotFound { .. } | ImportError::UnsupportedDocument { .. } => {
                ErrorSeverity::High
            }
            ImportError::ConfigError { .. }
            | ImportError::MissingConfigError { .. }
            | ImportError::InvalidConfigValueError { .. } => ErrorSeverity::High,
            ImportError::IoError(_) | ImportError::SerializationError(_) => {
                ErrorSeverity::Critical
            }
        }
    }

    /// HTTP status attached to the failure, if the remote service answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ImportError::Throttled { .. } => Some(429),
            ImportError::RemoteRejected { status, .. } => Some(*status),
            ImportError::TransportUnavailable(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Raw response text returned by the remote service, if any.
    pub fn response_text(&self) -> Option<&str> {
        match self {
            ImportError::Throttled { body } | ImportError::RemoteRejected { body, .. } => {
                Some(body.as_str())
            }
            _ => None,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ImportError::NotFound { path } => format!("Query file '{}' does not exist", path),
            ImportError::Throttled { .. } => {
                "The server kept rate limiting requests after a retry".to_string()
            }
            ImportError::RemoteRejected { status, body } => {
                format!("The server rejected the request with HTTP {}: {}", status, body)
            }
            ImportError::TransportUnavailable(e) => {
                format!("Could not reach the server: {}", e)
            }
            ImportError::UnsupportedDocument { origin, reason } => {
                format!("Could not read queries from {}: {}", origin, reason)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => "Check the command line flags and the config profile",
            ErrorCategory::Input => "Check that the query source exists and has a supported layout",
            ErrorCategory::Network => "Check that the server URL is reachable and try again",
            ErrorCategory::Remote => match self.status() {
                Some(401) | Some(403) => "Check the API token id and token key",
                Some(429) => "Increase --rate-limit and run the import again",
                _ => "Inspect the response text above; the query may be invalid or already exist",
            },
            ErrorCategory::Internal => "Re-run with --verbose and report the log output",
        }
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;
