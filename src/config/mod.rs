#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

use crate::adapters::{GitHubTreeSource, JsonUrlSource, LocalFileSource, ReqwestBackend};
use crate::core::ConfigProvider;
use crate::domain::ports::QuerySource;
use crate::utils::error::{ImportError, Result};
use crate::utils::validation::{
    validate_non_empty_secret, validate_path, validate_range, validate_url, Validate,
};
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_RATE_LIMIT_SECONDS: f64 = 0.5;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const TOKEN_ID_ENV: &str = "BHE_TOKEN_ID";
pub const TOKEN_KEY_ENV: &str = "BHE_TOKEN_KEY";

#[derive(Debug, Clone, PartialEq)]
pub enum SourceSpec {
    JsonUrl(String),
    GitHub {
        repo_url: String,
        branch: String,
        path: String,
    },
    LocalFile(PathBuf),
}

/// Fully resolved settings: command line over profile over environment over defaults.
#[derive(Clone)]
pub struct ImporterSettings {
    pub base_url: String,
    pub token_id: String,
    pub token_key: String,
    pub rate_limit_seconds: f64,
    pub timeout_seconds: u64,
    pub sources: Vec<SourceSpec>,
}

impl std::fmt::Debug for ImporterSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImporterSettings")
            .field("base_url", &self.base_url)
            .field("token_id", &self.token_id)
            .field("token_key", &"<redacted>")
            .field("rate_limit_seconds", &self.rate_limit_seconds)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("sources", &self.sources)
            .finish()
    }
}

impl ImporterSettings {
    /// Query sources in processing order: JSON URL, then GitHub, then local file.
    pub fn query_sources(&self, backend: &ReqwestBackend) -> Vec<Box<dyn QuerySource>> {
        self.sources
            .iter()
            .map(|spec| -> Box<dyn QuerySource> {
                match spec {
                    SourceSpec::JsonUrl(url) => Box::new(JsonUrlSource::new(url, backend.clone())),
                    SourceSpec::GitHub {
                        repo_url,
                        branch,
                        path,
                    } => Box::new(GitHubTreeSource::new(
                        repo_url,
                        branch,
                        path,
                        backend.clone(),
                    )),
                    SourceSpec::LocalFile(path) => Box::new(LocalFileSource::new(path.clone())),
                }
            })
            .collect()
    }
}

impl ConfigProvider for ImporterSettings {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn token_id(&self) -> &str {
        &self.token_id
    }

    fn token_key(&self) -> &str {
        &self.token_key
    }

    fn rate_limit_seconds(&self) -> f64 {
        self.rate_limit_seconds
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }
}

impl Validate for ImporterSettings {
    fn validate(&self) -> Result<()> {
        validate_url("url", &self.base_url)?;
        validate_non_empty_secret("token_id", &self.token_id)?;
        validate_non_empty_secret("token_key", &self.token_key)?;
        validate_range("rate_limit", self.rate_limit_seconds, 0.0, 60.0)?;
        validate_range("timeout", self.timeout_seconds, 1, 600)?;

        if self.sources.is_empty() {
            return Err(ImportError::ConfigError {
                message: "No query source given; use --json-url, --github or --file".to_string(),
            });
        }

        for source in &self.sources {
            match source {
                SourceSpec::JsonUrl(url) => validate_url("json_url", url)?,
                SourceSpec::GitHub { repo_url, .. } => validate_url("github", repo_url)?,
                SourceSpec::LocalFile(path) => validate_path("file", &path.to_string_lossy())?,
            }
        }
        Ok(())
    }
}
