use crate::config::toml_config::ProfileConfig;
use crate::config::{
    ImporterSettings, SourceSpec, DEFAULT_BASE_URL, DEFAULT_RATE_LIMIT_SECONDS,
    DEFAULT_TIMEOUT_SECONDS, TOKEN_ID_ENV, TOKEN_KEY_ENV,
};
use crate::utils::error::Result;
use crate::utils::validation::{validate_required_field, Validate};
use clap::Parser;
use std::path::PathBuf;

#[derive(Clone, Parser)]
#[command(name = "bhe-query-import")]
#[command(about = "Import custom Cypher queries into BloodHound CE")]
pub struct CliConfig {
    #[arg(long, help = "BloodHound instance URL (default: http://localhost:8080)")]
    pub url: Option<String>,

    #[arg(long, help = "API token ID (or BHE_TOKEN_ID)")]
    pub token_id: Option<String>,

    #[arg(long, help = "API token key (or BHE_TOKEN_KEY)")]
    pub token_key: Option<String>,

    #[arg(long, help = "URL to a JSON file containing queries")]
    pub json_url: Option<String>,

    #[arg(long, help = "Import queries from a GitHub repository URL")]
    pub github: Option<String>,

    #[arg(long, default_value = "main", help = "GitHub branch name")]
    pub branch: String,

    #[arg(long, default_value = "", help = "Path within the GitHub repository")]
    pub path: String,

    #[arg(long, help = "Import queries from a local file")]
    pub file: Option<PathBuf>,

    #[arg(long, help = "Delay between requests in seconds (default: 0.5)")]
    pub rate_limit: Option<f64>,

    #[arg(long, help = "HTTP timeout in seconds (default: 30)")]
    pub timeout: Option<u64>,

    #[arg(long, help = "TOML profile with server and rate limit settings")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

impl CliConfig {
    pub fn sources(&self) -> Vec<SourceSpec> {
        let mut sources = Vec::new();
        if let Some(url) = &self.json_url {
            sources.push(SourceSpec::JsonUrl(url.clone()));
        }
        if let Some(repo_url) = &self.github {
            sources.push(SourceSpec::GitHub {
                repo_url: repo_url.clone(),
                branch: self.branch.clone(),
                path: self.path.clone(),
            });
        }
        if let Some(path) = &self.file {
            sources.push(SourceSpec::LocalFile(path.clone()));
        }
        sources
    }

    /// Merges flags with the optional profile and the token environment variables.
    pub fn resolve(&self) -> Result<ImporterSettings> {
        let profile = match &self.config {
            Some(path) => {
                let profile = ProfileConfig::from_file(path)?;
                profile.validate()?;
                profile
            }
            None => ProfileConfig::default(),
        };
        let server = profile.server;

        let token_id = self
            .token_id
            .clone()
            .or(server.token_id)
            .or_else(|| std::env::var(TOKEN_ID_ENV).ok());
        let token_key = self
            .token_key
            .clone()
            .or(server.token_key)
            .or_else(|| std::env::var(TOKEN_KEY_ENV).ok());

        Ok(ImporterSettings {
            base_url: self
                .url
                .clone()
                .or(server.url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            token_id: validate_required_field("token_id", &token_id)?.clone(),
            token_key: validate_required_field("token_key", &token_key)?.clone(),
            rate_limit_seconds: self
                .rate_limit
                .or(profile.rate_limit.delay_seconds)
                .unwrap_or(DEFAULT_RATE_LIMIT_SECONDS),
            timeout_seconds: self
                .timeout
                .or(server.timeout_seconds)
                .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
            sources: self.sources(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn parse(args: &[&str]) -> CliConfig {
        CliConfig::parse_from(std::iter::once("bhe-query-import").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["--token-id", "id", "--token-key", "key", "--file", "q.json"]);
        let settings = cli.resolve().unwrap();

        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.rate_limit_seconds, 0.5);
        assert_eq!(settings.timeout_seconds, 30);
        assert_eq!(settings.sources, vec![SourceSpec::LocalFile("q.json".into())]);
    }

    #[test]
    fn test_sources_in_processing_order() {
        let cli = parse(&[
            "--token-id", "id", "--token-key", "key",
            "--file", "local.json",
            "--github", "https://github.com/org/repo",
            "--branch", "dev",
            "--path", "queries",
            "--json-url", "https://example.com/q.json",
        ]);

        assert_eq!(
            cli.sources(),
            vec![
                SourceSpec::JsonUrl("https://example.com/q.json".to_string()),
                SourceSpec::GitHub {
                    repo_url: "https://github.com/org/repo".to_string(),
                    branch: "dev".to_string(),
                    path: "queries".to_string(),
                },
                SourceSpec::LocalFile("local.json".into()),
            ]
        );
    }

    #[test]
    fn test_flags_override_profile() {
        let mut profile = NamedTempFile::new().unwrap();
        profile
            .write_all(
                b"[server]\nurl = \"https://bh.example.com\"\ntoken_id = \"profile-id\"\ntoken_key = \"profile-key\"\n[rate_limit]\ndelay_seconds = 2.0\n",
            )
            .unwrap();
        let profile_path = profile.path().to_str().unwrap();

        let cli = parse(&["--config", profile_path, "--rate-limit", "1.0", "--token-id", "flag-id"]);
        let settings = cli.resolve().unwrap();

        assert_eq!(settings.base_url, "https://bh.example.com");
        assert_eq!(settings.token_id, "flag-id");
        assert_eq!(settings.token_key, "profile-key");
        assert_eq!(settings.rate_limit_seconds, 1.0);
    }
}
