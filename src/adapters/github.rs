use crate::adapters::http::fetch_text;
use crate::adapters::local_file::load_file;
use crate::domain::model::{FailurePolicy, QueryRecord};
use crate::domain::ports::{HttpBackend, QuerySource, SourceEntry};
use crate::utils::error::{ImportError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const QUERY_EXTENSIONS: &[&str] = &[".json", ".yaml", ".yml", ".txt", ".cypher"];

#[derive(Debug, Deserialize)]
struct ListingEntry {
    #[serde(rename = "type")]
    kind: String,
    name: String,
    download_url: Option<String>,
}

pub fn has_query_extension(name: &str) -> bool {
    QUERY_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

pub fn raw_content_url(repo_url: &str, branch: &str, path: &str) -> String {
    let mut raw_url = repo_url.replace("github.com", "raw.githubusercontent.com");
    if !raw_url.ends_with('/') {
        raw_url.push('/');
    }
    raw_url.push_str(branch);
    raw_url.push('/');
    raw_url.push_str(path.trim_start_matches('/'));
    raw_url
}

/// Fetched text written to disk so it can go through the local file loader.
/// Each scratch file gets its own temporary directory, which is removed on drop.
pub struct ScratchFile {
    _dir: TempDir,
    path: PathBuf,
}

impl ScratchFile {
    pub async fn create(file_name: &str, content: &str) -> Result<Self> {
        // Keep only the final component so listing names cannot escape the directory.
        let file_name = Path::new(file_name)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "query.txt".to_string());

        let dir = tempfile::Builder::new()
            .prefix("bhe-query-import-")
            .tempdir()?;
        let path = dir.path().join(file_name);
        tokio::fs::write(&path, content).await?;

        Ok(Self { _dir: dir, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

async fn normalize_fetched(file_name: &str, content: &str) -> Result<Vec<QueryRecord>> {
    let scratch = ScratchFile::create(file_name, content).await?;
    load_file(scratch.path()).await
}

pub struct GitHubTreeSource<B: HttpBackend> {
    repo_url: String,
    branch: String,
    path: String,
    backend: B,
}

impl<B: HttpBackend> GitHubTreeSource<B> {
    pub fn new(repo_url: &str, branch: &str, path: &str, backend: B) -> Self {
        Self {
            repo_url: repo_url.to_string(),
            branch: branch.to_string(),
            path: path.to_string(),
            backend,
        }
    }

    pub fn raw_url(&self) -> String {
        raw_content_url(&self.repo_url, &self.branch, &self.path)
    }
}

/// Keeps listed files with a query extension and a download URL, in listing order.
fn parse_listing(url: &str, listing: &str) -> Result<Vec<SourceEntry>> {
    let items: Vec<ListingEntry> =
        serde_json::from_str(listing).map_err(|e| ImportError::UnsupportedDocument {
            origin: url.to_string(),
            reason: format!("expected a directory listing: {}", e),
        })?;

    let mut entries = Vec::new();
    for item in items {
        if item.kind != "file" || !has_query_extension(&item.name) {
            tracing::debug!("Skipping {} entry {}", item.kind, item.name);
            continue;
        }
        let Some(download_url) = item.download_url else {
            tracing::warn!("Listing entry {} has no download_url, skipping", item.name);
            continue;
        };
        entries.push(SourceEntry {
            name: item.name,
            location: download_url,
        });
    }
    Ok(entries)
}

#[async_trait]
impl<B: HttpBackend> QuerySource for GitHubTreeSource<B> {
    fn describe(&self) -> String {
        format!("GitHub {} ({}:{})", self.repo_url, self.branch, self.path)
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::Isolate
    }

    async fn entries(&self) -> Result<Vec<SourceEntry>> {
        let url = self.raw_url();
        if has_query_extension(&self.path) {
            return Ok(vec![SourceEntry {
                name: self.path.clone(),
                location: url,
            }]);
        }

        let listing = fetch_text(&self.backend, &url).await?;
        let entries = parse_listing(&url, &listing)?;
        tracing::info!("Found {} query files in {}", entries.len(), self.describe());
        Ok(entries)
    }

    async fn load_entry(&self, entry: &SourceEntry) -> Result<Vec<QueryRecord>> {
        let content = fetch_text(&self.backend, &entry.location).await?;
        let records = normalize_fetched(&entry.name, &content).await?;
        tracing::debug!("{}: {} queries", entry.name, records.len());
        Ok(records)
    }
}
