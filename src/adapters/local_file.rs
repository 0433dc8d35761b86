use crate::core::normalize::normalize_content;
use crate::domain::model::{FailurePolicy, QueryRecord};
use crate::domain::ports::{QuerySource, SourceEntry};
use crate::utils::error::{ImportError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LocalFileSource {
    path: PathBuf,
}

impl LocalFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub async fn load_file(path: &Path) -> Result<Vec<QueryRecord>> {
    if !path.exists() {
        return Err(ImportError::NotFound {
            path: path.display().to_string(),
        });
    }

    let content = tokio::fs::read_to_string(path).await?;
    Ok(normalize_content(&content, path))
}

#[async_trait]
impl QuerySource for LocalFileSource {
    fn describe(&self) -> String {
        format!("local file {}", self.path.display())
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::StopOnFirst
    }

    async fn entries(&self) -> Result<Vec<SourceEntry>> {
        if !self.path.exists() {
            return Err(ImportError::NotFound {
                path: self.path.display().to_string(),
            });
        }
        Ok(vec![SourceEntry {
            name: self.path.display().to_string(),
            location: self.path.display().to_string(),
        }])
    }

    async fn load_entry(&self, _entry: &SourceEntry) -> Result<Vec<QueryRecord>> {
        load_file(&self.path).await
    }
}
