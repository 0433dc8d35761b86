use crate::adapters::http::fetch_text;
use crate::core::normalize::record_from_entry;
use crate::domain::model::{FailurePolicy, QueryRecord};
use crate::domain::ports::{HttpBackend, QuerySource, SourceEntry};
use crate::utils::error::{ImportError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Either a plain list of queries or the grouped layout used by community
/// query packs (`{"queries": [{"name", "category", "queryList": [...]}]}`).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum QueryFeed {
    Grouped { queries: Vec<QueryGroup> },
    Flat(Vec<Map<String, Value>>),
}

#[derive(Debug, Deserialize)]
struct QueryGroup {
    name: String,
    #[serde(default = "uncategorized")]
    category: String,
    #[serde(default, rename = "queryList")]
    query_list: Vec<GroupedQuery>,
}

#[derive(Debug, Deserialize)]
struct GroupedQuery {
    #[serde(default)]
    query: String,
    #[serde(default, rename = "final")]
    is_final: bool,
}

fn uncategorized() -> String {
    "Uncategorized".to_string()
}

/// `github.com/<owner>/<repo>/blob/<branch>/<path>` to the raw content host.
pub fn to_raw_url(url: &str) -> String {
    if url.contains("github.com") && url.contains("/blob/") {
        url.replace("github.com", "raw.githubusercontent.com")
            .replace("/blob/", "/")
    } else {
        url.to_string()
    }
}

pub fn parse_feed(origin: &str, content: &str) -> Result<Vec<QueryRecord>> {
    let feed: QueryFeed =
        serde_json::from_str(content).map_err(|e| ImportError::UnsupportedDocument {
            origin: origin.to_string(),
            reason: format!("expected a query list or a grouped query pack: {}", e),
        })?;

    let records = match feed {
        QueryFeed::Flat(items) => items.iter().map(record_from_entry).collect(),
        QueryFeed::Grouped { queries } => queries
            .into_iter()
            .flat_map(|group| {
                let name = format!("{} - {}", group.name, group.category);
                let description = format!("Category: {}", group.category);
                group
                    .query_list
                    .into_iter()
                    .filter(|item| item.is_final)
                    .map(move |item| QueryRecord::new(name.clone(), item.query, description.clone()))
            })
            .collect(),
    };
    Ok(records)
}

pub struct JsonUrlSource<B: HttpBackend> {
    url: String,
    backend: B,
}

impl<B: HttpBackend> JsonUrlSource<B> {
    pub fn new(url: &str, backend: B) -> Self {
        Self {
            url: to_raw_url(url),
            backend,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl<B: HttpBackend> QuerySource for JsonUrlSource<B> {
    fn describe(&self) -> String {
        format!("JSON URL {}", self.url)
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::Isolate
    }

    async fn entries(&self) -> Result<Vec<SourceEntry>> {
        Ok(vec![SourceEntry {
            name: self.url.clone(),
            location: self.url.clone(),
        }])
    }

    async fn load_entry(&self, entry: &SourceEntry) -> Result<Vec<QueryRecord>> {
        let content = fetch_text(&self.backend, &entry.location).await?;
        let records = parse_feed(&entry.location, &content)?;
        tracing::info!("Found {} queries at {}", records.len(), entry.location);
        Ok(records)
    }
}
