use crate::domain::model::{
    BatchReport, FailureDetail, FailurePolicy, ImportResult, Outcome, QueryRecord,
};
use crate::domain::ports::{QuerySource, SavedQueryApi};
use crate::utils::error::{ErrorSeverity, ImportError, Result};

/// Submits records from a source one at a time, in order.
pub struct ImportPipeline<A: SavedQueryApi> {
    api: A,
}

/// Everything a run over several sources produced.
#[derive(Debug, Default)]
pub struct ImportSummary {
    pub reports: Vec<BatchReport>,
    pub source_errors: Vec<(String, ImportError)>,
}

impl ImportSummary {
    pub fn imported(&self) -> usize {
        self.reports.iter().map(BatchReport::succeeded).sum()
    }

    pub fn failed(&self) -> usize {
        self.reports.iter().map(BatchReport::failed).sum()
    }

    /// Most severe error that stopped a source (load failure or fatal submission).
    pub fn worst_severity(&self) -> Option<ErrorSeverity> {
        self.source_errors
            .iter()
            .map(|(_, e)| e.severity())
            .chain(
                self.reports
                    .iter()
                    .filter_map(|r| r.fatal.as_ref().map(ImportError::severity)),
            )
            .max()
    }
}

fn failure_detail(error: &ImportError) -> FailureDetail {
    FailureDetail {
        status: error.status(),
        message: error.to_string(),
        response_text: error.response_text().map(str::to_string),
    }
}

fn log_failure(record: &QueryRecord, error: &ImportError) {
    match error.status() {
        Some(status) => tracing::error!(
            "Error importing query '{}': status code {}, response: {}",
            record.name,
            status,
            error.response_text().unwrap_or_default()
        ),
        None => tracing::error!("Error importing query '{}': {}", record.name, error),
    }
}

impl<A: SavedQueryApi> ImportPipeline<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Submits a source entry by entry. Failing to enumerate the source is returned as
    /// `Err`. An entry that fails to load stops the entries after it and is recorded
    /// as the report's fatal error. Submission failures follow the source's policy.
    pub async fn run<S: QuerySource + ?Sized>(&mut self, source: &S) -> Result<BatchReport> {
        let label = source.describe();
        tracing::info!("Importing queries from {}", label);

        let entries = source.entries().await?;
        let policy = source.failure_policy();
        let mut report = BatchReport {
            source: label,
            results: Vec::new(),
            fatal: None,
        };

        'entries: for entry in &entries {
            let records = match source.load_entry(entry).await {
                Ok(records) => records,
                Err(error) => {
                    tracing::error!(
                        "Error loading {} from {}: {}",
                        entry.name,
                        report.source,
                        error
                    );
                    report.fatal = Some(error);
                    break;
                }
            };

            for record in records {
                match self.api.create_saved_query(&record).await {
                    Ok(payload) => {
                        tracing::info!("Imported query: {}", record.name);
                        report.results.push(ImportResult {
                            record,
                            outcome: Outcome::Success(payload),
                        });
                    }
                    Err(error) => {
                        log_failure(&record, &error);
                        report.results.push(ImportResult {
                            outcome: Outcome::Failure(failure_detail(&error)),
                            record,
                        });
                        if policy == FailurePolicy::StopOnFirst {
                            report.fatal = Some(error);
                            break 'entries;
                        }
                    }
                }
            }
        }

        tracing::info!(
            "{}: {} imported, {} failed",
            report.source,
            report.succeeded(),
            report.failed()
        );
        Ok(report)
    }

    /// Runs every source in order; a source that fails to load does not stop the others.
    pub async fn run_all(&mut self, sources: &[Box<dyn QuerySource>]) -> ImportSummary {
        let mut summary = ImportSummary::default();
        for source in sources {
            match self.run(source.as_ref()).await {
                Ok(report) => summary.reports.push(report),
                Err(error) => {
                    let label = source.describe();
                    tracing::error!("Error importing from {}: {}", label, error);
                    summary.source_errors.push((label, error));
                }
            }
        }
        summary
    }
}
