use crate::config::{EntityKind, ExistingPolicy, ImportConfig};
use crate::engine::kind::{ContactImport, ImportKind, ValueImport};
use crate::error::{ImportError, ServiceError};
use crate::progress::ProgressReporter;
use crate::service::AccountService;
use crate::stream_rows;

use log::{debug, error, warn};
use std::io::Write;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportCounters {
    pub created: u64,
    pub updated: u64,
    pub skipped: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub counters: ImportCounters,
    /// Rows handed to the engine, blank lines excluded.
    pub rows: u64,
    /// Dry-run rows that failed local validation.
    pub invalid_rows: u64,
}

struct Labels {
    created: String,
    updated: String,
    skipped: String,
}

impl Labels {
    fn new(noun: &str) -> Self {
        Self {
            created: format!("{}s created", noun),
            updated: format!("{}s updated", noun),
            skipped: format!("{}s skipped", noun),
        }
    }
}

/// Streams one CSV file into the account service, one row at a time.
pub struct Importer<'a, W: Write> {
    service: &'a dyn AccountService,
    config: &'a ImportConfig,
    progress: ProgressReporter<W>,
}

impl<'a, W: Write> Importer<'a, W> {
    pub fn new(
        service: &'a dyn AccountService,
        config: &'a ImportConfig,
        progress: ProgressReporter<W>,
    ) -> Self {
        Self {
            service,
            config,
            progress,
        }
    }

    pub async fn run(&mut self) -> Result<ImportReport, ImportError> {
        debug!("import config={:?}", self.config);
        self.config.validate()?;

        match self.config.kind {
            EntityKind::Contact => self.import(&ContactImport).await,
            EntityKind::Value => self.import(&ValueImport).await,
        }
    }

    async fn import<K: ImportKind>(&mut self, kind: &K) -> Result<ImportReport, ImportError> {
        let labels = Labels::new(kind.noun());
        let mut report = ImportReport::default();

        if let Err(e) = self.import_rows(kind, &labels, &mut report).await {
            // Keep the error log off the status line.
            if let Err(io) = self.progress.interrupt() {
                debug!("unable to end status line: {}", io);
            }
            return Err(e);
        }

        if !self.config.dry_run {
            self.show_progress(&labels, &report.counters, true)?;
        }

        Ok(report)
    }

    async fn import_rows<K: ImportKind>(
        &mut self,
        kind: &K,
        labels: &Labels,
        report: &mut ImportReport,
    ) -> Result<(), ImportError> {
        let config = self.config;

        let rows = stream_rows(&config.source_file, config.encoding)?;
        for item in rows {
            let (line, row) = item?;
            report.rows += 1;

            let request = kind.map_row(&row, config);

            if config.dry_run {
                debug!("row={:?}", row);
                let (valid, message) = check_row(kind, &request);
                self.progress.diagnostic(line, &message)?;
                if !valid {
                    report.invalid_rows += 1;
                }
                continue;
            }

            match kind.create(self.service, &request).await {
                Ok(()) => report.counters.created += 1,
                Err(e) if e.is_code(kind.exists_code()) => {
                    self.resolve_existing(kind, line, &request, e, &mut report.counters)
                        .await?
                }
                Err(e) => return Err(e.into()),
            }

            self.show_progress(labels, &report.counters, false)?;
        }

        Ok(())
    }

    async fn resolve_existing<K: ImportKind>(
        &mut self,
        kind: &K,
        line: u64,
        request: &K::Request,
        conflict: ServiceError,
        counters: &mut ImportCounters,
    ) -> Result<(), ImportError> {
        match self.config.existing {
            ExistingPolicy::Skip => {
                debug!("{} skipping...", conflict.message);
                counters.skipped += 1;
            }
            ExistingPolicy::Update => {
                debug!("{} updating...", conflict.message);
                kind.update(self.service, request).await?;
                counters.updated += 1;
            }
            ExistingPolicy::Warn => {
                warn!("Line {} {}", line, conflict.message);
            }
            ExistingPolicy::Exit => {
                error!("Line {} {}", line, conflict.message);
                return Err(ImportError::ExistsExit {
                    line,
                    message: conflict.message,
                });
            }
        }
        Ok(())
    }

    fn show_progress(
        &mut self,
        labels: &Labels,
        counters: &ImportCounters,
        done: bool,
    ) -> Result<(), ImportError> {
        self.progress.report(
            &[
                (counters.created, labels.created.as_str()),
                (counters.updated, labels.updated.as_str()),
                (counters.skipped, labels.skipped.as_str()),
            ],
            done,
        )?;
        Ok(())
    }

    pub fn into_progress(self) -> ProgressReporter<W> {
        self.progress
    }
}

/// Dry-run verdict for one row: whether it is valid, and the text to show for
/// it. Valid rows render as the request that would be sent.
fn check_row<K: ImportKind>(kind: &K, request: &K::Request) -> (bool, String) {
    match kind.check(request) {
        Some(problem) => (false, problem.describe(kind.noun())),
        None => {
            let rendered =
                serde_json::to_string(request).unwrap_or_else(|_| format!("{:?}", request));
            (true, rendered)
        }
    }
}
