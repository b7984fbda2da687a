use chrono::Utc;
use contracts::usecases::u501_import_catalog::{ImportOptions, ImportResponse};
use sea_orm::DatabaseConnection;

use super::aggregator::{self, ResultAggregator};
use super::detector;
use super::error::ImportError;
use super::grouper::{self, CanonicalProductRecord, GroupingPolicy, DEFAULT_GROUPING_POLICY};
use super::parser::{self, ImportFormat};
use super::reconciler::{self, ConflictPolicy};
use crate::domain::a001_location::service::ensure_default_locations;
use crate::shared::config::ImportSettings;

/// Фазы обработки одного пакета
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportPhase {
    Parsing,
    Grouping,
    DetectingDuplicates,
    AwaitingConfirmation,
    Reconciling,
    Completed,
}

impl ImportPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportPhase::Parsing => "parsing",
            ImportPhase::Grouping => "grouping",
            ImportPhase::DetectingDuplicates => "detecting_duplicates",
            ImportPhase::AwaitingConfirmation => "awaiting_confirmation",
            ImportPhase::Reconciling => "reconciling",
            ImportPhase::Completed => "completed",
        }
    }
}

/// Executor для UseCase импорта каталога из файла
#[derive(Clone)]
pub struct CatalogImportExecutor {
    db: DatabaseConnection,
    settings: ImportSettings,
    grouping_policy: GroupingPolicy,
}

impl CatalogImportExecutor {
    pub fn new(db: DatabaseConnection, settings: ImportSettings) -> Self {
        Self {
            db,
            settings,
            grouping_policy: DEFAULT_GROUPING_POLICY,
        }
    }

    pub fn with_grouping_policy(mut self, policy: GroupingPolicy) -> Self {
        self.grouping_policy = policy;
        self
    }

    /// Импорт загруженного файла: разбор, группировка, сверка с каталогом
    pub async fn execute(
        &self,
        file_name: &str,
        bytes: &[u8],
        options: ImportOptions,
        imported_by: &str,
    ) -> Result<ImportResponse, ImportError> {
        tracing::info!(
            file_name,
            imported_by,
            force = options.force,
            mode = options.mode.as_str(),
            "Catalog import started"
        );

        enter(ImportPhase::Parsing);
        let format = ImportFormat::from_file_name(file_name)?;
        let rows = parser::parse(bytes, format)?;

        enter(ImportPhase::Grouping);
        let report = grouper::group_rows(&rows, self.grouping_policy, Utc::now());
        if !report.skipped_lines.is_empty() {
            tracing::warn!(
                "{} rows without product code skipped (lines {:?})",
                report.skipped_lines.len(),
                report.skipped_lines
            );
        }
        tracing::info!("{} rows grouped into {} records", rows.len(), report.records.len());

        self.import_records(report.records, options).await
    }

    /// Импорт уже сгруппированных записей
    pub async fn import_records(
        &self,
        records: Vec<CanonicalProductRecord>,
        options: ImportOptions,
    ) -> Result<ImportResponse, ImportError> {
        let started_at = std::time::Instant::now();

        if !options.force {
            enter(ImportPhase::DetectingDuplicates);
            let scan = detector::scan(&self.db, &records).await?;
            if scan.has_duplicates() {
                enter(ImportPhase::AwaitingConfirmation);
                tracing::info!(
                    "{} products already exist, {} new: confirmation required",
                    scan.existing.len(),
                    scan.new_count
                );
                return Ok(aggregator::confirmation(scan));
            }
        }

        enter(ImportPhase::Reconciling);
        let locations = ensure_default_locations(&self.db, &self.settings).await?;
        let policy = ConflictPolicy::from_options(&options);

        let mut results = ResultAggregator::new();
        for (idx, record) in records.iter().enumerate() {
            if idx > 0 && idx % 100 == 0 {
                tracing::info!("Catalog import progress: {} records processed...", idx);
            }
            let outcome = reconciler::reconcile_record(&self.db, &locations, record, policy).await;
            results.record(outcome);
        }

        enter(ImportPhase::Completed);
        let created = results.created_count();
        let response = results.finish();
        if let ImportResponse::Completed(summary) = &response {
            tracing::info!(
                "Catalog import finished in {:?}: {} imported ({} new), {} failed",
                started_at.elapsed(),
                summary.imported_count,
                created,
                summary.errors.len()
            );
        }
        Ok(response)
    }
}

fn enter(phase: ImportPhase) {
    tracing::debug!(phase = phase.as_str(), "Catalog import phase");
}
