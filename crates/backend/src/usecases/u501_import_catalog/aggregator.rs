use contracts::usecases::u501_import_catalog::{ConfirmationRequest, ImportResponse, ImportSummary};

use super::detector::DuplicateScan;
use super::reconciler::ImportOutcome;

/// Сводка по итогам записей пакета
#[derive(Debug, Default)]
pub struct ResultAggregator {
    imported_count: usize,
    created_count: usize,
    errors: Vec<String>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: ImportOutcome) {
        match outcome {
            ImportOutcome::Imported { created } => {
                self.imported_count += 1;
                if created {
                    self.created_count += 1;
                }
            }
            ImportOutcome::Failed(reason) => self.errors.push(reason),
        }
    }

    pub fn created_count(&self) -> usize {
        self.created_count
    }

    pub fn finish(self) -> ImportResponse {
        ImportResponse::Completed(ImportSummary {
            imported_count: self.imported_count,
            errors: self.errors,
        })
    }
}

/// Ответ "нужно подтверждение" по результату поиска дубликатов
pub fn confirmation(scan: DuplicateScan) -> ImportResponse {
    ImportResponse::NeedsConfirmation(ConfirmationRequest::new(scan.existing, scan.new_count))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tallies_outcomes() {
        let mut aggregator = ResultAggregator::new();
        aggregator.record(ImportOutcome::Imported { created: true });
        aggregator.record(ImportOutcome::Failed("product B2: boom".into()));
        aggregator.record(ImportOutcome::Imported { created: false });
        assert_eq!(aggregator.created_count(), 1);

        assert_eq!(
            aggregator.finish(),
            ImportResponse::Completed(ImportSummary {
                imported_count: 2,
                errors: vec!["product B2: boom".into()],
            })
        );
    }

    #[test]
    fn test_confirmation_counts_new_records() {
        let response = confirmation(DuplicateScan {
            existing: vec![],
            new_count: 3,
        });
        match response {
            ImportResponse::NeedsConfirmation(req) => {
                assert!(req.needs_confirmation);
                assert_eq!(req.new_products_count, 3);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
