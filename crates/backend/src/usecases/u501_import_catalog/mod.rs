//! UseCase u501: массовый импорт каталога из CSV/XLSX/XLS
//!
//! Конвейер: parser -> grouper -> detector -> reconciler -> aggregator,
//! управляется `executor::CatalogImportExecutor`.

pub mod aggregator;
pub mod detector;
pub mod error;
pub mod executor;
pub mod grouper;
pub mod headers;
pub mod parser;
pub mod price_tiers;
pub mod reconciler;

pub use error::{ImportError, PriceTierViolation, RecordError};
pub use executor::CatalogImportExecutor;
