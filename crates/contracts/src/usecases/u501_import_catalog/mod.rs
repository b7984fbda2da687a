//! UseCase u501: массовый импорт каталога товаров из CSV/XLSX/XLS

pub mod request;
pub mod response;

pub use request::{ConflictMode, ImportOptions};
pub use response::{ConfirmationRequest, DuplicateProduct, ImportResponse, ImportSummary};
