use serde::{Deserialize, Serialize};

/// Товар из файла, который уже есть в каталоге
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateProduct {
    pub product_code: String,
    /// Наименование из файла (то, что будет записано при перезаписи)
    pub product_name: String,
    pub stock_to_add: i64,
    pub current_stock: i64,
}

/// Запрос подтверждения: импорт остановлен до решения оператора
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationRequest {
    pub needs_confirmation: bool,
    pub duplicate_products: Vec<DuplicateProduct>,
    pub new_products_count: usize,
}

impl ConfirmationRequest {
    pub fn new(duplicate_products: Vec<DuplicateProduct>, new_products_count: usize) -> Self {
        Self {
            needs_confirmation: true,
            duplicate_products,
            new_products_count,
        }
    }
}

/// Итог выполненного импорта
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub imported_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// Ответ эндпоинта импорта: ровно одна из двух форм
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImportResponse {
    NeedsConfirmation(ConfirmationRequest),
    Completed(ImportSummary),
}

impl ImportResponse {
    pub fn needs_confirmation(&self) -> bool {
        matches!(self, ImportResponse::NeedsConfirmation(_))
    }
}
