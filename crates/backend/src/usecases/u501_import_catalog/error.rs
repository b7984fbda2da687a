use contracts::domain::a004_product::PriceLevel;
use sea_orm::DbErr;
use thiserror::Error;

/// Ошибки уровня пакета: импорт не начинается или прерывается целиком
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("No file uploaded: multipart field 'file' is required")]
    MissingFile,

    #[error("Unsupported file format '{0}': expected .csv, .xlsx or .xls")]
    UnsupportedFormat(String),

    #[error("File contains no data rows")]
    EmptyInput,

    #[error("Malformed {format} file: {reason}")]
    MalformedFile {
        format: &'static str,
        reason: String,
    },

    #[error("Uploaded file exceeds the limit of {limit} bytes")]
    FileTooLarge { limit: usize },

    #[error("Invalid value '{value}' for '{field}'")]
    InvalidParameter { field: String, value: String },

    #[error("Storage error: {0}")]
    Storage(#[from] DbErr),
}

impl ImportError {
    /// Ошибка во входных данных запроса (HTTP 400), а не в системе
    pub fn is_input_error(&self) -> bool {
        !matches!(self, ImportError::Storage(_))
    }
}

/// Нарушение лестницы цен: уровень дороже вышестоящего
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("product {product_code}: {level} price {value} exceeds {ceiling_level} price {ceiling}")]
pub struct PriceTierViolation {
    pub product_code: String,
    pub level: PriceLevel,
    pub value: i64,
    pub ceiling_level: PriceLevel,
    pub ceiling: i64,
}

/// Ошибка одной записи: откатывает только её транзакцию
#[derive(Debug, Error)]
pub enum RecordError {
    #[error(transparent)]
    PriceTier(#[from] PriceTierViolation),

    #[error("product {product_code}: {field} exceeds the maximum of {max}")]
    AmountOutOfRange {
        product_code: String,
        field: &'static str,
        max: i64,
    },

    #[error("product {product_code}: already exists in catalog")]
    AlreadyExists { product_code: String },

    #[error("product {product_code}: {source}")]
    Storage {
        product_code: String,
        #[source]
        source: DbErr,
    },
}

impl RecordError {
    pub fn storage(product_code: &str, source: DbErr) -> Self {
        RecordError::Storage {
            product_code: product_code.to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_product() {
        let violation = PriceTierViolation {
            product_code: "A1".into(),
            level: PriceLevel::Silver,
            value: 20000,
            ceiling_level: PriceLevel::Retail,
            ceiling: 15000,
        };
        assert_eq!(
            RecordError::from(violation).to_string(),
            "product A1: silver price 20000 exceeds retail price 15000"
        );
        let exists = RecordError::AlreadyExists {
            product_code: "B2".into(),
        };
        assert_eq!(exists.to_string(), "product B2: already exists in catalog");
        let oversized = RecordError::AmountOutOfRange {
            product_code: "OV".into(),
            field: "stock",
            max: 999_999_999_999,
        };
        assert_eq!(
            oversized.to_string(),
            "product OV: stock exceeds the maximum of 999999999999"
        );
    }

    #[test]
    fn test_input_vs_system_errors() {
        assert!(ImportError::EmptyInput.is_input_error());
        assert!(ImportError::UnsupportedFormat("txt".into()).is_input_error());
        assert!(ImportError::FileTooLarge { limit: 1024 }.is_input_error());
        assert!(!ImportError::Storage(DbErr::Custom("boom".into())).is_input_error());
    }
}
