use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use contracts::usecases::u501_import_catalog::{ConflictMode, ImportOptions, ImportResponse};
use serde::Serialize;

use crate::shared::app_state::AppState;
use crate::system::auth::extractor::CurrentUser;
use crate::usecases::u501_import_catalog::{headers, CatalogImportExecutor, ImportError};

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ImportError {
    fn into_response(self) -> Response {
        let status = if matches!(self, ImportError::FileTooLarge { .. }) {
            tracing::warn!("Catalog import rejected: {}", self);
            StatusCode::PAYLOAD_TOO_LARGE
        } else if self.is_input_error() {
            tracing::warn!("Catalog import rejected: {}", self);
            StatusCode::BAD_REQUEST
        } else {
            tracing::error!("Catalog import failed: {}", self);
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

// ============================================================================
// UseCase u501: Import catalog from CSV/XLSX/XLS
// ============================================================================

/// Загруженный файл и параметры из multipart-формы
struct ImportUpload {
    file_name: String,
    bytes: Vec<u8>,
    options: ImportOptions,
}

async fn read_upload(mut multipart: Multipart, limit: usize) -> Result<ImportUpload, ImportError> {
    // Превышение DefaultBodyLimit приходит из multer как ошибка чтения потока
    let malformed = |e: MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ImportError::FileTooLarge { limit }
        } else {
            ImportError::MalformedFile {
                format: "multipart",
                reason: e.to_string(),
            }
        }
    };

    let mut file: Option<(String, Vec<u8>)> = None;
    let mut options = ImportOptions::default();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(malformed)?;
                file = Some((file_name, bytes.to_vec()));
            }
            "force" => {
                let value = field.text().await.map_err(malformed)?;
                options.force = parse_force(&value)?;
            }
            "mode" => {
                let value = field.text().await.map_err(malformed)?;
                if !value.trim().is_empty() {
                    options.mode =
                        ConflictMode::parse(&value).ok_or_else(|| ImportError::InvalidParameter {
                            field: "mode".to_string(),
                            value: value.clone(),
                        })?;
                }
            }
            other => tracing::debug!("Ignoring multipart field '{}'", other),
        }
    }

    let (file_name, bytes) = file.ok_or(ImportError::MissingFile)?;
    Ok(ImportUpload {
        file_name,
        bytes,
        options,
    })
}

fn parse_force(value: &str) -> Result<bool, ImportError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "false" | "0" => Ok(false),
        "true" | "1" => Ok(true),
        _ => Err(ImportError::InvalidParameter {
            field: "force".to_string(),
            value: value.to_string(),
        }),
    }
}

/// POST /api/u501/import-catalog
pub async fn u501_import_catalog(
    State(state): State<AppState>,
    user: CurrentUser,
    multipart: Multipart,
) -> Result<Json<ImportResponse>, ImportError> {
    let upload = read_upload(multipart, state.config.import.max_upload_bytes).await?;
    tracing::info!(
        "U501 import request from '{}': file={}, size={} bytes",
        user.username,
        upload.file_name,
        upload.bytes.len()
    );

    let executor = CatalogImportExecutor::new(state.db.clone(), state.config.import.clone());
    let response = executor
        .execute(&upload.file_name, &upload.bytes, upload.options, &user.username)
        .await?;
    Ok(Json(response))
}

/// GET /api/u501/import-catalog/template
/// CSV с каноническими заголовками колонок
pub async fn u501_import_template() -> Result<Response, StatusCode> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(headers::canonical_headers())
        .map_err(|e| {
            tracing::error!("Failed to build import template: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    let body = writer.into_inner().map_err(|e| {
        tracing::error!("Failed to build import template: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"catalog_import_template.csv\"",
            ),
        ],
        body,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_force() {
        assert!(!parse_force("").unwrap());
        assert!(!parse_force("False").unwrap());
        assert!(parse_force(" true ").unwrap());
        assert!(parse_force("1").unwrap());
        assert!(matches!(
            parse_force("ya"),
            Err(ImportError::InvalidParameter { .. })
        ));
    }
}
