pub mod health;
pub mod layers;
pub mod styles;

use axum::extract::multipart::Field;

use crate::api::error::AppError;
use crate::services::bundle::FilePart;

/// Drains one multipart file field into memory.
pub(crate) async fn read_file_part(field: Field<'_>) -> Result<FilePart, AppError> {
    let file_name = field.file_name().unwrap_or("unnamed").to_string();
    let content = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    Ok(FilePart::new(file_name, content))
}

/// Drains one multipart text field.
pub(crate) async fn read_text(field: Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))
}
