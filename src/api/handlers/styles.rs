use axum::{
    Json,
    extract::{Multipart, State},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::AppState;
use crate::api::error::AppError;
use crate::api::handlers::{read_file_part, read_text};
use crate::services::bundle::FilePart;

#[derive(Serialize, ToSchema)]
pub struct StyleUploadResponse {
    pub dataset_id: i64,
    pub style_name: String,
}

#[utoipa::path(
    post,
    path = "/styles/upload",
    request_body(content = Multipart, description = "Style definition upload"),
    responses(
        (status = 200, description = "Style registered", body = StyleUploadResponse),
        (status = 400, description = "Malformed style submission"),
        (status = 404, description = "Dataset not found")
    ),
    tag = "styles"
)]
pub async fn upload_style(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<StyleUploadResponse>, AppError> {
    let mut layer_id: Option<i64> = None;
    let mut name: Option<String> = None;
    let mut set_default = false;
    let mut sld: Option<FilePart> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "layerid" => {
                let text = read_text(field).await?;
                layer_id = Some(text.trim().parse().map_err(|_| {
                    AppError::BadRequest("layerid must be an integer".to_string())
                })?);
            }
            "name" => {
                let text = read_text(field).await?;
                if !text.is_empty() {
                    name = Some(text);
                }
            }
            "update" => {
                let text = read_text(field).await?;
                set_default = matches!(
                    text.trim().to_ascii_lowercase().as_str(),
                    "true" | "on" | "1"
                );
            }
            "sld" => sld = Some(read_file_part(field).await?),
            _ => {}
        }
    }

    let layer_id =
        layer_id.ok_or_else(|| AppError::BadRequest("layerid is required".to_string()))?;
    // The style body is opaque here; the catalog's style registration is the
    // first layer that looks inside it.
    let sld = sld.ok_or_else(|| AppError::BadRequest("sld file is required".to_string()))?;

    let style_name = state
        .catalog
        .register_style(layer_id, name, set_default, sld.content)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("dataset {layer_id} not found")))?;

    tracing::info!(dataset = layer_id, style = %style_name, "style registered");

    Ok(Json(StyleUploadResponse {
        dataset_id: layer_id,
        style_name,
    }))
}
