use axum::{
    Json,
    extract::{Multipart, State},
};
use uuid::Uuid;

use super::types::UploadResponse;
use crate::AppState;
use crate::api::error::AppError;
use crate::api::handlers::{read_file_part, read_text};
use crate::services::bundle::{FilePart, UploadBundle};
use crate::services::importer::ImportRequest;
use crate::services::staging::stage_bundle;
use crate::utils::permissions::parse_permissions;

/// Collected multipart fields of one upload submission.
#[derive(Default)]
struct UploadForm {
    base_file: Option<FilePart>,
    dbf_file: Option<FilePart>,
    shx_file: Option<FilePart>,
    prj_file: Option<FilePart>,
    xml_file: Option<FilePart>,
    sld_file: Option<FilePart>,
    abstract_text: Option<String>,
    layer_title: Option<String>,
    permissions: Option<String>,
    charset: Option<String>,
}

#[utoipa::path(
    post,
    path = "/layers/upload",
    request_body(content = Multipart, description = "Spatial dataset bundle"),
    responses(
        (status = 200, description = "Bundle staged and handed to the importer", body = UploadResponse),
        (status = 400, description = "Bundle failed validation")
    ),
    tag = "layers"
)]
pub async fn upload_layer(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "base_file" => form.base_file = Some(read_file_part(field).await?),
            "dbf_file" => form.dbf_file = Some(read_file_part(field).await?),
            "shx_file" => form.shx_file = Some(read_file_part(field).await?),
            "prj_file" => form.prj_file = Some(read_file_part(field).await?),
            "xml_file" => form.xml_file = Some(read_file_part(field).await?),
            "sld_file" => form.sld_file = Some(read_file_part(field).await?),
            "abstract" => form.abstract_text = Some(read_text(field).await?),
            "layer_title" => form.layer_title = Some(read_text(field).await?),
            "permissions" => form.permissions = Some(read_text(field).await?),
            "charset" => form.charset = Some(read_text(field).await?),
            // Unrecognized fields are ignored rather than rejected.
            _ => {}
        }
    }

    let base_file = form
        .base_file
        .ok_or_else(|| AppError::BadRequest("base_file is required".to_string()))?;
    let permissions_text = form
        .permissions
        .ok_or_else(|| AppError::BadRequest("permissions field is required".to_string()))?;
    let permissions = parse_permissions(&permissions_text)?;

    let bundle = UploadBundle {
        base_file,
        dbf_file: form.dbf_file,
        shx_file: form.shx_file,
        prj_file: form.prj_file,
        xml_file: form.xml_file,
        sld_file: form.sld_file,
    };
    let validated = bundle.validate()?;

    let staged_files: Vec<String> = validated
        .parts()
        .iter()
        .map(|p| p.file_name.clone())
        .collect();
    let name = validated.base_name().to_string();
    let kind = validated.kind();

    // Staging is blocking filesystem work; keep it off the async executor.
    let staging_root = state.config.staging_dir.clone();
    let staged =
        tokio::task::spawn_blocking(move || stage_bundle(&validated, staging_root.as_deref()))
            .await
            .map_err(|e| AppError::Internal(format!("staging task failed: {e}")))??;

    tracing::info!(
        dataset = %name,
        files = staged_files.len(),
        directory = %staged.directory.display(),
        "upload staged"
    );

    let request = ImportRequest {
        name,
        kind,
        title: form.layer_title,
        abstract_text: form.abstract_text,
        charset: form
            .charset
            .unwrap_or_else(|| state.config.default_charset.clone()),
        permissions,
    };
    let dataset = state.importer.import(staged, request).await?;

    Ok(Json(UploadResponse {
        upload_id: Uuid::new_v4().to_string(),
        dataset,
        staged_files,
    }))
}
