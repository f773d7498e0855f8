use axum::{
    Json,
    extract::{Path, State},
};
use validator::Validate;

use crate::AppState;
use crate::api::error::AppError;
use crate::models::{AttributeEdit, Dataset, DatasetAttribute, DatasetDescription};

#[utoipa::path(
    get,
    path = "/layers/{id}",
    params(
        ("id" = i64, Path, description = "Dataset id")
    ),
    responses(
        (status = 200, description = "Catalog record", body = Dataset),
        (status = 404, description = "Dataset not found")
    ),
    tag = "layers"
)]
pub async fn get_layer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Dataset>, AppError> {
    let dataset = state
        .catalog
        .get_dataset(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("dataset {id} not found")))?;
    Ok(Json(dataset))
}

#[utoipa::path(
    put,
    path = "/layers/{id}/description",
    params(
        ("id" = i64, Path, description = "Dataset id")
    ),
    request_body = DatasetDescription,
    responses(
        (status = 200, description = "Updated catalog record", body = Dataset),
        (status = 400, description = "Description failed validation"),
        (status = 404, description = "Dataset not found")
    ),
    tag = "layers"
)]
pub async fn update_description(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(description): Json<DatasetDescription>,
) -> Result<Json<Dataset>, AppError> {
    description
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let dataset = state
        .catalog
        .update_description(id, &description)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("dataset {id} not found")))?;
    Ok(Json(dataset))
}

#[utoipa::path(
    put,
    path = "/layers/{id}/attributes",
    params(
        ("id" = i64, Path, description = "Dataset id")
    ),
    request_body = Vec<AttributeEdit>,
    responses(
        (status = 200, description = "Resulting attribute table", body = Vec<DatasetAttribute>),
        (status = 404, description = "Dataset not found")
    ),
    tag = "layers"
)]
pub async fn edit_attributes(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(edits): Json<Vec<AttributeEdit>>,
) -> Result<Json<Vec<DatasetAttribute>>, AppError> {
    let attributes = state
        .catalog
        .update_attributes(id, &edits)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("dataset {id} not found")))?;
    Ok(Json(attributes))
}
