pub mod api;
pub mod config;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::UploadConfig;
use crate::services::catalog::CatalogService;
use crate::services::importer::DatasetImporter;
use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::health::health_check,
        api::handlers::layers::upload::upload_layer,
        api::handlers::layers::metadata::get_layer,
        api::handlers::layers::metadata::update_description,
        api::handlers::layers::metadata::edit_attributes,
        api::handlers::styles::upload_style,
    ),
    components(
        schemas(
            api::handlers::health::HealthResponse,
            api::handlers::layers::types::UploadResponse,
            api::handlers::styles::StyleUploadResponse,
            models::Dataset,
            models::DatasetAttribute,
            models::AttributeEdit,
            models::DatasetDescription,
        )
    ),
    tags(
        (name = "layers", description = "Spatial dataset upload and metadata endpoints"),
        (name = "styles", description = "Style upload endpoints"),
        (name = "system", description = "Service health endpoints")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogService>,
    pub importer: Arc<dyn DatasetImporter>,
    pub config: UploadConfig,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health_check))
        .route(
            "/layers/upload",
            post(api::handlers::layers::upload::upload_layer),
        )
        .route("/layers/:id", get(api::handlers::layers::metadata::get_layer))
        .route(
            "/layers/:id/description",
            put(api::handlers::layers::metadata::update_description),
        )
        .route(
            "/layers/:id/attributes",
            put(api::handlers::layers::metadata::edit_attributes),
        )
        .route("/styles/upload", post(api::handlers::styles::upload_style))
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(axum::extract::DefaultBodyLimit::max(
            state.config.max_upload_size,
        ))
        .with_state(state)
}
