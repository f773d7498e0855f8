use serde::Serialize;
use utoipa::ToSchema;

use crate::models::Dataset;

#[derive(Serialize, ToSchema)]
pub struct UploadResponse {
    pub upload_id: String,
    pub dataset: Dataset,
    /// Filenames written to staging, in staging order. Metadata sidecars may
    /// appear here under their normalized name.
    pub staged_files: Vec<String>,
}
