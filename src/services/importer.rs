use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info};

use crate::models::Dataset;
use crate::services::bundle::BundleKind;
use crate::services::catalog::CatalogService;
use crate::services::staging::StagedUpload;

/// Everything the import pipeline needs besides the staged files.
#[derive(Debug, Clone)]
pub struct ImportRequest {
    /// Base name shared by the bundle's files; doubles as the dataset name.
    pub name: String,
    pub kind: BundleKind,
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    pub charset: String,
    /// Decoded permissions payload, forwarded as-is.
    pub permissions: Value,
}

/// Seam to the ingestion pipeline.
///
/// Whoever implements this owns the staged directory from the moment
/// `import` is called, including deleting it when done.
#[async_trait]
pub trait DatasetImporter: Send + Sync {
    async fn import(&self, staged: StagedUpload, request: ImportRequest) -> Result<Dataset>;
}

/// Pipeline stand-in that registers the catalog record straight away and
/// reclaims the staging directory.
///
/// The management fields (workspace, store, type name, ...) stay unset,
/// exactly as they would be before the real raster/vector processing has
/// run.
pub struct CatalogImporter {
    catalog: Arc<dyn CatalogService>,
}

impl CatalogImporter {
    pub fn new(catalog: Arc<dyn CatalogService>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl DatasetImporter for CatalogImporter {
    async fn import(&self, staged: StagedUpload, request: ImportRequest) -> Result<Dataset> {
        info!(
            base_file = %staged.base_file_path.display(),
            kind = ?request.kind,
            "importing staged upload"
        );
        debug!(permissions = %request.permissions, "permissions forwarded to catalog");

        let dataset = Dataset {
            id: 0,
            name: request.name.clone(),
            title: request.title.unwrap_or_else(|| request.name.clone()),
            abstract_text: request.abstract_text.unwrap_or_default(),
            keywords: String::new(),
            charset: request.charset,
            created_at: Utc::now(),
            workspace: None,
            store: None,
            store_type: None,
            type_name: None,
            default_style: None,
            styles: Vec::new(),
            upload_session: None,
            service: None,
        };
        let dataset = self.catalog.insert_dataset(dataset).await?;

        // The staged directory is ours now; nothing downstream of this stub
        // will read it again.
        tokio::fs::remove_dir_all(&staged.directory).await?;

        Ok(dataset)
    }
}
