use std::sync::atomic::{AtomicI64, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use tracing::warn;

use crate::models::{AttributeEdit, Dataset, DatasetAttribute, DatasetDescription};

/// A style definition registered against a dataset. The body is opaque at
/// this layer.
#[derive(Debug, Clone)]
pub struct StyleRecord {
    pub name: String,
    pub body: Bytes,
}

/// Seam to the catalog record store.
///
/// The real deployment backs this with the catalog database; the service
/// only needs these operations, so tests and the dev binary can run against
/// [`InMemoryCatalog`].
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Inserts a new dataset and returns it with its assigned id.
    async fn insert_dataset(&self, dataset: Dataset) -> Result<Dataset>;

    async fn get_dataset(&self, id: i64) -> Result<Option<Dataset>>;

    /// Applies the descriptive-metadata form. Returns the updated record, or
    /// `None` when the dataset does not exist.
    async fn update_description(
        &self,
        id: i64,
        description: &DatasetDescription,
    ) -> Result<Option<Dataset>>;

    /// Replaces a dataset's attribute table wholesale (import pipeline use).
    async fn replace_attributes(&self, id: i64, attributes: Vec<DatasetAttribute>) -> Result<()>;

    async fn get_attributes(&self, id: i64) -> Result<Vec<DatasetAttribute>>;

    /// Applies the editable subset of attribute fields. Edits naming unknown
    /// attributes are skipped. Returns the resulting table, or `None` when
    /// the dataset does not exist.
    async fn update_attributes(
        &self,
        id: i64,
        edits: &[AttributeEdit],
    ) -> Result<Option<Vec<DatasetAttribute>>>;

    /// Registers a style body for a dataset. Returns the style name used, or
    /// `None` when the dataset does not exist.
    async fn register_style(
        &self,
        id: i64,
        name: Option<String>,
        set_default: bool,
        body: Bytes,
    ) -> Result<Option<String>>;
}

/// DashMap-backed catalog used by the dev binary and the test suite.
#[derive(Default)]
pub struct InMemoryCatalog {
    datasets: DashMap<i64, Dataset>,
    attributes: DashMap<i64, Vec<DatasetAttribute>>,
    styles: DashMap<i64, Vec<StyleRecord>>,
    next_id: AtomicI64,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            ..Default::default()
        }
    }

    /// Registered style bodies for a dataset, in registration order.
    pub fn styles_for(&self, id: i64) -> Vec<StyleRecord> {
        self.styles.get(&id).map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CatalogService for InMemoryCatalog {
    async fn insert_dataset(&self, mut dataset: Dataset) -> Result<Dataset> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        dataset.id = id;
        self.datasets.insert(id, dataset.clone());
        Ok(dataset)
    }

    async fn get_dataset(&self, id: i64) -> Result<Option<Dataset>> {
        Ok(self.datasets.get(&id).map(|d| d.clone()))
    }

    async fn update_description(
        &self,
        id: i64,
        description: &DatasetDescription,
    ) -> Result<Option<Dataset>> {
        let Some(mut entry) = self.datasets.get_mut(&id) else {
            return Ok(None);
        };
        entry.title = description.title.clone();
        entry.abstract_text = description.abstract_text.clone().unwrap_or_default();
        entry.keywords = description.keywords.clone().unwrap_or_default();
        Ok(Some(entry.clone()))
    }

    async fn replace_attributes(&self, id: i64, attributes: Vec<DatasetAttribute>) -> Result<()> {
        self.attributes.insert(id, attributes);
        Ok(())
    }

    async fn get_attributes(&self, id: i64) -> Result<Vec<DatasetAttribute>> {
        Ok(self.attributes.get(&id).map(|a| a.clone()).unwrap_or_default())
    }

    async fn update_attributes(
        &self,
        id: i64,
        edits: &[AttributeEdit],
    ) -> Result<Option<Vec<DatasetAttribute>>> {
        if !self.datasets.contains_key(&id) {
            return Ok(None);
        }
        let mut table = self.attributes.entry(id).or_default();
        for edit in edits {
            match table.iter_mut().find(|a| a.attribute == edit.attribute) {
                Some(attr) => attr.apply_edit(edit),
                None => warn!(
                    attribute = %edit.attribute,
                    dataset = id,
                    "edit for unknown attribute skipped"
                ),
            }
        }
        Ok(Some(table.clone()))
    }

    async fn register_style(
        &self,
        id: i64,
        name: Option<String>,
        set_default: bool,
        body: Bytes,
    ) -> Result<Option<String>> {
        let Some(mut dataset) = self.datasets.get_mut(&id) else {
            return Ok(None);
        };

        let style_name = name.unwrap_or_else(|| dataset.name.clone());

        let mut styles = self.styles.entry(id).or_default();
        styles.retain(|s| s.name != style_name);
        styles.push(StyleRecord {
            name: style_name.clone(),
            body,
        });

        if !dataset.styles.contains(&style_name) {
            dataset.styles.push(style_name.clone());
        }
        // The first registered style becomes the default.
        if set_default || dataset.default_style.is_none() {
            dataset.default_style = Some(style_name.clone());
        }

        Ok(Some(style_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn dataset(name: &str) -> Dataset {
        Dataset {
            id: 0,
            name: name.to_string(),
            title: name.to_string(),
            abstract_text: String::new(),
            keywords: String::new(),
            charset: "UTF-8".to_string(),
            created_at: Utc::now(),
            workspace: None,
            store: None,
            store_type: None,
            type_name: None,
            default_style: None,
            styles: Vec::new(),
            upload_session: None,
            service: None,
        }
    }

    fn attribute(name: &str, order: i32) -> DatasetAttribute {
        DatasetAttribute {
            attribute: name.to_string(),
            attribute_label: None,
            attribute_type: "xsd:string".to_string(),
            display_order: order,
            count: Some(10),
            min: None,
            max: None,
            average: None,
            median: None,
            stddev: None,
            sum: None,
            unique_values: Some(10),
            last_stats_updated: None,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let catalog = InMemoryCatalog::new();
        let first = catalog.insert_dataset(dataset("roads")).await.unwrap();
        let second = catalog.insert_dataset(dataset("parcels")).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(
            catalog.get_dataset(1).await.unwrap().unwrap().name,
            "roads"
        );
    }

    #[tokio::test]
    async fn test_update_description_on_missing_dataset() {
        let catalog = InMemoryCatalog::new();
        let description = DatasetDescription {
            title: "Roads".to_string(),
            abstract_text: None,
            keywords: None,
        };
        assert!(catalog.update_description(99, &description).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_description_replaces_descriptive_fields() {
        let catalog = InMemoryCatalog::new();
        let inserted = catalog.insert_dataset(dataset("roads")).await.unwrap();

        let description = DatasetDescription {
            title: "Road Network".to_string(),
            abstract_text: Some("All public roads".to_string()),
            keywords: Some("transport".to_string()),
        };
        let updated = catalog
            .update_description(inserted.id, &description)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.title, "Road Network");
        assert_eq!(updated.abstract_text, "All public roads");
        assert_eq!(updated.keywords, "transport");
        assert_eq!(updated.name, "roads");
    }

    #[tokio::test]
    async fn test_update_attributes_skips_unknown_names() {
        let catalog = InMemoryCatalog::new();
        let inserted = catalog.insert_dataset(dataset("roads")).await.unwrap();
        catalog
            .replace_attributes(inserted.id, vec![attribute("surface", 1)])
            .await
            .unwrap();

        let edits = vec![
            AttributeEdit {
                attribute: "surface".to_string(),
                attribute_label: Some("Surface type".to_string()),
                display_order: 3,
            },
            AttributeEdit {
                attribute: "ghost".to_string(),
                attribute_label: None,
                display_order: 9,
            },
        ];
        let table = catalog
            .update_attributes(inserted.id, &edits)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table[0].attribute_label.as_deref(), Some("Surface type"));
        assert_eq!(table[0].display_order, 3);
        // Statistics survive the edit untouched.
        assert_eq!(table[0].count, Some(10));
    }

    #[tokio::test]
    async fn test_register_style_defaults_to_dataset_name() {
        let catalog = InMemoryCatalog::new();
        let inserted = catalog.insert_dataset(dataset("roads")).await.unwrap();

        let style_name = catalog
            .register_style(inserted.id, None, false, Bytes::from_static(b"<sld/>"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(style_name, "roads");

        let refreshed = catalog.get_dataset(inserted.id).await.unwrap().unwrap();
        assert_eq!(refreshed.styles, vec!["roads".to_string()]);
        // First style becomes the default even without the flag.
        assert_eq!(refreshed.default_style.as_deref(), Some("roads"));
        assert_eq!(catalog.styles_for(inserted.id).len(), 1);
    }

    #[tokio::test]
    async fn test_register_style_set_default_flag() {
        let catalog = InMemoryCatalog::new();
        let inserted = catalog.insert_dataset(dataset("roads")).await.unwrap();

        catalog
            .register_style(inserted.id, Some("plain".to_string()), false, Bytes::new())
            .await
            .unwrap();
        catalog
            .register_style(inserted.id, Some("fancy".to_string()), true, Bytes::new())
            .await
            .unwrap();

        let refreshed = catalog.get_dataset(inserted.id).await.unwrap().unwrap();
        assert_eq!(refreshed.default_style.as_deref(), Some("fancy"));
        assert_eq!(refreshed.styles.len(), 2);
    }

    #[tokio::test]
    async fn test_register_style_on_missing_dataset() {
        let catalog = InMemoryCatalog::new();
        let registered = catalog
            .register_style(42, None, false, Bytes::new())
            .await
            .unwrap();
        assert!(registered.is_none());
    }
}
