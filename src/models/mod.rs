use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// A catalog dataset record.
///
/// Only the descriptive fields are ever taken from user input. The management
/// fields are filled in by the import pipeline once the staged files have
/// been processed; no form surface exposes them for editing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Dataset {
    pub id: i64,
    pub name: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub keywords: String,
    pub charset: String,
    pub created_at: DateTime<Utc>,

    // Managed by the import pipeline, never by a form.
    pub workspace: Option<String>,
    pub store: Option<String>,
    pub store_type: Option<String>,
    pub type_name: Option<String>,
    pub default_style: Option<String>,
    pub styles: Vec<String>,
    pub upload_session: Option<String>,
    pub service: Option<String>,
}

/// One vector attribute column together with its computed statistics.
///
/// The statistics are recomputed by the import pipeline and are read-only
/// everywhere else.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DatasetAttribute {
    pub attribute: String,
    pub attribute_label: Option<String>,
    pub attribute_type: String,
    pub display_order: i32,
    pub count: Option<i64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub average: Option<f64>,
    pub median: Option<f64>,
    pub stddev: Option<f64>,
    pub sum: Option<f64>,
    pub unique_values: Option<i64>,
    pub last_stats_updated: Option<DateTime<Utc>>,
}

/// The subset of attribute fields a user may change.
///
/// `attribute` identifies the row and is informational only; it is matched
/// against the existing table but never rewritten.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttributeEdit {
    pub attribute: String,
    pub attribute_label: Option<String>,
    pub display_order: i32,
}

impl DatasetAttribute {
    /// Applies an edit, touching only the editable fields.
    pub fn apply_edit(&mut self, edit: &AttributeEdit) {
        self.attribute_label = edit.attribute_label.clone();
        self.display_order = edit.display_order;
    }
}

/// Descriptive metadata for a dataset. No cross-field validation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct DatasetDescription {
    #[validate(length(
        min = 1,
        max = 300,
        message = "Title must be between 1 and 300 characters"
    ))]
    pub title: String,

    #[validate(length(max = 1000, message = "Abstract must be at most 1000 characters"))]
    #[serde(rename = "abstract", default)]
    pub abstract_text: Option<String>,

    #[validate(length(max = 500, message = "Keywords must be at most 500 characters"))]
    #[serde(default)]
    pub keywords: Option<String>,
}
