use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::conditional::Conditional;
use crate::spec::field::FieldSchema;

/// Submission and autosave behaviour embedded in a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Settings {
    #[serde(default)]
    pub allow_draft: bool,
    #[serde(default)]
    pub auto_save: bool,
    #[serde(default = "default_auto_save_interval")]
    pub auto_save_interval_secs: u64,
    #[serde(default = "default_submit_label")]
    pub submit_label: String,
    #[serde(default = "default_draft_label")]
    pub draft_label: String,
}

fn default_auto_save_interval() -> u64 {
    30
}

fn default_submit_label() -> String {
    "Submit".into()
}

fn default_draft_label() -> String {
    "Save draft".into()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            allow_draft: false,
            auto_save: false,
            auto_save_interval_secs: default_auto_save_interval(),
            submit_label: default_submit_label(),
            draft_label: default_draft_label(),
        }
    }
}

/// Ordered grouping of fields, itself optionally conditional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Section {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional: Option<Conditional>,
    pub fields: Vec<FieldSchema>,
}

/// Top-level dynamic form definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormSchema {
    pub id: String,
    pub title: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub settings: Settings,
    pub sections: Vec<Section>,
}

impl FormSchema {
    /// Iterates every field across all sections in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.sections
            .iter()
            .flat_map(|section| section.fields.iter())
    }

    pub fn field(&self, id: &str) -> Option<&FieldSchema> {
        self.fields().find(|field| field.id == id)
    }

    pub fn has_field(&self, id: &str) -> bool {
        self.field(id).is_some()
    }
}
