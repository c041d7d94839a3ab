use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// `aare.toml` schema v1.
///
/// This is a *user-facing* config model: every field is optional so an empty file is valid.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AareConfigV1 {
    /// Optional schema string for tooling (`aare.config.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Directory holding `<name>.json` ontology documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ontology_dir: Option<String>,

    /// Ontology used when a request names none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_ontology: Option<String>,

    /// How many validated ontologies to keep in memory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_capacity: Option<u32>,

    /// What to do when a named ontology is not found: `default` (use the built-in) or `error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,

    /// Largest accepted input text, in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_text_bytes: Option<u64>,
}
