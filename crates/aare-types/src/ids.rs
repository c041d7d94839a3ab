//! Stable identifiers for the built-in ontology and its constraints.
//!
//! Constraint ids are the audit key for a rule: they stay the same across ontology versions
//! as long as the rule means the same thing.

// Built-in ontology
pub const DEFAULT_ONTOLOGY_NAME: &str = "mortgage-compliance-v1";
pub const DEFAULT_ONTOLOGY_VERSION: &str = "1.0.0";

// Constraints: mortgage-compliance-v1
pub const CONSTRAINT_ATR_QM_DTI: &str = "ATR_QM_DTI";
pub const CONSTRAINT_HOEPA_HIGH_COST: &str = "HOEPA_HIGH_COST";
pub const CONSTRAINT_UDAAP_NO_GUARANTEES: &str = "UDAAP_NO_GUARANTEES";
pub const CONSTRAINT_HPML_ESCROW: &str = "HPML_ESCROW";
pub const CONSTRAINT_REG_B_ADVERSE: &str = "REG_B_ADVERSE";

// Tool-level
pub const TOOL_NAME: &str = "aare";
