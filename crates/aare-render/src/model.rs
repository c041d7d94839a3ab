/// Report shape the renderers consume, decoupled from the wire types.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderableReport {
    pub verified: bool,
    pub ontology_name: String,
    pub ontology_version: String,
    pub violations: Vec<RenderableViolation>,
    /// Constraints that could not be decided because inputs were absent.
    pub unknown: Vec<RenderableUnknown>,
    pub counts: RenderableCounts,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderableViolation {
    pub constraint_id: String,
    pub category: String,
    pub message: String,
    pub citation: String,
    pub formula: String,
    /// `(variable, value)` pairs; absent values render as `absent`.
    pub values: Vec<(String, String)>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderableUnknown {
    pub constraint_id: String,
    pub missing: Vec<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderableCounts {
    pub satisfied: u32,
    pub violated: u32,
    pub unknown: u32,
    pub failed: u32,
}
