//! Config parsing and override resolution.
//!
//! This crate is intentionally IO-free: it parses and resolves configuration provided as strings.

#![forbid(unsafe_code)]

mod model;
mod resolve;

pub use model::AareConfigV1;
pub use resolve::{
    DEFAULT_CACHE_CAPACITY, DEFAULT_MAX_TEXT_BYTES, Fallback, Overrides, ResolvedConfig,
};

/// Parse `aare.toml` (or equivalent) into a typed model.
pub fn parse_config_toml(input: &str) -> anyhow::Result<AareConfigV1> {
    let cfg: AareConfigV1 = toml::from_str(input)?;
    Ok(cfg)
}

/// Resolve the effective config (built-in defaults, then file, then overrides).
pub fn resolve_config(cfg: AareConfigV1, overrides: Overrides) -> anyhow::Result<ResolvedConfig> {
    resolve::resolve_config(cfg, overrides)
}

/// JSON Schema of `aare.toml`, for editor tooling.
pub fn config_json_schema() -> schemars::Schema {
    schemars::schema_for!(AareConfigV1)
}
