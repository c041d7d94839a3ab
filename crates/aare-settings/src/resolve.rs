use crate::model::AareConfigV1;
use aare_types::ids;
use anyhow::Context;

pub const DEFAULT_CACHE_CAPACITY: usize = 10;
pub const DEFAULT_MAX_TEXT_BYTES: usize = 1024 * 1024;

/// Behavior when a named ontology does not exist in the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fallback {
    /// Serve the built-in default ontology instead.
    Default,
    Error,
}

#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub ontology_dir: Option<String>,
    pub default_ontology: Option<String>,
    pub fallback: Option<String>,
    pub cache_capacity: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub ontology_dir: Option<String>,
    pub default_ontology: String,
    pub cache_capacity: usize,
    pub fallback: Fallback,
    pub max_text_bytes: usize,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            ontology_dir: None,
            default_ontology: ids::DEFAULT_ONTOLOGY_NAME.to_string(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            fallback: Fallback::Default,
            max_text_bytes: DEFAULT_MAX_TEXT_BYTES,
        }
    }
}

pub fn resolve_config(cfg: AareConfigV1, overrides: Overrides) -> anyhow::Result<ResolvedConfig> {
    let mut resolved = ResolvedConfig::default();

    if let Some(schema) = cfg.schema.as_deref()
        && schema != "aare.config.v1"
    {
        anyhow::bail!("unsupported config schema: {schema} (expected 'aare.config.v1')");
    }

    resolved.ontology_dir = overrides.ontology_dir.or(cfg.ontology_dir);

    if let Some(name) = overrides.default_ontology.or(cfg.default_ontology) {
        if name.trim().is_empty() {
            anyhow::bail!("default_ontology must not be empty");
        }
        resolved.default_ontology = name;
    }

    if let Some(capacity) = overrides.cache_capacity.or(cfg.cache_capacity) {
        if capacity == 0 {
            anyhow::bail!("cache_capacity must be at least 1");
        }
        resolved.cache_capacity = capacity as usize;
    }

    if let Some(fallback) = overrides.fallback.or(cfg.fallback) {
        resolved.fallback = parse_fallback(&fallback).context("invalid fallback")?;
    }

    if let Some(max) = cfg.max_text_bytes {
        resolved.max_text_bytes =
            usize::try_from(max).context("max_text_bytes does not fit this platform")?;
    }

    Ok(resolved)
}

fn parse_fallback(v: &str) -> anyhow::Result<Fallback> {
    match v {
        "default" => Ok(Fallback::Default),
        "error" => Ok(Fallback::Error),
        other => anyhow::bail!("unknown fallback: {other} (expected 'default' or 'error')"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_config_toml;

    #[test]
    fn empty_config_resolves_to_defaults() {
        let cfg = parse_config_toml("").unwrap();
        let resolved = resolve_config(cfg, Overrides::default()).unwrap();
        assert_eq!(resolved, ResolvedConfig::default());
        assert_eq!(resolved.default_ontology, "mortgage-compliance-v1");
        assert_eq!(resolved.fallback, Fallback::Default);
    }

    #[test]
    fn file_values_apply() {
        let cfg = parse_config_toml(
            r#"
schema = "aare.config.v1"
ontology_dir = "ontologies"
default_ontology = "fair-lending-v2"
cache_capacity = 3
fallback = "error"
max_text_bytes = 2048
"#,
        )
        .unwrap();
        let resolved = resolve_config(cfg, Overrides::default()).unwrap();
        assert_eq!(resolved.ontology_dir.as_deref(), Some("ontologies"));
        assert_eq!(resolved.default_ontology, "fair-lending-v2");
        assert_eq!(resolved.cache_capacity, 3);
        assert_eq!(resolved.fallback, Fallback::Error);
        assert_eq!(resolved.max_text_bytes, 2048);
    }

    #[test]
    fn overrides_win_over_file() {
        let cfg = parse_config_toml("ontology_dir = \"a\"\nfallback = \"error\"").unwrap();
        let resolved = resolve_config(
            cfg,
            Overrides {
                ontology_dir: Some("b".to_string()),
                fallback: Some("default".to_string()),
                ..Overrides::default()
            },
        )
        .unwrap();
        assert_eq!(resolved.ontology_dir.as_deref(), Some("b"));
        assert_eq!(resolved.fallback, Fallback::Default);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let bad_fallback = parse_config_toml("fallback = \"maybe\"").unwrap();
        let err = resolve_config(bad_fallback, Overrides::default()).unwrap_err();
        assert!(format!("{err:#}").contains("unknown fallback"));

        let zero = parse_config_toml("cache_capacity = 0").unwrap();
        assert!(resolve_config(zero, Overrides::default()).is_err());

        let schema = parse_config_toml("schema = \"aare.config.v9\"").unwrap();
        assert!(resolve_config(schema, Overrides::default()).is_err());
    }

    #[test]
    fn unknown_toml_shape_fails_to_parse() {
        assert!(parse_config_toml("cache_capacity = \"ten\"").is_err());
    }
}
