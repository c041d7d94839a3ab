//! Ontology store: loads `<dir>/<name>.json`, falls back to the built-in default, and keeps a
//! bounded cache of validated ontologies.
//!
//! "Not found" and "invalid" are different outcomes. A missing ontology may fall back to the
//! built-in default (per config); a document that exists but fails validation is always an error.

use aare_ontology::{OntologyError, ValidatedOntology, default_ontology, load_ontology_json, validate};
use aare_settings::{Fallback, ResolvedConfig};
use aare_types::ids;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("ontology '{name}' not found")]
    NotFound { name: String },

    #[error("invalid ontology name '{name}'")]
    InvalidName { name: String },

    #[error("ontology '{name}' failed to load")]
    Invalid {
        name: String,
        #[source]
        source: OntologyError,
    },

    #[error("failed to read {path}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Least-recently-used cache; front is most recent.
#[derive(Debug)]
struct Cache {
    capacity: usize,
    entries: VecDeque<(String, Arc<ValidatedOntology>)>,
}

impl Cache {
    fn get(&mut self, name: &str) -> Option<Arc<ValidatedOntology>> {
        let pos = self.entries.iter().position(|(n, _)| n == name)?;
        let entry = self.entries.remove(pos)?;
        let ontology = Arc::clone(&entry.1);
        self.entries.push_front(entry);
        Some(ontology)
    }

    fn insert(&mut self, name: &str, ontology: Arc<ValidatedOntology>) {
        self.entries.retain(|(n, _)| n != name);
        self.entries.push_front((name.to_string(), ontology));
        self.entries.truncate(self.capacity);
    }
}

#[derive(Debug)]
pub struct OntologyStore {
    dir: Option<Utf8PathBuf>,
    fallback: Fallback,
    cache: Mutex<Cache>,
}

impl OntologyStore {
    pub fn new(dir: Option<Utf8PathBuf>, fallback: Fallback, capacity: usize) -> Self {
        Self {
            dir,
            fallback,
            cache: Mutex::new(Cache {
                capacity: capacity.max(1),
                entries: VecDeque::new(),
            }),
        }
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self::new(
            config.ontology_dir.as_ref().map(Utf8PathBuf::from),
            config.fallback,
            config.cache_capacity,
        )
    }

    pub fn dir(&self) -> Option<&Utf8Path> {
        self.dir.as_deref()
    }

    /// Resolve an ontology by name, loading and validating it on a cache miss.
    pub fn get(&self, name: &str) -> Result<Arc<ValidatedOntology>, StoreError> {
        if let Some(hit) = self.lock().get(name) {
            tracing::debug!(ontology = name, "ontology cache hit");
            return Ok(hit);
        }

        let loaded = match self.load_from_dir(name)? {
            Some(ontology) => ontology,
            None if name == ids::DEFAULT_ONTOLOGY_NAME => builtin()?,
            None => match self.fallback {
                Fallback::Default => {
                    tracing::warn!(
                        ontology = name,
                        fallback = ids::DEFAULT_ONTOLOGY_NAME,
                        "ontology not found, using built-in default"
                    );
                    return self.get(ids::DEFAULT_ONTOLOGY_NAME);
                }
                Fallback::Error => {
                    return Err(StoreError::NotFound {
                        name: name.to_string(),
                    });
                }
            },
        };

        let loaded = Arc::new(loaded);
        self.lock().insert(name, Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Names available to `get`: the built-in default plus every `*.json` in the directory.
    pub fn list_available(&self) -> Result<Vec<String>, StoreError> {
        let mut names = vec![ids::DEFAULT_ONTOLOGY_NAME.to_string()];
        if let Some(dir) = self.dir.as_deref().filter(|d| d.is_dir()) {
            for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
                let entry = entry.map_err(|e| StoreError::Io {
                    path: dir.to_path_buf(),
                    source: e.into(),
                })?;
                let path = entry.path();
                if !entry.file_type().is_file()
                    || path.extension().and_then(|e| e.to_str()) != Some("json")
                {
                    continue;
                }
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        names.dedup();
        Ok(names)
    }

    /// Cached names, most recently used first.
    pub fn cached_names(&self) -> Vec<String> {
        self.lock().entries.iter().map(|(n, _)| n.clone()).collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Cache> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn load_from_dir(&self, name: &str) -> Result<Option<ValidatedOntology>, StoreError> {
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(StoreError::InvalidName {
                name: name.to_string(),
            });
        }
        let Some(dir) = &self.dir else {
            return Ok(None);
        };

        let path = dir.join(format!("{name}.json"));
        if !path.is_file() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(ontology = name, path = %path, "loading ontology document");
        load_ontology_json(&text)
            .map(Some)
            .map_err(|source| StoreError::Invalid {
                name: name.to_string(),
                source,
            })
    }
}

fn builtin() -> Result<ValidatedOntology, StoreError> {
    validate(default_ontology()).map_err(|source| StoreError::Invalid {
        name: ids::DEFAULT_ONTOLOGY_NAME.to_string(),
        source,
    })
}
