//! JSON source format for ontologies.
//!
//! The document mirrors the model field names. A constraint may give its formula as a tagged
//! tree (`formula`) or as readable text (`formula_readable`); the tree wins when both are set.

use crate::error::{OntologyError, SchemaError};
use crate::formula::Expr;
use crate::model::{Constraint, DerivedRule, ExtractorRule, Ontology, VariableDecl};
use crate::parse::parse_formula;
use crate::validate::{ValidatedOntology, validate};
use aare_types::Value;
use schemars::JsonSchema;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Top-level fields checked before anything else, in this order.
pub const REQUIRED_FIELDS: [&str; 4] = ["name", "version", "constraints", "extractors"];

#[derive(Clone, Debug, Deserialize, JsonSchema)]
pub struct OntologyDocument {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    pub constraints: Vec<ConstraintDocument>,
    pub extractors: BTreeMap<String, ExtractorRule>,
    #[serde(default)]
    pub derived: BTreeMap<String, DerivedRule>,
    #[serde(default)]
    pub constants: BTreeMap<String, Value>,
}

#[derive(Clone, Debug, Deserialize, JsonSchema)]
pub struct ConstraintDocument {
    pub id: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    /// Tagged formula tree.
    #[serde(default)]
    pub formula: Option<Expr>,
    /// Readable formula, e.g. `(dti ≤ 43) ∨ (compensating_factors ≥ 2)`.
    #[serde(default)]
    pub formula_readable: Option<String>,
    #[serde(default)]
    pub variables: Vec<VariableDecl>,
    #[serde(default)]
    pub error_message: String,
    #[serde(default)]
    pub citation: String,
}

impl ConstraintDocument {
    fn into_constraint(self) -> Result<Constraint, SchemaError> {
        let formula = match (self.formula, self.formula_readable) {
            (Some(tree), _) => tree,
            (None, Some(text)) => {
                parse_formula(&text).map_err(|e| SchemaError::InvalidFormula {
                    constraint_id: self.id.clone(),
                    message: e.to_string(),
                })?
            }
            (None, None) => {
                return Err(SchemaError::InvalidFormula {
                    constraint_id: self.id.clone(),
                    message: "neither 'formula' nor 'formula_readable' is set".to_string(),
                });
            }
        };

        Ok(Constraint {
            id: self.id,
            category: self.category,
            description: self.description,
            formula,
            variables: self.variables,
            error_message: self.error_message,
            citation: self.citation,
        })
    }
}

impl OntologyDocument {
    pub fn into_ontology(self) -> Result<Ontology, SchemaError> {
        let constraints = self
            .constraints
            .into_iter()
            .map(ConstraintDocument::into_constraint)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Ontology {
            name: self.name,
            version: self.version,
            description: self.description,
            constraints,
            extractors: self.extractors,
            derived: self.derived,
            constants: self.constants,
        })
    }
}

/// Parse the JSON source format into the model. Does not validate.
pub fn parse_ontology_json(text: &str) -> Result<Ontology, SchemaError> {
    let raw: serde_json::Value =
        serde_json::from_str(text).map_err(|e| SchemaError::InvalidDocument {
            message: e.to_string(),
        })?;

    let Some(object) = raw.as_object() else {
        return Err(SchemaError::InvalidDocument {
            message: "top-level value must be an object".to_string(),
        });
    };
    for field in REQUIRED_FIELDS {
        if object.get(field).is_none_or(serde_json::Value::is_null) {
            return Err(SchemaError::missing(field));
        }
    }

    let doc: OntologyDocument =
        serde_json::from_value(raw).map_err(|e| SchemaError::InvalidDocument {
            message: e.to_string(),
        })?;
    doc.into_ontology()
}

/// Parse and validate in one step.
pub fn load_ontology_json(text: &str) -> Result<ValidatedOntology, OntologyError> {
    let ontology = parse_ontology_json(text)?;
    validate(ontology)
}

/// JSON Schema describing the ontology document format.
pub fn ontology_json_schema() -> serde_json::Value {
    let schema = schemars::schema_for!(OntologyDocument);
    schema.to_value()
}
