//! Ontology model and validation (no I/O).
//!
//! Input: an ontology document, either already typed or as JSON text.
//! Output: a `ValidatedOntology` whose formulas are well-typed, whose variables all have a
//! source, and whose extractor patterns are compiled.

#![forbid(unsafe_code)]

pub mod default;
pub mod document;
pub mod error;
pub mod formula;
pub mod model;
pub mod parse;

mod validate;

pub use default::default_ontology;
pub use document::{
    ConstraintDocument, OntologyDocument, REQUIRED_FIELDS, load_ontology_json,
    ontology_json_schema, parse_ontology_json,
};
pub use error::{ExtractionError, OntologyError, SchemaError};
pub use formula::{CompareOp, Expr, Term};
pub use model::{Constraint, DerivedRule, ExtractorRule, Ontology, PatternType, VarType, VariableDecl};
pub use parse::{FormulaParseError, MAX_NESTING, parse_formula};
pub use validate::{CompiledExtractor, Matcher, ValidatedOntology, validate};
