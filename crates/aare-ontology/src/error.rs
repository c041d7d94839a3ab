use thiserror::Error;

/// Structural or typing problem in an ontology. Fatal for the call that loaded it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("invalid ontology: missing {field}")]
    MissingField { field: String },

    #[error("invalid ontology document: {message}")]
    InvalidDocument { message: String },

    #[error("duplicate constraint id '{id}'")]
    DuplicateConstraintId { id: String },

    #[error("constraint '{constraint_id}' references undeclared variable '{variable}'")]
    UndeclaredVariable {
        constraint_id: String,
        variable: String,
    },

    #[error("constraint '{constraint_id}' uses '{variable}', which no extractor, derived rule or constant produces")]
    UnboundVariable {
        constraint_id: String,
        variable: String,
    },

    #[error("variable '{variable}' has more than one source")]
    ConflictingSource { variable: String },

    #[error("type mismatch in {context}: {message}")]
    TypeMismatch { context: String, message: String },

    #[error("constraint '{constraint_id}' has an invalid formula: {message}")]
    InvalidFormula {
        constraint_id: String,
        message: String,
    },

    #[error("derived variable '{variable}' is invalid: {message}")]
    InvalidDerived { variable: String, message: String },
}

impl SchemaError {
    pub(crate) fn missing(field: &str) -> Self {
        SchemaError::MissingField {
            field: field.to_string(),
        }
    }

    pub(crate) fn type_mismatch(context: impl Into<String>, message: impl Into<String>) -> Self {
        SchemaError::TypeMismatch {
            context: context.into(),
            message: message.into(),
        }
    }
}

/// Extractor misconfiguration found while compiling rules.
#[derive(Debug, Clone, Error)]
pub enum ExtractionError {
    #[error("extractor '{variable}' has an invalid pattern")]
    InvalidPattern {
        variable: String,
        #[source]
        source: regex::Error,
    },

    #[error("extractor '{variable}' pattern must have exactly one capture group, found {found}")]
    CaptureGroups { variable: String, found: usize },

    #[error("extractor '{variable}' has no keywords")]
    EmptyKeywords { variable: String },
}

#[derive(Debug, Clone, Error)]
pub enum OntologyError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}
