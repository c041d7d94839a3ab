//! The `validate` use case: check an ontology document without running it.

use aare_ontology::{OntologyError, load_ontology_json};

/// What a valid document contains.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationSummary {
    pub name: String,
    pub version: String,
    pub fingerprint: String,
    pub constraints: usize,
    pub extractors: usize,
    pub derived: usize,
    pub constants: usize,
}

/// Parse and validate an ontology document given as JSON text.
pub fn run_validate(text: &str) -> Result<ValidationSummary, OntologyError> {
    let validated = load_ontology_json(text)?;
    let model = validated.ontology();
    Ok(ValidationSummary {
        name: validated.name().to_string(),
        version: validated.version().to_string(),
        fingerprint: validated.fingerprint().to_string(),
        constraints: model.constraints.len(),
        extractors: model.extractors.len(),
        derived: model.derived.len(),
        constants: model.constants.len(),
    })
}

pub fn format_validation(summary: &ValidationSummary) -> String {
    format!(
        "{} v{} is valid: {} constraints, {} extractors, {} derived, {} constants\nfingerprint: {}\n",
        summary.name,
        summary.version,
        summary.constraints,
        summary.extractors,
        summary.derived,
        summary.constants,
        summary.fingerprint
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use aare_ontology::SchemaError;

    const DOC: &str = r#"{
        "name": "tiny",
        "version": "0.1.0",
        "constraints": [{
            "id": "MAX_DTI",
            "formula_readable": "dti ≤ limit",
            "variables": [{"name": "dti", "type": "real"}, {"name": "limit", "type": "real"}],
            "error_message": "DTI too high"
        }],
        "extractors": {"dti": {"type": "float", "pattern": "dti[:\\s]*(\\d+)"}},
        "constants": {"limit": 43}
    }"#;

    #[test]
    fn valid_document_is_summarized() {
        let summary = run_validate(DOC).unwrap();
        assert_eq!(summary.name, "tiny");
        assert_eq!(summary.constraints, 1);
        assert_eq!(summary.extractors, 1);
        assert_eq!(summary.constants, 1);
        assert_eq!(summary.fingerprint.len(), 64);

        let text = format_validation(&summary);
        assert!(text.starts_with("tiny v0.1.0 is valid: 1 constraints, 1 extractors"));
    }

    #[test]
    fn missing_extractors_is_reported() {
        let err = run_validate(r#"{"name": "x", "version": "1", "constraints": []}"#).unwrap_err();
        assert!(matches!(
            err,
            OntologyError::Schema(SchemaError::MissingField { field }) if field == "extractors"
        ));
    }
}
