use crate::engine::evaluate;
use crate::extract::extract;
use aare_ontology::{Ontology, OntologyError, ValidatedOntology, validate};
use aare_types::{ProofSummary, ProofTrace, SOLVER_NAME, VerificationResult};
use std::time::Instant;

/// Extract, then evaluate. Pure apart from `execution_time_ms`.
///
/// Never fails: per-text match failures surface as absent variables in the proof trace.
pub fn verify(text: &str, ontology: &ValidatedOntology) -> VerificationResult {
    let started = Instant::now();

    let assignment = extract(text, ontology);
    let evaluation = evaluate(ontology.name(), ontology.constraints(), &assignment);

    let summary = ProofSummary::from_records(&evaluation.records);
    let proof = ProofTrace {
        method: SOLVER_NAME.to_string(),
        records: evaluation.records,
        extraction: assignment.records().to_vec(),
        summary,
    };

    VerificationResult {
        verified: evaluation.verified,
        violations: evaluation.violations,
        parsed_data: assignment.snapshot(),
        proof,
        execution_time_ms: started.elapsed().as_secs_f64() * 1000.0,
    }
}

/// Validate, then verify.
pub fn verify_unvalidated(
    text: &str,
    ontology: Ontology,
) -> Result<VerificationResult, OntologyError> {
    let validated = validate(ontology)?;
    Ok(verify(text, &validated))
}
