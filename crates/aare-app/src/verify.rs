//! The `verify` use case: resolve the ontology, run the pure pipeline, wrap the wire report.

use crate::store::OntologyStore;
use aare_settings::ResolvedConfig;
use aare_types::{
    OntologySummary, Outcome, SCHEMA_VERIFICATION_V1, SOLVER_NAME, ToolMeta, VerificationReport,
    ids,
};
use anyhow::Context;
use time::OffsetDateTime;
use uuid::Uuid;

/// Input for the verify use case.
#[derive(Clone, Debug)]
pub struct VerifyInput<'a> {
    /// Text to verify.
    pub text: &'a str,
    /// Ontology name; the configured default when `None`.
    pub ontology: Option<&'a str>,
}

/// Run the verify use case and produce the wire report.
pub fn run_verify(
    store: &OntologyStore,
    config: &ResolvedConfig,
    input: VerifyInput<'_>,
) -> anyhow::Result<VerificationReport> {
    if input.text.trim().is_empty() {
        anyhow::bail!("llm_output is required");
    }
    if input.text.len() > config.max_text_bytes {
        anyhow::bail!(
            "llm_output is {} bytes, over the limit of {}",
            input.text.len(),
            config.max_text_bytes
        );
    }

    let name = input.ontology.unwrap_or(&config.default_ontology);
    let ontology = store
        .get(name)
        .with_context(|| format!("load ontology '{name}'"))?;

    let span = tracing::info_span!(
        "verify",
        ontology = ontology.name(),
        version = ontology.version()
    );
    let _entered = span.enter();

    let timestamp = OffsetDateTime::now_utc();
    let result = aare_domain::verify(input.text, &ontology);

    for record in result.proof.extraction.iter().filter(|r| !r.present) {
        tracing::debug!(variable = %record.variable, absence = ?record.absence, "variable absent");
    }
    for record in &result.proof.records {
        match record.outcome {
            Outcome::EvaluatedWithMissingData => tracing::debug!(
                constraint = %record.constraint_id,
                missing = ?record.missing_variables,
                "constraint undecided"
            ),
            Outcome::EvaluationFailed => tracing::warn!(
                constraint = %record.constraint_id,
                error = record.error.as_deref().unwrap_or_default(),
                "constraint evaluation failed"
            ),
            Outcome::Satisfied | Outcome::Violated => {}
        }
    }
    tracing::info!(
        verified = result.verified,
        violations = result.violations.len(),
        elapsed_ms = result.execution_time_ms,
        "verification finished"
    );

    Ok(VerificationReport {
        schema: SCHEMA_VERIFICATION_V1.to_string(),
        tool: ToolMeta {
            name: ids::TOOL_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        verification_id: Uuid::new_v4().to_string(),
        timestamp,
        verified: result.verified,
        violations: result.violations,
        parsed_data: result.parsed_data,
        ontology: OntologySummary {
            name: ontology.name().to_string(),
            version: ontology.version().to_string(),
            description: ontology.ontology().description.clone(),
            constraints_checked: ontology.constraints().len() as u32,
            fingerprint: ontology.fingerprint().to_string(),
        },
        proof: result.proof,
        solver: SOLVER_NAME.to_string(),
        execution_time_ms: result.execution_time_ms,
    })
}

/// Exit code for a finished verification: 0 when verified, 2 when violations were found.
pub fn verdict_exit_code(report: &VerificationReport) -> i32 {
    if report.verified { 0 } else { 2 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aare_settings::{Fallback, ResolvedConfig};

    fn store() -> OntologyStore {
        OntologyStore::new(None, Fallback::Default, 4)
    }

    fn input(text: &str) -> VerifyInput<'_> {
        VerifyInput {
            text,
            ontology: None,
        }
    }

    #[test]
    fn empty_text_is_rejected() {
        let err = run_verify(&store(), &ResolvedConfig::default(), input("   \n")).unwrap_err();
        assert_eq!(err.to_string(), "llm_output is required");
    }

    #[test]
    fn oversized_text_is_rejected() {
        let config = ResolvedConfig {
            max_text_bytes: 8,
            ..ResolvedConfig::default()
        };
        assert!(run_verify(&store(), &config, input("definitely too long")).is_err());
    }

    #[test]
    fn report_envelope_is_filled() {
        let report = run_verify(
            &store(),
            &ResolvedConfig::default(),
            input("You are guaranteed to be approved!"),
        )
        .unwrap();
        assert_eq!(report.schema, SCHEMA_VERIFICATION_V1);
        assert_eq!(report.tool.name, "aare");
        assert_eq!(report.ontology.name, ids::DEFAULT_ONTOLOGY_NAME);
        assert_eq!(report.ontology.constraints_checked, 5);
        assert_eq!(report.ontology.fingerprint.len(), 64);
        assert_eq!(report.solver, SOLVER_NAME);
        assert!(Uuid::parse_str(&report.verification_id).is_ok());
        assert!(!report.verified);
        assert_eq!(verdict_exit_code(&report), 2);
    }

    #[test]
    fn verification_ids_are_unique() {
        let cfg = ResolvedConfig::default();
        let a = run_verify(&store(), &cfg, input("DTI 30")).unwrap();
        let b = run_verify(&store(), &cfg, input("DTI 30")).unwrap();
        assert_ne!(a.verification_id, b.verification_id);
        assert_eq!(a.proof, b.proof);
        assert_eq!(verdict_exit_code(&a), 0);
    }

    #[test]
    fn unknown_ontology_without_fallback_is_an_error() {
        let strict = OntologyStore::new(None, Fallback::Error, 4);
        let err = run_verify(
            &strict,
            &ResolvedConfig::default(),
            VerifyInput {
                text: "hello",
                ontology: Some("nope"),
            },
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("ontology 'nope' not found"));
    }
}
