use aare_render::{RenderableCounts, RenderableReport, RenderableUnknown, RenderableViolation};
use aare_types::{Outcome, SCHEMA_VERIFICATION_V1, VerificationReport};
use anyhow::Context;

pub fn parse_report_json(text: &str) -> anyhow::Result<VerificationReport> {
    let value: serde_json::Value = serde_json::from_str(text).context("parse report json")?;

    let schema = value
        .get("schema")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    if schema != SCHEMA_VERIFICATION_V1 {
        anyhow::bail!("unknown report schema: {schema}");
    }

    serde_json::from_value(value).context("parse verification report")
}

pub fn serialize_report(report: &VerificationReport) -> anyhow::Result<Vec<u8>> {
    serde_json::to_vec_pretty(report).context("serialize verification report")
}

pub fn to_renderable(report: &VerificationReport) -> RenderableReport {
    let summary = &report.proof.summary;
    RenderableReport {
        verified: report.verified,
        ontology_name: report.ontology.name.clone(),
        ontology_version: report.ontology.version.clone(),
        violations: report
            .violations
            .iter()
            .map(|v| RenderableViolation {
                constraint_id: v.constraint_id.clone(),
                category: v.category.clone(),
                message: v.error_message.clone(),
                citation: v.citation.clone(),
                formula: v.formula.clone(),
                values: v
                    .assignment_snapshot
                    .iter()
                    .map(|(name, value)| {
                        let shown = value
                            .as_ref()
                            .map(|v| v.to_string())
                            .unwrap_or_else(|| "absent".to_string());
                        (name.clone(), shown)
                    })
                    .collect(),
            })
            .collect(),
        unknown: report
            .proof
            .records
            .iter()
            .filter(|r| r.outcome == Outcome::EvaluatedWithMissingData)
            .map(|r| RenderableUnknown {
                constraint_id: r.constraint_id.clone(),
                missing: r.missing_variables.clone(),
            })
            .collect(),
        counts: RenderableCounts {
            satisfied: summary.satisfied,
            violated: summary.violated,
            unknown: summary.unknown,
            failed: summary.failed,
        },
    }
}
