//! Render use cases: markdown and terminal text from in-memory reports.

use aare_render::RenderableReport;

pub fn render_markdown(report: &RenderableReport) -> String {
    aare_render::render_markdown(report)
}

pub fn render_text(report: &RenderableReport) -> String {
    aare_render::render_text(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aare_render::{RenderableCounts, RenderableViolation};

    fn sample_report() -> RenderableReport {
        RenderableReport {
            verified: false,
            ontology_name: "tiny".to_string(),
            ontology_version: "0.1.0".to_string(),
            violations: vec![RenderableViolation {
                constraint_id: "MAX_DTI".to_string(),
                category: "ATR".to_string(),
                message: "DTI too high".to_string(),
                citation: "12 CFR 1026.43".to_string(),
                formula: "dti ≤ 43".to_string(),
                values: vec![("dti".to_string(), "50".to_string())],
            }],
            unknown: Vec::new(),
            counts: RenderableCounts {
                violated: 1,
                ..RenderableCounts::default()
            },
        }
    }

    #[test]
    fn both_surfaces_name_the_violation() {
        let report = sample_report();
        assert!(render_markdown(&report).contains("MAX_DTI"));
        assert!(render_text(&report).contains("VIOLATED MAX_DTI: DTI too high"));
    }
}
