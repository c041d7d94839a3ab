use crate::RenderableReport;

/// Compact terminal summary.
pub fn render_text(report: &RenderableReport) -> String {
    let mut out = String::new();
    let c = report.counts;

    let verdict = if report.verified { "verified" } else { "violations found" };
    out.push_str(&format!(
        "{} v{}: {} ({} satisfied, {} violated, {} unknown, {} failed)\n",
        report.ontology_name,
        report.ontology_version,
        verdict,
        c.satisfied,
        c.violated,
        c.unknown,
        c.failed
    ));

    for v in &report.violations {
        out.push_str(&format!(
            "  VIOLATED {}: {} [{}]\n",
            v.constraint_id, v.message, v.citation
        ));
    }
    for u in &report.unknown {
        out.push_str(&format!(
            "  UNKNOWN  {}: missing {}\n",
            u.constraint_id,
            u.missing.join(", ")
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RenderableCounts, RenderableViolation};

    #[test]
    fn one_line_per_violation() {
        let report = RenderableReport {
            verified: false,
            ontology_name: "o".to_string(),
            ontology_version: "1".to_string(),
            violations: vec![RenderableViolation {
                constraint_id: "REG_B_ADVERSE".to_string(),
                category: "Regulation B".to_string(),
                message: "Must disclose specific denial reason".to_string(),
                citation: "12 CFR § 1002.9".to_string(),
                formula: "is_denial → has_specific_reason".to_string(),
                values: Vec::new(),
            }],
            unknown: Vec::new(),
            counts: RenderableCounts {
                violated: 1,
                ..RenderableCounts::default()
            },
        };
        let text = render_text(&report);
        assert_eq!(text.lines().count(), 2);
        assert!(text.starts_with("o v1: violations found"));
        assert!(text.contains("VIOLATED REG_B_ADVERSE: Must disclose specific denial reason"));
    }
}
