use crate::RenderableReport;

pub fn render_markdown(report: &RenderableReport) -> String {
    let mut out = String::new();

    out.push_str("# Verification report\n\n");
    let verdict = if report.verified { "VERIFIED" } else { "VIOLATIONS" };
    let c = report.counts;
    out.push_str(&format!(
        "- Verdict: **{}**\n- Ontology: `{}` v{}\n- Constraints: {} satisfied, {} violated, {} unknown, {} failed\n\n",
        verdict,
        report.ontology_name,
        report.ontology_version,
        c.satisfied,
        c.violated,
        c.unknown,
        c.failed
    ));

    if report.violations.is_empty() {
        out.push_str("No violations.\n");
    } else {
        out.push_str("## Violations\n\n");
        for v in &report.violations {
            out.push_str(&format!(
                "- [{}] `{}`: {} ({})\n",
                v.category, v.constraint_id, v.message, v.citation
            ));
            out.push_str(&format!("  - formula: `{}`\n", v.formula));
            if !v.values.is_empty() {
                let values: Vec<String> = v
                    .values
                    .iter()
                    .map(|(name, value)| format!("{name} = {value}"))
                    .collect();
                out.push_str(&format!("  - values: {}\n", values.join(", ")));
            }
        }
    }

    if !report.unknown.is_empty() {
        out.push_str("\n## Undecided (missing data)\n\n");
        for u in &report.unknown {
            out.push_str(&format!(
                "- `{}`: missing {}\n",
                u.constraint_id,
                u.missing.join(", ")
            ));
        }
    }

    out
}
