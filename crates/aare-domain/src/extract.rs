//! Text to variable extraction.
//!
//! Each extractor sees the full text on its own; none observes another's result. Pattern
//! extractors take the first match and coerce the capture group; failure to match or coerce
//! leaves the variable absent. Keyword extractors are booleans and are never absent: no keyword
//! in the text means `false`. Numeric absence stays absent, boolean absence collapses to false.
//!
//! After the extractor pass, constants are bound and derived rules are computed from the
//! extractor and constant values.

use crate::assignment::{Assignment, Binding};
use aare_ontology::{CompiledExtractor, DerivedRule, Matcher, PatternType, ValidatedOntology};
use aare_types::{AbsenceReason, ExtractionSource, Number, Value};
use rayon::prelude::*;

/// Fractional digits kept by ratio rules.
const RATIO_DIGITS: u32 = 6;

pub fn extract(text: &str, ontology: &ValidatedOntology) -> Assignment {
    let lowered = text.to_lowercase();

    let extracted: Vec<(&str, ExtractionSource, Binding)> = ontology
        .extractors()
        .par_iter()
        .map(|e| {
            let (source, binding) = run_extractor(e, text, &lowered);
            (e.variable.as_str(), source, binding)
        })
        .collect();

    let mut assignment = Assignment::new();
    for (variable, source, binding) in extracted {
        assignment.bind(variable, source, binding);
    }

    let model = ontology.ontology();
    for (variable, value) in &model.constants {
        assignment.bind(
            variable,
            ExtractionSource::Constant,
            Binding::Present(value.clone()),
        );
    }

    // Derived rules read only extractor and constant values, so they are computed against the
    // assignment as it stands before any of them are bound.
    let derived: Vec<(&str, Binding)> = model
        .derived
        .iter()
        .map(|(variable, rule)| (variable.as_str(), derive(rule, &assignment, &lowered)))
        .collect();
    for (variable, binding) in derived {
        assignment.bind(variable, ExtractionSource::Derived, binding);
    }

    assignment
}

fn run_extractor(
    extractor: &CompiledExtractor,
    text: &str,
    lowered: &str,
) -> (ExtractionSource, Binding) {
    match &extractor.matcher {
        Matcher::Keywords { keywords } => {
            let found = keywords.iter().any(|k| lowered.contains(k.as_str()));
            (ExtractionSource::Keyword, Binding::Present(Value::Bool(found)))
        }
        Matcher::Pattern { value_type, regex } => {
            let binding = match regex.captures(text) {
                None => Binding::Absent(AbsenceReason::NoMatch),
                Some(caps) => match (caps.get(0), caps.get(1)) {
                    (Some(whole), Some(group)) => {
                        let suffix = &text[group.end()..whole.end()];
                        coerce(*value_type, group.as_str(), suffix)
                    }
                    // The group is optional in the pattern and did not participate.
                    _ => Binding::Absent(AbsenceReason::NoMatch),
                },
            };
            (ExtractionSource::Pattern, binding)
        }
    }
}

/// Coerce a captured substring. `suffix` is the rest of the match after the capture group,
/// which is where a money multiplier (`450k fees`) sits.
fn coerce(value_type: PatternType, raw: &str, suffix: &str) -> Binding {
    let failed = || {
        Binding::Absent(AbsenceReason::CoercionFailed {
            raw: raw.to_string(),
        })
    };

    let parsed = match value_type {
        PatternType::Int => Number::parse(raw).filter(|n| n.is_integer()),
        PatternType::Real => Number::parse(raw),
        PatternType::Money => parse_money(raw, suffix),
    };
    match parsed {
        Some(n) => Binding::Present(Value::Number(n)),
        None => failed(),
    }
}

fn parse_money(raw: &str, suffix: &str) -> Option<Number> {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();
    let (digits, inline_k) = match cleaned.strip_suffix(['k', 'K']) {
        Some(rest) => (rest, true),
        None => (cleaned.as_str(), false),
    };
    let trailing_k = suffix.trim_start().starts_with(['k', 'K']);

    let amount = Number::parse(digits)?;
    if inline_k || trailing_k {
        amount.checked_mul(Number::from_i64(1000))
    } else {
        Some(amount)
    }
}

fn derive(rule: &DerivedRule, assignment: &Assignment, lowered: &str) -> Binding {
    match rule {
        DerivedRule::Ratio {
            numerator,
            denominator,
            scale,
        } => {
            let missing: Vec<String> = [numerator, denominator]
                .into_iter()
                .filter(|name| numeric(assignment, name).is_none())
                .cloned()
                .collect();
            let (Some(num), Some(den)) = (
                numeric(assignment, numerator),
                numeric(assignment, denominator),
            ) else {
                return Binding::Absent(AbsenceReason::MissingInput { inputs: missing });
            };
            if den.is_zero() {
                return Binding::Absent(AbsenceReason::DivisionByZero);
            }
            match num
                .checked_mul(*scale)
                .and_then(|scaled| scaled.checked_div(den, RATIO_DIGITS))
            {
                Some(n) => Binding::Present(Value::Number(n)),
                None => Binding::Absent(AbsenceReason::CoercionFailed {
                    raw: format!("{num} / {den}"),
                }),
            }
        }
        DerivedRule::KeywordCount { keywords } => {
            let mut seen: Vec<String> = Vec::new();
            for k in keywords {
                let k = k.trim().to_lowercase();
                if !k.is_empty() && !seen.contains(&k) && lowered.contains(k.as_str()) {
                    seen.push(k);
                }
            }
            let count = i64::try_from(seen.len()).unwrap_or(i64::MAX);
            Binding::Present(Value::Number(Number::from_i64(count)))
        }
    }
}

fn numeric(assignment: &Assignment, name: &str) -> Option<Number> {
    assignment.value(name).and_then(Value::as_number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{default_validated, number};

    fn value(a: &Assignment, name: &str) -> Option<Value> {
        a.value(name).cloned()
    }

    #[test]
    fn money_with_k_multiplier() {
        let a = extract("Closing includes $450k fees.", &default_validated());
        assert_eq!(value(&a, "fees"), Some(Value::from(450_000)));
    }

    #[test]
    fn money_strips_separators() {
        let a = extract("Total $12,500 fees on a $250,000 loan", &default_validated());
        assert_eq!(value(&a, "fees"), Some(Value::from(12_500)));
        assert_eq!(value(&a, "loan_amount"), Some(Value::from(250_000)));
    }

    #[test]
    fn fee_percentage_is_exact_ratio() {
        let a = extract("$12,000 fees on a $150,000 loan", &default_validated());
        assert_eq!(value(&a, "fee_percentage"), Some(Value::from(8)));

        let a = extract("$1,000 fees on a $3,000 loan", &default_validated());
        assert_eq!(
            value(&a, "fee_percentage"),
            Some(Value::Number(number("33.333333")))
        );
    }

    #[test]
    fn ratio_missing_input_is_absent_with_reason() {
        let a = extract("$5,000 fees, no amount given", &default_validated());
        assert_eq!(
            a.get("fee_percentage"),
            Some(&Binding::Absent(AbsenceReason::MissingInput {
                inputs: vec!["loan_amount".to_string()]
            }))
        );
    }

    #[test]
    fn ratio_zero_denominator_is_absent() {
        let a = extract("$5,000 fees on a $0 loan", &default_validated());
        assert_eq!(
            a.get("fee_percentage"),
            Some(&Binding::Absent(AbsenceReason::DivisionByZero))
        );
    }

    #[test]
    fn pattern_match_is_case_insensitive() {
        let a = extract("Borrower FICO: 700, DTI ~ 38.5", &default_validated());
        assert_eq!(value(&a, "credit_score"), Some(Value::from(700)));
        assert_eq!(value(&a, "dti"), Some(Value::Number(number("38.5"))));
    }

    #[test]
    fn keyword_absence_collapses_to_false_but_numbers_stay_absent() {
        let a = extract("Thank you for your application.", &default_validated());
        assert_eq!(value(&a, "has_guarantee"), Some(Value::Bool(false)));
        assert_eq!(value(&a, "escrow_waived"), Some(Value::Bool(false)));
        assert_eq!(
            a.get("dti"),
            Some(&Binding::Absent(AbsenceReason::NoMatch))
        );
        assert_eq!(value(&a, "credit_score"), None);
    }

    #[test]
    fn keyword_match_is_case_insensitive_substring() {
        let a = extract("You are GUARANTEED to be Approved!", &default_validated());
        assert_eq!(value(&a, "has_guarantee"), Some(Value::Bool(true)));
        assert_eq!(value(&a, "has_approval"), Some(Value::Bool(true)));
    }

    #[test]
    fn keyword_count_counts_distinct_phrases() {
        let a = extract(
            "Strong reserves, more reserves, and stable employment history.",
            &default_validated(),
        );
        assert_eq!(value(&a, "compensating_factors"), Some(Value::from(2)));

        let a = extract("nothing relevant", &default_validated());
        assert_eq!(value(&a, "compensating_factors"), Some(Value::from(0)));
    }

    #[test]
    fn int_coercion_rejects_fractions() {
        assert_eq!(
            coerce(PatternType::Int, "6.5", ""),
            Binding::Absent(AbsenceReason::CoercionFailed {
                raw: "6.5".to_string()
            })
        );
    }

    #[test]
    fn money_coercion_handles_edge_cases() {
        assert_eq!(parse_money("450", "k fees"), Some(number("450000")));
        assert_eq!(parse_money("450K", ""), Some(number("450000")));
        assert_eq!(parse_money("$ 1,200", " fees"), Some(number("1200")));
        assert_eq!(parse_money(",", " fees"), None);
    }

    #[test]
    fn every_variable_has_an_extraction_record() {
        let v = default_validated();
        let a = extract("", &v);
        let o = v.ontology();
        assert_eq!(
            a.records().len(),
            o.extractors.len() + o.derived.len() + o.constants.len()
        );
        let sources: Vec<ExtractionSource> = a.records().iter().map(|r| r.source).collect();
        assert!(sources.contains(&ExtractionSource::Derived));
        assert!(sources.contains(&ExtractionSource::Keyword));
    }
}
