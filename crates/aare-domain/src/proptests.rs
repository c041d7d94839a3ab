//! Property-based tests for the domain crate.
//!
//! These tests use proptest to verify invariants around:
//! - verdict consistency and idempotence of `verify`
//! - Kleene connectives over absent variables
//! - exact numeric comparison at thresholds

use crate::assignment::{Assignment, Binding};
use crate::engine::evaluate;
use crate::test_support::{bool_var, constraint, default_validated, num_var};
use crate::verify::verify;
use aare_ontology::{CompareOp, Expr, Term};
use aare_types::{AbsenceReason, ExtractionSource, Number, Outcome, TruthValue, Value};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

/// Text fragments that exercise the default extractors.
fn arb_fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u32..80, 0u32..100).prop_map(|(i, f)| format!("DTI: {i}.{f:02}")),
        (300u32..850).prop_map(|s| format!("FICO {s}")),
        (1u32..999).prop_map(|k| format!("${k}k fees")),
        (1u32..999).prop_map(|k| format!("${k},000 loan")),
        Just("guaranteed".to_string()),
        Just("approved".to_string()),
        Just("counseling".to_string()),
        Just("waive escrow".to_string()),
        Just("denied".to_string()),
        Just("income".to_string()),
        Just("reserves".to_string()),
        Just("stable employment".to_string()),
        "[a-z ]{0,20}",
    ]
}

fn arb_text() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_fragment(), 0..8).prop_map(|parts| parts.join(". "))
}

/// Optional boolean: `None` is an absent variable.
fn arb_tri() -> impl Strategy<Value = Option<bool>> {
    prop_oneof![Just(None), Just(Some(true)), Just(Some(false))]
}

fn to_truth(v: Option<bool>) -> TruthValue {
    v.map(TruthValue::from).unwrap_or(TruthValue::Unknown)
}

fn bool_assignment(values: &[(&str, Option<bool>)]) -> Assignment {
    let mut a = Assignment::new();
    for (name, value) in values {
        let binding = match value {
            Some(b) => Binding::Present(Value::Bool(*b)),
            None => Binding::Absent(AbsenceReason::NoMatch),
        };
        a.bind(name, ExtractionSource::Constant, binding);
    }
    a
}

fn truth_of(expr: Expr, values: &[(&str, Option<bool>)]) -> TruthValue {
    let c = constraint("P", expr, vec![bool_var("a"), bool_var("b")]);
    let e = evaluate("o", &[c], &bool_assignment(values));
    e.records[0].truth_value
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn verified_iff_no_violations(text in arb_text()) {
        let result = verify(&text, &default_validated());
        prop_assert_eq!(result.verified, result.violations.is_empty());
        let violated = result
            .proof
            .records
            .iter()
            .filter(|r| r.outcome == Outcome::Violated)
            .count();
        prop_assert_eq!(violated, result.violations.len());
    }

    #[test]
    fn verify_is_deterministic(text in arb_text()) {
        let ontology = default_validated();
        let a = verify(&text, &ontology);
        let b = verify(&text, &ontology);
        prop_assert_eq!(a.violations, b.violations);
        prop_assert_eq!(a.proof, b.proof);
        prop_assert_eq!(a.parsed_data, b.parsed_data);
    }

    #[test]
    fn earlier_calls_do_not_leak(first in arb_text(), second in arb_text()) {
        let ontology = default_validated();
        let fresh = verify(&second, &ontology);
        let _ = verify(&first, &ontology);
        let after = verify(&second, &ontology);
        prop_assert_eq!(fresh.proof, after.proof);
    }

    #[test]
    fn unknown_records_are_never_violations(text in arb_text()) {
        let result = verify(&text, &default_validated());
        for r in &result.proof.records {
            if r.truth_value == TruthValue::Unknown {
                prop_assert_ne!(r.outcome, Outcome::Violated);
                prop_assert!(!r.missing_variables.is_empty());
            }
        }
    }

    #[test]
    fn connectives_match_kleene_tables(a in arb_tri(), b in arb_tri()) {
        let values = [("a", a), ("b", b)];
        let (ta, tb) = (to_truth(a), to_truth(b));

        prop_assert_eq!(
            truth_of(Expr::and(vec![Expr::var("a"), Expr::var("b")]), &values),
            ta.and(tb)
        );
        prop_assert_eq!(
            truth_of(Expr::or(vec![Expr::var("a"), Expr::var("b")]), &values),
            ta.or(tb)
        );
        prop_assert_eq!(
            truth_of(Expr::implies(Expr::var("a"), Expr::var("b")), &values),
            ta.implies(tb)
        );
        prop_assert_eq!(truth_of(Expr::not(Expr::var("a")), &values), ta.not());
    }

    #[test]
    fn decimal_comparison_is_exact(int in 0i64..100, frac in 0u32..1000, threshold in 0i64..100) {
        let x = Number::parse(&format!("{int}.{frac:03}")).expect("decimal literal");
        let c = constraint(
            "LE",
            Expr::compare(Term::var("x"), CompareOp::Le, Term::num(threshold)),
            vec![num_var("x")],
        );
        let mut a = Assignment::new();
        a.bind("x", ExtractionSource::Pattern, Binding::Present(Value::Number(x)));
        let e = evaluate("o", &[c], &a);

        let expected = int < threshold || (int == threshold && frac == 0);
        prop_assert_eq!(e.records[0].truth_value, TruthValue::from(expected));
    }
}
