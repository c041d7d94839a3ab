use crate::assignment::Assignment;
use crate::fingerprint::fingerprint_for_violation;
use aare_ontology::{CompareOp, Constraint, Expr, Term};
use aare_types::{Outcome, ProofRecord, TruthValue, Value, ValueKind, Violation};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Runtime failure inside one formula. Only reachable when an assignment disagrees with the
/// types the ontology declared; the constraint is recorded as failed and the call continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("'{variable}' holds a {found} where a {expected} is required")]
    TypeMismatch {
        variable: String,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("cannot compare {left} with {right} using {op}")]
    IncomparableOperands {
        op: &'static str,
        left: ValueKind,
        right: ValueKind,
    },
}

/// Result of evaluating every constraint against one assignment.
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    pub verified: bool,
    pub violations: Vec<Violation>,
    /// One record per constraint, in declared order.
    pub records: Vec<ProofRecord>,
}

/// Evaluate all constraints with Kleene three-valued logic.
///
/// Unknown constraints are not violations; only a definite `false` is.
pub fn evaluate(
    ontology_name: &str,
    constraints: &[Constraint],
    assignment: &Assignment,
) -> Evaluation {
    let evaluated: Vec<(ProofRecord, Option<Violation>)> = constraints
        .par_iter()
        .map(|c| evaluate_constraint(ontology_name, c, assignment))
        .collect();

    let mut records = Vec::with_capacity(evaluated.len());
    let mut violations = Vec::new();
    for (record, violation) in evaluated {
        records.push(record);
        violations.extend(violation);
    }

    Evaluation {
        verified: violations.is_empty(),
        violations,
        records,
    }
}

fn evaluate_constraint(
    ontology_name: &str,
    constraint: &Constraint,
    assignment: &Assignment,
) -> (ProofRecord, Option<Violation>) {
    let used = constraint.formula.variables();
    let missing: Vec<String> = used
        .iter()
        .filter(|v| !assignment.is_present(v))
        .map(|v| v.to_string())
        .collect();
    let variables_used: Vec<String> = used.iter().map(|v| v.to_string()).collect();

    let (truth_value, outcome, support, error) = match eval(&constraint.formula, assignment) {
        Ok(result) => {
            let outcome = match result.truth {
                TruthValue::True => Outcome::Satisfied,
                TruthValue::False => Outcome::Violated,
                TruthValue::Unknown => Outcome::EvaluatedWithMissingData,
            };
            (result.truth, outcome, result.support, None)
        }
        Err(err) => (
            TruthValue::Unknown,
            Outcome::EvaluationFailed,
            BTreeSet::new(),
            Some(err.to_string()),
        ),
    };

    let witness: BTreeMap<String, Value> = support
        .into_iter()
        .filter_map(|name| assignment.value(name).map(|v| (name.to_string(), v.clone())))
        .collect();

    let violation = (outcome == Outcome::Violated).then(|| {
        let snapshot = assignment.snapshot_of(used.iter().copied());
        Violation {
            constraint_id: constraint.id.clone(),
            category: constraint.category.clone(),
            description: constraint.description.clone(),
            formula: constraint.formula.to_string(),
            error_message: constraint.error_message.clone(),
            citation: constraint.citation.clone(),
            fingerprint: fingerprint_for_violation(ontology_name, &constraint.id, &snapshot),
            assignment_snapshot: snapshot,
            witness: witness.clone(),
        }
    });

    let record = ProofRecord {
        constraint_id: constraint.id.clone(),
        truth_value,
        outcome,
        variables_used,
        missing_variables: missing,
        witness,
        error,
    };
    (record, violation)
}

/// Truth value plus the variables that decided it. Support is empty for unknown results.
struct Eval<'a> {
    truth: TruthValue,
    support: BTreeSet<&'a str>,
}

impl<'a> Eval<'a> {
    fn unknown() -> Self {
        Eval {
            truth: TruthValue::Unknown,
            support: BTreeSet::new(),
        }
    }

    fn definite(value: bool, support: BTreeSet<&'a str>) -> Self {
        Eval {
            truth: TruthValue::from(value),
            support,
        }
    }
}

fn eval<'a>(expr: &'a Expr, assignment: &Assignment) -> Result<Eval<'a>, EvalError> {
    match expr {
        Expr::Lit { value } => Ok(Eval::definite(*value, BTreeSet::new())),
        Expr::Var { name } => match assignment.value(name) {
            None => Ok(Eval::unknown()),
            Some(Value::Bool(b)) => Ok(Eval::definite(*b, BTreeSet::from([name.as_str()]))),
            Some(other) => Err(EvalError::TypeMismatch {
                variable: name.clone(),
                expected: ValueKind::Bool,
                found: other.kind(),
            }),
        },
        Expr::Not { arg } => {
            let inner = eval(arg, assignment)?;
            Ok(Eval {
                truth: inner.truth.not(),
                support: inner.support,
            })
        }
        Expr::And { args } => {
            let results = args
                .iter()
                .map(|a| eval(a, assignment))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(combine(results, TruthValue::False))
        }
        Expr::Or { args } => {
            let results = args
                .iter()
                .map(|a| eval(a, assignment))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(combine(results, TruthValue::True))
        }
        Expr::Implies { left, right } => {
            // a → b is ¬a ∨ b
            let left = eval(left, assignment)?;
            let right = eval(right, assignment)?;
            let negated = Eval {
                truth: left.truth.not(),
                support: left.support,
            };
            Ok(combine(vec![negated, right], TruthValue::True))
        }
        Expr::Compare { cmp, left, right } => compare(*cmp, left, right, assignment),
    }
}

/// Fold an n-ary connective. `dominant` is the value that decides it on its own
/// (`false` for AND, `true` for OR).
///
/// The first dominant operand is the witness. Without one, the result is the other definite
/// value if every operand is definite (supported by all of them), else unknown.
fn combine(results: Vec<Eval<'_>>, dominant: TruthValue) -> Eval<'_> {
    let mut all_definite = true;
    let mut support = BTreeSet::new();
    for r in results {
        if r.truth == dominant {
            return Eval {
                truth: dominant,
                support: r.support,
            };
        }
        if r.truth == TruthValue::Unknown {
            all_definite = false;
        }
        support.extend(r.support);
    }
    if all_definite {
        Eval {
            truth: dominant.not(),
            support,
        }
    } else {
        Eval::unknown()
    }
}

fn compare<'a>(
    op: CompareOp,
    left: &'a Term,
    right: &'a Term,
    assignment: &Assignment,
) -> Result<Eval<'a>, EvalError> {
    let mut support = BTreeSet::new();
    let mut resolve = |term: &'a Term| -> Option<Value> {
        match term {
            Term::Lit(v) => Some(v.clone()),
            Term::Var(name) => {
                let v = assignment.value(name).cloned();
                if v.is_some() {
                    support.insert(name.as_str());
                }
                v
            }
        }
    };
    let (Some(l), Some(r)) = (resolve(left), resolve(right)) else {
        return Ok(Eval::unknown());
    };

    let holds = match (&l, &r) {
        (Value::Number(a), Value::Number(b)) => op.holds(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) if op.is_equality() => op.holds(a.cmp(b)),
        _ => {
            return Err(EvalError::IncomparableOperands {
                op: op.symbol(),
                left: l.kind(),
                right: r.kind(),
            });
        }
    };
    Ok(Eval::definite(holds, support))
}
