use crate::Value;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// Stable schema identifier for the verification report envelope.
pub const SCHEMA_VERIFICATION_V1: &str = "aare.verification.v1";

/// Name of the decision procedure, reported alongside every proof.
pub const SOLVER_NAME: &str = "three-valued constraint evaluation";

/// Variable values as seen by one constraint. `None` means the variable was absent.
pub type Snapshot = BTreeMap<String, Option<Value>>;

/// Kleene truth value. `Unknown` arises only from absent inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TruthValue {
    True,
    False,
    Unknown,
}

impl TruthValue {
    pub fn not(self) -> TruthValue {
        match self {
            TruthValue::True => TruthValue::False,
            TruthValue::False => TruthValue::True,
            TruthValue::Unknown => TruthValue::Unknown,
        }
    }

    pub fn and(self, other: TruthValue) -> TruthValue {
        match (self, other) {
            (TruthValue::False, _) | (_, TruthValue::False) => TruthValue::False,
            (TruthValue::True, TruthValue::True) => TruthValue::True,
            _ => TruthValue::Unknown,
        }
    }

    pub fn or(self, other: TruthValue) -> TruthValue {
        match (self, other) {
            (TruthValue::True, _) | (_, TruthValue::True) => TruthValue::True,
            (TruthValue::False, TruthValue::False) => TruthValue::False,
            _ => TruthValue::Unknown,
        }
    }

    pub fn implies(self, other: TruthValue) -> TruthValue {
        self.not().or(other)
    }
}

impl From<bool> for TruthValue {
    fn from(value: bool) -> Self {
        if value {
            TruthValue::True
        } else {
            TruthValue::False
        }
    }
}

/// How a constraint was decided.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Satisfied,
    Violated,
    /// Truth value was unknown because inputs were absent; not a violation.
    EvaluatedWithMissingData,
    /// The formula could not be evaluated (runtime type mismatch); not a violation.
    EvaluationFailed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionSource {
    Pattern,
    Keyword,
    Derived,
    Constant,
}

/// Why a variable has no value. Absence is degradation, never an error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum AbsenceReason {
    NoMatch,
    CoercionFailed { raw: String },
    MissingInput { inputs: Vec<String> },
    DivisionByZero,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ExtractionRecord {
    pub variable: String,
    pub source: ExtractionSource,
    pub present: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absence: Option<AbsenceReason>,
}

/// One constraint's evaluation, recorded whatever the verdict.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProofRecord {
    pub constraint_id: String,
    pub truth_value: TruthValue,
    pub outcome: Outcome,
    /// Variables referenced by the formula, in order of first appearance.
    pub variables_used: Vec<String>,
    /// Subset of `variables_used` that had no value.
    pub missing_variables: Vec<String>,
    /// Minimal set of values that decided a definite outcome.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub witness: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProofSummary {
    pub satisfied: u32,
    pub violated: u32,
    pub unknown: u32,
    pub failed: u32,
}

impl ProofSummary {
    pub fn from_records(records: &[ProofRecord]) -> Self {
        let mut summary = ProofSummary::default();
        for r in records {
            match r.outcome {
                Outcome::Satisfied => summary.satisfied += 1,
                Outcome::Violated => summary.violated += 1,
                Outcome::EvaluatedWithMissingData => summary.unknown += 1,
                Outcome::EvaluationFailed => summary.failed += 1,
            }
        }
        summary
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProofTrace {
    pub method: String,
    pub records: Vec<ProofRecord>,
    pub extraction: Vec<ExtractionRecord>,
    pub summary: ProofSummary,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Violation {
    pub constraint_id: String,
    pub category: String,
    pub description: String,
    /// Readable rendering of the violated formula.
    pub formula: String,
    pub error_message: String,
    pub citation: String,
    pub assignment_snapshot: Snapshot,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub witness: BTreeMap<String, Value>,
    /// Stable SHA-256 identity: ontology name, constraint id and snapshot.
    pub fingerprint: String,
}

/// Core output of one verification call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VerificationResult {
    pub verified: bool,
    pub violations: Vec<Violation>,
    pub parsed_data: Snapshot,
    pub proof: ProofTrace,
    pub execution_time_ms: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OntologySummary {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub constraints_checked: u32,
    pub fingerprint: String,
}

/// Wire report assembled by the caller of the core.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VerificationReport {
    /// Versioned schema identifier for the envelope shape.
    pub schema: String,
    pub tool: ToolMeta,
    pub verification_id: String,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub verified: bool,
    pub violations: Vec<Violation>,
    pub parsed_data: Snapshot,
    pub ontology: OntologySummary,
    pub proof: ProofTrace,
    pub solver: String,
    pub execution_time_ms: f64,
}
