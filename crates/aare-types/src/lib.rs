//! Stable DTOs and IDs used across the aare workspace.
//!
//! This crate is intentionally boring:
//! - exact numeric values and the value enum carried by assignments
//! - data types for the emitted verification result and report envelope
//! - stable string IDs for the built-in ontology and report schemas

#![forbid(unsafe_code)]

pub mod ids;
pub mod number;
pub mod receipt;

pub use number::{Number, Value, ValueKind};
pub use receipt::{
    AbsenceReason, ExtractionRecord, ExtractionSource, OntologySummary, Outcome, ProofRecord,
    ProofSummary, ProofTrace, SCHEMA_VERIFICATION_V1, SOLVER_NAME, Snapshot, ToolMeta, TruthValue,
    VerificationReport, VerificationResult, Violation,
};
