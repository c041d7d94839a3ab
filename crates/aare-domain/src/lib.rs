//! Pure verification engines (no IO).
//!
//! Input: raw text and a validated ontology.
//! Output: extracted assignment, per-constraint proof records, violations and verdict.

#![forbid(unsafe_code)]

pub mod assignment;
pub mod fingerprint;

mod engine;
mod extract;
mod verify;

#[cfg(test)]
mod proptests;
#[cfg(test)]
mod test_support;

pub use assignment::{Assignment, Binding};
pub use engine::{EvalError, Evaluation, evaluate};
pub use extract::extract;
pub use verify::{verify, verify_unvalidated};
