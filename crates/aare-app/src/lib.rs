//! Use case orchestration for aare.
//!
//! This crate provides the application layer: use cases that coordinate the ontology store, the
//! pure verification engines and the renderers. It is intentionally thin and delegates heavy
//! lifting to the appropriate layers.
//!
//! The CLI crate depends on this; it only handles argument parsing and I/O.

#![forbid(unsafe_code)]

mod explain;
mod render;
mod report;
mod store;
mod validate;
mod verify;

pub use explain::{
    ConstraintExplanation, ExplainOutput, VariableSource, format_explanation, format_not_found,
    run_explain,
};
pub use render::{render_markdown, render_text};
pub use report::{parse_report_json, serialize_report, to_renderable};
pub use store::{OntologyStore, StoreError};
pub use validate::{ValidationSummary, format_validation, run_validate};
pub use verify::{VerifyInput, run_verify, verdict_exit_code};
