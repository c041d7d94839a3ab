//! Rendering utilities for human-facing surfaces (Markdown, terminal text).

#![forbid(unsafe_code)]

mod markdown;
mod model;
mod text;

pub use markdown::render_markdown;
pub use model::{RenderableCounts, RenderableReport, RenderableUnknown, RenderableViolation};
pub use text::render_text;
