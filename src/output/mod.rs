//! Result output (console text and JSON report)

pub mod json;
pub mod text;
