//! Result rendering
//!
//! Results go to stdout; logs go to stderr so either output format can be
//! piped cleanly.

pub mod json;
pub mod text;
