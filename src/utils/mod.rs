//! Utility module

mod span;
mod source;
mod error;

pub use span::Span;
pub use source::SourceReference;
pub use error::{Error, ErrorCategory, Result};
