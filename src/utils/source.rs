//! Source references carried by every AST node for diagnostics

use std::fmt;
use std::sync::Arc;

use crate::utils::Span;

/// The raw text, line and column of a construct.
///
/// The file text is shared, so cloning a reference is cheap. References are
/// diagnostic data only: they take no part in node equality or lookup keys.
#[derive(Clone)]
pub struct SourceReference {
    file: Arc<str>,
    span: Span,
}

impl SourceReference {
    pub fn new(file: Arc<str>, span: Span) -> Self {
        Self { file, span }
    }

    /// A reference to a standalone piece of text, used for synthesized nodes
    pub fn detached(text: &str) -> Self {
        Self {
            file: Arc::from(text),
            span: Span::new(0, text.len(), 1, 1),
        }
    }

    /// Raw source text of the construct
    pub fn text(&self) -> &str {
        self.file.get(self.span.start..self.span.end).unwrap_or("")
    }

    pub fn line(&self) -> u32 {
        self.span.line
    }

    pub fn column(&self) -> u32 {
        self.span.column
    }

    pub fn span(&self) -> Span {
        self.span
    }
}

impl fmt::Debug for SourceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} {:?}", self.span.line, self.span.column, self.text())
    }
}

impl fmt::Display for SourceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} at column {}", self.span.line, self.span.column)
    }
}
