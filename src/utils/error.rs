//! Error handling for the Papyrus front-end

use crate::frontend::ast::NodeId;
use crate::frontend::symbol::SymbolKind;
use crate::utils::{SourceReference, Span};
use serde::Serialize;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`], used for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorCategory {
    Parse,
    Syntax,
    DefinitionCollision,
    UnresolvedIdentifier,
    GlobalNameCollision,
    Contract,
    Io,
}

/// Front-end error
#[derive(Error, Debug, Clone)]
pub enum Error {
    // ==================== Parser Errors ====================

    #[error("Unexpected token: expected {expected}, got {got}")]
    UnexpectedToken {
        expected: String,
        got: String,
        span: Span,
    },

    #[error("Unterminated string literal")]
    UnterminatedString { span: Span },

    #[error("Unterminated block comment")]
    UnterminatedComment { span: Span },

    #[error("Malformed number literal \"{text}\"")]
    InvalidNumber { text: String, span: Span },

    // ==================== Syntax Errors ====================

    #[error("Array size cannot be greater than 128 (got {size})")]
    ArraySizeTooLarge { size: i32, reference: SourceReference },

    #[error("Only one state may be marked Auto, \"{original_name}\" already is (declared on {original})")]
    MultipleAutoStates {
        reference: SourceReference,
        original_name: String,
        original: SourceReference,
    },

    #[error("{message}")]
    InvalidAccessor {
        message: String,
        reference: SourceReference,
    },

    #[error("Cannot specify {accessor} function for full property twice")]
    DuplicateAccessor {
        accessor: &'static str,
        reference: SourceReference,
    },

    #[error("Invalid property \"{name}\": {message}")]
    InvalidProperty {
        name: String,
        message: String,
        reference: SourceReference,
    },

    #[error("{flag} is not allowed on {context}")]
    InvalidFlag {
        flag: &'static str,
        context: &'static str,
        reference: SourceReference,
    },

    #[error("Cannot assign to \"{}\"", .reference.text())]
    InvalidAssignee { reference: SourceReference },

    // ==================== Resolution Errors ====================

    #[error("Identifier \"{name}\" is already defined on line {} at column {}", .original.line(), .original.column())]
    DefinitionCollision {
        name: String,
        reference: SourceReference,
        original: SourceReference,
    },

    #[error("Unable to resolve {name}")]
    UnresolvedIdentifier {
        name: String,
        reference: SourceReference,
    },

    #[error("Global name \"{name}\" is already exported by script {owner} on line {} at column {}", .original.line(), .original.column())]
    GlobalNameCollision {
        name: String,
        owner: String,
        reference: SourceReference,
        original: SourceReference,
    },

    // ==================== Contract Violations ====================

    #[error("Symbols of kind {kind:?} do not carry a data type")]
    MissingDataType { kind: SymbolKind },

    #[error("No scope has been indexed for construct {node}")]
    UnindexedConstruct { node: NodeId },

    // ==================== Loading ====================

    #[error("IO error: {0}")]
    Io(String),

    #[error("Could not locate a script with name \"{name}\"")]
    ScriptNotFound { name: String },
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnexpectedToken { .. }
            | Self::UnterminatedString { .. }
            | Self::UnterminatedComment { .. }
            | Self::InvalidNumber { .. } => ErrorCategory::Parse,
            Self::ArraySizeTooLarge { .. }
            | Self::MultipleAutoStates { .. }
            | Self::InvalidAccessor { .. }
            | Self::DuplicateAccessor { .. }
            | Self::InvalidProperty { .. }
            | Self::InvalidFlag { .. }
            | Self::InvalidAssignee { .. } => ErrorCategory::Syntax,
            Self::DefinitionCollision { .. } => ErrorCategory::DefinitionCollision,
            Self::UnresolvedIdentifier { .. } => ErrorCategory::UnresolvedIdentifier,
            Self::GlobalNameCollision { .. } => ErrorCategory::GlobalNameCollision,
            Self::MissingDataType { .. } | Self::UnindexedConstruct { .. } => {
                ErrorCategory::Contract
            }
            Self::Io(_) | Self::ScriptNotFound { .. } => ErrorCategory::Io,
        }
    }

    /// Get the span associated with this error
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::UnexpectedToken { span, .. }
            | Self::UnterminatedString { span }
            | Self::UnterminatedComment { span }
            | Self::InvalidNumber { span, .. } => Some(*span),
            _ => self.reference().map(SourceReference::span),
        }
    }

    /// The source reference of the offending construct, if the error has one
    pub fn reference(&self) -> Option<&SourceReference> {
        match self {
            Self::ArraySizeTooLarge { reference, .. }
            | Self::MultipleAutoStates { reference, .. }
            | Self::InvalidAccessor { reference, .. }
            | Self::DuplicateAccessor { reference, .. }
            | Self::InvalidProperty { reference, .. }
            | Self::InvalidFlag { reference, .. }
            | Self::InvalidAssignee { reference }
            | Self::DefinitionCollision { reference, .. }
            | Self::UnresolvedIdentifier { reference, .. }
            | Self::GlobalNameCollision { reference, .. } => Some(reference),
            _ => None,
        }
    }

    /// The earlier definition an error conflicts with
    pub fn original(&self) -> Option<&SourceReference> {
        match self {
            Self::MultipleAutoStates { original, .. }
            | Self::DefinitionCollision { original, .. }
            | Self::GlobalNameCollision { original, .. } => Some(original),
            _ => None,
        }
    }

    /// `(line, column)` of the error, if it has a location
    pub fn location(&self) -> Option<(u32, u32)> {
        self.span().map(|span| (span.line, span.column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn reference(text: &str, line: u32, column: u32) -> SourceReference {
        let file: Arc<str> = Arc::from(text);
        SourceReference::new(file, Span::new(0, text.len(), line, column))
    }

    #[test]
    fn test_collision_message_points_at_original() {
        let err = Error::DefinitionCollision {
            name: "foo".to_string(),
            reference: reference("Int FOO", 7, 5),
            original: reference("Int foo", 3, 1),
        };
        assert_eq!(
            err.to_string(),
            "Identifier \"foo\" is already defined on line 3 at column 1"
        );
        assert_eq!(err.location(), Some((7, 5)));
        assert_eq!(err.original().map(SourceReference::line), Some(3));
        assert_eq!(err.category(), ErrorCategory::DefinitionCollision);
    }

    #[test]
    fn test_contract_errors_have_no_location() {
        let err = Error::MissingDataType { kind: SymbolKind::State };
        assert_eq!(err.location(), None);
        assert_eq!(err.category(), ErrorCategory::Contract);
    }

    #[test]
    fn test_parse_error_location_comes_from_span() {
        let err = Error::UnterminatedString { span: Span::new(4, 9, 2, 8) };
        assert_eq!(err.location(), Some((2, 8)));
        assert_eq!(err.category(), ErrorCategory::Parse);
    }
}
