//! Token definitions for Papyrus

use crate::utils::Span;

/// A token produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn eof(span: Span) -> Self {
        Self { kind: TokenKind::Eof, span }
    }
}

/// Token kinds
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ============ Keywords ============
    /// ScriptName
    ScriptName,
    /// Extends
    Extends,
    /// Import
    Import,
    /// Property
    Property,
    /// EndProperty
    EndProperty,
    /// Auto
    Auto,
    /// AutoReadOnly
    AutoReadOnly,
    /// State
    State,
    /// EndState
    EndState,
    /// Function
    Function,
    /// EndFunction
    EndFunction,
    /// Event
    Event,
    /// EndEvent
    EndEvent,
    /// Native
    Native,
    /// Global
    Global,
    /// Hidden
    Hidden,
    /// Conditional
    Conditional,
    /// Return
    Return,
    /// As
    As,
    /// If
    If,
    /// ElseIf
    ElseIf,
    /// Else
    Else,
    /// EndIf
    EndIf,
    /// While
    While,
    /// EndWhile
    EndWhile,
    /// New
    New,
    /// Length
    Length,

    // ============ Builtin types ============
    Bool,
    Int,
    Float,
    String,

    // ============ Literals ============
    /// True
    True,
    /// False
    False,
    /// None
    None,
    /// Self
    SelfRef,
    /// Parent
    Parent,
    /// Integer literal, raw text (decimal or 0x hex, optionally signed)
    IntLit(std::string::String),
    /// Float literal
    FloatLit(f32),
    /// String literal with escapes applied
    StringLit(std::string::String),
    /// Identifier
    Ident(std::string::String),
    /// `{ ... }` documentation comment, without the braces
    DocComment(std::string::String),

    // ============ Operators ============
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Star,
    /// /
    Slash,
    /// %
    Percent,
    /// =
    Eq,
    /// +=
    PlusEq,
    /// -=
    MinusEq,
    /// *=
    StarEq,
    /// /=
    SlashEq,
    /// %=
    PercentEq,
    /// ==
    EqEq,
    /// !=
    Ne,
    /// <
    Lt,
    /// <=
    Le,
    /// >
    Gt,
    /// >=
    Ge,
    /// &&
    AndAnd,
    /// ||
    OrOr,
    /// !
    Not,

    // ============ Punctuation ============
    /// .
    Dot,
    /// ,
    Comma,
    /// (
    LParen,
    /// )
    RParen,
    /// [
    LBracket,
    /// ]
    RBracket,

    // ============ Special ============
    /// Line break, the statement terminator
    Newline,
    /// End of file
    Eof,
    /// Unknown/invalid character
    Unknown(char),
}

impl TokenKind {
    /// Try to convert an identifier to a keyword, ignoring case
    pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
        let kind = match s.to_ascii_lowercase().as_str() {
            "scriptname" => TokenKind::ScriptName,
            "extends" => TokenKind::Extends,
            "import" => TokenKind::Import,
            "property" => TokenKind::Property,
            "endproperty" => TokenKind::EndProperty,
            "auto" => TokenKind::Auto,
            "autoreadonly" => TokenKind::AutoReadOnly,
            "state" => TokenKind::State,
            "endstate" => TokenKind::EndState,
            "function" => TokenKind::Function,
            "endfunction" => TokenKind::EndFunction,
            "event" => TokenKind::Event,
            "endevent" => TokenKind::EndEvent,
            "native" => TokenKind::Native,
            "global" => TokenKind::Global,
            "hidden" => TokenKind::Hidden,
            "conditional" => TokenKind::Conditional,
            "return" => TokenKind::Return,
            "as" => TokenKind::As,
            "if" => TokenKind::If,
            "elseif" => TokenKind::ElseIf,
            "else" => TokenKind::Else,
            "endif" => TokenKind::EndIf,
            "while" => TokenKind::While,
            "endwhile" => TokenKind::EndWhile,
            "new" => TokenKind::New,
            "length" => TokenKind::Length,
            "bool" => TokenKind::Bool,
            "int" => TokenKind::Int,
            "float" => TokenKind::Float,
            "string" => TokenKind::String,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "none" => TokenKind::None,
            "self" => TokenKind::SelfRef,
            "parent" => TokenKind::Parent,
            _ => return Option::None,
        };
        Some(kind)
    }

    /// Whether this token may start a type
    pub fn starts_type(&self) -> bool {
        matches!(
            self,
            TokenKind::Bool | TokenKind::Int | TokenKind::Float | TokenKind::String | TokenKind::Ident(_)
        )
    }

    /// Whether this token is a compound or plain assignment operator
    pub fn is_assignment(&self) -> bool {
        matches!(
            self,
            TokenKind::Eq
                | TokenKind::PlusEq
                | TokenKind::MinusEq
                | TokenKind::StarEq
                | TokenKind::SlashEq
                | TokenKind::PercentEq
        )
    }

    /// Get the precedence of a binary operator (for precedence climbing)
    /// Returns None if not a binary operator
    pub fn binary_precedence(&self) -> Option<u8> {
        match self {
            // Logical OR (lowest)
            TokenKind::OrOr => Some(1),

            // Logical AND
            TokenKind::AndAnd => Some(2),

            // Comparison
            TokenKind::EqEq
            | TokenKind::Ne
            | TokenKind::Lt
            | TokenKind::Le
            | TokenKind::Gt
            | TokenKind::Ge => Some(3),

            // Additive
            TokenKind::Plus | TokenKind::Minus => Some(4),

            // Multiplicative (highest for binary)
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Some(5),

            _ => Option::None,
        }
    }
}
