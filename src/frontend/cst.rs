//! Concrete parse tree
//!
//! Mirrors the grammar productions as written. Nothing here is validated
//! beyond what the grammar itself enforces: flag lists are kept raw, every
//! function written inside a property is kept, and literals keep their text.
//! [`build`](crate::frontend::builder::build) turns this into the AST.

use std::sync::Arc;

use crate::frontend::ast::{AssignmentOperator, BinaryOperator, UnaryOperator};
use crate::utils::Span;

/// A parsed script together with the text its spans point into
#[derive(Debug, Clone)]
pub struct ScriptTree {
    pub file: Arc<str>,
    pub span: Span,
    pub header: HeaderNode,
    pub declarations: Vec<DeclarationNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    Hidden,
    Conditional,
    Global,
    Native,
    Auto,
    AutoReadOnly,
}

impl Flag {
    pub fn name(&self) -> &'static str {
        match self {
            Flag::Hidden => "Hidden",
            Flag::Conditional => "Conditional",
            Flag::Global => "Global",
            Flag::Native => "Native",
            Flag::Auto => "Auto",
            Flag::AutoReadOnly => "AutoReadOnly",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlagNode {
    pub flag: Flag,
    pub span: Span,
}

/// Whether `flags` contains `flag`
pub fn has_flag(flags: &[FlagNode], flag: Flag) -> bool {
    flags.iter().any(|f| f.flag == flag)
}

#[derive(Debug, Clone)]
pub struct HeaderNode {
    pub span: Span,
    pub name: Ident,
    pub parent: Option<Ident>,
    pub flags: Vec<FlagNode>,
    pub doc: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BaseTypeNode {
    Bool,
    Int,
    Float,
    String,
    Object(Ident),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeNode {
    pub span: Span,
    pub base: BaseTypeNode,
    pub is_array: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralKind {
    Bool(bool),
    /// Raw text, possibly with a folded leading `-`
    Int(String),
    Float(f32),
    String(String),
    None,
    SelfRef,
    Parent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralNode {
    pub span: Span,
    pub kind: LiteralKind,
}

// ==================== Declarations ====================

#[derive(Debug, Clone)]
pub enum DeclarationNode {
    Import(ImportNode),
    Variable(ScriptVariableNode),
    Property(PropertyNode),
    State(StateNode),
    Function(FunctionNode),
    Event(EventNode),
}

#[derive(Debug, Clone)]
pub struct ImportNode {
    pub span: Span,
    pub name: Ident,
}

#[derive(Debug, Clone)]
pub struct ScriptVariableNode {
    pub span: Span,
    pub ty: TypeNode,
    pub name: Ident,
    pub value: Option<LiteralNode>,
    pub flags: Vec<FlagNode>,
}

#[derive(Debug, Clone)]
pub struct PropertyNode {
    pub span: Span,
    pub ty: TypeNode,
    pub name: Ident,
    pub value: Option<LiteralNode>,
    pub flags: Vec<FlagNode>,
    pub doc: Option<String>,
    /// Functions between the header and `EndProperty`
    pub functions: Vec<FunctionNode>,
}

#[derive(Debug, Clone)]
pub struct StateNode {
    pub span: Span,
    pub is_auto: bool,
    pub name: Ident,
    pub invokables: Vec<InvokableNode>,
}

#[derive(Debug, Clone)]
pub enum InvokableNode {
    Function(FunctionNode),
    Event(EventNode),
}

#[derive(Debug, Clone)]
pub struct FunctionNode {
    pub span: Span,
    pub return_type: Option<TypeNode>,
    pub name: Ident,
    pub params: Vec<ParamNode>,
    pub flags: Vec<FlagNode>,
    pub doc: Option<String>,
    /// Absent when the function is flagged `Native`
    pub body: Option<Vec<StatementNode>>,
}

#[derive(Debug, Clone)]
pub struct EventNode {
    pub span: Span,
    pub name: Ident,
    pub params: Vec<ParamNode>,
    pub flags: Vec<FlagNode>,
    pub doc: Option<String>,
    pub body: Option<Vec<StatementNode>>,
}

#[derive(Debug, Clone)]
pub struct ParamNode {
    pub span: Span,
    pub ty: TypeNode,
    pub name: Ident,
    pub default: Option<LiteralNode>,
}

// ==================== Statements ====================

#[derive(Debug, Clone)]
pub enum StatementNode {
    Expression(ExprNode),
    Variable(LocalNode),
    Assignment(AssignmentNode),
    Return(ReturnNode),
    If(IfNode),
    While(WhileNode),
}

#[derive(Debug, Clone)]
pub struct LocalNode {
    pub span: Span,
    pub ty: TypeNode,
    pub name: Ident,
    pub value: Option<ExprNode>,
}

#[derive(Debug, Clone)]
pub struct AssignmentNode {
    pub span: Span,
    /// Any expression; `build` checks it is assignable
    pub target: ExprNode,
    pub operator: AssignmentOperator,
    pub value: ExprNode,
}

#[derive(Debug, Clone)]
pub struct ReturnNode {
    pub span: Span,
    pub value: Option<ExprNode>,
}

#[derive(Debug, Clone)]
pub struct IfNode {
    pub span: Span,
    pub branches: Vec<(ExprNode, BlockNode)>,
    pub else_block: Option<BlockNode>,
}

#[derive(Debug, Clone)]
pub struct WhileNode {
    pub span: Span,
    pub condition: ExprNode,
    pub body: BlockNode,
}

#[derive(Debug, Clone)]
pub struct BlockNode {
    pub span: Span,
    pub statements: Vec<StatementNode>,
}

// ==================== Expressions ====================

#[derive(Debug, Clone)]
pub struct ExprNode {
    pub span: Span,
    pub kind: ExprKind,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Literal(LiteralKind),
    Ident(String),
    Binary {
        operator: BinaryOperator,
        left: Box<ExprNode>,
        right: Box<ExprNode>,
    },
    Unary {
        operator: UnaryOperator,
        operand: Box<ExprNode>,
    },
    Cast {
        expression: Box<ExprNode>,
        ty: TypeNode,
    },
    Index {
        array: Box<ExprNode>,
        index: Box<ExprNode>,
    },
    Length {
        array: Box<ExprNode>,
    },
    NewArray {
        element: TypeNode,
        size: LiteralNode,
    },
    Member {
        object: Box<ExprNode>,
        name: Ident,
    },
    Call {
        receiver: Option<Box<ExprNode>>,
        name: Ident,
        args: Vec<ArgNode>,
    },
    Paren(Box<ExprNode>),
}

#[derive(Debug, Clone)]
pub struct ArgNode {
    pub span: Span,
    pub name: Option<Ident>,
    pub value: ExprNode,
}
