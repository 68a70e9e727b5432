//! Abstract Syntax Tree for Papyrus
//!
//! Nodes are immutable values produced once per parse by
//! [`build`](crate::frontend::builder::build). Every node carries a
//! [`SourceReference`] for diagnostics only.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::DataType;
use crate::utils::SourceReference;

// ==================== Node Identity ====================

/// Process-unique id of a scope-introducing node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Allocate an id no other node in this process has
    pub fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        NodeId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node that introduces a scope when indexed
pub trait Scoped {
    fn node_id(&self) -> NodeId;
}

// ==================== Identifiers and Types ====================

/// A name as written in source. Equality and hashing ignore case.
#[derive(Debug, Clone)]
pub struct Identifier {
    name: String,
    source: SourceReference,
}

impl Identifier {
    pub fn new(name: impl Into<String>, source: SourceReference) -> Self {
        Self { name: name.into(), source }
    }

    /// The name exactly as written
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Case-insensitive lookup key
    pub fn key(&self) -> String {
        self.name.to_uppercase()
    }

    /// Whether this identifier names `other`, ignoring case
    pub fn is_equivalent(&self, other: &str) -> bool {
        self.key() == other.to_uppercase()
    }

    pub fn source(&self) -> &SourceReference {
        &self.source
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Identifier {}

impl Hash for Identifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// The builtin base types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Bool,
    Int,
    Float,
    String,
}

/// A data type plus, for object types, the script it names
#[derive(Debug, Clone)]
pub struct Type {
    data_type: DataType,
    object: Option<Identifier>,
    source: SourceReference,
}

impl Type {
    /// A builtin type, or an array of one
    pub fn primitive(primitive: Primitive, is_array: bool, source: SourceReference) -> Self {
        let data_type = match (primitive, is_array) {
            (Primitive::Bool, false) => DataType::Bool,
            (Primitive::Int, false) => DataType::Int,
            (Primitive::Float, false) => DataType::Float,
            (Primitive::String, false) => DataType::String,
            (Primitive::Bool, true) => DataType::BoolArray,
            (Primitive::Int, true) => DataType::IntArray,
            (Primitive::Float, true) => DataType::FloatArray,
            (Primitive::String, true) => DataType::StringArray,
        };
        Self { data_type, object: None, source }
    }

    /// A script type, or an array of one
    pub fn object(script: Identifier, is_array: bool, source: SourceReference) -> Self {
        let data_type = if is_array { DataType::ObjectArray } else { DataType::Object };
        Self { data_type, object: Some(script), source }
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// The script named by an object type
    pub fn object_name(&self) -> Option<&Identifier> {
        self.object.as_ref()
    }

    pub fn source(&self) -> &SourceReference {
        &self.source
    }

    /// Same data type and, for object types, the same script
    pub fn is_equivalent(&self, other: &Type) -> bool {
        self.data_type == other.data_type && self.object == other.object
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.object {
            Some(script) if self.data_type.is_array() => write!(f, "{}[]", script),
            Some(script) => write!(f, "{}", script),
            None => write!(f, "{}", self.data_type),
        }
    }
}

// ==================== Script ====================

/// Root node
#[derive(Debug, Clone)]
pub struct Script {
    pub id: NodeId,
    pub source: SourceReference,
    pub header: Header,
    pub declarations: Vec<Declaration>,
}

impl Script {
    pub fn name(&self) -> &Identifier {
        &self.header.name
    }

    /// Scripts named by `Import` declarations, in declaration order
    pub fn imports(&self) -> impl Iterator<Item = &Identifier> {
        self.declarations.iter().filter_map(|declaration| match declaration {
            Declaration::Import(import) => Some(&import.script),
            _ => None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Header {
    pub source: SourceReference,
    pub name: Identifier,
    pub parent: Option<Identifier>,
    pub is_hidden: bool,
    pub is_conditional: bool,
    pub doc_comment: Option<String>,
}

/// Declarations appearing at script level; states hold only invokables
#[derive(Debug, Clone)]
pub enum Declaration {
    Import(Import),
    ScriptVariable(ScriptVariable),
    Property(Property),
    State(State),
    Function(Function),
    Event(Event),
}

#[derive(Debug, Clone)]
pub struct Import {
    pub source: SourceReference,
    pub script: Identifier,
}

#[derive(Debug, Clone)]
pub struct ScriptVariable {
    pub source: SourceReference,
    pub ty: Type,
    pub name: Identifier,
    pub initial_value: Option<Literal>,
    pub is_conditional: bool,
}

#[derive(Debug, Clone)]
pub struct Property {
    pub source: SourceReference,
    pub ty: Type,
    pub name: Identifier,
    pub kind: PropertyKind,
    pub doc_comment: Option<String>,
    pub is_hidden: bool,
    pub is_conditional: bool,
}

/// The three mutually exclusive property modes
#[derive(Debug, Clone)]
pub enum PropertyKind {
    Auto { default: Option<Literal> },
    AutoReadOnly { default: Literal },
    Full { get: Option<Function>, set: Option<Function> },
}

impl Property {
    pub fn default_value(&self) -> Option<&Literal> {
        match &self.kind {
            PropertyKind::Auto { default } => default.as_ref(),
            PropertyKind::AutoReadOnly { default } => Some(default),
            PropertyKind::Full { .. } => None,
        }
    }

    pub fn get_function(&self) -> Option<&Function> {
        match &self.kind {
            PropertyKind::Full { get, .. } => get.as_ref(),
            _ => None,
        }
    }

    pub fn set_function(&self) -> Option<&Function> {
        match &self.kind {
            PropertyKind::Full { set, .. } => set.as_ref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct State {
    pub id: NodeId,
    pub source: SourceReference,
    pub name: Identifier,
    pub is_auto: bool,
    pub invokables: Vec<Invokable>,
}

/// A Function or Event
#[derive(Debug, Clone)]
pub enum Invokable {
    Function(Function),
    Event(Event),
}

impl Invokable {
    pub fn name(&self) -> &Identifier {
        match self {
            Invokable::Function(function) => &function.name,
            Invokable::Event(event) => &event.name,
        }
    }

    pub fn parameters(&self) -> &[Parameter] {
        match self {
            Invokable::Function(function) => &function.parameters,
            Invokable::Event(event) => &event.parameters,
        }
    }

    pub fn is_native(&self) -> bool {
        match self {
            Invokable::Function(function) => function.is_native(),
            Invokable::Event(event) => event.is_native(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Function {
    pub id: NodeId,
    pub source: SourceReference,
    pub return_type: Option<Type>,
    pub name: Identifier,
    pub parameters: Vec<Parameter>,
    /// `None` for native functions
    pub body: Option<Vec<Statement>>,
    pub doc_comment: Option<String>,
    pub is_global: bool,
}

impl Function {
    pub fn is_native(&self) -> bool {
        self.body.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct Event {
    pub id: NodeId,
    pub source: SourceReference,
    pub name: Identifier,
    pub parameters: Vec<Parameter>,
    /// `None` for native events
    pub body: Option<Vec<Statement>>,
    pub doc_comment: Option<String>,
}

impl Event {
    pub fn is_native(&self) -> bool {
        self.body.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub source: SourceReference,
    pub ty: Type,
    pub name: Identifier,
    pub default_value: Option<Literal>,
}

macro_rules! scoped {
    ($($node:ty),*) => {
        $(impl Scoped for $node {
            fn node_id(&self) -> NodeId {
                self.id
            }
        })*
    };
}

scoped!(Script, State, Function, Event, Block);

impl Scoped for NodeId {
    fn node_id(&self) -> NodeId {
        *self
    }
}

// ==================== Statements ====================

#[derive(Debug, Clone)]
pub enum Statement {
    Expression(Expression),
    Variable(Variable),
    Assignment(Assignment),
    Return(Return),
    If(If),
    While(While),
}

impl Statement {
    pub fn source(&self) -> &SourceReference {
        match self {
            Statement::Expression(e) => e.source(),
            Statement::Variable(v) => &v.source,
            Statement::Assignment(a) => &a.source,
            Statement::Return(r) => &r.source,
            Statement::If(i) => &i.source,
            Statement::While(w) => &w.source,
        }
    }
}

/// Local variable declaration
#[derive(Debug, Clone)]
pub struct Variable {
    pub source: SourceReference,
    pub ty: Type,
    pub name: Identifier,
    pub value: Option<Expression>,
}

#[derive(Debug, Clone)]
pub struct Assignment {
    pub source: SourceReference,
    pub assignee: Assignee,
    pub operator: AssignmentOperator,
    pub value: Expression,
}

/// Expressions that may appear on the left of an assignment
#[derive(Debug, Clone)]
pub enum Assignee {
    Identifier(Identifier),
    DotAccess(DotAccess),
    ArrayAccess(ArrayAccess),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOperator {
    Assign,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

#[derive(Debug, Clone)]
pub struct Return {
    pub source: SourceReference,
    pub value: Option<Expression>,
}

/// `If` with its `ElseIf` branches in order, then an optional `Else`
#[derive(Debug, Clone)]
pub struct If {
    pub source: SourceReference,
    pub branches: Vec<ConditionalBlock>,
    pub else_block: Option<Block>,
}

#[derive(Debug, Clone)]
pub struct ConditionalBlock {
    pub condition: Expression,
    pub block: Block,
}

#[derive(Debug, Clone)]
pub struct While {
    pub source: SourceReference,
    pub condition: Expression,
    pub block: Block,
}

/// Statement sequence bounding local variable lifetime
#[derive(Debug, Clone)]
pub struct Block {
    pub id: NodeId,
    pub source: SourceReference,
    pub statements: Vec<Statement>,
}

// ==================== Expressions ====================

#[derive(Debug, Clone)]
pub enum Expression {
    Literal(Literal),
    Identifier(Identifier),
    BinaryOperation(BinaryOperation),
    UnaryOperation(UnaryOperation),
    Cast(Cast),
    ArrayAccess(ArrayAccess),
    ArrayLength(ArrayLength),
    ArrayInitialization(ArrayInitialization),
    DotAccess(DotAccess),
    FunctionCall(FunctionCall),
    Parenthetical(Parenthetical),
}

impl Expression {
    pub fn source(&self) -> &SourceReference {
        match self {
            Expression::Literal(l) => l.source(),
            Expression::Identifier(i) => i.source(),
            Expression::BinaryOperation(b) => &b.source,
            Expression::UnaryOperation(u) => &u.source,
            Expression::Cast(c) => &c.source,
            Expression::ArrayAccess(a) => &a.source,
            Expression::ArrayLength(a) => &a.source,
            Expression::ArrayInitialization(a) => &a.source,
            Expression::DotAccess(d) => &d.source,
            Expression::FunctionCall(f) => &f.source,
            Expression::Parenthetical(p) => &p.source,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    LogicalOr,
    LogicalAnd,
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

#[derive(Debug, Clone)]
pub struct BinaryOperation {
    pub source: SourceReference,
    pub operator: BinaryOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    NumericNegation,
    LogicalNegation,
}

#[derive(Debug, Clone)]
pub struct UnaryOperation {
    pub source: SourceReference,
    pub operator: UnaryOperator,
    pub operand: Box<Expression>,
}

#[derive(Debug, Clone)]
pub struct Cast {
    pub source: SourceReference,
    pub expression: Box<Expression>,
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub struct ArrayAccess {
    pub source: SourceReference,
    pub array: Box<Expression>,
    pub index: Box<Expression>,
}

#[derive(Debug, Clone)]
pub struct ArrayLength {
    pub source: SourceReference,
    pub array: Box<Expression>,
}

/// `new T[size]`; `element_type` is `T`, never an array type
#[derive(Debug, Clone)]
pub struct ArrayInitialization {
    pub source: SourceReference,
    pub element_type: Type,
    pub size: IntegerLiteral,
}

/// Largest size an array initializer may request
pub const MAX_ARRAY_SIZE: i32 = 128;

#[derive(Debug, Clone)]
pub struct DotAccess {
    pub source: SourceReference,
    pub reference: Box<Expression>,
    pub member: Identifier,
}

/// A call. Without a receiver the function is looked up in the current scope.
#[derive(Debug, Clone)]
pub struct FunctionCall {
    pub source: SourceReference,
    pub receiver: Option<Box<Expression>>,
    pub name: Identifier,
    pub arguments: Vec<CallArgument>,
}

/// A call argument, optionally passed by parameter name
#[derive(Debug, Clone)]
pub struct CallArgument {
    pub source: SourceReference,
    pub name: Option<Identifier>,
    pub value: Expression,
}

#[derive(Debug, Clone)]
pub struct Parenthetical {
    pub source: SourceReference,
    pub expression: Box<Expression>,
}

// ==================== Literals ====================

#[derive(Debug, Clone)]
pub enum Literal {
    Boolean(BooleanLiteral),
    Integer(IntegerLiteral),
    Float(FloatLiteral),
    String(StringLiteral),
    Object(ObjectLiteral),
}

impl Literal {
    pub fn source(&self) -> &SourceReference {
        match self {
            Literal::Boolean(l) => &l.source,
            Literal::Integer(l) => &l.source,
            Literal::Float(l) => &l.source,
            Literal::String(l) => &l.source,
            Literal::Object(l) => &l.source,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BooleanLiteral {
    pub source: SourceReference,
    pub value: bool,
}

/// Integer literal clamped into `i32`
#[derive(Debug, Clone)]
pub struct IntegerLiteral {
    pub source: SourceReference,
    pub value: i32,
    /// The written value did not fit and `value` was clamped
    pub out_of_range: bool,
}

impl IntegerLiteral {
    /// Parse decimal or `0x` hex text with an optional leading `-`
    pub fn parse(text: &str, source: SourceReference) -> Self {
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let (radix, digits) = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
            Some(hex) => (16, hex),
            None => (10, digits),
        };

        // None once the magnitude no longer fits in i64
        let magnitude = digits.chars().try_fold(0i64, |acc, c| {
            let digit = i64::from(c.to_digit(radix)?);
            acc.checked_mul(i64::from(radix))?.checked_add(digit)
        });

        let (value, out_of_range) = match magnitude {
            Some(m) => {
                let signed = if negative { -m } else { m };
                match i32::try_from(signed) {
                    Ok(v) => (v, false),
                    Err(_) if negative => (i32::MIN, true),
                    Err(_) => (i32::MAX, true),
                }
            }
            None if negative => (i32::MIN, true),
            None => (i32::MAX, true),
        };

        Self { source, value, out_of_range }
    }
}

#[derive(Debug, Clone)]
pub struct FloatLiteral {
    pub source: SourceReference,
    pub value: f32,
}

#[derive(Debug, Clone)]
pub struct StringLiteral {
    pub source: SourceReference,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectValue {
    None,
    SelfRef,
    Parent,
}

#[derive(Debug, Clone)]
pub struct ObjectLiteral {
    pub source: SourceReference,
    pub value: ObjectValue,
}
