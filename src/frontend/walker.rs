//! Structural AST traversal
//!
//! [`walk`] visits every node of a script exactly once in source order.
//! Composite nodes get [`Walker::enter`] before their children and
//! [`Walker::exit`] after; leaves (identifiers, types, literals) get
//! [`Walker::touch`]. The traversal itself holds no state, so any number of
//! walks may run over the same script.

use crate::frontend::ast::*;
use crate::utils::SourceReference;

/// A borrowed view of any AST node
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Script(&'a Script),
    Header(&'a Header),
    Import(&'a Import),
    ScriptVariable(&'a ScriptVariable),
    Property(&'a Property),
    State(&'a State),
    Function(&'a Function),
    Event(&'a Event),
    Parameter(&'a Parameter),
    Block(&'a Block),
    Variable(&'a Variable),
    Assignment(&'a Assignment),
    Return(&'a Return),
    If(&'a If),
    While(&'a While),
    BinaryOperation(&'a BinaryOperation),
    UnaryOperation(&'a UnaryOperation),
    Cast(&'a Cast),
    ArrayAccess(&'a ArrayAccess),
    ArrayLength(&'a ArrayLength),
    ArrayInitialization(&'a ArrayInitialization),
    DotAccess(&'a DotAccess),
    FunctionCall(&'a FunctionCall),
    CallArgument(&'a CallArgument),
    Parenthetical(&'a Parenthetical),
    Type(&'a Type),
    Identifier(&'a Identifier),
    Literal(&'a Literal),
    /// Size of an array initializer
    ArraySize(&'a IntegerLiteral),
}

impl<'a> Node<'a> {
    fn declaration(declaration: &'a Declaration) -> Self {
        match declaration {
            Declaration::Import(i) => Node::Import(i),
            Declaration::ScriptVariable(v) => Node::ScriptVariable(v),
            Declaration::Property(p) => Node::Property(p),
            Declaration::State(s) => Node::State(s),
            Declaration::Function(f) => Node::Function(f),
            Declaration::Event(e) => Node::Event(e),
        }
    }

    fn invokable(invokable: &'a Invokable) -> Self {
        match invokable {
            Invokable::Function(f) => Node::Function(f),
            Invokable::Event(e) => Node::Event(e),
        }
    }

    fn statement(statement: &'a Statement) -> Self {
        match statement {
            Statement::Expression(e) => Node::expression(e),
            Statement::Variable(v) => Node::Variable(v),
            Statement::Assignment(a) => Node::Assignment(a),
            Statement::Return(r) => Node::Return(r),
            Statement::If(i) => Node::If(i),
            Statement::While(w) => Node::While(w),
        }
    }

    fn expression(expression: &'a Expression) -> Self {
        match expression {
            Expression::Literal(l) => Node::Literal(l),
            Expression::Identifier(i) => Node::Identifier(i),
            Expression::BinaryOperation(b) => Node::BinaryOperation(b),
            Expression::UnaryOperation(u) => Node::UnaryOperation(u),
            Expression::Cast(c) => Node::Cast(c),
            Expression::ArrayAccess(a) => Node::ArrayAccess(a),
            Expression::ArrayLength(a) => Node::ArrayLength(a),
            Expression::ArrayInitialization(a) => Node::ArrayInitialization(a),
            Expression::DotAccess(d) => Node::DotAccess(d),
            Expression::FunctionCall(f) => Node::FunctionCall(f),
            Expression::Parenthetical(p) => Node::Parenthetical(p),
        }
    }

    fn assignee(assignee: &'a Assignee) -> Self {
        match assignee {
            Assignee::Identifier(i) => Node::Identifier(i),
            Assignee::DotAccess(d) => Node::DotAccess(d),
            Assignee::ArrayAccess(a) => Node::ArrayAccess(a),
        }
    }

    /// Leaves are touched instead of entered
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            Node::Type(_) | Node::Identifier(_) | Node::Literal(_) | Node::ArraySize(_)
        )
    }

    /// Short name of the node kind, for logs and diagnostics
    pub fn label(&self) -> &'static str {
        match self {
            Node::Script(_) => "Script",
            Node::Header(_) => "Header",
            Node::Import(_) => "Import",
            Node::ScriptVariable(_) => "ScriptVariable",
            Node::Property(_) => "Property",
            Node::State(_) => "State",
            Node::Function(_) => "Function",
            Node::Event(_) => "Event",
            Node::Parameter(_) => "Parameter",
            Node::Block(_) => "Block",
            Node::Variable(_) => "Variable",
            Node::Assignment(_) => "Assignment",
            Node::Return(_) => "Return",
            Node::If(_) => "If",
            Node::While(_) => "While",
            Node::BinaryOperation(_) => "BinaryOperation",
            Node::UnaryOperation(_) => "UnaryOperation",
            Node::Cast(_) => "Cast",
            Node::ArrayAccess(_) => "ArrayAccess",
            Node::ArrayLength(_) => "ArrayLength",
            Node::ArrayInitialization(_) => "ArrayInitialization",
            Node::DotAccess(_) => "DotAccess",
            Node::FunctionCall(_) => "FunctionCall",
            Node::CallArgument(_) => "CallArgument",
            Node::Parenthetical(_) => "Parenthetical",
            Node::Type(_) => "Type",
            Node::Identifier(_) => "Identifier",
            Node::Literal(_) => "Literal",
            Node::ArraySize(_) => "ArraySize",
        }
    }

    pub fn source(&self) -> &'a SourceReference {
        match *self {
            Node::Script(n) => &n.source,
            Node::Header(n) => &n.source,
            Node::Import(n) => &n.source,
            Node::ScriptVariable(n) => &n.source,
            Node::Property(n) => &n.source,
            Node::State(n) => &n.source,
            Node::Function(n) => &n.source,
            Node::Event(n) => &n.source,
            Node::Parameter(n) => &n.source,
            Node::Block(n) => &n.source,
            Node::Variable(n) => &n.source,
            Node::Assignment(n) => &n.source,
            Node::Return(n) => &n.source,
            Node::If(n) => &n.source,
            Node::While(n) => &n.source,
            Node::BinaryOperation(n) => &n.source,
            Node::UnaryOperation(n) => &n.source,
            Node::Cast(n) => &n.source,
            Node::ArrayAccess(n) => &n.source,
            Node::ArrayLength(n) => &n.source,
            Node::ArrayInitialization(n) => &n.source,
            Node::DotAccess(n) => &n.source,
            Node::FunctionCall(n) => &n.source,
            Node::CallArgument(n) => &n.source,
            Node::Parenthetical(n) => &n.source,
            Node::Type(n) => n.source(),
            Node::Identifier(n) => n.source(),
            Node::Literal(n) => n.source(),
            Node::ArraySize(n) => &n.source,
        }
    }

    /// Direct children in traversal order
    pub fn children(&self) -> Vec<Node<'a>> {
        let mut children = Vec::new();
        match *self {
            Node::Script(script) => {
                children.push(Node::Header(&script.header));
                children.extend(script.declarations.iter().map(Node::declaration));
            }
            Node::Header(header) => {
                children.push(Node::Identifier(&header.name));
                children.extend(header.parent.as_ref().map(Node::Identifier));
            }
            Node::Import(import) => children.push(Node::Identifier(&import.script)),
            Node::ScriptVariable(variable) => {
                children.push(Node::Type(&variable.ty));
                children.push(Node::Identifier(&variable.name));
                children.extend(variable.initial_value.as_ref().map(Node::Literal));
            }
            Node::Property(property) => {
                children.push(Node::Type(&property.ty));
                children.push(Node::Identifier(&property.name));
                children.extend(property.default_value().map(Node::Literal));
                children.extend(property.get_function().map(Node::Function));
                children.extend(property.set_function().map(Node::Function));
            }
            Node::State(state) => {
                children.push(Node::Identifier(&state.name));
                children.extend(state.invokables.iter().map(Node::invokable));
            }
            Node::Function(function) => {
                children.extend(function.return_type.as_ref().map(Node::Type));
                children.push(Node::Identifier(&function.name));
                children.extend(function.parameters.iter().map(Node::Parameter));
                children.extend(function.body.iter().flatten().map(Node::statement));
            }
            Node::Event(event) => {
                children.push(Node::Identifier(&event.name));
                children.extend(event.parameters.iter().map(Node::Parameter));
                children.extend(event.body.iter().flatten().map(Node::statement));
            }
            Node::Parameter(parameter) => {
                children.push(Node::Type(&parameter.ty));
                children.push(Node::Identifier(&parameter.name));
                children.extend(parameter.default_value.as_ref().map(Node::Literal));
            }
            Node::Block(block) => children.extend(block.statements.iter().map(Node::statement)),
            Node::Variable(variable) => {
                children.push(Node::Type(&variable.ty));
                children.push(Node::Identifier(&variable.name));
                children.extend(variable.value.as_ref().map(Node::expression));
            }
            Node::Assignment(assignment) => {
                children.push(Node::assignee(&assignment.assignee));
                children.push(Node::expression(&assignment.value));
            }
            Node::Return(ret) => children.extend(ret.value.as_ref().map(Node::expression)),
            Node::If(branch) => {
                for conditional in &branch.branches {
                    children.push(Node::expression(&conditional.condition));
                    children.push(Node::Block(&conditional.block));
                }
                children.extend(branch.else_block.as_ref().map(Node::Block));
            }
            Node::While(looped) => {
                children.push(Node::expression(&looped.condition));
                children.push(Node::Block(&looped.block));
            }
            Node::BinaryOperation(op) => {
                children.push(Node::expression(&op.left));
                children.push(Node::expression(&op.right));
            }
            Node::UnaryOperation(op) => children.push(Node::expression(&op.operand)),
            Node::Cast(cast) => {
                children.push(Node::expression(&cast.expression));
                children.push(Node::Type(&cast.ty));
            }
            Node::ArrayAccess(access) => {
                children.push(Node::expression(&access.array));
                children.push(Node::expression(&access.index));
            }
            Node::ArrayLength(length) => children.push(Node::expression(&length.array)),
            Node::ArrayInitialization(init) => {
                children.push(Node::Type(&init.element_type));
                children.push(Node::ArraySize(&init.size));
            }
            Node::DotAccess(access) => {
                children.push(Node::expression(&access.reference));
                children.push(Node::Identifier(&access.member));
            }
            Node::FunctionCall(call) => {
                children.extend(call.receiver.as_deref().map(Node::expression));
                children.push(Node::Identifier(&call.name));
                children.extend(call.arguments.iter().map(Node::CallArgument));
            }
            Node::CallArgument(argument) => {
                children.extend(argument.name.as_ref().map(Node::Identifier));
                children.push(Node::expression(&argument.value));
            }
            Node::Parenthetical(paren) => children.push(Node::expression(&paren.expression)),
            Node::Type(_) | Node::Identifier(_) | Node::Literal(_) | Node::ArraySize(_) => {}
        }
        children
    }
}

/// Hooks invoked by [`walk`]. Every hook defaults to doing nothing.
pub trait Walker {
    type Error;

    fn enter(&mut self, _node: Node<'_>) -> Result<(), Self::Error> {
        Ok(())
    }

    fn exit(&mut self, _node: Node<'_>) -> Result<(), Self::Error> {
        Ok(())
    }

    fn touch(&mut self, _node: Node<'_>) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Walk `script` depth-first. The first hook error ends the walk.
pub fn walk<W: Walker + ?Sized>(script: &Script, walker: &mut W) -> Result<(), W::Error> {
    visit(Node::Script(script), walker)
}

fn visit<W: Walker + ?Sized>(node: Node<'_>, walker: &mut W) -> Result<(), W::Error> {
    if node.is_leaf() {
        return walker.touch(node);
    }
    walker.enter(node)?;
    for child in node.children() {
        visit(child, walker)?;
    }
    walker.exit(node)
}
