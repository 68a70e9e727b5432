//! AST construction
//!
//! [`build`] converts a parse tree into the immutable AST in one pass and
//! enforces the rules the grammar cannot express: array initializer sizes,
//! a single auto state, property modes and accessor signatures, flag
//! placement, and assignable targets.

use std::sync::Arc;

use crate::frontend::ast::*;
use crate::frontend::cst::{self, Flag, FlagNode};
use crate::utils::{Error, Result, SourceReference, Span};

/// Build the AST for a parsed script
pub fn build(tree: &cst::ScriptTree) -> Result<Script> {
    let mut builder = Builder {
        file: tree.file.clone(),
        auto_state: None,
    };
    builder.script(tree)
}

struct Builder {
    file: Arc<str>,
    /// Name and location of the first `Auto State` seen
    auto_state: Option<(String, SourceReference)>,
}

impl Builder {
    fn reference(&self, span: Span) -> SourceReference {
        SourceReference::new(self.file.clone(), span)
    }

    fn identifier(&self, ident: &cst::Ident) -> Identifier {
        Identifier::new(ident.name.clone(), self.reference(ident.span))
    }

    fn check_flags(&self, flags: &[FlagNode], allowed: &[Flag], context: &'static str) -> Result<()> {
        match flags.iter().find(|f| !allowed.contains(&f.flag)) {
            Some(bad) => Err(Error::InvalidFlag {
                flag: bad.flag.name(),
                context,
                reference: self.reference(bad.span),
            }),
            None => Ok(()),
        }
    }

    // ==================== Script Level ====================

    fn script(&mut self, tree: &cst::ScriptTree) -> Result<Script> {
        let header = self.header(&tree.header)?;
        let declarations = tree
            .declarations
            .iter()
            .map(|d| self.declaration(d))
            .collect::<Result<Vec<_>>>()?;

        Ok(Script {
            id: NodeId::fresh(),
            source: self.reference(tree.span),
            header,
            declarations,
        })
    }

    fn header(&self, node: &cst::HeaderNode) -> Result<Header> {
        self.check_flags(&node.flags, &[Flag::Hidden, Flag::Conditional], "a script header")?;
        Ok(Header {
            source: self.reference(node.span),
            name: self.identifier(&node.name),
            parent: node.parent.as_ref().map(|p| self.identifier(p)),
            is_hidden: cst::has_flag(&node.flags, Flag::Hidden),
            is_conditional: cst::has_flag(&node.flags, Flag::Conditional),
            doc_comment: node.doc.clone(),
        })
    }

    fn declaration(&mut self, node: &cst::DeclarationNode) -> Result<Declaration> {
        let declaration = match node {
            cst::DeclarationNode::Import(import) => Declaration::Import(Import {
                source: self.reference(import.span),
                script: self.identifier(&import.name),
            }),
            cst::DeclarationNode::Variable(variable) => {
                self.check_flags(&variable.flags, &[Flag::Conditional], "a script variable")?;
                Declaration::ScriptVariable(ScriptVariable {
                    source: self.reference(variable.span),
                    ty: self.ty(&variable.ty),
                    name: self.identifier(&variable.name),
                    initial_value: variable.value.as_ref().map(|v| self.literal(v)),
                    is_conditional: cst::has_flag(&variable.flags, Flag::Conditional),
                })
            }
            cst::DeclarationNode::Property(property) => Declaration::Property(self.property(property)?),
            cst::DeclarationNode::State(state) => Declaration::State(self.state(state)?),
            cst::DeclarationNode::Function(function) => Declaration::Function(self.function(function)?),
            cst::DeclarationNode::Event(event) => Declaration::Event(self.event(event)?),
        };
        Ok(declaration)
    }

    fn state(&mut self, node: &cst::StateNode) -> Result<State> {
        let source = self.reference(node.span);
        if node.is_auto {
            if let Some((original_name, original)) = &self.auto_state {
                return Err(Error::MultipleAutoStates {
                    reference: source,
                    original_name: original_name.clone(),
                    original: original.clone(),
                });
            }
            self.auto_state = Some((node.name.name.clone(), source.clone()));
        }

        let invokables = node
            .invokables
            .iter()
            .map(|invokable| match invokable {
                cst::InvokableNode::Function(f) => self.function(f).map(Invokable::Function),
                cst::InvokableNode::Event(e) => self.event(e).map(Invokable::Event),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(State {
            id: NodeId::fresh(),
            source,
            name: self.identifier(&node.name),
            is_auto: node.is_auto,
            invokables,
        })
    }

    fn function(&self, node: &cst::FunctionNode) -> Result<Function> {
        self.check_flags(&node.flags, &[Flag::Global, Flag::Native], "a function")?;
        Ok(Function {
            id: NodeId::fresh(),
            source: self.reference(node.span),
            return_type: node.return_type.as_ref().map(|t| self.ty(t)),
            name: self.identifier(&node.name),
            parameters: node.params.iter().map(|p| self.parameter(p)).collect(),
            body: self.body(node.body.as_deref())?,
            doc_comment: node.doc.clone(),
            is_global: cst::has_flag(&node.flags, Flag::Global),
        })
    }

    fn event(&self, node: &cst::EventNode) -> Result<Event> {
        self.check_flags(&node.flags, &[Flag::Native], "an event")?;
        Ok(Event {
            id: NodeId::fresh(),
            source: self.reference(node.span),
            name: self.identifier(&node.name),
            parameters: node.params.iter().map(|p| self.parameter(p)).collect(),
            body: self.body(node.body.as_deref())?,
            doc_comment: node.doc.clone(),
        })
    }

    fn body(&self, statements: Option<&[cst::StatementNode]>) -> Result<Option<Vec<Statement>>> {
        statements
            .map(|statements| statements.iter().map(|s| self.statement(s)).collect())
            .transpose()
    }

    fn parameter(&self, node: &cst::ParamNode) -> Parameter {
        Parameter {
            source: self.reference(node.span),
            ty: self.ty(&node.ty),
            name: self.identifier(&node.name),
            default_value: node.default.as_ref().map(|d| self.literal(d)),
        }
    }

    // ==================== Properties ====================

    fn property(&self, node: &cst::PropertyNode) -> Result<Property> {
        self.check_flags(
            &node.flags,
            &[Flag::Hidden, Flag::Conditional, Flag::Auto, Flag::AutoReadOnly],
            "a property",
        )?;
        let source = self.reference(node.span);
        let ty = self.ty(&node.ty);
        let name = self.identifier(&node.name);
        let is_auto = cst::has_flag(&node.flags, Flag::Auto);
        let is_auto_read_only = cst::has_flag(&node.flags, Flag::AutoReadOnly);
        let is_conditional = cst::has_flag(&node.flags, Flag::Conditional);

        let invalid = |message: &str| Error::InvalidProperty {
            name: node.name.name.clone(),
            message: message.to_string(),
            reference: source.clone(),
        };

        let kind = match (is_auto, is_auto_read_only) {
            (true, true) => return Err(invalid("cannot be both Auto and AutoReadOnly")),
            (true, false) => {
                if !node.functions.is_empty() {
                    return Err(invalid("Auto properties cannot have Get or Set functions"));
                }
                PropertyKind::Auto {
                    default: node.value.as_ref().map(|v| self.literal(v)),
                }
            }
            (false, true) => {
                if !node.functions.is_empty() {
                    return Err(invalid("AutoReadOnly properties cannot have Get or Set functions"));
                }
                if is_conditional {
                    return Err(invalid("AutoReadOnly properties cannot be Conditional"));
                }
                let default = node
                    .value
                    .as_ref()
                    .map(|v| self.literal(v))
                    .ok_or_else(|| invalid("AutoReadOnly properties must have a default value"))?;
                PropertyKind::AutoReadOnly { default }
            }
            (false, false) => {
                if node.value.is_some() {
                    return Err(invalid("only Auto and AutoReadOnly properties can have a default value"));
                }
                if is_conditional {
                    return Err(invalid("only Auto properties can be Conditional"));
                }
                if node.functions.is_empty() {
                    return Err(invalid("full properties must have a Get or Set function"));
                }
                self.accessors(&node.functions, &ty)?
            }
        };

        Ok(Property {
            source,
            ty,
            name,
            kind,
            doc_comment: node.doc.clone(),
            is_hidden: cst::has_flag(&node.flags, Flag::Hidden),
            is_conditional,
        })
    }

    fn accessors(&self, functions: &[cst::FunctionNode], property_type: &Type) -> Result<PropertyKind> {
        let mut get = None;
        let mut set = None;

        for node in functions {
            self.check_flags(&node.flags, &[], "a property function")?;
            let function = self.function(node)?;
            let reference = function.source.clone();
            let invalid = |message: String| Error::InvalidAccessor {
                message,
                reference: reference.clone(),
            };

            if function.name.is_equivalent("Get") {
                if get.is_some() {
                    return Err(Error::DuplicateAccessor { accessor: "get", reference });
                }
                if !function.parameters.is_empty() {
                    return Err(invalid("Get function cannot have parameters".to_string()));
                }
                match &function.return_type {
                    Some(ty) if ty.is_equivalent(property_type) => {}
                    _ => {
                        return Err(invalid(format!(
                            "Get function must return the property type {}",
                            property_type
                        )))
                    }
                }
                get = Some(function);
            } else if function.name.is_equivalent("Set") {
                if set.is_some() {
                    return Err(Error::DuplicateAccessor { accessor: "set", reference });
                }
                if function.return_type.is_some() {
                    return Err(invalid("Set function cannot return a value".to_string()));
                }
                match function.parameters.as_slice() {
                    [parameter] if parameter.ty.is_equivalent(property_type) => {}
                    _ => {
                        return Err(invalid(format!(
                            "Set function must take exactly one parameter of type {}",
                            property_type
                        )))
                    }
                }
                set = Some(function);
            } else {
                return Err(invalid(
                    "Property function must be named \"Get\" or \"Set\"".to_string(),
                ));
            }
        }

        Ok(PropertyKind::Full { get, set })
    }

    // ==================== Statements ====================

    fn statement(&self, node: &cst::StatementNode) -> Result<Statement> {
        let statement = match node {
            cst::StatementNode::Expression(e) => Statement::Expression(self.expression(e)?),
            cst::StatementNode::Variable(local) => Statement::Variable(Variable {
                source: self.reference(local.span),
                ty: self.ty(&local.ty),
                name: self.identifier(&local.name),
                value: local.value.as_ref().map(|v| self.expression(v)).transpose()?,
            }),
            cst::StatementNode::Assignment(assignment) => {
                let assignee = match self.expression(&assignment.target)? {
                    Expression::Identifier(i) => Assignee::Identifier(i),
                    Expression::DotAccess(d) => Assignee::DotAccess(d),
                    Expression::ArrayAccess(a) => Assignee::ArrayAccess(a),
                    other => {
                        return Err(Error::InvalidAssignee {
                            reference: other.source().clone(),
                        })
                    }
                };
                Statement::Assignment(Assignment {
                    source: self.reference(assignment.span),
                    assignee,
                    operator: assignment.operator,
                    value: self.expression(&assignment.value)?,
                })
            }
            cst::StatementNode::Return(ret) => Statement::Return(Return {
                source: self.reference(ret.span),
                value: ret.value.as_ref().map(|v| self.expression(v)).transpose()?,
            }),
            cst::StatementNode::If(node) => {
                let branches = node
                    .branches
                    .iter()
                    .map(|(condition, block)| {
                        Ok(ConditionalBlock {
                            condition: self.expression(condition)?,
                            block: self.block(block)?,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Statement::If(If {
                    source: self.reference(node.span),
                    branches,
                    else_block: node.else_block.as_ref().map(|b| self.block(b)).transpose()?,
                })
            }
            cst::StatementNode::While(node) => Statement::While(While {
                source: self.reference(node.span),
                condition: self.expression(&node.condition)?,
                block: self.block(&node.body)?,
            }),
        };
        Ok(statement)
    }

    fn block(&self, node: &cst::BlockNode) -> Result<Block> {
        Ok(Block {
            id: NodeId::fresh(),
            source: self.reference(node.span),
            statements: node
                .statements
                .iter()
                .map(|s| self.statement(s))
                .collect::<Result<Vec<_>>>()?,
        })
    }

    // ==================== Expressions ====================

    fn expression(&self, node: &cst::ExprNode) -> Result<Expression> {
        let source = self.reference(node.span);
        let boxed = |e: &cst::ExprNode| self.expression(e).map(Box::new);

        let expression = match &node.kind {
            cst::ExprKind::Literal(kind) => Expression::Literal(self.literal_kind(kind, source)),
            cst::ExprKind::Ident(name) => Expression::Identifier(Identifier::new(name.clone(), source)),
            cst::ExprKind::Binary { operator, left, right } => {
                Expression::BinaryOperation(BinaryOperation {
                    source,
                    operator: *operator,
                    left: boxed(left)?,
                    right: boxed(right)?,
                })
            }
            cst::ExprKind::Unary { operator, operand } => Expression::UnaryOperation(UnaryOperation {
                source,
                operator: *operator,
                operand: boxed(operand)?,
            }),
            cst::ExprKind::Cast { expression, ty } => Expression::Cast(Cast {
                source,
                expression: boxed(expression)?,
                ty: self.ty(ty),
            }),
            cst::ExprKind::Index { array, index } => Expression::ArrayAccess(ArrayAccess {
                source,
                array: boxed(array)?,
                index: boxed(index)?,
            }),
            cst::ExprKind::Length { array } => Expression::ArrayLength(ArrayLength {
                source,
                array: boxed(array)?,
            }),
            cst::ExprKind::NewArray { element, size } => {
                let size_text = match &size.kind {
                    cst::LiteralKind::Int(text) => text.as_str(),
                    _ => "",
                };
                let size = IntegerLiteral::parse(size_text, self.reference(size.span));
                if size.value > MAX_ARRAY_SIZE {
                    return Err(Error::ArraySizeTooLarge {
                        size: size.value,
                        reference: size.source,
                    });
                }
                Expression::ArrayInitialization(ArrayInitialization {
                    source,
                    element_type: self.ty(element),
                    size,
                })
            }
            cst::ExprKind::Member { object, name } => Expression::DotAccess(DotAccess {
                source,
                reference: boxed(object)?,
                member: self.identifier(name),
            }),
            cst::ExprKind::Call { receiver, name, args } => Expression::FunctionCall(FunctionCall {
                source,
                receiver: receiver.as_deref().map(boxed).transpose()?,
                name: self.identifier(name),
                arguments: args
                    .iter()
                    .map(|arg| {
                        Ok(CallArgument {
                            source: self.reference(arg.span),
                            name: arg.name.as_ref().map(|n| self.identifier(n)),
                            value: self.expression(&arg.value)?,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?,
            }),
            cst::ExprKind::Paren(inner) => Expression::Parenthetical(Parenthetical {
                source,
                expression: boxed(inner)?,
            }),
        };
        Ok(expression)
    }

    // ==================== Types and Literals ====================

    fn ty(&self, node: &cst::TypeNode) -> Type {
        let source = self.reference(node.span);
        let primitive = match &node.base {
            cst::BaseTypeNode::Bool => Primitive::Bool,
            cst::BaseTypeNode::Int => Primitive::Int,
            cst::BaseTypeNode::Float => Primitive::Float,
            cst::BaseTypeNode::String => Primitive::String,
            cst::BaseTypeNode::Object(script) => {
                return Type::object(self.identifier(script), node.is_array, source)
            }
        };
        Type::primitive(primitive, node.is_array, source)
    }

    fn literal(&self, node: &cst::LiteralNode) -> Literal {
        self.literal_kind(&node.kind, self.reference(node.span))
    }

    fn literal_kind(&self, kind: &cst::LiteralKind, source: SourceReference) -> Literal {
        match kind {
            cst::LiteralKind::Bool(value) => Literal::Boolean(BooleanLiteral { source, value: *value }),
            cst::LiteralKind::Int(text) => Literal::Integer(IntegerLiteral::parse(text, source)),
            cst::LiteralKind::Float(value) => Literal::Float(FloatLiteral { source, value: *value }),
            cst::LiteralKind::String(value) => Literal::String(StringLiteral {
                source,
                value: value.clone(),
            }),
            cst::LiteralKind::None => object_literal(ObjectValue::None, source),
            cst::LiteralKind::SelfRef => object_literal(ObjectValue::SelfRef, source),
            cst::LiteralKind::Parent => object_literal(ObjectValue::Parent, source),
        }
    }
}

fn object_literal(value: ObjectValue, source: SourceReference) -> Literal {
    Literal::Object(ObjectLiteral { source, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parse_script;
    use crate::types::DataType;
    use crate::utils::ErrorCategory;
    use pretty_assertions::assert_eq;

    fn script(body: &str) -> Result<Script> {
        parse_script(&format!("ScriptName Test\n{}", body))
    }

    fn function_body(script: &Script) -> &[Statement] {
        match &script.declarations[0] {
            Declaration::Function(f) => f.body.as_deref().unwrap_or(&[]),
            other => panic!("expected function, got {:?}", other),
        }
    }

    fn property(script: &Script) -> &Property {
        match &script.declarations[0] {
            Declaration::Property(p) => p,
            other => panic!("expected property, got {:?}", other),
        }
    }

    #[test]
    fn test_array_size_limit() {
        let ok = script("Function Make()\n  Int[] a = new Int[128]\nEndFunction\n").expect("build");
        match &function_body(&ok)[0] {
            Statement::Variable(v) => match &v.value {
                Some(Expression::ArrayInitialization(init)) => {
                    assert_eq!(init.size.value, 128);
                    assert_eq!(init.element_type.data_type(), DataType::Int);
                }
                other => panic!("expected array initialization, got {:?}", other),
            },
            other => panic!("expected variable, got {:?}", other),
        }

        let err = script("Function Make()\n  Int[] a = new Int[129]\nEndFunction\n").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Syntax);
        match err {
            Error::ArraySizeTooLarge { size, reference } => {
                assert_eq!(size, 129);
                assert_eq!(reference.text(), "129");
                assert_eq!((reference.line(), reference.column()), (3, 21));
            }
            other => panic!("expected ArraySizeTooLarge, got {:?}", other),
        }
    }

    #[test]
    fn test_huge_array_size_is_clamped_then_rejected() {
        let err = script("Function Make()\n  Int[] a = new Int[99999999999]\nEndFunction\n").unwrap_err();
        assert!(matches!(err, Error::ArraySizeTooLarge { size, .. } if size == i32::MAX));
    }

    #[test]
    fn test_multiple_auto_states() {
        let source = "Auto State One\nEndState\nState Two\nEndState\nAuto State Three\nEndState\n";
        let err = script(source).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Syntax);
        match err {
            Error::MultipleAutoStates { reference, original_name, original } => {
                assert_eq!(original_name, "One");
                assert_eq!(original.line(), 2);
                assert_eq!(reference.line(), 6);
            }
            other => panic!("expected MultipleAutoStates, got {:?}", other),
        }
    }

    #[test]
    fn test_single_auto_state() {
        let built = script("Auto State One\nEndState\nState Two\nEndState\n").expect("build");
        let autos: Vec<bool> = built
            .declarations
            .iter()
            .filter_map(|d| match d {
                Declaration::State(s) => Some(s.is_auto),
                _ => None,
            })
            .collect();
        assert_eq!(autos, vec![true, false]);
    }

    #[test]
    fn test_property_modes() {
        let auto = script("Int Property Count = 3 Auto Conditional Hidden\n").expect("build");
        let p = property(&auto);
        assert!(matches!(p.kind, PropertyKind::Auto { default: Some(_) }));
        assert!(p.is_conditional && p.is_hidden);

        let read_only = script("Float Property Rate = 1.5 AutoReadOnly\n").expect("build");
        assert!(matches!(property(&read_only).kind, PropertyKind::AutoReadOnly { .. }));

        let full = script(
            "Int Property Count\n  Int Function get()\n    Return 1\n  EndFunction\n  Function SET(Int value)\n  EndFunction\nEndProperty\n",
        )
        .expect("build");
        let p = property(&full);
        assert!(p.get_function().is_some());
        assert!(p.set_function().is_some());
        assert!(p.default_value().is_none());
    }

    #[test]
    fn test_contradictory_properties() {
        let cases = [
            "Int Property A Auto AutoReadOnly\n",
            "Int Property A AutoReadOnly\n",
            "Int Property A = 1 AutoReadOnly Conditional\n",
            "Int Property A Auto\n  Function Set(Int v)\n  EndFunction\nEndProperty\n",
            "Int Property A = 1\n  Int Function Get()\n  EndFunction\nEndProperty\n",
            "Int Property A Conditional\n  Int Function Get()\n  EndFunction\nEndProperty\n",
            "Int Property A\nEndProperty\n",
        ];
        for case in cases {
            let err = script(case).unwrap_err();
            assert!(
                matches!(err, Error::InvalidProperty { .. }),
                "{} gave {:?}",
                case,
                err
            );
        }
    }

    #[test]
    fn test_accessor_validation() {
        let misnamed = script("Int Property A\n  Int Function Fetch()\n  EndFunction\nEndProperty\n").unwrap_err();
        assert_eq!(
            misnamed.to_string(),
            "Property function must be named \"Get\" or \"Set\""
        );

        let twice = script(
            "Int Property A\n  Int Function Get()\n  EndFunction\n  Int Function Get()\n  EndFunction\nEndProperty\n",
        )
        .unwrap_err();
        assert!(matches!(twice, Error::DuplicateAccessor { accessor: "get", ref reference } if reference.line() == 5));

        let bad_get = script("Int Property A\n  Float Function Get()\n  EndFunction\nEndProperty\n").unwrap_err();
        assert!(matches!(bad_get, Error::InvalidAccessor { .. }));

        let get_with_params = script("Int Property A\n  Int Function Get(Int x)\n  EndFunction\nEndProperty\n").unwrap_err();
        assert!(matches!(get_with_params, Error::InvalidAccessor { .. }));

        let bad_set = script("Actor Property A\n  Function Set(ObjectReference v)\n  EndFunction\nEndProperty\n").unwrap_err();
        assert!(matches!(bad_set, Error::InvalidAccessor { .. }));

        let set_returns = script("Int Property A\n  Int Function Set(Int v)\n  EndFunction\nEndProperty\n").unwrap_err();
        assert!(matches!(set_returns, Error::InvalidAccessor { .. }));

        let global = script("Int Property A\n  Int Function Get() Global\n  EndFunction\nEndProperty\n").unwrap_err();
        assert!(matches!(global, Error::InvalidFlag { flag: "Global", .. }));
    }

    #[test]
    fn test_object_typed_accessors_compare_case_insensitively() {
        let built = script("Actor Property Target\n  actor Function Get()\n  EndFunction\nEndProperty\n").expect("build");
        assert!(property(&built).get_function().is_some());
    }

    #[test]
    fn test_flag_placement() {
        let err = script("Int x Hidden\n").unwrap_err();
        assert!(matches!(err, Error::InvalidFlag { flag: "Hidden", context: "a script variable", .. }));

        let err = script("Event OnInit() Global\nEndEvent\n").unwrap_err();
        assert!(matches!(err, Error::InvalidFlag { flag: "Global", .. }));
    }

    #[test]
    fn test_invalid_assignee() {
        let err = script("Function F()\n  GetActor() = None\nEndFunction\n").unwrap_err();
        match err {
            Error::InvalidAssignee { reference } => assert_eq!(reference.text(), "GetActor()"),
            other => panic!("expected InvalidAssignee, got {:?}", other),
        }
    }

    #[test]
    fn test_assignees() {
        let built = script("Function F()\n  x = 1\n  a.b = 2\n  arr[0] *= 3\nEndFunction\n").expect("build");
        let body = function_body(&built);
        assert!(matches!(body[0], Statement::Assignment(Assignment { assignee: Assignee::Identifier(_), .. })));
        assert!(matches!(body[1], Statement::Assignment(Assignment { assignee: Assignee::DotAccess(_), .. })));
        assert!(matches!(
            body[2],
            Statement::Assignment(Assignment {
                assignee: Assignee::ArrayAccess(_),
                operator: AssignmentOperator::Multiply,
                ..
            })
        ));
    }

    #[test]
    fn test_literals() {
        let built = script("Int big = 3000000000\nBool flag = true\nActor who = None\nString s = \"hi\"\n").expect("build");
        let values: Vec<&Literal> = built
            .declarations
            .iter()
            .filter_map(|d| match d {
                Declaration::ScriptVariable(v) => v.initial_value.as_ref(),
                _ => None,
            })
            .collect();
        assert!(matches!(values[0], Literal::Integer(IntegerLiteral { value: i32::MAX, out_of_range: true, .. })));
        assert!(matches!(values[1], Literal::Boolean(BooleanLiteral { value: true, .. })));
        assert!(matches!(values[2], Literal::Object(ObjectLiteral { value: ObjectValue::None, .. })));
        assert!(matches!(values[3], Literal::String(StringLiteral { ref value, .. }) if value == "hi"));
    }

    #[test]
    fn test_negative_literal_in_body_matches_default() {
        let built = script("Int a = -2147483648\nFunction F()\n  Int b = -2147483648\nEndFunction\n").expect("build");
        match &built.declarations[0] {
            Declaration::ScriptVariable(v) => assert!(matches!(
                v.initial_value,
                Some(Literal::Integer(IntegerLiteral { value: i32::MIN, out_of_range: false, .. }))
            )),
            other => panic!("expected variable, got {:?}", other),
        }
        let body = match &built.declarations[1] {
            Declaration::Function(f) => f.body.as_deref().unwrap_or(&[]),
            other => panic!("expected function, got {:?}", other),
        };
        match &body[0] {
            Statement::Variable(v) => match &v.value {
                Some(Expression::Literal(Literal::Integer(literal))) => {
                    assert_eq!((literal.value, literal.out_of_range), (i32::MIN, false));
                    assert_eq!(literal.source.text(), "-2147483648");
                }
                other => panic!("expected integer literal, got {:?}", other),
            },
            other => panic!("expected variable, got {:?}", other),
        }
    }

    #[test]
    fn test_header_and_sources() {
        let built = parse_script("ScriptName Foo extends Quest Conditional\n{Docs}\nInt x\n").expect("build");
        assert_eq!(built.name().name(), "Foo");
        assert_eq!(built.header.parent.as_ref().map(Identifier::name), Some("Quest"));
        assert!(built.header.is_conditional);
        assert_eq!(built.header.doc_comment.as_deref(), Some("Docs"));
        assert_eq!(built.header.source.text(), "ScriptName Foo extends Quest Conditional");
        match &built.declarations[0] {
            Declaration::ScriptVariable(v) => assert_eq!(v.source.text(), "Int x"),
            other => panic!("expected variable, got {:?}", other),
        }
    }

    #[test]
    fn test_native_invokables_have_no_body() {
        let built = script("Function F() Native Global\nEvent OnLoad() Native\n").expect("build");
        match (&built.declarations[0], &built.declarations[1]) {
            (Declaration::Function(f), Declaration::Event(e)) => {
                assert!(f.is_native() && f.is_global);
                assert!(e.is_native());
            }
            other => panic!("unexpected declarations {:?}", other),
        }
    }

    #[test]
    fn test_scope_nodes_get_distinct_ids() {
        let built = script("Function F()\n  If true\n  Else\n  EndIf\nEndFunction\n").expect("build");
        let function = match &built.declarations[0] {
            Declaration::Function(f) => f,
            other => panic!("expected function, got {:?}", other),
        };
        let branch = match &function_body(&built)[0] {
            Statement::If(i) => i,
            other => panic!("expected if, got {:?}", other),
        };
        let else_block = branch.else_block.as_ref().expect("else");
        let ids = [built.id, function.id, branch.branches[0].block.id, else_block.id];
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
