//! Parser for Papyrus
//!
//! Recursive descent for declarations and statements, precedence climbing for
//! binary expressions. Produces a [`ScriptTree`]; context-sensitive rules are
//! checked later by the AST builder.

use std::sync::Arc;

use crate::frontend::ast::{AssignmentOperator, BinaryOperator, UnaryOperator};
use crate::frontend::cst::*;
use crate::frontend::lexer::Lexer;
use crate::frontend::token::{Token, TokenKind};
use crate::utils::{Error, Result, Span};

/// The parser
pub struct Parser {
    file: Arc<str>,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Create a new parser from a lexer
    pub fn new(mut lexer: Lexer) -> Result<Self> {
        let tokens = lexer.tokenize()?;
        Ok(Self {
            file: Arc::from(lexer.text()),
            tokens,
            pos: 0,
        })
    }

    // ==================== Helper Methods ====================

    fn current(&self) -> &Token {
        // tokenize always ends the stream with Eof
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn peek_kind(&self, n: usize) -> &TokenKind {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + n).min(last)].kind
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    fn error(&self, expected: &str) -> Error {
        Error::UnexpectedToken {
            expected: expected.to_string(),
            got: format!("{:?}", self.current_kind()),
            span: self.current().span,
        }
    }

    fn expect(&mut self, expected: TokenKind) -> Result<Token> {
        if self.check(&expected) {
            Ok(self.advance())
        } else {
            Err(self.error(&format!("{:?}", expected)))
        }
    }

    fn consume(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Span of the last consumed token that is not a line break or comment
    fn previous_span(&self) -> Span {
        self.tokens[..self.pos]
            .iter()
            .rev()
            .find(|t| !matches!(t.kind, TokenKind::Newline | TokenKind::DocComment(_)))
            .map_or(self.current().span, |t| t.span)
    }

    fn span_from(&self, start: Span) -> Span {
        start.merge(&self.previous_span())
    }

    /// Skip blank lines and documentation comments in positions that take none
    fn skip_newlines(&mut self) {
        while matches!(self.current_kind(), TokenKind::Newline | TokenKind::DocComment(_)) {
            self.advance();
        }
    }

    fn at_line_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Newline | TokenKind::Eof)
    }

    fn expect_line_end(&mut self) -> Result<()> {
        if self.is_at_end() || self.consume(&TokenKind::Newline) {
            Ok(())
        } else {
            Err(self.error("end of line"))
        }
    }

    /// End a declaration header line, picking up a documentation comment
    /// written either on the same line or on the lines that follow
    fn parse_line_end_with_doc(&mut self) -> Result<Option<String>> {
        if let TokenKind::DocComment(doc) = self.current_kind().clone() {
            self.advance();
            self.expect_line_end()?;
            return Ok(Some(doc));
        }
        self.expect_line_end()?;

        let mut ahead = 0;
        while matches!(self.peek_kind(ahead), TokenKind::Newline) {
            ahead += 1;
        }
        if let TokenKind::DocComment(doc) = self.peek_kind(ahead).clone() {
            self.pos += ahead + 1;
            return Ok(Some(doc));
        }
        Ok(None)
    }

    // ==================== Parsing Methods ====================

    /// Parse a complete script
    pub fn parse_script(&mut self) -> Result<ScriptTree> {
        self.skip_newlines();
        let header = self.parse_header()?;

        let mut declarations = Vec::new();
        loop {
            self.skip_newlines();
            if self.is_at_end() {
                break;
            }
            declarations.push(self.parse_declaration()?);
        }

        let end = self.file.len();
        Ok(ScriptTree {
            file: self.file.clone(),
            span: Span::new(0, end, 1, 1),
            header,
            declarations,
        })
    }

    fn parse_header(&mut self) -> Result<HeaderNode> {
        let start = self.expect(TokenKind::ScriptName)?.span;
        let name = self.parse_ident()?;
        let parent = if self.consume(&TokenKind::Extends) {
            Some(self.parse_ident()?)
        } else {
            None
        };
        let flags = self.parse_flags();
        let span = self.span_from(start);
        let doc = self.parse_line_end_with_doc()?;

        Ok(HeaderNode { span, name, parent, flags, doc })
    }

    fn parse_flags(&mut self) -> Vec<FlagNode> {
        let mut flags = Vec::new();
        loop {
            let flag = match self.current_kind() {
                TokenKind::Hidden => Flag::Hidden,
                TokenKind::Conditional => Flag::Conditional,
                TokenKind::Global => Flag::Global,
                TokenKind::Native => Flag::Native,
                TokenKind::Auto => Flag::Auto,
                TokenKind::AutoReadOnly => Flag::AutoReadOnly,
                _ => break,
            };
            let span = self.advance().span;
            flags.push(FlagNode { flag, span });
        }
        flags
    }

    fn parse_ident(&mut self) -> Result<Ident> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Ident { name, span: token.span })
            }
            _ => Err(self.error("identifier")),
        }
    }

    fn parse_declaration(&mut self) -> Result<DeclarationNode> {
        match self.current_kind() {
            TokenKind::Import => {
                let start = self.advance().span;
                let name = self.parse_ident()?;
                let span = self.span_from(start);
                self.expect_line_end()?;
                Ok(DeclarationNode::Import(ImportNode { span, name }))
            }
            TokenKind::Auto => {
                let start = self.advance().span;
                Ok(DeclarationNode::State(self.parse_state(start, true)?))
            }
            TokenKind::State => {
                let start = self.current().span;
                Ok(DeclarationNode::State(self.parse_state(start, false)?))
            }
            TokenKind::Event => Ok(DeclarationNode::Event(self.parse_event()?)),
            TokenKind::Function => Ok(DeclarationNode::Function(self.parse_function(None)?)),
            kind if kind.starts_type() => {
                let ty = self.parse_type()?;
                match self.current_kind() {
                    TokenKind::Function => {
                        Ok(DeclarationNode::Function(self.parse_function(Some(ty))?))
                    }
                    TokenKind::Property => Ok(DeclarationNode::Property(self.parse_property(ty)?)),
                    TokenKind::Ident(_) => {
                        Ok(DeclarationNode::Variable(self.parse_script_variable(ty)?))
                    }
                    _ => Err(self.error("Function, Property or variable name")),
                }
            }
            _ => Err(self.error("declaration")),
        }
    }

    fn parse_script_variable(&mut self, ty: TypeNode) -> Result<ScriptVariableNode> {
        let start = ty.span;
        let name = self.parse_ident()?;
        let value = if self.consume(&TokenKind::Eq) {
            Some(self.parse_literal()?)
        } else {
            None
        };
        let flags = self.parse_flags();
        let span = self.span_from(start);
        self.expect_line_end()?;

        Ok(ScriptVariableNode { span, ty, name, value, flags })
    }

    fn parse_property(&mut self, ty: TypeNode) -> Result<PropertyNode> {
        let start = ty.span;
        self.expect(TokenKind::Property)?;
        let name = self.parse_ident()?;
        let value = if self.consume(&TokenKind::Eq) {
            Some(self.parse_literal()?)
        } else {
            None
        };
        let flags = self.parse_flags();
        let mut span = self.span_from(start);
        let doc = self.parse_line_end_with_doc()?;

        let is_auto = has_flag(&flags, Flag::Auto) || has_flag(&flags, Flag::AutoReadOnly);
        let mut functions = Vec::new();
        if !is_auto || self.has_property_body() {
            loop {
                self.skip_newlines();
                if self.check(&TokenKind::EndProperty) || self.is_at_end() {
                    break;
                }
                let return_type = if self.check(&TokenKind::Function) {
                    None
                } else if self.current_kind().starts_type() {
                    Some(self.parse_type()?)
                } else {
                    return Err(self.error("Function or EndProperty"));
                };
                functions.push(self.parse_function(return_type)?);
            }
            self.expect(TokenKind::EndProperty)?;
            span = self.span_from(start);
            self.expect_line_end()?;
        }

        Ok(PropertyNode { span, ty, name, value, flags, doc, functions })
    }

    /// Whether an `EndProperty` closes the current property before anything
    /// that could only start another script-level declaration
    fn has_property_body(&self) -> bool {
        self.tokens[self.pos..]
            .iter()
            .find(|t| {
                matches!(
                    t.kind,
                    TokenKind::EndProperty
                        | TokenKind::Property
                        | TokenKind::State
                        | TokenKind::EndState
                        | TokenKind::Event
                        | TokenKind::Import
                        | TokenKind::ScriptName
                        | TokenKind::Eof
                )
            })
            .map_or(false, |t| t.kind == TokenKind::EndProperty)
    }

    fn parse_state(&mut self, start: Span, is_auto: bool) -> Result<StateNode> {
        self.expect(TokenKind::State)?;
        let name = self.parse_ident()?;
        self.expect_line_end()?;

        let mut invokables = Vec::new();
        loop {
            self.skip_newlines();
            match self.current_kind() {
                TokenKind::EndState | TokenKind::Eof => break,
                TokenKind::Event => invokables.push(InvokableNode::Event(self.parse_event()?)),
                TokenKind::Function => {
                    invokables.push(InvokableNode::Function(self.parse_function(None)?))
                }
                kind if kind.starts_type() => {
                    let ty = self.parse_type()?;
                    invokables.push(InvokableNode::Function(self.parse_function(Some(ty))?));
                }
                _ => return Err(self.error("Function, Event or EndState")),
            }
        }
        self.expect(TokenKind::EndState)?;
        let span = self.span_from(start);
        self.expect_line_end()?;

        Ok(StateNode { span, is_auto, name, invokables })
    }

    fn parse_function(&mut self, return_type: Option<TypeNode>) -> Result<FunctionNode> {
        let start = return_type.as_ref().map_or(self.current().span, |t| t.span);
        self.expect(TokenKind::Function)?;
        let name = self.parse_ident()?;
        let params = self.parse_params()?;
        let flags = self.parse_flags();
        let mut span = self.span_from(start);
        let doc = self.parse_line_end_with_doc()?;

        let body = if has_flag(&flags, Flag::Native) {
            None
        } else {
            let statements = self.parse_statements(&[TokenKind::EndFunction])?;
            self.expect(TokenKind::EndFunction)?;
            span = self.span_from(start);
            self.expect_line_end()?;
            Some(statements)
        };

        Ok(FunctionNode { span, return_type, name, params, flags, doc, body })
    }

    fn parse_event(&mut self) -> Result<EventNode> {
        let start = self.expect(TokenKind::Event)?.span;
        let name = self.parse_ident()?;
        let params = self.parse_params()?;
        let flags = self.parse_flags();
        let mut span = self.span_from(start);
        let doc = self.parse_line_end_with_doc()?;

        let body = if has_flag(&flags, Flag::Native) {
            None
        } else {
            let statements = self.parse_statements(&[TokenKind::EndEvent])?;
            self.expect(TokenKind::EndEvent)?;
            span = self.span_from(start);
            self.expect_line_end()?;
            Some(statements)
        };

        Ok(EventNode { span, name, params, flags, doc, body })
    }

    fn parse_params(&mut self) -> Result<Vec<ParamNode>> {
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();

        while !self.check(&TokenKind::RParen) && !self.is_at_end() {
            params.push(self.parse_param()?);
            if !self.consume(&TokenKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::RParen)?;
        Ok(params)
    }

    fn parse_param(&mut self) -> Result<ParamNode> {
        let ty = self.parse_type()?;
        let name = self.parse_ident()?;
        let default = if self.consume(&TokenKind::Eq) {
            Some(self.parse_literal()?)
        } else {
            None
        };

        Ok(ParamNode {
            span: self.span_from(ty.span),
            ty,
            name,
            default,
        })
    }

    fn parse_base_type(&mut self) -> Result<BaseTypeNode> {
        let base = match self.current_kind() {
            TokenKind::Bool => BaseTypeNode::Bool,
            TokenKind::Int => BaseTypeNode::Int,
            TokenKind::Float => BaseTypeNode::Float,
            TokenKind::String => BaseTypeNode::String,
            TokenKind::Ident(_) => return Ok(BaseTypeNode::Object(self.parse_ident()?)),
            _ => return Err(self.error("type")),
        };
        self.advance();
        Ok(base)
    }

    fn parse_type(&mut self) -> Result<TypeNode> {
        let start = self.current().span;
        let base = self.parse_base_type()?;

        let is_array = self.check(&TokenKind::LBracket)
            && matches!(self.peek_kind(1), TokenKind::RBracket);
        if is_array {
            self.advance();
            self.advance();
        }

        Ok(TypeNode {
            span: self.span_from(start),
            base,
            is_array,
        })
    }

    /// A literal in a declaration default; a leading `-` folds into numbers
    fn parse_literal(&mut self) -> Result<LiteralNode> {
        let start = self.current().span;
        let negative = self.consume(&TokenKind::Minus);

        let kind = match (self.current_kind().clone(), negative) {
            (TokenKind::IntLit(text), true) => LiteralKind::Int(format!("-{}", text)),
            (TokenKind::IntLit(text), false) => LiteralKind::Int(text),
            (TokenKind::FloatLit(value), true) => LiteralKind::Float(-value),
            (TokenKind::FloatLit(value), false) => LiteralKind::Float(value),
            (TokenKind::True, false) => LiteralKind::Bool(true),
            (TokenKind::False, false) => LiteralKind::Bool(false),
            (TokenKind::None, false) => LiteralKind::None,
            (TokenKind::StringLit(value), false) => LiteralKind::String(value),
            _ => return Err(self.error("literal")),
        };
        self.advance();

        Ok(LiteralNode { span: self.span_from(start), kind })
    }

    // ==================== Statements ====================

    /// Parse statements until one of `terminators`, which is left unconsumed
    fn parse_statements(&mut self, terminators: &[TokenKind]) -> Result<Vec<StatementNode>> {
        let mut statements = Vec::new();
        loop {
            self.skip_newlines();
            if terminators.iter().any(|t| self.check(t)) {
                break;
            }
            if self.is_at_end() {
                let expected: Vec<String> = terminators.iter().map(|t| format!("{:?}", t)).collect();
                return Err(self.error(&expected.join(" or ")));
            }
            statements.push(self.parse_statement()?);
        }
        Ok(statements)
    }

    fn parse_block(&mut self, terminators: &[TokenKind]) -> Result<BlockNode> {
        self.skip_newlines();
        let start = self.current().span;
        let statements = self.parse_statements(terminators)?;
        let span = if statements.is_empty() {
            Span::new(start.start, start.start, start.line, start.column)
        } else {
            self.span_from(start)
        };
        Ok(BlockNode { span, statements })
    }

    fn parse_statement(&mut self) -> Result<StatementNode> {
        let start = self.current().span;
        let statement = match self.current_kind() {
            TokenKind::Return => {
                self.advance();
                let value = if self.at_line_end() {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                StatementNode::Return(ReturnNode {
                    span: self.span_from(start),
                    value,
                })
            }
            TokenKind::If => StatementNode::If(self.parse_if()?),
            TokenKind::While => StatementNode::While(self.parse_while()?),
            _ if self.is_local_declaration() => {
                let ty = self.parse_type()?;
                let name = self.parse_ident()?;
                let value = if self.consume(&TokenKind::Eq) {
                    Some(self.parse_expression()?)
                } else {
                    None
                };
                StatementNode::Variable(LocalNode {
                    span: self.span_from(start),
                    ty,
                    name,
                    value,
                })
            }
            _ => {
                let target = self.parse_expression()?;
                match assignment_operator(self.current_kind()) {
                    Some(operator) => {
                        self.advance();
                        let value = self.parse_expression()?;
                        StatementNode::Assignment(AssignmentNode {
                            span: self.span_from(start),
                            target,
                            operator,
                            value,
                        })
                    }
                    None => StatementNode::Expression(target),
                }
            }
        };
        self.expect_line_end()?;
        Ok(statement)
    }

    /// `Type name`, `Type[] name` or a builtin type keyword starts a local
    fn is_local_declaration(&self) -> bool {
        match self.current_kind() {
            TokenKind::Bool | TokenKind::Int | TokenKind::Float | TokenKind::String => true,
            TokenKind::Ident(_) => match self.peek_kind(1) {
                TokenKind::Ident(_) => true,
                TokenKind::LBracket => matches!(self.peek_kind(2), TokenKind::RBracket),
                _ => false,
            },
            _ => false,
        }
    }

    fn parse_if(&mut self) -> Result<IfNode> {
        let start = self.expect(TokenKind::If)?.span;
        let branch_end = [TokenKind::ElseIf, TokenKind::Else, TokenKind::EndIf];

        let mut branches = Vec::new();
        let condition = self.parse_expression()?;
        self.expect_line_end()?;
        branches.push((condition, self.parse_block(&branch_end)?));

        while self.consume(&TokenKind::ElseIf) {
            let condition = self.parse_expression()?;
            self.expect_line_end()?;
            branches.push((condition, self.parse_block(&branch_end)?));
        }

        let else_block = if self.consume(&TokenKind::Else) {
            self.expect_line_end()?;
            Some(self.parse_block(&[TokenKind::EndIf])?)
        } else {
            None
        };
        self.expect(TokenKind::EndIf)?;

        Ok(IfNode {
            span: self.span_from(start),
            branches,
            else_block,
        })
    }

    fn parse_while(&mut self) -> Result<WhileNode> {
        let start = self.expect(TokenKind::While)?.span;
        let condition = self.parse_expression()?;
        self.expect_line_end()?;
        let body = self.parse_block(&[TokenKind::EndWhile])?;
        self.expect(TokenKind::EndWhile)?;

        Ok(WhileNode {
            span: self.span_from(start),
            condition,
            body,
        })
    }

    // ==================== Expressions ====================

    pub fn parse_expression(&mut self) -> Result<ExprNode> {
        self.parse_binary(0)
    }

    fn parse_binary(&mut self, min_precedence: u8) -> Result<ExprNode> {
        let mut left = self.parse_cast()?;

        loop {
            let (precedence, operator) = match (
                self.current_kind().binary_precedence(),
                binary_operator(self.current_kind()),
            ) {
                (Some(p), Some(op)) if p > min_precedence => (p, op),
                _ => break,
            };
            self.advance();
            let right = self.parse_binary(precedence)?;
            left = ExprNode {
                span: left.span.merge(&right.span),
                kind: ExprKind::Binary {
                    operator,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            };
        }

        Ok(left)
    }

    fn parse_cast(&mut self) -> Result<ExprNode> {
        let mut expression = self.parse_unary()?;
        while self.consume(&TokenKind::As) {
            let ty = self.parse_type()?;
            expression = ExprNode {
                span: expression.span.merge(&ty.span),
                kind: ExprKind::Cast {
                    expression: Box::new(expression),
                    ty,
                },
            };
        }
        Ok(expression)
    }

    fn parse_unary(&mut self) -> Result<ExprNode> {
        // A sign directly before a number is part of the literal
        let negated = match (self.current_kind(), self.peek_kind(1)) {
            (TokenKind::Minus, TokenKind::IntLit(text)) => Some(LiteralKind::Int(format!("-{}", text))),
            (TokenKind::Minus, TokenKind::FloatLit(value)) => Some(LiteralKind::Float(-value)),
            _ => None,
        };
        if let Some(literal) = negated {
            let start = self.advance().span;
            let end = self.advance().span;
            return Ok(ExprNode { span: start.merge(&end), kind: ExprKind::Literal(literal) });
        }

        let operator = match self.current_kind() {
            TokenKind::Minus => UnaryOperator::NumericNegation,
            TokenKind::Not => UnaryOperator::LogicalNegation,
            _ => return self.parse_postfix(),
        };
        let start = self.advance().span;
        let operand = self.parse_unary()?;
        Ok(ExprNode {
            span: start.merge(&operand.span),
            kind: ExprKind::Unary {
                operator,
                operand: Box::new(operand),
            },
        })
    }

    fn parse_postfix(&mut self) -> Result<ExprNode> {
        let mut expression = self.parse_primary()?;

        loop {
            if self.consume(&TokenKind::Dot) {
                if self.check(&TokenKind::Length) {
                    let end = self.advance().span;
                    expression = ExprNode {
                        span: expression.span.merge(&end),
                        kind: ExprKind::Length { array: Box::new(expression) },
                    };
                    continue;
                }
                let name = self.parse_ident()?;
                expression = if self.check(&TokenKind::LParen) {
                    let (args, end) = self.parse_args()?;
                    ExprNode {
                        span: expression.span.merge(&end),
                        kind: ExprKind::Call {
                            receiver: Some(Box::new(expression)),
                            name,
                            args,
                        },
                    }
                } else {
                    ExprNode {
                        span: expression.span.merge(&name.span),
                        kind: ExprKind::Member {
                            object: Box::new(expression),
                            name,
                        },
                    }
                };
            } else if self.consume(&TokenKind::LBracket) {
                let index = self.parse_expression()?;
                let end = self.expect(TokenKind::RBracket)?.span;
                expression = ExprNode {
                    span: expression.span.merge(&end),
                    kind: ExprKind::Index {
                        array: Box::new(expression),
                        index: Box::new(index),
                    },
                };
            } else {
                break;
            }
        }

        Ok(expression)
    }

    fn parse_primary(&mut self) -> Result<ExprNode> {
        let token = self.current().clone();
        let literal = match token.kind {
            TokenKind::True => Some(LiteralKind::Bool(true)),
            TokenKind::False => Some(LiteralKind::Bool(false)),
            TokenKind::None => Some(LiteralKind::None),
            TokenKind::SelfRef => Some(LiteralKind::SelfRef),
            TokenKind::Parent => Some(LiteralKind::Parent),
            TokenKind::IntLit(ref text) => Some(LiteralKind::Int(text.clone())),
            TokenKind::FloatLit(value) => Some(LiteralKind::Float(value)),
            TokenKind::StringLit(ref value) => Some(LiteralKind::String(value.clone())),
            _ => None,
        };
        if let Some(literal) = literal {
            self.advance();
            return Ok(ExprNode { span: token.span, kind: ExprKind::Literal(literal) });
        }

        match token.kind {
            TokenKind::Ident(name) => {
                self.advance();
                if self.check(&TokenKind::LParen) {
                    let (args, end) = self.parse_args()?;
                    Ok(ExprNode {
                        span: token.span.merge(&end),
                        kind: ExprKind::Call {
                            receiver: None,
                            name: Ident { name, span: token.span },
                            args,
                        },
                    })
                } else {
                    Ok(ExprNode { span: token.span, kind: ExprKind::Ident(name) })
                }
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                let end = self.expect(TokenKind::RParen)?.span;
                Ok(ExprNode {
                    span: token.span.merge(&end),
                    kind: ExprKind::Paren(Box::new(inner)),
                })
            }
            TokenKind::New => {
                self.advance();
                let element_start = self.current().span;
                let base = self.parse_base_type()?;
                let element = TypeNode {
                    span: self.span_from(element_start),
                    base,
                    is_array: false,
                };
                self.expect(TokenKind::LBracket)?;
                let size_token = self.current().clone();
                let size = match size_token.kind {
                    TokenKind::IntLit(text) => LiteralNode {
                        span: size_token.span,
                        kind: LiteralKind::Int(text),
                    },
                    _ => return Err(self.error("array size")),
                };
                self.advance();
                let end = self.expect(TokenKind::RBracket)?.span;
                Ok(ExprNode {
                    span: token.span.merge(&end),
                    kind: ExprKind::NewArray { element, size },
                })
            }
            _ => Err(self.error("expression")),
        }
    }

    /// Parse `( args )`, returning the arguments and the closing paren span
    fn parse_args(&mut self) -> Result<(Vec<ArgNode>, Span)> {
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();

        while !self.check(&TokenKind::RParen) && !self.is_at_end() {
            let start = self.current().span;
            let name = if matches!(self.current_kind(), TokenKind::Ident(_))
                && matches!(self.peek_kind(1), TokenKind::Eq)
            {
                let name = self.parse_ident()?;
                self.advance();
                Some(name)
            } else {
                None
            };
            let value = self.parse_expression()?;
            args.push(ArgNode {
                span: self.span_from(start),
                name,
                value,
            });
            if !self.consume(&TokenKind::Comma) {
                break;
            }
        }

        let end = self.expect(TokenKind::RParen)?.span;
        Ok((args, end))
    }
}

fn binary_operator(kind: &TokenKind) -> Option<BinaryOperator> {
    let operator = match kind {
        TokenKind::OrOr => BinaryOperator::LogicalOr,
        TokenKind::AndAnd => BinaryOperator::LogicalAnd,
        TokenKind::EqEq => BinaryOperator::Equal,
        TokenKind::Ne => BinaryOperator::NotEqual,
        TokenKind::Gt => BinaryOperator::Greater,
        TokenKind::Ge => BinaryOperator::GreaterOrEqual,
        TokenKind::Lt => BinaryOperator::Less,
        TokenKind::Le => BinaryOperator::LessOrEqual,
        TokenKind::Plus => BinaryOperator::Add,
        TokenKind::Minus => BinaryOperator::Subtract,
        TokenKind::Star => BinaryOperator::Multiply,
        TokenKind::Slash => BinaryOperator::Divide,
        TokenKind::Percent => BinaryOperator::Modulo,
        _ => return None,
    };
    Some(operator)
}

fn assignment_operator(kind: &TokenKind) -> Option<AssignmentOperator> {
    let operator = match kind {
        TokenKind::Eq => AssignmentOperator::Assign,
        TokenKind::PlusEq => AssignmentOperator::Add,
        TokenKind::MinusEq => AssignmentOperator::Subtract,
        TokenKind::StarEq => AssignmentOperator::Multiply,
        TokenKind::SlashEq => AssignmentOperator::Divide,
        TokenKind::PercentEq => AssignmentOperator::Modulo,
        _ => return None,
    };
    Some(operator)
}
