//! Frontend module - Lexer, Parser, AST, Scopes and Symbol Resolution

pub mod token;
pub mod lexer;
pub mod cst;
pub mod parser;
pub mod ast;
pub mod builder;
pub mod walker;
pub mod symbol;
pub mod scope;
pub mod symbol_table;
pub mod module;

use crate::utils::Result;

/// Lex, parse and build the AST of one script
pub fn parse_script(source: &str) -> Result<ast::Script> {
    let lexer = lexer::Lexer::new(source);
    let tree = parser::Parser::new(lexer)?.parse_script()?;
    builder::build(&tree)
}
