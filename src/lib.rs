//! Papyrus front-end
//!
//! Parses Papyrus scripts into an immutable AST, builds lexical scopes for
//! each script and indexes whole programs for name resolution.

pub mod feedback;
pub mod frontend;
pub mod types;
pub mod utils;

pub use frontend::parse_script;
pub use frontend::symbol_table::SymbolTable;
