//! Syntax-level EXPLAIN support: the directive node, its settings and output
//! options, AST formatting, and a small parser for the EXPLAIN prefix.
pub mod ast;
pub mod format;
pub mod keywords;
pub mod parser;
pub mod tokens;

pub use parser::parse_explain;
