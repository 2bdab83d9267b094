// tinylang interpreter library
//
// Front-end and evaluator for a small expression-oriented scripting
// language: a Pratt parser builds an AST from a lazy token stream, and a
// tree-walking evaluator executes it against a lexical environment chain.

// Public modules
pub mod ast;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod runner;
pub mod value;

// Re-export commonly used items
pub use ast::{Block, Expr, Program, Stmt};
pub use environment::Environment;
pub use error::{ParseError, Span};
pub use evaluator::Evaluator;
pub use lexer::{Lexer, Token, TokenType};
pub use parser::Parser;
pub use value::{HashKey, Value};

// Re-export main functions
pub use repl::start as start_repl;
pub use runner::run;
