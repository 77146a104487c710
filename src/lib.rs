//! A small line-oriented command interpreter.
//!
//! Each input line is split into whitespace-delimited words, the words are
//! classified against a fixed table of keywords (built-in commands) and
//! operators (`<`, `>`, `>>`), and the line is then either handled in-process
//! by a built-in or launched as an external program, with optional input and
//! output redirection around it.
//!
//! The main entry point is [`Interpreter`], which owns the process context
//! ([`env::Environment`]) and the immutable [`lexer::TokenTable`].

mod builtin;
pub mod command;
pub mod config;
pub mod env;
pub mod error;
mod external;
mod interpreter;
pub mod io_adapters;
pub mod lexer;
pub mod prompt;
pub mod redirect;

/// Just a convenient re-export of the command runner.
///
/// See [`Interpreter`] for the high-level API.
pub use interpreter::{Interpreter, Outcome};
