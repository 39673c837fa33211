//! Bee: a small statically typed imperative language compiled to LLVM IR.
//!
//! # Pipeline
//! - `lexer`: source text → tokens
//! - `ast`: syntax tree produced by the parser
//! - `parser`: token stream → AST
//! - `codegen`: AST → LLVM IR, optimization pipeline, JIT execution and
//!   textual `.ll` emission

pub mod ast;
pub mod codegen;
pub mod lexer;
pub mod parser;
