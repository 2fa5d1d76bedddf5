//! TAC Compiler - Common Types and Utilities
//! 
//! This crate contains shared types, error definitions, and utilities
//! used across all components of the TAC compiler back-end.

pub mod error;
pub mod types;

pub use error::CompilerError;
pub use types::*;
