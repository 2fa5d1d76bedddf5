//! Error handling for the TAC compiler
//!
//! This module defines the error type reported across phase boundaries.
//! Each phase keeps its own detailed error enum and folds it into
//! `CompilerError` when handing a failure back to the driver.

use thiserror::Error;

/// Main compiler error type that encompasses all phases of compilation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompilerError {
    #[error("Malformed TAC in function '{function}': {message}")]
    InvalidTac {
        function: String,
        message: String,
    },

    #[error("Code generation error in function '{function}': {message}")]
    CodegenError {
        function: String,
        message: String,
    },
}

impl CompilerError {
    /// Create a malformed-input error
    pub fn invalid_tac(function: impl Into<String>, message: impl Into<String>) -> Self {
        CompilerError::InvalidTac {
            function: function.into(),
            message: message.into(),
        }
    }

    /// Create a codegen error
    pub fn codegen_error(function: impl Into<String>, message: impl Into<String>) -> Self {
        CompilerError::CodegenError {
            function: function.into(),
            message: message.into(),
        }
    }
}
