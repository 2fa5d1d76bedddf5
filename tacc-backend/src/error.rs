//! Back-end errors
//!
//! Allocation itself never fails: register exhaustion is resolved by
//! spilling. What can fail is malformed input from upstream and ABI limits.

use tacc_codegen::{AbiError, Reg};
use tacc_common::{CompilerError, Label};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Jump to unknown label '{0}'")]
    UnknownLabel(Label),

    #[error("Label '{0}' defined more than once")]
    DuplicateLabel(Label),

    #[error("Edge ({0}, {1}) refers to a block that does not exist")]
    DanglingEdge(usize, usize),

    #[error("Register {reg} used where '{instr}' requires a temporary")]
    PhysicalOperand { reg: Reg, instr: String },

    #[error(transparent)]
    Abi(#[from] AbiError),
}

impl BackendError {
    /// Attach the failing function's name for reporting to the driver
    pub fn in_function(self, function: &Label) -> CompilerError {
        match self {
            BackendError::UnknownLabel(_)
            | BackendError::DuplicateLabel(_)
            | BackendError::DanglingEdge(..) => {
                CompilerError::invalid_tac(function.name(), self.to_string())
            }
            BackendError::PhysicalOperand { .. } | BackendError::Abi(_) => {
                CompilerError::codegen_error(function.name(), self.to_string())
            }
        }
    }
}
