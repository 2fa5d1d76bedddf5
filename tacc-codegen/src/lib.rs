//! TAC Compiler - Code Generation Backend
//!
//! This crate handles the target-facing end of compilation: the RV32 register
//! and instruction model the allocator resolves into, and the printer that
//! turns it into assembly text. It includes:
//!
//! - Assembly instruction definitions
//! - ABI implementation (calling convention, stack frames)
//! - Program printing

pub mod asm;
pub mod abi;
pub mod emit;

pub use asm::{Reg, AsmInst};
pub use abi::{Frame, AbiError, CallingConvention};
pub use emit::{emit_complete_program, emit_instructions, AsmFunction};

/// Main entry point for assembly text generation
pub fn generate_assembly(functions: &[AsmFunction]) -> String {
    emit_complete_program(functions)
}
