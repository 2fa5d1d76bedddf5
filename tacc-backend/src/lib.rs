//! TAC Compiler - Backend
//!
//! This crate lowers three-address code to RV32IM assembly: it builds the
//! control-flow graph of each function, runs liveness analysis, and assigns
//! physical registers with a block-local brute-force allocator.

pub mod dataflow;
pub mod error;
pub mod lower;
pub mod regmgmt;
pub mod subroutine;
pub mod tac;

pub use dataflow::{BasicBlock, BlockKind, Cfg, CfgBuilder, LivenessAnalyzer, Loc};
pub use error::BackendError;
pub use lower::{lower_function, lower_program};
pub use regmgmt::{BruteRegAlloc, RegisterFile};
pub use subroutine::{EmitSink, FrameService, SubroutineEmitter, SubroutineInfo};
pub use tac::{Operand, TacFunc, TacInstr, TacProg};

/// Options for lowering
#[derive(Debug, Clone, Default)]
pub struct LoweringOptions {
    /// Annotate the output with the TAC and allocation decisions
    pub emit_comments: bool,

    /// Use only the first N allocatable registers
    pub register_limit: Option<usize>,
}

/// Lower a program to assembly text with options
pub fn compile_program(prog: &TacProg, options: &LoweringOptions) -> Result<String, tacc_common::CompilerError> {
    let functions = lower_program(prog, options)?;
    Ok(tacc_codegen::generate_assembly(&functions))
}
