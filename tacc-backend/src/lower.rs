//! Function and program lowering
//!
//! TAC function -> CFG -> liveness -> register allocation -> framed native
//! code.

use log::{debug, info};
use tacc_codegen::AsmFunction;
use tacc_common::CompilerError;
use crate::dataflow::{CfgBuilder, LivenessAnalyzer};
use crate::error::BackendError;
use crate::regmgmt::BruteRegAlloc;
use crate::subroutine::{SubroutineEmitter, SubroutineInfo};
use crate::tac::{TacFunc, TacProg};
use crate::LoweringOptions;

/// Lower one function to native code, prologue and epilogue included.
///
/// A function without instructions produces no code at all.
pub fn lower_function(func: &TacFunc, options: &LoweringOptions) -> Result<AsmFunction, BackendError> {
    let mut cfg = CfgBuilder::build(func)?;
    if cfg.is_empty() {
        debug!("{}: no blocks, nothing to emit", func.name);
        return Ok(AsmFunction::new(func.name.clone(), Vec::new()));
    }
    LivenessAnalyzer::analyze(&mut cfg);

    let info = SubroutineInfo::of(func);
    let mut emitter = SubroutineEmitter::new(info.clone());
    let mut alloc = BruteRegAlloc::new(options);
    alloc.accept(&cfg, &info, &mut emitter)?;

    let instructions = emitter.finish(&alloc.used_callee_saved(), alloc.has_calls())?;
    debug!(
        "{}: {} instructions",
        func.name,
        instructions.iter().filter(|inst| !inst.is_pseudo()).count()
    );
    Ok(AsmFunction::new(func.name.clone(), instructions))
}

/// Lower every function of a program, stopping at the first failure.
pub fn lower_program(prog: &TacProg, options: &LoweringOptions) -> Result<Vec<AsmFunction>, CompilerError> {
    info!("lowering {} functions", prog.funcs.len());
    prog.funcs
        .iter()
        .map(|func| lower_function(func, options).map_err(|e| e.in_function(&func.name)))
        .collect()
}
