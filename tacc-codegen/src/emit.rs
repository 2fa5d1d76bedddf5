//! Assembly printer
//!
//! Turns native instructions into GNU-assembler compatible text.

use crate::asm::AsmInst;
use std::fmt::Write;
use tacc_common::Label;

/// The native code of one function, entry label excluded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsmFunction {
    pub name: Label,
    pub instructions: Vec<AsmInst>,
}

impl AsmFunction {
    pub fn new(name: Label, instructions: Vec<AsmInst>) -> Self {
        Self { name, instructions }
    }
}

/// Render a flat instruction list, one per line.
///
/// Labels are flush left, everything else is indented.
pub fn emit_instructions(instructions: &[AsmInst]) -> String {
    let mut out = String::new();
    for inst in instructions {
        match inst {
            AsmInst::Label(_) => {
                let _ = writeln!(out, "{inst}");
            }
            _ => {
                let _ = writeln!(out, "    {inst}");
            }
        }
    }
    out
}

/// Render a whole program: a text section with every function exported.
///
/// Functions without any code are left out.
pub fn emit_complete_program(functions: &[AsmFunction]) -> String {
    let emitted: Vec<&AsmFunction> = functions.iter().filter(|f| !f.instructions.is_empty()).collect();
    let mut out = String::from("    .text\n");
    for func in &emitted {
        let _ = writeln!(out, "    .global {}", func.name);
    }
    for func in emitted {
        out.push('\n');
        let _ = writeln!(out, "{}:", func.name);
        out.push_str(&emit_instructions(&func.instructions));
    }
    out
}
