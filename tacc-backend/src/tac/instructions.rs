//! TAC Instructions
//!
//! Defines all instruction forms the back-end consumes.

use serde::{Deserialize, Serialize};
use std::fmt;
use tacc_codegen::Reg;
use tacc_common::{Label, Temp};
use super::ops::{CondBranchOp, InstrKind, TacBinaryOp, TacUnaryOp};

/// An instruction operand: a temporary, or a register fixed before allocation.
///
/// In JSON a temporary is written as its index and a register by ABI name,
/// e.g. `[3, "a0"]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operand {
    Temp(Temp),
    Reg(Reg),
}

impl Operand {
    pub fn as_temp(&self) -> Option<Temp> {
        match self {
            Operand::Temp(temp) => Some(*temp),
            Operand::Reg(_) => None,
        }
    }
}

impl From<Temp> for Operand {
    fn from(temp: Temp) -> Self {
        Operand::Temp(temp)
    }
}

impl From<Reg> for Operand {
    fn from(reg: Reg) -> Self {
        Operand::Reg(reg)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Temp(temp) => write!(f, "{temp}"),
            Operand::Reg(reg) => write!(f, "{reg}"),
        }
    }
}

/// TAC Instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TacInstr {
    /// dst = src
    Assign { dst: Operand, src: Operand },

    /// dst = value
    LoadImm { dst: Operand, value: i32 },

    /// dst = op operand
    Unary { op: TacUnaryOp, dst: Operand, operand: Operand },

    /// dst = lhs op rhs
    Binary { op: TacBinaryOp, dst: Operand, lhs: Operand, rhs: Operand },

    /// Unconditional branch
    Branch { target: Label },

    /// Branch on the truth value of `cond`
    CondBranch { op: CondBranchOp, cond: Operand, target: Label },

    /// Return, optionally with a value
    Return { value: Option<Operand> },

    /// Label marking the start of a block
    Mark { label: Label },

    /// Free-form annotation carried through to the assembly
    Memo { text: String },

    /// dst = call target(args...)
    Call { dst: Option<Operand>, target: Label, args: Vec<Operand> },
}

impl TacInstr {
    pub fn kind(&self) -> InstrKind {
        match self {
            TacInstr::Mark { .. } => InstrKind::Label,
            TacInstr::Branch { .. } => InstrKind::Jmp,
            TacInstr::CondBranch { .. } => InstrKind::CondJmp,
            TacInstr::Return { .. } => InstrKind::Ret,
            TacInstr::Assign { .. }
            | TacInstr::LoadImm { .. }
            | TacInstr::Unary { .. }
            | TacInstr::Binary { .. }
            | TacInstr::Memo { .. }
            | TacInstr::Call { .. } => InstrKind::Seq,
        }
    }

    pub fn is_call(&self) -> bool {
        matches!(self, TacInstr::Call { .. })
    }

    /// Operands read by this instruction, in order
    pub fn srcs(&self) -> Vec<Operand> {
        match self {
            TacInstr::Assign { src, .. } => vec![*src],
            TacInstr::Unary { operand, .. } => vec![*operand],
            TacInstr::Binary { lhs, rhs, .. } => vec![*lhs, *rhs],
            TacInstr::CondBranch { cond, .. } => vec![*cond],
            TacInstr::Return { value } => value.iter().copied().collect(),
            TacInstr::Call { args, .. } => args.clone(),
            TacInstr::LoadImm { .. }
            | TacInstr::Branch { .. }
            | TacInstr::Mark { .. }
            | TacInstr::Memo { .. } => Vec::new(),
        }
    }

    /// Operands written by this instruction, in order
    pub fn dsts(&self) -> Vec<Operand> {
        match self {
            TacInstr::Assign { dst, .. }
            | TacInstr::LoadImm { dst, .. }
            | TacInstr::Unary { dst, .. }
            | TacInstr::Binary { dst, .. } => vec![*dst],
            TacInstr::Call { dst, .. } => dst.iter().copied().collect(),
            TacInstr::Branch { .. }
            | TacInstr::CondBranch { .. }
            | TacInstr::Return { .. }
            | TacInstr::Mark { .. }
            | TacInstr::Memo { .. } => Vec::new(),
        }
    }

    /// Temporaries read by this instruction
    pub fn uses(&self) -> impl Iterator<Item = Temp> {
        self.srcs().into_iter().filter_map(|op| op.as_temp())
    }

    /// Temporaries written by this instruction
    pub fn defs(&self) -> impl Iterator<Item = Temp> {
        self.dsts().into_iter().filter_map(|op| op.as_temp())
    }

    /// Branch target, for jumps and conditional jumps
    pub fn jump_target(&self) -> Option<&Label> {
        match self {
            TacInstr::Branch { target } | TacInstr::CondBranch { target, .. } => Some(target),
            _ => None,
        }
    }

    /// Highest temporary index mentioned, if any
    pub fn max_temp(&self) -> Option<Temp> {
        self.uses().chain(self.defs()).max()
    }
}

impl fmt::Display for TacInstr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TacInstr::Assign { dst, src } => write!(f, "{dst} = {src}"),
            TacInstr::LoadImm { dst, value } => write!(f, "{dst} = {value}"),
            TacInstr::Unary { op, dst, operand } => write!(f, "{dst} = {op} {operand}"),
            TacInstr::Binary { op, dst, lhs, rhs } => write!(f, "{dst} = ({lhs} {op} {rhs})"),
            TacInstr::Branch { target } => write!(f, "branch {target}"),
            TacInstr::CondBranch { op, cond, target } => write!(f, "if ({cond} {op}) branch {target}"),
            TacInstr::Return { value: Some(value) } => write!(f, "return {value}"),
            TacInstr::Return { value: None } => write!(f, "return"),
            TacInstr::Mark { label } => write!(f, "{label}:"),
            TacInstr::Memo { text } => write!(f, "memo '{text}'"),
            TacInstr::Call { dst, target, args } => {
                if let Some(dst) = dst {
                    write!(f, "{dst} = ")?;
                }
                write!(f, "call {target}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}
