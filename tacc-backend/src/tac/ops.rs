//! TAC Operations
//!
//! Defines the unary, binary and conditional-branch operators of TAC.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Shape of an instruction as far as control flow is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstrKind {
    /// Labels
    Label,
    /// Sequential instructions (unary operations, binary operations, calls, etc)
    Seq,
    /// Unconditional branch
    Jmp,
    /// Branch with a condition
    CondJmp,
    /// Return
    Ret,
}

/// Unary operations in TAC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TacUnaryOp {
    Neg,
    BitNot,
    LogicNot,
}

impl fmt::Display for TacUnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op_str = match self {
            TacUnaryOp::Neg => "NEG",
            TacUnaryOp::BitNot => "NOT",
            TacUnaryOp::LogicNot => "SEQZ",
        };
        write!(f, "{op_str}")
    }
}

/// Binary operations in TAC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TacBinaryOp {
    // Arithmetic
    Add, Sub, Mul, Div, Mod,

    // Comparison (produce 0 or 1)
    Equ, Neq, Slt, Sgt, Leq, Geq,

    // Logical (operands are truth values, produce 0 or 1)
    Lor, Land,
}

impl fmt::Display for TacBinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op_str = match self {
            TacBinaryOp::Add => "ADD",
            TacBinaryOp::Sub => "SUB",
            TacBinaryOp::Mul => "MUL",
            TacBinaryOp::Div => "DIV",
            TacBinaryOp::Mod => "MOD",
            TacBinaryOp::Equ => "EQU",
            TacBinaryOp::Neq => "NEQ",
            TacBinaryOp::Slt => "SLT",
            TacBinaryOp::Sgt => "SGT",
            TacBinaryOp::Leq => "LEQ",
            TacBinaryOp::Geq => "GEQ",
            TacBinaryOp::Lor => "LOR",
            TacBinaryOp::Land => "LAND",
        };
        write!(f, "{op_str}")
    }
}

/// Conditional branch operations in TAC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CondBranchOp {
    /// Branch if the condition is zero
    Beq,
    /// Branch if the condition is non-zero
    Bne,
}

impl fmt::Display for CondBranchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CondBranchOp::Beq => write!(f, "BEQZ"),
            CondBranchOp::Bne => write!(f, "BNEZ"),
        }
    }
}
