//! Instruction selection
//!
//! Lowers a TAC instruction whose operands have been resolved to physical
//! registers into RV32IM instructions.

use tacc_codegen::{AsmInst, CallingConvention, Reg};
use tacc_common::Label;
use super::instructions::TacInstr;
use super::ops::{CondBranchOp, TacBinaryOp, TacUnaryOp};

impl TacInstr {
    /// Produce the native form of this instruction.
    ///
    /// `dsts` and `srcs` are the registers chosen for `self.dsts()` and
    /// `self.srcs()`, in the same order. `exit` is the label of the
    /// function epilogue that returns jump to.
    pub fn to_native(&self, dsts: &[Reg], srcs: &[Reg], exit: &Label) -> Vec<AsmInst> {
        debug_assert_eq!(dsts.len(), self.dsts().len());
        debug_assert_eq!(srcs.len(), self.srcs().len());

        match self {
            TacInstr::Assign { .. } => vec![AsmInst::Mv(dsts[0], srcs[0])],
            TacInstr::LoadImm { value, .. } => vec![AsmInst::Li(dsts[0], *value)],
            TacInstr::Unary { op, .. } => {
                let (rd, rs) = (dsts[0], srcs[0]);
                vec![match op {
                    TacUnaryOp::Neg => AsmInst::Neg(rd, rs),
                    TacUnaryOp::BitNot => AsmInst::Not(rd, rs),
                    TacUnaryOp::LogicNot => AsmInst::Seqz(rd, rs),
                }]
            }
            TacInstr::Binary { op, .. } => lower_binary(*op, dsts[0], srcs[0], srcs[1]),
            TacInstr::Branch { target } => vec![AsmInst::J(target.to_string())],
            TacInstr::CondBranch { op, target, .. } => vec![match op {
                CondBranchOp::Beq => AsmInst::Beqz(srcs[0], target.to_string()),
                CondBranchOp::Bne => AsmInst::Bnez(srcs[0], target.to_string()),
            }],
            TacInstr::Return { value } => {
                let mut code = Vec::with_capacity(2);
                if value.is_some() && srcs[0] != CallingConvention::RETURN_REG {
                    code.push(AsmInst::Mv(CallingConvention::RETURN_REG, srcs[0]));
                }
                code.push(AsmInst::J(exit.to_string()));
                code
            }
            TacInstr::Mark { label } => vec![AsmInst::Label(label.to_string())],
            TacInstr::Memo { text } => vec![AsmInst::Comment(text.clone())],
            TacInstr::Call { target, .. } => vec![AsmInst::Call(target.to_string())],
        }
    }
}

fn lower_binary(op: TacBinaryOp, rd: Reg, lhs: Reg, rhs: Reg) -> Vec<AsmInst> {
    match op {
        TacBinaryOp::Add => vec![AsmInst::Add(rd, lhs, rhs)],
        TacBinaryOp::Sub => vec![AsmInst::Sub(rd, lhs, rhs)],
        TacBinaryOp::Mul => vec![AsmInst::Mul(rd, lhs, rhs)],
        TacBinaryOp::Div => vec![AsmInst::Div(rd, lhs, rhs)],
        TacBinaryOp::Mod => vec![AsmInst::Rem(rd, lhs, rhs)],
        TacBinaryOp::Slt => vec![AsmInst::Slt(rd, lhs, rhs)],
        TacBinaryOp::Sgt => vec![AsmInst::Sgt(rd, lhs, rhs)],
        TacBinaryOp::Equ => vec![AsmInst::Sub(rd, lhs, rhs), AsmInst::Seqz(rd, rd)],
        TacBinaryOp::Neq => vec![AsmInst::Sub(rd, lhs, rhs), AsmInst::Snez(rd, rd)],
        TacBinaryOp::Leq => vec![AsmInst::Sgt(rd, lhs, rhs), AsmInst::Seqz(rd, rd)],
        TacBinaryOp::Geq => vec![AsmInst::Slt(rd, lhs, rhs), AsmInst::Seqz(rd, rd)],
        TacBinaryOp::Lor => vec![AsmInst::Or(rd, lhs, rhs), AsmInst::Snez(rd, rd)],
        TacBinaryOp::Land => {
            // rd is overwritten before the second operand is read, so read
            // the aliased operand first.
            let (first, second) = if rd == rhs { (rhs, lhs) } else { (lhs, rhs) };
            vec![
                AsmInst::Snez(rd, first),
                AsmInst::Neg(rd, rd),
                AsmInst::And(rd, rd, second),
                AsmInst::Snez(rd, rd),
            ]
        }
    }
}
