//! RV32 Assembly Instruction Definitions
//!
//! This module defines the instruction set and register model for the
//! RV32IM target.

use serde::{Deserialize, Serialize};
use std::fmt;

/// RV32 Register Set
///
/// Variants are declared in hardware order (x0..x31) so that `Reg as usize`
/// is the architectural register number. Serialized by ABI name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reg {
    Zero, Ra, Sp, Gp, Tp,
    T0, T1, T2,
    S0, S1,
    A0, A1, A2, A3, A4, A5, A6, A7,
    S2, S3, S4, S5, S6, S7, S8, S9, S10, S11,
    T3, T4, T5, T6,
}

impl Reg {
    /// Number of architectural registers
    pub const COUNT: usize = 32;

    /// Every register, indexed by hardware number
    pub const ALL: [Reg; Reg::COUNT] = [
        Reg::Zero, Reg::Ra, Reg::Sp, Reg::Gp, Reg::Tp,
        Reg::T0, Reg::T1, Reg::T2,
        Reg::S0, Reg::S1,
        Reg::A0, Reg::A1, Reg::A2, Reg::A3, Reg::A4, Reg::A5, Reg::A6, Reg::A7,
        Reg::S2, Reg::S3, Reg::S4, Reg::S5, Reg::S6, Reg::S7, Reg::S8, Reg::S9, Reg::S10, Reg::S11,
        Reg::T3, Reg::T4, Reg::T5, Reg::T6,
    ];

    const NAMES: [&'static str; Reg::COUNT] = [
        "zero", "ra", "sp", "gp", "tp",
        "t0", "t1", "t2",
        "s0", "s1",
        "a0", "a1", "a2", "a3", "a4", "a5", "a6", "a7",
        "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11",
        "t3", "t4", "t5", "t6",
    ];

    /// Hardware register number
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        Self::NAMES[self.index()]
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// RV32 Assembly Instructions
///
/// Real RV32IM instructions plus the standard assembler pseudo-instructions
/// the back-end relies on (`li`, `mv`, `neg`, `not`, `seqz`, `snez`, `sgt`,
/// `j`, `beqz`, `bnez`, `call`, `ret`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsmInst {
    // Register-register arithmetic
    Add(Reg, Reg, Reg),           // rd = rs + rt
    Sub(Reg, Reg, Reg),           // rd = rs - rt
    Mul(Reg, Reg, Reg),           // rd = rs * rt
    Div(Reg, Reg, Reg),           // rd = rs / rt
    Rem(Reg, Reg, Reg),           // rd = rs % rt

    // Logical and comparison
    And(Reg, Reg, Reg),
    Or(Reg, Reg, Reg),
    Slt(Reg, Reg, Reg),           // rd = (rs < rt) ? 1 : 0
    Sgt(Reg, Reg, Reg),           // rd = (rs > rt) ? 1 : 0

    // Immediate forms
    Addi(Reg, Reg, i32),
    Li(Reg, i32),

    // Unary pseudo-instructions
    Mv(Reg, Reg),
    Neg(Reg, Reg),
    Not(Reg, Reg),
    Seqz(Reg, Reg),
    Snez(Reg, Reg),

    // Memory: register, byte offset, base
    Lw(Reg, i32, Reg),
    Sw(Reg, i32, Reg),

    // Control flow
    J(String),
    Beqz(Reg, String),
    Bnez(Reg, String),
    Call(String),
    Ret,

    // Assembly pseudo-instructions
    Label(String),
    Comment(String),
}

impl AsmInst {
    /// True for labels and comments, which occupy no code space
    pub fn is_pseudo(&self) -> bool {
        matches!(self, AsmInst::Label(_) | AsmInst::Comment(_))
    }
}

impl fmt::Display for AsmInst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsmInst::Add(rd, rs, rt) => write!(f, "add {rd}, {rs}, {rt}"),
            AsmInst::Sub(rd, rs, rt) => write!(f, "sub {rd}, {rs}, {rt}"),
            AsmInst::Mul(rd, rs, rt) => write!(f, "mul {rd}, {rs}, {rt}"),
            AsmInst::Div(rd, rs, rt) => write!(f, "div {rd}, {rs}, {rt}"),
            AsmInst::Rem(rd, rs, rt) => write!(f, "rem {rd}, {rs}, {rt}"),

            AsmInst::And(rd, rs, rt) => write!(f, "and {rd}, {rs}, {rt}"),
            AsmInst::Or(rd, rs, rt) => write!(f, "or {rd}, {rs}, {rt}"),
            AsmInst::Slt(rd, rs, rt) => write!(f, "slt {rd}, {rs}, {rt}"),
            AsmInst::Sgt(rd, rs, rt) => write!(f, "sgt {rd}, {rs}, {rt}"),

            AsmInst::Addi(rd, rs, imm) => write!(f, "addi {rd}, {rs}, {imm}"),
            AsmInst::Li(rd, imm) => write!(f, "li {rd}, {imm}"),

            AsmInst::Mv(rd, rs) => write!(f, "mv {rd}, {rs}"),
            AsmInst::Neg(rd, rs) => write!(f, "neg {rd}, {rs}"),
            AsmInst::Not(rd, rs) => write!(f, "not {rd}, {rs}"),
            AsmInst::Seqz(rd, rs) => write!(f, "seqz {rd}, {rs}"),
            AsmInst::Snez(rd, rs) => write!(f, "snez {rd}, {rs}"),

            AsmInst::Lw(rd, offset, base) => write!(f, "lw {rd}, {offset}({base})"),
            AsmInst::Sw(rs, offset, base) => write!(f, "sw {rs}, {offset}({base})"),

            AsmInst::J(label) => write!(f, "j {label}"),
            AsmInst::Beqz(rs, label) => write!(f, "beqz {rs}, {label}"),
            AsmInst::Bnez(rs, label) => write!(f, "bnez {rs}, {label}"),
            AsmInst::Call(label) => write!(f, "call {label}"),
            AsmInst::Ret => write!(f, "ret"),

            AsmInst::Label(label) => write!(f, "{label}:"),
            AsmInst::Comment(text) => write!(f, "# {text}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_register_display() {
        assert_eq!(format!("{}", Reg::Zero), "zero");
        assert_eq!(format!("{}", Reg::S0), "s0");
        assert_eq!(format!("{}", Reg::A7), "a7");
        assert_eq!(format!("{}", Reg::T6), "t6");
    }

    #[test]
    fn test_register_numbering() {
        for (i, reg) in Reg::ALL.iter().enumerate() {
            assert_eq!(reg.index(), i);
        }
        assert_eq!(Reg::A0.index(), 10);
        assert_eq!(Reg::S2.index(), 18);
        assert_eq!(Reg::T3.index(), 28);
    }

    #[test]
    fn test_instruction_display() {
        assert_eq!(format!("{}", AsmInst::Li(Reg::T0, 42)), "li t0, 42");
        assert_eq!(format!("{}", AsmInst::Add(Reg::A0, Reg::T1, Reg::T2)), "add a0, t1, t2");
        assert_eq!(format!("{}", AsmInst::Sw(Reg::T0, -60, Reg::S0)), "sw t0, -60(s0)");
        assert_eq!(format!("{}", AsmInst::Lw(Reg::A1, 4, Reg::Sp)), "lw a1, 4(sp)");
        assert_eq!(format!("{}", AsmInst::Beqz(Reg::T3, "_L2".to_string())), "beqz t3, _L2");
        assert_eq!(format!("{}", AsmInst::Label("main".to_string())), "main:");
        assert_eq!(format!("{}", AsmInst::Comment("spill".to_string())), "# spill");
    }
}
