//! Shared helpers for the lowering tests: TAC shorthands and a small RV32
//! interpreter that executes lowered functions directly.

#![allow(dead_code)]

use std::collections::HashMap;
use tacc_backend::tac::{CondBranchOp, TacBinaryOp, TacUnaryOp};
use tacc_backend::{Operand, TacInstr};
use tacc_codegen::{AsmFunction, AsmInst, CallingConvention, Reg};
use tacc_common::{Label, Temp};

pub fn t(id: u32) -> Operand {
    Operand::Temp(Temp(id))
}

pub fn li(dst: u32, value: i32) -> TacInstr {
    TacInstr::LoadImm { dst: t(dst), value }
}

pub fn bin(op: TacBinaryOp, dst: u32, lhs: u32, rhs: u32) -> TacInstr {
    TacInstr::Binary { op, dst: t(dst), lhs: t(lhs), rhs: t(rhs) }
}

pub fn un(op: TacUnaryOp, dst: u32, operand: u32) -> TacInstr {
    TacInstr::Unary { op, dst: t(dst), operand: t(operand) }
}

pub fn mark(id: u32) -> TacInstr {
    TacInstr::Mark { label: Label::block(id) }
}

pub fn jump(id: u32) -> TacInstr {
    TacInstr::Branch { target: Label::block(id) }
}

pub fn branch_if(op: CondBranchOp, cond: u32, id: u32) -> TacInstr {
    TacInstr::CondBranch { op, cond: t(cond), target: Label::block(id) }
}

pub fn call(dst: Option<u32>, target: &str, args: &[u32]) -> TacInstr {
    TacInstr::Call {
        dst: dst.map(t),
        target: Label::func(target),
        args: args.iter().map(|&a| t(a)).collect(),
    }
}

pub fn ret(value: u32) -> TacInstr {
    TacInstr::Return { value: Some(t(value)) }
}

/// Return address that stops the machine
const HALT: i32 = -1;

/// Written into caller-saved registers whenever a call returns
const CLOBBER: i32 = 0x5a5a_5a5a;

const STACK_TOP: i32 = 0x0010_0000;
const STEP_LIMIT: usize = 1_000_000;

/// Executes lowered functions instruction by instruction.
///
/// Besides computing results it checks the calling convention: callee-saved
/// registers and `sp` must survive every call, and caller-saved registers are
/// scrambled on return so that code relying on them produces wrong results.
pub struct Machine {
    code: Vec<AsmInst>,
    labels: HashMap<String, usize>,
    regs: [i32; Reg::COUNT],
    memory: HashMap<i32, i32>,
    /// (callee-saved snapshot, sp) per active call
    frames: Vec<(Vec<i32>, i32)>,
    pub steps: usize,
}

impl Machine {
    pub fn new(functions: &[AsmFunction]) -> Self {
        let mut code = Vec::new();
        let mut labels = HashMap::new();
        for func in functions {
            labels.insert(func.name.to_string(), code.len());
            for inst in &func.instructions {
                if let AsmInst::Label(name) = inst {
                    let previous = labels.insert(name.clone(), code.len());
                    assert!(previous.is_none(), "label {name} defined twice");
                }
                code.push(inst.clone());
            }
        }
        Self {
            code,
            labels,
            regs: [0; Reg::COUNT],
            memory: HashMap::new(),
            frames: Vec::new(),
            steps: 0,
        }
    }

    fn get(&self, reg: Reg) -> i32 {
        if reg == Reg::Zero { 0 } else { self.regs[reg.index()] }
    }

    fn set(&mut self, reg: Reg, value: i32) {
        if reg != Reg::Zero {
            self.regs[reg.index()] = value;
        }
    }

    fn load(&self, addr: i32) -> i32 {
        assert_eq!(addr % 4, 0, "unaligned load from {addr:#x}");
        *self.memory.get(&addr).unwrap_or_else(|| panic!("load from uninitialised {addr:#x}"))
    }

    fn store(&mut self, addr: i32, value: i32) {
        assert_eq!(addr % 4, 0, "unaligned store to {addr:#x}");
        self.memory.insert(addr, value);
    }

    fn target(&self, label: &str) -> usize {
        *self.labels.get(label).unwrap_or_else(|| panic!("unknown label {label}"))
    }

    fn callee_saved(&self) -> Vec<i32> {
        let mut regs: Vec<i32> = CallingConvention::CALLEE_SAVED.iter().map(|&r| self.get(r)).collect();
        regs.push(self.get(Reg::S0));
        regs
    }

    /// Call `entry` with `args` and return the value left in `a0`.
    pub fn run(&mut self, entry: &str, args: &[i32]) -> i32 {
        self.regs = [0; Reg::COUNT];
        self.frames.clear();
        self.steps = 0;
        self.set(Reg::Sp, STACK_TOP);
        self.set(Reg::Ra, HALT);
        for (i, &arg) in args.iter().enumerate() {
            match CallingConvention::PARAM_REGS.get(i) {
                Some(&reg) => self.set(reg, arg),
                None => {
                    let offset = CallingConvention::stack_param_offset(i).unwrap();
                    self.store(STACK_TOP + offset, arg);
                }
            }
        }
        self.frames.push((self.callee_saved(), STACK_TOP));

        let mut pc = self.target(entry);
        loop {
            self.steps += 1;
            assert!(self.steps < STEP_LIMIT, "step limit exceeded");
            let inst = self.code[pc].clone();
            let mut next = pc + 1;

            match inst {
                AsmInst::Add(rd, a, b) => self.set(rd, self.get(a).wrapping_add(self.get(b))),
                AsmInst::Sub(rd, a, b) => self.set(rd, self.get(a).wrapping_sub(self.get(b))),
                AsmInst::Mul(rd, a, b) => self.set(rd, self.get(a).wrapping_mul(self.get(b))),
                AsmInst::Div(rd, a, b) => {
                    let (x, y) = (self.get(a), self.get(b));
                    self.set(rd, if y == 0 { -1 } else { x.wrapping_div(y) });
                }
                AsmInst::Rem(rd, a, b) => {
                    let (x, y) = (self.get(a), self.get(b));
                    self.set(rd, if y == 0 { x } else { x.wrapping_rem(y) });
                }
                AsmInst::And(rd, a, b) => self.set(rd, self.get(a) & self.get(b)),
                AsmInst::Or(rd, a, b) => self.set(rd, self.get(a) | self.get(b)),
                AsmInst::Slt(rd, a, b) => self.set(rd, (self.get(a) < self.get(b)) as i32),
                AsmInst::Sgt(rd, a, b) => self.set(rd, (self.get(a) > self.get(b)) as i32),
                AsmInst::Addi(rd, a, imm) => self.set(rd, self.get(a).wrapping_add(imm)),
                AsmInst::Li(rd, imm) => self.set(rd, imm),
                AsmInst::Mv(rd, a) => self.set(rd, self.get(a)),
                AsmInst::Neg(rd, a) => self.set(rd, self.get(a).wrapping_neg()),
                AsmInst::Not(rd, a) => self.set(rd, !self.get(a)),
                AsmInst::Seqz(rd, a) => self.set(rd, (self.get(a) == 0) as i32),
                AsmInst::Snez(rd, a) => self.set(rd, (self.get(a) != 0) as i32),
                AsmInst::Lw(rd, offset, base) => {
                    let value = self.load(self.get(base).wrapping_add(offset));
                    self.set(rd, value);
                }
                AsmInst::Sw(rs, offset, base) => {
                    self.store(self.get(base).wrapping_add(offset), self.get(rs));
                }
                AsmInst::J(label) => next = self.target(&label),
                AsmInst::Beqz(rs, label) => {
                    if self.get(rs) == 0 {
                        next = self.target(&label);
                    }
                }
                AsmInst::Bnez(rs, label) => {
                    if self.get(rs) != 0 {
                        next = self.target(&label);
                    }
                }
                AsmInst::Call(label) => {
                    self.frames.push((self.callee_saved(), self.get(Reg::Sp)));
                    self.set(Reg::Ra, next as i32);
                    next = self.target(&label);
                }
                AsmInst::Ret => {
                    let (saved, sp) = self.frames.pop().expect("return without call");
                    assert_eq!(self.callee_saved(), saved, "callee-saved registers not preserved");
                    assert_eq!(self.get(Reg::Sp), sp, "stack pointer not restored");

                    let ra = self.get(Reg::Ra);
                    if ra == HALT {
                        return self.get(Reg::A0);
                    }
                    for reg in CallingConvention::CALLER_SAVED {
                        if reg != CallingConvention::RETURN_REG {
                            self.set(reg, CLOBBER);
                        }
                    }
                    next = ra as usize;
                }
                AsmInst::Label(_) | AsmInst::Comment(_) => {}
            }

            pc = next;
        }
    }
}
