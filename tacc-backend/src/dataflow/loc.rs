//! Instruction locations
//!
//! A `Loc` pairs one instruction with the temporaries live on either side
//! of it.

use std::collections::BTreeSet;
use tacc_common::Temp;
use crate::tac::TacInstr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loc {
    pub instr: TacInstr,

    /// Temporaries live immediately before `instr`
    pub live_in: BTreeSet<Temp>,

    /// Temporaries live immediately after `instr`
    pub live_out: BTreeSet<Temp>,
}

impl Loc {
    pub fn new(instr: TacInstr) -> Self {
        Self {
            instr,
            live_in: BTreeSet::new(),
            live_out: BTreeSet::new(),
        }
    }
}
