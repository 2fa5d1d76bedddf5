//! Basic Block Management
//!
//! Defines basic blocks - maximal runs of instructions with a single entry
//! and a single exit.

use std::collections::BTreeSet;
use tacc_common::{Label, Temp};
use crate::tac::{InstrKind, TacInstr};
use super::loc::Loc;

/// How control leaves a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// Falls through into the lexically next block
    Continuous,
    EndByJump,
    EndByCondJump,
    EndByReturn,
}

impl BlockKind {
    /// Block kind implied by the block's last instruction
    pub fn from_terminator(kind: InstrKind) -> Self {
        match kind {
            InstrKind::Jmp => BlockKind::EndByJump,
            InstrKind::CondJmp => BlockKind::EndByCondJump,
            InstrKind::Ret => BlockKind::EndByReturn,
            InstrKind::Label | InstrKind::Seq => BlockKind::Continuous,
        }
    }
}

/// Basic Block - a sequence of instructions with a single entry and exit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicBlock {
    pub id: usize,
    pub kind: BlockKind,
    pub label: Option<Label>,
    pub locs: Vec<Loc>,

    /// Temporaries live on entry to the block
    pub live_in: BTreeSet<Temp>,

    /// Temporaries live on exit from the block
    pub live_out: BTreeSet<Temp>,
}

impl BasicBlock {
    pub fn new(id: usize, kind: BlockKind, label: Option<Label>, instrs: Vec<TacInstr>) -> Self {
        Self {
            id,
            kind,
            label,
            locs: instrs.into_iter().map(Loc::new).collect(),
            live_in: BTreeSet::new(),
            live_out: BTreeSet::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.locs.is_empty()
    }

    /// The control transfer ending this block, if it has one
    pub fn terminator(&self) -> Option<&Loc> {
        match self.kind {
            BlockKind::Continuous => None,
            _ => self.locs.last(),
        }
    }

    /// Jump target of the terminator
    pub fn jump_target(&self) -> Option<&Label> {
        self.terminator().and_then(|loc| loc.instr.jump_target())
    }

    /// Locations in program order
    pub fn all_seq(&self) -> impl Iterator<Item = &Loc> {
        self.locs.iter()
    }
}
