//! Basic-block builder
//!
//! Splits a function's instruction stream into basic blocks and derives the
//! control-flow edges from the block terminators.

use std::collections::HashMap;
use log::debug;
use tacc_common::Label;
use crate::error::BackendError;
use crate::tac::{InstrKind, TacFunc, TacInstr};
use super::basicblock::{BasicBlock, BlockKind};
use super::cfg::Cfg;

pub struct CfgBuilder {
    blocks: Vec<BasicBlock>,
    labels: HashMap<Label, usize>,

    /// Block under construction
    pending: Vec<TacInstr>,
    pending_label: Option<Label>,
}

impl CfgBuilder {
    /// Build the CFG of `func`.
    ///
    /// A `Mark` starts a new block and becomes that block's label; `Branch`,
    /// `CondBranch` and `Return` end the block they appear in.
    pub fn build(func: &TacFunc) -> Result<Cfg, BackendError> {
        let mut builder = Self {
            blocks: Vec::new(),
            labels: HashMap::new(),
            pending: Vec::new(),
            pending_label: None,
        };

        for instr in &func.instrs {
            match instr.kind() {
                InstrKind::Label => {
                    builder.close(BlockKind::Continuous)?;
                    if let TacInstr::Mark { label } = instr {
                        builder.pending_label = Some(label.clone());
                    }
                }
                InstrKind::Seq => builder.pending.push(instr.clone()),
                kind @ (InstrKind::Jmp | InstrKind::CondJmp | InstrKind::Ret) => {
                    builder.pending.push(instr.clone());
                    builder.close(BlockKind::from_terminator(kind))?;
                }
            }
        }
        builder.close(BlockKind::Continuous)?;

        let edges = builder.edges()?;
        debug!("{}: {} basic blocks", func.name, builder.blocks.len());
        Cfg::new(builder.blocks, edges)
    }

    /// Finish the pending block, if it has any content
    fn close(&mut self, kind: BlockKind) -> Result<(), BackendError> {
        if self.pending.is_empty() && self.pending_label.is_none() {
            return Ok(());
        }

        let id = self.blocks.len();
        let label = self.pending_label.take();
        if let Some(label) = &label {
            if self.labels.insert(label.clone(), id).is_some() {
                return Err(BackendError::DuplicateLabel(label.clone()));
            }
        }

        let instrs = std::mem::take(&mut self.pending);
        self.blocks.push(BasicBlock::new(id, kind, label, instrs));
        Ok(())
    }

    fn target_of(&self, label: &Label) -> Result<usize, BackendError> {
        self.labels
            .get(label)
            .copied()
            .ok_or_else(|| BackendError::UnknownLabel(label.clone()))
    }

    fn edges(&self) -> Result<Vec<(usize, usize)>, BackendError> {
        let mut edges = Vec::new();
        let count = self.blocks.len();

        for block in &self.blocks {
            let next = block.id + 1;
            match block.kind {
                BlockKind::Continuous => {
                    if next < count {
                        edges.push((block.id, next));
                    }
                }
                BlockKind::EndByJump => {
                    if let Some(target) = block.jump_target() {
                        edges.push((block.id, self.target_of(target)?));
                    }
                }
                BlockKind::EndByCondJump => {
                    if let Some(target) = block.jump_target() {
                        edges.push((block.id, self.target_of(target)?));
                    }
                    if next < count {
                        edges.push((block.id, next));
                    }
                }
                BlockKind::EndByReturn => {}
            }
        }

        Ok(edges)
    }
}
