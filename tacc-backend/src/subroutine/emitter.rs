//! Per-function frame management and instruction buffer
//!
//! Every temporary that is ever stored gets one 4-byte slot below the fixed
//! part of the frame. Parameters passed on the stack keep living in the
//! caller's outgoing-argument area.

use std::collections::HashMap;
use log::{debug, warn};
use tacc_codegen::{AsmInst, CallingConvention, Frame, Reg};
use tacc_common::{Label, Temp};
use crate::error::BackendError;
use super::info::SubroutineInfo;

/// Stack home for temporaries
pub trait FrameService {
    /// Store `reg` into the slot of `temp`, allocating the slot on first use
    fn store_to_stack(&mut self, reg: Reg, temp: Temp);

    /// Load the slot of `temp` into `reg`
    fn load_from_stack(&mut self, reg: Reg, temp: Temp);
}

/// Ordered sink for generated code
pub trait EmitSink {
    fn emit_native(&mut self, code: Vec<AsmInst>);
    fn emit_label(&mut self, label: &Label);
    fn emit_comment(&mut self, text: &str);
}

pub struct SubroutineEmitter {
    info: SubroutineInfo,

    /// FP-relative offset of each temporary's home
    offsets: HashMap<Temp, i32>,
    slot_count: u32,
    body: Vec<AsmInst>,
}

impl SubroutineEmitter {
    pub fn new(info: SubroutineInfo) -> Self {
        let offsets = info
            .params
            .iter()
            .enumerate()
            .filter_map(|(i, &param)| {
                CallingConvention::stack_param_offset(i).map(|offset| (param, offset))
            })
            .collect();

        Self { info, offsets, slot_count: 0, body: Vec::new() }
    }

    /// Number of slots handed out so far
    pub fn slot_count(&self) -> u32 {
        self.slot_count
    }

    /// Home of `temp`, if it has one
    pub fn offset_of(&self, temp: Temp) -> Option<i32> {
        self.offsets.get(&temp).copied()
    }

    fn slot_for(&mut self, temp: Temp) -> i32 {
        if let Some(&offset) = self.offsets.get(&temp) {
            return offset;
        }
        let offset = Frame::slot_offset(self.slot_count);
        self.slot_count += 1;
        self.offsets.insert(temp, offset);
        offset
    }

    /// Wrap the body in prologue and epilogue.
    ///
    /// `saved` lists the callee-saved registers the body writes; `has_calls`
    /// decides whether `ra` must be preserved.
    pub fn finish(self, saved: &[Reg], has_calls: bool) -> Result<Vec<AsmInst>, BackendError> {
        let mut frame = Frame::new(self.slot_count);
        frame.set_has_calls(has_calls);
        for &reg in saved {
            frame.add_saved_reg(reg);
        }
        debug!(
            "{}: frame of {} bytes, {} slots, saved {:?}",
            self.info.func_label, frame.total_size, self.slot_count, frame.saved_regs
        );

        let mut code = frame.gen_prologue()?;
        code.extend(self.body);
        code.push(AsmInst::Label(self.info.exit_label().to_string()));
        code.extend(frame.gen_epilogue()?);
        Ok(code)
    }
}

impl FrameService for SubroutineEmitter {
    fn store_to_stack(&mut self, reg: Reg, temp: Temp) {
        let offset = self.slot_for(temp);
        self.body.push(AsmInst::Sw(reg, offset, CallingConvention::FRAME_PTR));
    }

    fn load_from_stack(&mut self, reg: Reg, temp: Temp) {
        if !self.offsets.contains_key(&temp) {
            warn!("{}: {temp} is read before it is ever stored", self.info.func_label);
        }
        let offset = self.slot_for(temp);
        self.body.push(AsmInst::Lw(reg, offset, CallingConvention::FRAME_PTR));
    }
}

impl EmitSink for SubroutineEmitter {
    fn emit_native(&mut self, code: Vec<AsmInst>) {
        self.body.extend(code);
    }

    fn emit_label(&mut self, label: &Label) {
        self.body.push(AsmInst::Label(label.to_string()));
    }

    fn emit_comment(&mut self, text: &str) {
        self.body.push(AsmInst::Comment(text.to_string()));
    }
}
