//! Brute-force register allocator
//!
//! Allocation is block-local: every block starts with no bindings, every
//! value live after an instruction is written back to its stack slot, and
//! values are reloaded on first use inside a block. Registers never carry
//! values across block boundaries.

use std::collections::BTreeSet;
use log::{debug, trace, warn};
use tacc_codegen::{AbiError, CallingConvention, Reg};
use tacc_common::{Label, Temp};
use crate::dataflow::{BasicBlock, Cfg, Loc};
use crate::error::BackendError;
use crate::subroutine::{EmitSink, FrameService, SubroutineInfo};
use crate::tac::{Operand, TacInstr};
use crate::LoweringOptions;
use super::regfile::RegisterFile;

pub struct BruteRegAlloc {
    regs: RegisterFile,

    /// Registers holding operands of the instruction being allocated
    pinned: BTreeSet<Reg>,

    /// Where the next forced eviction starts looking
    cursor: usize,

    emit_comments: bool,
    has_calls: bool,
    spills: usize,
}

impl BruteRegAlloc {
    pub fn new(options: &LoweringOptions) -> Self {
        if let Some(limit) = options.register_limit {
            if limit < RegisterFile::MIN_ALLOCATABLE {
                warn!(
                    "register limit {limit} is too small, using {}",
                    RegisterFile::MIN_ALLOCATABLE
                );
            }
        }
        Self {
            regs: RegisterFile::new(options.register_limit),
            pinned: BTreeSet::new(),
            cursor: 0,
            emit_comments: options.emit_comments,
            has_calls: false,
            spills: 0,
        }
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.regs
    }

    /// Whether the last function allocated contains a call
    pub fn has_calls(&self) -> bool {
        self.has_calls
    }

    /// Callee-saved registers the last function wrote
    pub fn used_callee_saved(&self) -> Vec<Reg> {
        self.regs.used_callee_saved()
    }

    /// Number of live values evicted to make room in the last function
    pub fn spill_count(&self) -> usize {
        self.spills
    }

    /// Allocate registers for one function and emit its body.
    pub fn accept<E>(&mut self, cfg: &Cfg, info: &SubroutineInfo, emitter: &mut E) -> Result<(), BackendError>
    where
        E: FrameService + EmitSink,
    {
        let temp_count = cfg
            .nodes()
            .iter()
            .flat_map(|block| block.all_seq())
            .filter_map(|loc| loc.instr.max_temp())
            .chain(info.params.iter().copied())
            .max()
            .map_or(0, |temp| temp.index() + 1);

        self.regs.reset_function(temp_count);
        self.pinned.clear();
        self.cursor = 0;
        self.has_calls = false;
        self.spills = 0;
        debug!(
            "allocating {}: {} temps, {} reachable blocks",
            info.func_label,
            temp_count,
            cfg.iter().count()
        );

        for (&temp, reg) in info.params.iter().zip(CallingConvention::PARAM_REGS) {
            self.regs.bind(temp, reg);
        }

        if cfg.is_reachable(0) {
            for &temp in &cfg.block(0).live_in {
                if let Some(reg) = self.regs.binding(temp) {
                    emitter.store_to_stack(reg, temp);
                }
            }
        }

        let exit = info.exit_label();
        for block in cfg.iter() {
            if let Some(label) = &block.label {
                emitter.emit_label(label);
            }
            self.local_alloc(block, &exit, emitter)?;
        }

        debug!("{}: {} spills", info.func_label, self.spills);
        Ok(())
    }

    fn local_alloc<E>(&mut self, block: &BasicBlock, exit: &Label, emitter: &mut E) -> Result<(), BackendError>
    where
        E: FrameService + EmitSink,
    {
        self.regs.reset_block();
        trace!("block {} ({:?}), live in {:?}", block.id, block.kind, block.live_in);

        let last = block.locs.len().saturating_sub(1);
        let has_terminator = block.terminator().is_some();

        for (i, loc) in block.locs.iter().enumerate() {
            match &loc.instr {
                TacInstr::Call { dst, args, .. } => {
                    self.alloc_for_call(loc, *dst, args, exit, emitter)?;
                }
                instr => {
                    trace!("{instr}");
                    if self.emit_comments {
                        emitter.emit_comment(&instr.to_string());
                    }
                    // The jump itself is emitted after the write-backs below
                    let deferred = has_terminator && i == last;
                    self.alloc_for_loc(loc, exit, !deferred, emitter);
                }
            }

            for &temp in &loc.live_out {
                if let Some(reg) = self.regs.binding(temp) {
                    emitter.store_to_stack(reg, temp);
                }
            }
            debug_assert!(self.regs.is_consistent(), "bindings diverged after {}", loc.instr);
        }

        if let Some(loc) = block.terminator() {
            self.alloc_for_loc(loc, exit, true, emitter);
        }
        Ok(())
    }

    fn alloc_for_call<E>(
        &mut self,
        loc: &Loc,
        dst: Option<Operand>,
        args: &[Operand],
        exit: &Label,
        emitter: &mut E,
    ) -> Result<(), BackendError>
    where
        E: FrameService + EmitSink,
    {
        if args.len() > CallingConvention::MAX_REG_PARAMS {
            return Err(AbiError::TooManyArguments(args.len(), CallingConvention::MAX_REG_PARAMS).into());
        }
        let arg_temps = args
            .iter()
            .map(|&arg| require_temp(arg, &loc.instr))
            .collect::<Result<Vec<_>, _>>()?;
        let dst = dst.map(|op| require_temp(op, &loc.instr)).transpose()?;

        self.has_calls = true;
        if self.emit_comments {
            emitter.emit_comment(&loc.instr.to_string());
        }

        for reg in CallingConvention::CALLER_SAVED {
            if let Some(temp) = self.regs.occupant(reg) {
                if loc.live_in.contains(&temp) {
                    trace!("save {temp} from {reg} across call");
                    emitter.store_to_stack(reg, temp);
                }
                self.regs.unbind(temp);
            }
        }

        for (&temp, reg) in arg_temps.iter().zip(CallingConvention::PARAM_REGS) {
            self.regs.unbind(temp);
            emitter.load_from_stack(reg, temp);
            self.regs.bind(temp, reg);
        }

        let arg_regs = &CallingConvention::PARAM_REGS[..arg_temps.len()];
        let dst_regs: &[Reg] = if dst.is_some() { &[CallingConvention::RETURN_REG] } else { &[] };
        emitter.emit_native(loc.instr.to_native(dst_regs, arg_regs, exit));

        // The callee may have overwritten any of them
        for reg in CallingConvention::CALLER_SAVED {
            if let Some(temp) = self.regs.occupant(reg) {
                self.regs.unbind(temp);
            }
        }

        if let Some(dst) = dst {
            self.regs.bind(dst, CallingConvention::RETURN_REG);
            emitter.store_to_stack(CallingConvention::RETURN_REG, dst);
        }
        Ok(())
    }

    /// Resolve the operands of `loc` and, if `emit` is set, emit its native
    /// form.
    fn alloc_for_loc<E>(&mut self, loc: &Loc, exit: &Label, emit: bool, emitter: &mut E)
    where
        E: FrameService + EmitSink,
    {
        let instr = &loc.instr;
        let srcs = instr.srcs();
        let dsts = instr.dsts();

        self.pinned.clear();
        for op in srcs.iter().chain(dsts.iter()) {
            if let Operand::Reg(reg) = op {
                self.pinned.insert(*reg);
            }
        }

        let mut src_regs = Vec::with_capacity(srcs.len());
        for op in srcs {
            let reg = match op {
                Operand::Reg(reg) => reg,
                Operand::Temp(temp) => self.alloc_reg_for(temp, true, &loc.live_in, emitter),
            };
            self.pinned.insert(reg);
            src_regs.push(reg);
        }

        let mut dst_regs = Vec::with_capacity(dsts.len());
        for op in dsts {
            let reg = match op {
                Operand::Reg(reg) => reg,
                Operand::Temp(temp) => self.alloc_reg_for(temp, false, &loc.live_out, emitter),
            };
            dst_regs.push(reg);
        }
        self.pinned.clear();

        if emit {
            emitter.emit_native(instr.to_native(&dst_regs, &src_regs, exit));
        }
    }

    /// Find a register for `temp`.
    ///
    /// `live` holds the temporaries whose values must survive: the
    /// instruction's live-in set for reads, its live-out set for writes
    /// (sources are read before the destination is written).
    fn alloc_reg_for<E>(&mut self, temp: Temp, is_read: bool, live: &BTreeSet<Temp>, emitter: &mut E) -> Reg
    where
        E: FrameService + EmitSink,
    {
        if let Some(reg) = self.regs.binding(temp) {
            return reg;
        }

        let free = self.regs.allocatable().iter().copied().find(|&reg| {
            if is_read && self.pinned.contains(&reg) {
                return false;
            }
            match self.regs.occupant(reg) {
                None => true,
                Some(occupant) => !live.contains(&occupant),
            }
        });

        if let Some(reg) = free {
            trace!("allocate {temp} to {reg} (read: {is_read})");
            if self.emit_comments {
                emitter.emit_comment(&format!("allocate {temp} to {reg} (read: {is_read})"));
            }
            if is_read {
                emitter.load_from_stack(reg, temp);
            }
            self.regs.bind(temp, reg);
            return reg;
        }

        let reg = self.pick_victim(is_read);
        if let Some(victim) = self.regs.occupant(reg) {
            trace!("spill {reg} ({victim}) for {temp}");
            if self.emit_comments {
                emitter.emit_comment(&format!("spill {reg} ({victim})"));
            }
            emitter.store_to_stack(reg, victim);
            self.regs.unbind(victim);
            self.spills += 1;
        }

        if self.emit_comments {
            emitter.emit_comment(&format!("allocate {temp} to {reg} (read: {is_read})"));
        }
        self.regs.bind(temp, reg);
        if is_read {
            emitter.load_from_stack(reg, temp);
        }
        reg
    }

    /// Next unpinned pool register after the cursor
    fn pick_victim(&mut self, is_read: bool) -> Reg {
        let pool = self.regs.allocatable();
        let len = pool.len();
        let position = (0..len)
            .map(|k| (self.cursor + k) % len)
            .find(|&i| !self.pinned.contains(&pool[i]));

        let index = match position {
            Some(index) => index,
            None => {
                if is_read {
                    warn!("every register holds an operand, evicting {}", pool[self.cursor % len]);
                }
                self.cursor % len
            }
        };
        self.cursor = (index + 1) % len;
        pool[index]
    }
}

fn require_temp(op: Operand, instr: &TacInstr) -> Result<Temp, BackendError> {
    match op {
        Operand::Temp(temp) => Ok(temp),
        Operand::Reg(reg) => Err(BackendError::PhysicalOperand { reg, instr: instr.to_string() }),
    }
}
