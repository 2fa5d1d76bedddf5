//! Register file model
//!
//! Tracks, for every physical register, whether it was ever written in the
//! current function and which temporary it currently holds, together with the
//! reverse temp -> register binding table.

use log::trace;
use tacc_codegen::{CallingConvention, Reg};
use tacc_common::Temp;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegState {
    /// Written at some point in the current function. Never cleared by
    /// `unbind`; read by the prologue/epilogue logic.
    pub used: bool,

    /// Holds a live binding in the current block
    pub occupied: bool,

    /// Current occupant
    pub temp: Option<Temp>,
}

#[derive(Debug, Clone)]
pub struct RegisterFile {
    states: [RegState; Reg::COUNT],

    /// Registers the allocator may hand out, in preference order
    allocatable: Vec<Reg>,

    /// Binding table indexed by temp id
    bindings: Vec<Option<Reg>>,
}

impl RegisterFile {
    /// Smallest pool that can still hold both operands of a binary instruction
    pub const MIN_ALLOCATABLE: usize = 2;

    /// Create a register file whose pool is the first `limit` allocatable
    /// registers (all of them when `limit` is `None`).
    pub fn new(limit: Option<usize>) -> Self {
        let count = limit
            .unwrap_or(CallingConvention::ALLOCATABLE.len())
            .clamp(Self::MIN_ALLOCATABLE, CallingConvention::ALLOCATABLE.len());
        Self {
            states: [RegState::default(); Reg::COUNT],
            allocatable: CallingConvention::ALLOCATABLE[..count].to_vec(),
            bindings: Vec::new(),
        }
    }

    pub fn allocatable(&self) -> &[Reg] {
        &self.allocatable
    }

    pub fn state(&self, reg: Reg) -> &RegState {
        &self.states[reg.index()]
    }

    /// Register currently holding `temp`
    pub fn binding(&self, temp: Temp) -> Option<Reg> {
        self.bindings.get(temp.index()).copied().flatten()
    }

    /// Temporary currently held in `reg`
    pub fn occupant(&self, reg: Reg) -> Option<Temp> {
        let state = self.state(reg);
        if state.occupied { state.temp } else { None }
    }

    /// Bind `temp` to `reg`, releasing whatever either side was bound to.
    pub fn bind(&mut self, temp: Temp, reg: Reg) {
        if let Some(old) = self.occupant(reg) {
            if old != temp {
                self.unbind(old);
            }
        }
        if let Some(prev) = self.binding(temp) {
            if prev != reg {
                self.release(prev);
            }
        }

        if self.bindings.len() <= temp.index() {
            self.bindings.resize(temp.index() + 1, None);
        }
        self.bindings[temp.index()] = Some(reg);

        let state = &mut self.states[reg.index()];
        state.used = true;
        state.occupied = true;
        state.temp = Some(temp);
        trace!("bind {temp} -> {reg}");
    }

    /// Drop the binding of `temp`, returning the register it held
    pub fn unbind(&mut self, temp: Temp) -> Option<Reg> {
        let reg = self.bindings.get_mut(temp.index())?.take()?;
        self.release(reg);
        trace!("unbind {temp} from {reg}");
        Some(reg)
    }

    fn release(&mut self, reg: Reg) {
        let state = &mut self.states[reg.index()];
        state.occupied = false;
        state.temp = None;
    }

    /// Forget every binding; `used` flags survive
    pub fn reset_block(&mut self) {
        for state in &mut self.states {
            state.occupied = false;
            state.temp = None;
        }
        self.bindings.iter_mut().for_each(|slot| *slot = None);
    }

    /// Start a new function with a binding table sized for `temp_count`
    /// temporaries
    pub fn reset_function(&mut self, temp_count: usize) {
        self.states = [RegState::default(); Reg::COUNT];
        self.bindings = vec![None; temp_count];
    }

    /// Current bindings, ordered by temporary
    pub fn bound(&self) -> impl Iterator<Item = (Temp, Reg)> + '_ {
        self.bindings
            .iter()
            .enumerate()
            .filter_map(|(i, reg)| reg.map(|reg| (Temp(i as u32), reg)))
    }

    /// Callee-saved registers written in this function, in save order
    pub fn used_callee_saved(&self) -> Vec<Reg> {
        CallingConvention::CALLEE_SAVED
            .iter()
            .copied()
            .filter(|reg| self.state(*reg).used)
            .collect()
    }

    /// The binding table and the per-register occupants agree
    pub fn is_consistent(&self) -> bool {
        let forward = self.bound().all(|(temp, reg)| self.occupant(reg) == Some(temp));
        let backward = Reg::ALL.iter().all(|&reg| match self.occupant(reg) {
            Some(temp) => self.binding(temp) == Some(reg),
            None => true,
        });
        forward && backward
    }
}
