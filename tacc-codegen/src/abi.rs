//! RV32 ABI Implementation
//!
//! This module implements the Application Binary Interface (ABI) for the
//! target, including the calling convention, stack frame layout, and
//! function prologue/epilogue generation.

use crate::asm::{AsmInst, Reg};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
    #[error("Too many call arguments: {0} (maximum: {1})")]
    TooManyArguments(usize, usize),

    #[error("Stack frame too large: {0} bytes")]
    FrameTooLarge(i32),
}

/// Size of a machine word in bytes
pub const WORD_SIZE: i32 = 4;

/// RV32 Calling Convention
///
/// Register Usage:
/// - zero: hard-wired zero
/// - ra: return address
/// - sp: stack pointer, s0: frame pointer
/// - a0-a7: function arguments, a0 also carries the return value
/// - t0-t6: temporaries (caller-saved)
/// - s1-s11: saved registers (callee-saved)
pub struct CallingConvention;

impl CallingConvention {
    /// Maximum number of parameters that can be passed in registers
    pub const MAX_REG_PARAMS: usize = 8;

    /// Registers used for passing parameters
    pub const PARAM_REGS: [Reg; 8] = [
        Reg::A0, Reg::A1, Reg::A2, Reg::A3, Reg::A4, Reg::A5, Reg::A6, Reg::A7,
    ];

    /// Registers that must be saved by callee
    pub const CALLEE_SAVED: [Reg; 11] = [
        Reg::S1, Reg::S2, Reg::S3, Reg::S4, Reg::S5, Reg::S6,
        Reg::S7, Reg::S8, Reg::S9, Reg::S10, Reg::S11,
    ];

    /// Registers that can be freely used by callee (caller-saved)
    pub const CALLER_SAVED: [Reg; 15] = [
        Reg::T0, Reg::T1, Reg::T2, Reg::T3, Reg::T4, Reg::T5, Reg::T6,
        Reg::A0, Reg::A1, Reg::A2, Reg::A3, Reg::A4, Reg::A5, Reg::A6, Reg::A7,
    ];

    /// Registers handed to the register allocator, in preference order
    pub const ALLOCATABLE: [Reg; 26] = [
        Reg::T0, Reg::T1, Reg::T2, Reg::T3, Reg::T4, Reg::T5, Reg::T6,
        Reg::A0, Reg::A1, Reg::A2, Reg::A3, Reg::A4, Reg::A5, Reg::A6, Reg::A7,
        Reg::S1, Reg::S2, Reg::S3, Reg::S4, Reg::S5, Reg::S6,
        Reg::S7, Reg::S8, Reg::S9, Reg::S10, Reg::S11,
    ];

    /// Register holding a function's return value
    pub const RETURN_REG: Reg = Reg::A0;

    /// Stack registers
    pub const STACK_PTR: Reg = Reg::Sp;
    pub const FRAME_PTR: Reg = Reg::S0;

    pub fn is_caller_saved(reg: Reg) -> bool {
        Self::CALLER_SAVED.contains(&reg)
    }

    pub fn is_callee_saved(reg: Reg) -> bool {
        Self::CALLEE_SAVED.contains(&reg)
    }

    /// FP-relative offset of a parameter passed on the stack.
    ///
    /// Parameters past the register set are stored by the caller at the
    /// bottom of its frame, which is where the callee's FP points.
    pub fn stack_param_offset(index: usize) -> Option<i32> {
        index
            .checked_sub(Self::MAX_REG_PARAMS)
            .map(|i| i as i32 * WORD_SIZE)
    }
}

/// Stack Frame Layout
///
/// The frame pointer (s0) holds the value SP had on entry; the frame grows
/// downward from it:
///
/// ```text
///   FP - 4             saved return address
///   FP - 8             saved frame pointer
///   FP - 12 .. FP - 52 one fixed cell per callee-saved register s1..s11
///   FP - 56 - 4*k      temporary slot k
/// ```
///
/// The total size is rounded up to 16 bytes.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Number of 4-byte temporary slots
    pub slot_count: u32,

    /// Callee-saved registers that need to be preserved
    pub saved_regs: Vec<Reg>,

    /// Whether this function makes calls (needs to save RA)
    pub has_calls: bool,

    /// Total frame size in bytes (computed)
    pub total_size: i32,
}

impl Frame {
    /// Bytes reserved above the slot area
    const HEADER_SIZE: i32 = 2 * WORD_SIZE + CallingConvention::CALLEE_SAVED.len() as i32 * WORD_SIZE;

    /// Largest frame whose offsets still fit a 12-bit signed immediate
    pub const MAX_SIZE: i32 = 2032;

    /// Create a new frame with the given number of temporary slots
    pub fn new(slot_count: u32) -> Self {
        let mut frame = Self {
            slot_count,
            saved_regs: Vec::new(),
            has_calls: false,
            total_size: 0,
        };
        frame.compute_frame_size();
        frame
    }

    /// Mark that this function makes calls
    pub fn set_has_calls(&mut self, has_calls: bool) {
        self.has_calls = has_calls;
    }

    /// Add a register that needs to be saved
    pub fn add_saved_reg(&mut self, reg: Reg) {
        if CallingConvention::is_callee_saved(reg) && !self.saved_regs.contains(&reg) {
            self.saved_regs.push(reg);
        }
    }

    /// FP-relative offset of temporary slot `index`
    pub fn slot_offset(index: u32) -> i32 {
        -(Self::HEADER_SIZE + (index as i32 + 1) * WORD_SIZE)
    }

    /// FP-relative offset of the save cell for a callee-saved register
    pub fn save_offset(reg: Reg) -> Option<i32> {
        CallingConvention::CALLEE_SAVED
            .iter()
            .position(|&r| r == reg)
            .map(|i| -(3 + i as i32) * WORD_SIZE)
    }

    /// Compute the total frame size
    fn compute_frame_size(&mut self) {
        let raw = Self::HEADER_SIZE + self.slot_count as i32 * WORD_SIZE;
        self.total_size = (raw + 15) & !15;
    }

    fn check_size(&self) -> Result<(), AbiError> {
        if self.total_size > Self::MAX_SIZE {
            return Err(AbiError::FrameTooLarge(self.total_size));
        }
        Ok(())
    }

    /// Generate function prologue
    ///
    /// The prologue:
    /// 1. Allocates the frame
    /// 2. Saves return address if needed, and the old frame pointer
    /// 3. Sets up the new frame pointer
    /// 4. Saves callee registers
    pub fn gen_prologue(&self) -> Result<Vec<AsmInst>, AbiError> {
        self.check_size()?;
        let size = self.total_size;
        let sp = CallingConvention::STACK_PTR;
        let fp = CallingConvention::FRAME_PTR;
        let mut code = vec![AsmInst::Addi(sp, sp, -size)];

        if self.has_calls {
            code.push(AsmInst::Sw(Reg::Ra, size - WORD_SIZE, sp));
        }
        code.push(AsmInst::Sw(fp, size - 2 * WORD_SIZE, sp));
        code.push(AsmInst::Addi(fp, sp, size));

        for &reg in &self.saved_regs {
            if let Some(offset) = Self::save_offset(reg) {
                code.push(AsmInst::Sw(reg, offset, fp));
            }
        }

        Ok(code)
    }

    /// Generate function epilogue
    ///
    /// The epilogue:
    /// 1. Restores callee registers
    /// 2. Restores return address if saved, and the old frame pointer
    /// 3. Deallocates the frame
    /// 4. Returns to caller
    pub fn gen_epilogue(&self) -> Result<Vec<AsmInst>, AbiError> {
        self.check_size()?;
        let size = self.total_size;
        let sp = CallingConvention::STACK_PTR;
        let fp = CallingConvention::FRAME_PTR;
        let mut code = Vec::new();

        for &reg in self.saved_regs.iter().rev() {
            if let Some(offset) = Self::save_offset(reg) {
                code.push(AsmInst::Lw(reg, offset, fp));
            }
        }

        if self.has_calls {
            code.push(AsmInst::Lw(Reg::Ra, size - WORD_SIZE, sp));
        }
        code.push(AsmInst::Lw(fp, size - 2 * WORD_SIZE, sp));
        code.push(AsmInst::Addi(sp, sp, size));
        code.push(AsmInst::Ret);

        Ok(code)
    }
}
