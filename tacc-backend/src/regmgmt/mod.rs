//! Register Management
//!
//! - `RegisterFile` - per-register state and the temp -> register bindings
//! - `BruteRegAlloc` - liveness-driven block-local allocator that emits the
//!   final instruction stream through a `SubroutineEmitter`
//!
//! ## Invariants
//!
//! - A temporary is bound to at most one register and a register holds at
//!   most one temporary
//! - No binding survives a block boundary or a call for caller-saved
//!   registers
//! - Every value live after an instruction has an up-to-date stack copy

pub use self::brute::BruteRegAlloc;
pub use self::regfile::{RegState, RegisterFile};

mod brute;
mod regfile;
