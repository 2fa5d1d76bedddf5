//! Three-address code consumed by the back-end
//!
//! TAC arrives from the front-end already linearised: one instruction stream
//! per function, temporaries numbered densely, labels resolved.

mod function;
mod instructions;
mod native;
mod ops;

pub use function::{TacFunc, TacProg};
pub use instructions::{Operand, TacInstr};
pub use ops::{CondBranchOp, InstrKind, TacBinaryOp, TacUnaryOp};
