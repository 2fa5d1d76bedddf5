//! Code generation context for one function

mod emitter;
mod info;

pub use emitter::{EmitSink, FrameService, SubroutineEmitter};
pub use info::SubroutineInfo;
