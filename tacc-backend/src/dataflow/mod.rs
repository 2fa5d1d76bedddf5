//! Control-flow and liveness information for one function

mod basicblock;
mod builder;
mod cfg;
mod liveness;
mod loc;

pub use basicblock::{BasicBlock, BlockKind};
pub use builder::CfgBuilder;
pub use cfg::Cfg;
pub use liveness::LivenessAnalyzer;
pub use loc::Loc;
