use tacc_common::{Label, Temp};
use crate::tac::TacFunc;

/// What the allocator needs to know about the function it is working on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubroutineInfo {
    pub func_label: Label,

    /// Parameter temporaries in declaration order
    pub params: Vec<Temp>,
}

impl SubroutineInfo {
    pub fn new(func_label: Label, params: Vec<Temp>) -> Self {
        Self { func_label, params }
    }

    pub fn of(func: &TacFunc) -> Self {
        Self::new(func.name.clone(), func.params.clone())
    }

    /// Label of the shared epilogue
    pub fn exit_label(&self) -> Label {
        Label(format!("{}_exit", self.func_label))
    }
}
