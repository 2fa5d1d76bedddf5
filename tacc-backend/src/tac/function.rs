//! TAC functions and programs

use serde::{Deserialize, Serialize};
use std::fmt;
use tacc_common::{Label, Temp};
use super::instructions::TacInstr;

/// One function in three-address code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TacFunc {
    /// Entry label, also the exported symbol name
    pub name: Label,

    /// Parameter temporaries in declaration order
    #[serde(default)]
    pub params: Vec<Temp>,

    /// Instruction stream; the entry label is implicit
    pub instrs: Vec<TacInstr>,
}

impl TacFunc {
    pub fn new(name: Label, params: Vec<Temp>, instrs: Vec<TacInstr>) -> Self {
        Self { name, params, instrs }
    }

    /// Size of the function's temporary universe
    pub fn temp_count(&self) -> usize {
        self.params
            .iter()
            .copied()
            .chain(self.instrs.iter().filter_map(TacInstr::max_temp))
            .max()
            .map_or(0, |t| t.index() + 1)
    }

    /// Label of the shared epilogue every return jumps to
    pub fn exit_label(&self) -> Label {
        Label(format!("{}_exit", self.name))
    }
}

impl fmt::Display for TacFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FUNCTION<{}>(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{param}")?;
        }
        writeln!(f, "):")?;
        for instr in &self.instrs {
            match instr {
                TacInstr::Mark { .. } => writeln!(f, "{instr}")?,
                _ => writeln!(f, "    {instr}")?,
            }
        }
        Ok(())
    }
}

/// A whole program
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TacProg {
    pub funcs: Vec<TacFunc>,
}

impl TacProg {
    pub fn new(funcs: Vec<TacFunc>) -> Self {
        Self { funcs }
    }

    /// Parse a program from its JSON form
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for TacProg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, func) in self.funcs.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{func}")?;
        }
        Ok(())
    }
}
