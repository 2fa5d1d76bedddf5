//! Common types used throughout the compiler
//!
//! This module defines the identifiers that are shared between TAC
//! generation, the back-end passes and the driver.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Label identifier for code generation
pub type LabelId = u32;

/// Temporary variable identifier for TAC
pub type TempId = u32;

/// A virtual register produced by TAC generation.
///
/// Temporaries are numbered densely from zero within a function, so the index
/// can be used directly to address per-temporary tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Temp(pub TempId);

impl Temp {
    pub fn new(id: TempId) -> Self {
        Temp(id)
    }

    pub fn id(&self) -> TempId {
        self.0
    }

    /// Index into dense per-temporary tables
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Temp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_T{}", self.0)
    }
}

/// A jump target or function entry point
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(pub String);

impl Label {
    /// Label for a function entry
    pub fn func(name: impl Into<String>) -> Self {
        Label(name.into())
    }

    /// Label for a block inside a function
    pub fn block(id: LabelId) -> Self {
        Label(format!("_L{id}"))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Label {
    fn from(name: &str) -> Self {
        Label(name.to_string())
    }
}
