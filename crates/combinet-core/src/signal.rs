//! Signal namespaces and descriptions.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Signal kind
// ---------------------------------------------------------------------------

/// Namespace a signal lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Item,
    Fluid,
    Virtual,
}

impl SignalKind {
    /// The `type` string used in blueprint JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            SignalKind::Item => "item",
            SignalKind::Fluid => "fluid",
            SignalKind::Virtual => "virtual",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Description
// ---------------------------------------------------------------------------

/// Everything known about one signal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignalDescription {
    /// Name used from Rust code, e.g. `iron_plate` or `A`.
    pub code_name: String,
    /// Name the game expects, e.g. `iron-plate` or `signal-A`.
    pub game_name: String,
    pub kind: SignalKind,
    /// Position inside its namespace.
    pub index: u32,
}

// ===========================================================================
// Tests
// ===========================================================================
