//! The three wildcard signals.

use serde::{Deserialize, Serialize};

/// Matches if any input signal satisfies the condition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Any;

/// Matches if every input signal satisfies the condition. As an output,
/// forwards every input signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct All;

/// Evaluates the combinator once per input signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Each;

/// A wildcard chosen at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WildCard {
    Any,
    All,
    Each,
}

impl WildCard {
    /// Virtual signal name used in blueprint JSON.
    pub fn game_name(self) -> &'static str {
        match self {
            WildCard::Any => "signal-anything",
            WildCard::All => "signal-everything",
            WildCard::Each => "signal-each",
        }
    }
}

impl From<Any> for WildCard {
    fn from(_: Any) -> Self {
        WildCard::Any
    }
}

impl From<All> for WildCard {
    fn from(_: All) -> Self {
        WildCard::All
    }
}

impl From<Each> for WildCard {
    fn from(_: Each) -> Self {
        WildCard::Each
    }
}
