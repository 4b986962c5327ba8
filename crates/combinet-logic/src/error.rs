//! Error types for circuit construction and simulation.

use combinet_core::id::NetworkId;

use crate::WireColor;
use crate::wildcard::WildCard;

/// A combinator whose shape the game rejects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AlgebraError {
    #[error("an `each` output requires an `each` left input")]
    EachOutputWithoutEachInput,

    #[error("an `everything` output cannot be combined with an `each` left input")]
    EverythingOutputWithEachInput,

    #[error("wildcard {wildcard:?} is not allowed as {position}")]
    WildcardNotAllowed {
        wildcard: WildCard,
        position: &'static str,
    },

    #[error("constant combinator holds at most {max} signals, got {count}")]
    TooManySignals { count: usize, max: usize },

    #[error("constant combinator slot {index} out of range (max {max})")]
    SlotOutOfRange { index: usize, max: usize },
}

/// Misuse of the network graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("circuit has been compiled; structural changes are no longer allowed")]
    NotBuilding,

    #[error("circuit has not been compiled yet")]
    NotCompiled,

    #[error("network {0:?} does not belong to this circuit")]
    UnknownNetwork(NetworkId),

    #[error("cannot merge a {left:?} network with a {right:?} network")]
    ColorMismatch { left: WireColor, right: WireColor },

    #[error("cannot merge a network with itself")]
    SelfMerge,

    #[error("cannot merge a connector that has already been turned into a wire")]
    CompletedMerge,

    #[error("network {0:?} is not a loop wire")]
    NotALoop(NetworkId),

    #[error("loop wire {0:?} has already been closed")]
    LoopAlreadyClosed(NetworkId),

    #[error("loop wire {0:?} feeds an output but was never closed")]
    UnclosedLoop(NetworkId),

    #[error("value history must hold at least 2 ticks, got {0}")]
    HistoryTooShort(usize),

    #[error("requested {ago} ticks ago but only {available} are available")]
    HistoryOutOfRange { ago: usize, available: usize },
}
