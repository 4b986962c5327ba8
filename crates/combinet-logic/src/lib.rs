//! Combinator algebra, wire networks and the tick simulator.
//!
//! Circuits are described in two layers. The algebra ([`decider`],
//! [`arithmetic`], [`constant`]) builds combinator values whose static shape
//! rules out combinations the game rejects. A [`Circuit`] then registers those
//! values, merges their output connectors into canonical networks and, once
//! primed, ticks them.
//!
//! Signal propagation has a one-tick delay per combinator: every combinator
//! reads the previous tick's values of its input networks.

pub mod arithmetic;
pub mod color;
pub mod constant;
pub mod decider;
pub mod error;
pub mod network;
pub mod signal;
pub mod sim;
pub mod wildcard;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use arithmetic::{AriCom, AriComData, AriInput, AriLeft, AriMode, AriOperand, AriOutput, AriRight, On};
pub use color::{Color, Green, Red, RedGreen};
pub use constant::{ConstCom, ConstComData};
pub use decider::{
    Boolable, DeciCom, DeciComData, DeciInput, DeciLeft, DeciMode, DeciOperand, DeciOutput,
    DeciOutputTarget, DeciOutputType, DeciOutputValue, DeciRight, INPUT, Then,
};
pub use error::{AlgebraError, GraphError};
pub use network::{
    Circuit, Combinator, Connector, Network, NetworkFlags, NetworkHandle, Source, SourceKind, Wire,
};
pub use signal::{Signal, SignalValue};
pub use wildcard::{All, Any, Each, WildCard};

// ---------------------------------------------------------------------------
// Signal set
// ---------------------------------------------------------------------------

/// Signal -> value. Sparse: zero entries are never stored.
pub type SignalSet = BTreeMap<Signal, i32>;

/// Add `value` to `signal` with wrapping arithmetic.
pub fn add_signal(set: &mut SignalSet, signal: Signal, value: i32) {
    let entry = set.entry(signal).or_insert(0);
    *entry = entry.wrapping_add(value);
}

/// Drop entries that summed to zero.
pub fn prune(set: &mut SignalSet) {
    set.retain(|_, v| *v != 0);
}

/// Per-signal wrapping sum of two sets, pruned.
pub fn sum_sets(a: &SignalSet, b: &SignalSet) -> SignalSet {
    let mut out = a.clone();
    for (&signal, &value) in b {
        add_signal(&mut out, signal, value);
    }
    prune(&mut out);
    out
}

// ---------------------------------------------------------------------------
// Operator descriptions
// ---------------------------------------------------------------------------

/// Names of a decider or arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ModeDescription {
    pub name: &'static str,
    /// How the operator is spelled in Rust.
    pub code_syntax: &'static str,
    /// The string the game stores in blueprints.
    pub game_syntax: &'static str,
    pub index: u8,
}

// ---------------------------------------------------------------------------
// Wire color
// ---------------------------------------------------------------------------

/// Physical wire color. A red-green handle is two networks, one per color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WireColor {
    Red,
    Green,
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn sum_sets_wraps_and_prunes() {
        let a: SignalSet = [(coal(), i32::MAX), (iron_plate(), 4)].into_iter().collect();
        let b: SignalSet = [(coal(), 1), (iron_plate(), -4)].into_iter().collect();
        let sum = sum_sets(&a, &b);
        assert_eq!(sum.get(&coal()), Some(&i32::MIN));
        assert!(!sum.contains_key(&iron_plate()));
    }

    #[test]
    fn add_signal_accumulates() {
        let mut set = SignalSet::new();
        add_signal(&mut set, signal_a(), 3);
        add_signal(&mut set, signal_a(), 4);
        assert_eq!(set[&signal_a()], 7);
    }
}
