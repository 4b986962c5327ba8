//! Fixtures for circuit tests and benchmarks: signal shortcuts resolved
//! against the bundled registry, literal signal sets, and a few stock
//! circuits (a tick counter, parallel arithmetic chains).
//!
//! Helpers panic on failure; they only ever see known-good input.

use crate::arithmetic::On;
use crate::color::{Red, RedGreen};
use crate::constant::ConstCom;
use crate::decider::{DeciCom, DeciOperand, DeciOutputTarget, INPUT, Then};
use crate::network::{Circuit, Connector, Wire};
use crate::signal::Signal;
use crate::wildcard::Each;
use crate::{SignalSet, add_signal};

// ===========================================================================
// Signals
// ===========================================================================

pub fn item(name: &str) -> Signal {
    Signal::item(name).unwrap_or_else(|e| panic!("{e}"))
}

pub fn fluid(name: &str) -> Signal {
    Signal::fluid(name).unwrap_or_else(|e| panic!("{e}"))
}

pub fn virt(name: &str) -> Signal {
    Signal::virtual_signal(name).unwrap_or_else(|e| panic!("{e}"))
}

pub fn coal() -> Signal {
    item("coal")
}
pub fn iron_plate() -> Signal {
    item("iron_plate")
}
pub fn copper_plate() -> Signal {
    item("copper_plate")
}
pub fn water() -> Signal {
    fluid("water")
}
pub fn signal_a() -> Signal {
    virt("A")
}
pub fn signal_b() -> Signal {
    virt("B")
}
pub fn signal_c() -> Signal {
    virt("C")
}
pub fn signal_x() -> Signal {
    virt("X")
}

// ===========================================================================
// Signal sets
// ===========================================================================

/// Build a signal set, summing repeated signals and dropping zeros.
pub fn signals(values: &[(Signal, i32)]) -> SignalSet {
    let mut set = SignalSet::new();
    for &(signal, value) in values {
        add_signal(&mut set, signal, value);
    }
    crate::prune(&mut set);
    set
}

// ===========================================================================
// Combinators
// ===========================================================================

/// Constant combinator emitting `values` on both colors.
pub fn constant_of(circuit: &mut Circuit, values: &[(Signal, i32)]) -> Connector<RedGreen> {
    let com = ConstCom::new(values.iter().map(|&(s, v)| s.count(v)))
        .expect("at most 18 constant signals");
    circuit.constant(com).expect("circuit still building")
}

/// Forwards every positive signal unchanged.
pub fn pass_positive() -> DeciCom {
    Each.gt(0).then(Each.out(INPUT))
}

/// A red self-loop on `signal_x` that counts ticks. Returns the loop wire.
pub fn counter(circuit: &mut Circuit) -> Wire<Red> {
    let wire = circuit.loop_wire::<Red>().expect("circuit still building");
    let out = circuit
        .feed(wire, (signal_x() + 1).on(signal_x()).r())
        .expect("circuit still building");
    circuit.close_loop(wire, out).expect("fresh loop")
}

// ===========================================================================
// Circuit builders
// ===========================================================================

/// `width` parallel chains of `depth` arithmetic combinators, each fed by its
/// own constant combinator. Every chain end is a main output.
pub fn build_chains(width: usize, depth: usize) -> Circuit {
    let mut circuit = Circuit::new();
    for i in 0..width {
        let seed = constant_of(&mut circuit, &[(coal(), i as i32 + 1), (signal_a(), 1)]);
        let mut wire = circuit.wire(seed.r()).expect("circuit still building");
        for _ in 0..depth {
            let out = circuit
                .feed(wire, (Each * 3).on(Each).r())
                .expect("circuit still building");
            wire = circuit.wire(out).expect("circuit still building");
        }
        circuit.mark_as_output(&wire).expect("circuit still building");
    }
    circuit
}
