//! Tick simulation.
//!
//! A tick evaluates every combinator against the previous tick's values of
//! its input networks and writes the summed results into each network's next
//! slot of the value ring. Combinators therefore add exactly one tick of
//! latency, as in the game.

use std::borrow::Cow;

use combinet_core::id::NetworkId;
use log::trace;

use crate::arithmetic::{AriComData, AriLeft, AriOutput, AriRight};
use crate::constant::ConstComData;
use crate::decider::{DeciComData, DeciLeft, DeciOutputType, DeciRight};
use crate::error::GraphError;
use crate::network::{Circuit, Source, SourceKind};
use crate::signal::Signal;
use crate::{SignalSet, add_signal, prune, sum_sets};

// ---------------------------------------------------------------------------
// Circuit stepping
// ---------------------------------------------------------------------------

impl Circuit {
    /// Advance the simulation by one tick.
    pub fn tick(&mut self) -> Result<(), GraphError> {
        if self.is_building() {
            return Err(GraphError::NotCompiled);
        }
        let len = self.history_len;
        let last = (self.sim_index - 1) % len;
        let next = self.sim_index % len;

        let mut results = Vec::with_capacity(self.order.len());
        for &index in &self.order {
            let mut out = SignalSet::new();
            for &id in &self.networks[index].sources {
                let source = &self.sources[id.0 as usize];
                let input = self.input_values(source, last);
                evaluate(&source.kind, &input, &mut out);
            }
            prune(&mut out);
            results.push((index, out));
        }
        for (index, values) in results {
            self.networks[index].values[next] = values;
        }

        self.sim_index = if self.sim_index >= len { 1 } else { self.sim_index + 1 };
        self.ticks += 1;
        trace!("tick {} done, ring slot {}", self.ticks, next);
        Ok(())
    }

    /// What `source` sees on its inputs: red and green summed.
    fn input_values(&self, source: &Source, slot: usize) -> Cow<'_, SignalSet> {
        let read = |id: Option<NetworkId>| {
            id.map(|id| &self.networks[self.lookup[id.0 as usize] as usize].values[slot])
        };
        match (read(source.red_input), read(source.green_input)) {
            (Some(red), Some(green)) => Cow::Owned(sum_sets(red, green)),
            (Some(values), None) | (None, Some(values)) => Cow::Borrowed(values),
            (None, None) => Cow::Owned(SignalSet::new()),
        }
    }
}

// ---------------------------------------------------------------------------
// Combinator evaluation
// ---------------------------------------------------------------------------

/// Add the output of one combinator, given its input, to `out`.
pub fn evaluate(kind: &SourceKind, input: &SignalSet, out: &mut SignalSet) {
    match kind {
        SourceKind::Constant(data) => evaluate_constant(data, out),
        SourceKind::Decider(data) => evaluate_decider(data, input, out),
        SourceKind::Arithmetic(data) => evaluate_arithmetic(data, input, out),
    }
}

fn read(input: &SignalSet, signal: Signal) -> i32 {
    input.get(&signal).copied().unwrap_or(0)
}

pub fn evaluate_constant(data: &ConstComData, out: &mut SignalSet) {
    for (_, value) in data.filled() {
        add_signal(out, value.signal, value.count);
    }
}

pub fn evaluate_arithmetic(data: &AriComData, input: &SignalSet, out: &mut SignalSet) {
    let right = match data.right {
        AriRight::Constant(v) => v,
        AriRight::Signal(s) => read(input, s),
    };
    let apply = |left: i32| data.mode.apply(left, right);
    match (data.left, data.output) {
        (AriLeft::Constant(v), AriOutput::Signal(o)) => add_signal(out, o, apply(v)),
        (AriLeft::Signal(s), AriOutput::Signal(o)) => add_signal(out, o, apply(read(input, s))),
        (AriLeft::Each, AriOutput::Signal(o)) => {
            let total = input
                .values()
                .fold(0i32, |acc, &v| acc.wrapping_add(apply(v)));
            add_signal(out, o, total);
        }
        (AriLeft::Each, AriOutput::Each) => {
            for (&signal, &v) in input {
                add_signal(out, signal, apply(v));
            }
        }
        // Unreachable through the algebra; the game emits nothing.
        (_, AriOutput::Each) => {}
    }
}

pub fn evaluate_decider(data: &DeciComData, input: &SignalSet, out: &mut SignalSet) {
    let right = match data.right {
        DeciRight::Constant(v) => v,
        DeciRight::Signal(s) => read(input, s),
    };
    let holds = |v: i32| data.mode.compare(v, right);

    if data.left == DeciLeft::Each {
        let passing = input.iter().filter(|&(_, &v)| holds(v));
        match (data.output, data.value) {
            (DeciOutputType::Each, None) => {
                for (&signal, &v) in passing {
                    add_signal(out, signal, v);
                }
            }
            (DeciOutputType::Each, Some(c)) => {
                for (&signal, _) in passing {
                    add_signal(out, signal, c);
                }
            }
            (DeciOutputType::Signal(o), None) => {
                let total = passing.fold(0i32, |acc, (_, &v)| acc.wrapping_add(v));
                add_signal(out, o, total);
            }
            (DeciOutputType::Signal(o), Some(c)) => {
                let count = passing.count() as i32;
                add_signal(out, o, count.wrapping_mul(c));
            }
            (DeciOutputType::All, _) => {}
        }
        return;
    }

    let condition = match data.left {
        DeciLeft::Signal(s) => holds(read(input, s)),
        DeciLeft::Any => input.values().any(|&v| holds(v)),
        DeciLeft::All => input.values().all(|&v| holds(v)),
        DeciLeft::Each => false,
    };
    if !condition {
        return;
    }
    match data.output {
        DeciOutputType::All => {
            for (&signal, &v) in input {
                add_signal(out, signal, data.value.unwrap_or(v));
            }
        }
        DeciOutputType::Signal(o) => add_signal(out, o, data.value.unwrap_or(read(input, o))),
        DeciOutputType::Each => {}
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arithmetic::{AriMode, AriOperand, On};
    use crate::color::Red;
    use crate::constant::ConstCom;
    use crate::decider::{DeciMode, DeciOperand, DeciOutputTarget, INPUT, Then};
    use crate::wildcard::{All, Any, Each};
    use crate::test_utils::*;

    fn signals_with(items: &[(Signal, i32)]) -> SignalSet {
        items.iter().copied().collect()
    }

    fn run_decider(com: crate::DeciCom, input: &SignalSet) -> SignalSet {
        let mut out = SignalSet::new();
        evaluate_decider(com.data(), input, &mut out);
        prune(&mut out);
        out
    }

    fn run_arithmetic(com: crate::AriCom, input: &SignalSet) -> SignalSet {
        let mut out = SignalSet::new();
        evaluate_arithmetic(com.data(), input, &mut out);
        prune(&mut out);
        out
    }

    fn mixed() -> SignalSet {
        signals_with(&[(coal(), 10), (iron_plate(), -5), (signal_a(), 3)])
    }

    // -- decider --------------------------------------------------------------

    #[test]
    fn signal_condition_outputs() {
        let input = mixed();
        let copy = run_decider(coal().gt(5).then(iron_plate().out(INPUT)), &input);
        assert_eq!(copy, signals_with(&[(iron_plate(), -5)]));
        let one = run_decider(coal().gt(5).then(signal_b().out(1)), &input);
        assert_eq!(one, signals_with(&[(signal_b(), 1)]));
        let none = run_decider(coal().lt(5).then(signal_b().out(1)), &input);
        assert!(none.is_empty());
    }

    #[test]
    fn missing_signal_reads_zero() {
        let input = mixed();
        let out = run_decider(copper_plate().eq(0).then(signal_b().out(2)), &input);
        assert_eq!(out, signals_with(&[(signal_b(), 2)]));
    }

    #[test]
    fn right_signal_operand() {
        let input = mixed();
        let out = run_decider(signal_a().lt(coal()).then(All.out(INPUT)), &input);
        assert_eq!(out, input);
        let out = run_decider(signal_a().lt(coal()).then(All.out(1)), &input);
        assert_eq!(
            out,
            signals_with(&[(coal(), 1), (iron_plate(), 1), (signal_a(), 1)])
        );
    }

    #[test]
    fn any_and_all_conditions() {
        let input = mixed();
        assert!(!run_decider(Any.lt(-4).then(signal_b().out(1)), &input).is_empty());
        assert!(run_decider(Any.lt(-5).then(signal_b().out(1)), &input).is_empty());
        assert!(run_decider(All.gt(0).then(signal_b().out(1)), &input).is_empty());
        assert!(!run_decider(All.gt(-6).then(signal_b().out(1)), &input).is_empty());
    }

    #[test]
    fn all_is_vacuously_true_and_any_false_on_empty_input() {
        let empty = SignalSet::new();
        let all = run_decider(All.gt(0).then(signal_b().out(1)), &empty);
        assert_eq!(all, signals_with(&[(signal_b(), 1)]));
        assert!(run_decider(Any.gt(0).then(signal_b().out(1)), &empty).is_empty());
    }

    #[test]
    fn each_outputs() {
        let input = mixed();
        let pass = run_decider(Each.gt(0).then(Each.out(INPUT)), &input);
        assert_eq!(pass, signals_with(&[(coal(), 10), (signal_a(), 3)]));
        let flag = run_decider(Each.gt(0).then(Each.out(7)), &input);
        assert_eq!(flag, signals_with(&[(coal(), 7), (signal_a(), 7)]));
        let sum = run_decider(Each.gt(0).then(signal_b().out(INPUT)), &input);
        assert_eq!(sum, signals_with(&[(signal_b(), 13)]));
        let count = run_decider(Each.ne(0).then(signal_b().out(2)), &input);
        assert_eq!(count, signals_with(&[(signal_b(), 6)]));
    }

    #[test]
    fn each_against_signal_right() {
        let input = mixed();
        let out = run_decider(Each.ge(signal_a()).then(Each.out(INPUT)), &input);
        assert_eq!(out, signals_with(&[(coal(), 10), (signal_a(), 3)]));
    }

    // -- arithmetic -----------------------------------------------------------

    #[test]
    fn arithmetic_signal_and_constant_left() {
        let input = mixed();
        let out = run_arithmetic((coal() * iron_plate()).on(signal_b()), &input);
        assert_eq!(out, signals_with(&[(signal_b(), -50)]));
        let out = run_arithmetic((100 - coal()).on(signal_b()), &input);
        assert_eq!(out, signals_with(&[(signal_b(), 90)]));
        let out = run_arithmetic(AriOperand::pow(2, signal_a()).on(signal_b()), &input);
        assert_eq!(out, signals_with(&[(signal_b(), 8)]));
    }

    #[test]
    fn arithmetic_each_to_signal_sums() {
        let input = mixed();
        let out = run_arithmetic((Each * 2).on(signal_b()), &input);
        assert_eq!(out, signals_with(&[(signal_b(), 16)]));
    }

    #[test]
    fn arithmetic_each_to_each() {
        let input = mixed();
        let out = run_arithmetic((Each.with_op(AriMode::Rem)).against(3).on(Each), &input);
        assert_eq!(out, signals_with(&[(coal(), 1), (iron_plate(), -2)]));
    }

    #[test]
    fn arithmetic_each_min_divided_by_minus_one() {
        let input = signals_with(&[(signal_a(), i32::MIN)]);
        let out = run_arithmetic((Each / -1).on(Each), &input);
        assert!(out.is_empty());
    }

    // -- circuit --------------------------------------------------------------

    #[test]
    fn one_tick_latency_per_combinator() {
        let mut circuit = Circuit::new();
        let c = circuit
            .constant(ConstCom::new([coal().count(4)]).unwrap().r())
            .unwrap();
        let w = circuit.wire(c).unwrap();
        let first = circuit.feed(w, (Each * 2).on(Each).r()).unwrap();
        let w2 = circuit.wire(first).unwrap();
        let second = circuit.feed(w2, (Each + 1).on(Each).r()).unwrap();
        circuit.mark_as_output(&second).unwrap();
        circuit.prime(4).unwrap();

        assert!(circuit.last_values(&second).unwrap().is_empty());
        circuit.tick().unwrap();
        assert_eq!(circuit.last_values(&w2).unwrap(), signals_with(&[(coal(), 8)]));
        assert!(circuit.last_values(&second).unwrap().is_empty());
        circuit.tick().unwrap();
        assert_eq!(circuit.last_values(&second).unwrap(), signals_with(&[(coal(), 9)]));
    }

    #[test]
    fn red_and_green_inputs_are_summed() {
        let mut circuit = Circuit::new();
        let red = circuit
            .constant(ConstCom::new([coal().count(4)]).unwrap().r())
            .unwrap();
        let green = circuit
            .constant(ConstCom::new([coal().count(6), signal_a().count(1)]).unwrap().g())
            .unwrap();
        let both = circuit.wire(red + green).unwrap();
        let out = circuit
            .feed(both, coal().with_mode(DeciMode::Eq).against(10).then(All.out(INPUT)).r())
            .unwrap();
        circuit.mark_as_output(&out).unwrap();
        circuit.prime(2).unwrap();
        circuit.tick().unwrap();
        assert_eq!(
            circuit.last_values(&out).unwrap(),
            signals_with(&[(coal(), 10), (signal_a(), 1)])
        );
    }

    #[test]
    fn history_ring_wraps() {
        let mut circuit = Circuit::new();
        let w = circuit.loop_wire::<Red>().unwrap();
        let out = circuit.feed(w, (signal_x() + 1).on(signal_x()).r()).unwrap();
        circuit.close_loop(w, out).unwrap();
        circuit.mark_as_output(&out).unwrap();
        circuit.prime(3).unwrap();
        for _ in 0..7 {
            circuit.tick().unwrap();
        }
        assert_eq!(circuit.ticks(), 7);
        assert_eq!(circuit.last_values(&out).unwrap()[&signal_x()], 7);
        assert_eq!(circuit.history(&out, 1).unwrap()[&signal_x()], 6);
        assert_eq!(circuit.history(&out, 2).unwrap()[&signal_x()], 5);
        assert!(circuit.history(&out, 3).is_err());
    }

    #[test]
    fn tick_requires_priming() {
        let mut circuit = Circuit::new();
        assert_eq!(circuit.tick().unwrap_err(), GraphError::NotCompiled);
    }
}
