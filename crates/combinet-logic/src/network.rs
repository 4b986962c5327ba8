//! Wire networks and the circuit that owns them.
//!
//! Every combinator registered in a [`Circuit`] becomes a [`Source`] and gets
//! one fresh output network per color it drives. Merging connectors
//! coalesces networks: the pool stays dense and a separate lookup table maps
//! every [`NetworkId`] ever handed out to the pool slot of its canonical
//! network, so lookups stay O(1) after any number of merges.
//!
//! A circuit is built first, then primed once (see [`Circuit::prime`]). After
//! that only the value history changes.

use std::marker::PhantomData;
use std::ops::Add;

use bitflags::bitflags;
use combinet_core::id::{NetworkId, SourceId};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::arithmetic::{AriCom, AriComData};
use crate::color::{Color, Green, Red, RedGreen};
use crate::constant::{ConstCom, ConstComData};
use crate::decider::{DeciCom, DeciComData};
use crate::error::GraphError;
use crate::{SignalSet, WireColor, add_signal, prune};

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

bitflags! {
    /// State bits of a network.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct NetworkFlags: u8 {
        /// A wire has been taken from this network; it no longer merges as a connector.
        const COMPLETED = 0b0001;
        /// Created by [`Circuit::loop_wire`].
        const LOOP = 0b0010;
        /// Reachable backwards from a main output.
        const OUTPUT_RELEVANT = 0b0100;
        /// Marked by the user as an external tap.
        const MAIN_OUTPUT = 0b1000;
    }
}

// ---------------------------------------------------------------------------
// Network
// ---------------------------------------------------------------------------

/// A canonical signal network.
#[derive(Debug, Clone)]
pub struct Network {
    pub(crate) color: WireColor,
    pub(crate) sources: Vec<SourceId>,
    pub(crate) targets: Vec<SourceId>,
    /// Every external id that resolves to this network.
    pub(crate) inverse_lookup: Vec<NetworkId>,
    pub(crate) flags: NetworkFlags,
    /// Ring of past values, allocated when the circuit is primed.
    pub(crate) values: Vec<SignalSet>,
}

impl Network {
    fn new(id: NetworkId, color: WireColor, flags: NetworkFlags) -> Self {
        Self {
            color,
            sources: Vec::new(),
            targets: Vec::new(),
            inverse_lookup: vec![id],
            flags,
            values: Vec::new(),
        }
    }

    pub fn color(&self) -> WireColor {
        self.color
    }

    /// Combinators writing into this network, in merge order.
    pub fn sources(&self) -> &[SourceId] {
        &self.sources
    }

    /// Combinators reading from this network.
    pub fn targets(&self) -> &[SourceId] {
        &self.targets
    }

    pub fn flags(&self) -> NetworkFlags {
        self.flags
    }

    pub fn aliases(&self) -> &[NetworkId] {
        &self.inverse_lookup
    }

    /// The oldest id aliasing this network; defines registration order.
    pub fn first_id(&self) -> NetworkId {
        self.inverse_lookup
            .iter()
            .copied()
            .min()
            .unwrap_or(NetworkId(u32::MAX))
    }

    pub fn is_main_output(&self) -> bool {
        self.flags.contains(NetworkFlags::MAIN_OUTPUT)
    }

    pub fn is_output_relevant(&self) -> bool {
        self.flags.contains(NetworkFlags::OUTPUT_RELEVANT)
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Payload of a registered combinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SourceKind {
    Constant(ConstComData),
    Decider(DeciComData),
    Arithmetic(AriComData),
}

impl SourceKind {
    pub fn is_constant(&self) -> bool {
        matches!(self, SourceKind::Constant(_))
    }
}

/// A registered combinator instance.
#[derive(Debug, Clone, Serialize)]
pub struct Source {
    pub kind: SourceKind,
    pub red_input: Option<NetworkId>,
    pub green_input: Option<NetworkId>,
    pub red_output: Option<NetworkId>,
    pub green_output: Option<NetworkId>,
    pub output_relevant: bool,
}

impl Source {
    pub fn inputs(&self) -> impl Iterator<Item = NetworkId> {
        [self.red_input, self.green_input].into_iter().flatten()
    }

    pub fn outputs(&self) -> impl Iterator<Item = NetworkId> {
        [self.red_output, self.green_output].into_iter().flatten()
    }
}

/// A combinator that reads from a wire.
pub trait Combinator {
    type Color: Color;

    fn into_kind(self) -> SourceKind;
}

impl<C: Color> Combinator for DeciCom<C> {
    type Color = C;

    fn into_kind(self) -> SourceKind {
        SourceKind::Decider(*self.data())
    }
}

impl<C: Color> Combinator for AriCom<C> {
    type Color = C;

    fn into_kind(self) -> SourceKind {
        SourceKind::Arithmetic(*self.data())
    }
}

// ---------------------------------------------------------------------------
// Handles
// ---------------------------------------------------------------------------

/// Anything that names one network per color.
pub trait NetworkHandle {
    fn red(&self) -> Option<NetworkId>;
    fn green(&self) -> Option<NetworkId>;

    fn ids(&self) -> impl Iterator<Item = NetworkId> {
        [self.red(), self.green()].into_iter().flatten()
    }
}

/// An open output: can still be merged with other connectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Connector<C> {
    red: Option<NetworkId>,
    green: Option<NetworkId>,
    color: PhantomData<C>,
}

/// A closed output, usable as combinator input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Wire<C> {
    red: Option<NetworkId>,
    green: Option<NetworkId>,
    color: PhantomData<C>,
}

macro_rules! handle_impls {
    ($($handle:ident),*) => {$(
        impl<C> $handle<C> {
            fn from_parts(red: Option<NetworkId>, green: Option<NetworkId>) -> Self {
                Self {
                    red,
                    green,
                    color: PhantomData,
                }
            }
        }

        impl<C> NetworkHandle for $handle<C> {
            fn red(&self) -> Option<NetworkId> {
                self.red
            }

            fn green(&self) -> Option<NetworkId> {
                self.green
            }
        }

        impl $handle<RedGreen> {
            pub fn r(self) -> $handle<Red> {
                $handle::from_parts(self.red, None)
            }

            pub fn g(self) -> $handle<Green> {
                $handle::from_parts(None, self.green)
            }
        }

        impl Add<$handle<Green>> for $handle<Red> {
            type Output = $handle<RedGreen>;

            fn add(self, green: $handle<Green>) -> $handle<RedGreen> {
                $handle::from_parts(self.red, green.green)
            }
        }

        impl Add<$handle<Red>> for $handle<Green> {
            type Output = $handle<RedGreen>;

            fn add(self, red: $handle<Red>) -> $handle<RedGreen> {
                $handle::from_parts(red.red, self.green)
            }
        }
    )*};
}

handle_impls!(Connector, Wire);

fn pairs(
    left: &impl NetworkHandle,
    right: &impl NetworkHandle,
) -> impl Iterator<Item = (NetworkId, NetworkId)> {
    [(left.red(), right.red()), (left.green(), right.green())]
        .into_iter()
        .filter_map(|pair| match pair {
            (Some(l), Some(r)) => Some((l, r)),
            _ => None,
        })
}

// ---------------------------------------------------------------------------
// Circuit
// ---------------------------------------------------------------------------

/// Owns every network and combinator of one circuit.
#[derive(Debug, Default)]
pub struct Circuit {
    pub(crate) networks: Vec<Network>,
    /// NetworkId -> index into `networks`.
    pub(crate) lookup: Vec<u32>,
    pub(crate) sources: Vec<Source>,
    /// Pool indices in registration order, fixed at priming.
    pub(crate) order: Vec<usize>,
    /// 0 while building, then cycles through `1..=history_len`.
    pub(crate) sim_index: usize,
    pub(crate) history_len: usize,
    pub(crate) ticks: u64,
}

impl Circuit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_building(&self) -> bool {
        self.sim_index == 0
    }

    fn ensure_building(&self) -> Result<(), GraphError> {
        if self.is_building() {
            Ok(())
        } else {
            Err(GraphError::NotBuilding)
        }
    }

    pub(crate) fn index_of(&self, id: NetworkId) -> Result<usize, GraphError> {
        self.lookup
            .get(id.0 as usize)
            .map(|&i| i as usize)
            .ok_or(GraphError::UnknownNetwork(id))
    }

    /// The canonical network behind `id`.
    pub fn network(&self, id: NetworkId) -> Result<&Network, GraphError> {
        Ok(&self.networks[self.index_of(id)?])
    }

    fn network_mut(&mut self, id: NetworkId) -> Result<&mut Network, GraphError> {
        let index = self.index_of(id)?;
        Ok(&mut self.networks[index])
    }

    /// Live networks in registration order.
    pub fn networks(&self) -> Vec<&Network> {
        let mut networks: Vec<&Network> = self.networks.iter().collect();
        networks.sort_by_key(|n| n.first_id());
        networks
    }

    pub fn network_count(&self) -> usize {
        self.networks.len()
    }

    pub fn source(&self, id: SourceId) -> Option<&Source> {
        self.sources.get(id.0 as usize)
    }

    /// Combinators in registration order.
    pub fn sources(&self) -> impl Iterator<Item = (SourceId, &Source)> {
        self.sources
            .iter()
            .enumerate()
            .map(|(i, s)| (SourceId(i as u32), s))
    }

    /// True if both handles resolve to the same canonical networks.
    pub fn same_network(&self, a: &impl NetworkHandle, b: &impl NetworkHandle) -> bool {
        let resolve = |id: Option<NetworkId>| id.map(|id| self.index_of(id).ok());
        resolve(a.red()) == resolve(b.red()) && resolve(a.green()) == resolve(b.green())
    }

    // -- construction -------------------------------------------------------

    fn new_network(&mut self, color: WireColor, flags: NetworkFlags) -> NetworkId {
        let id = NetworkId(self.lookup.len() as u32);
        self.lookup.push(self.networks.len() as u32);
        self.networks.push(Network::new(id, color, flags));
        id
    }

    fn new_output(&mut self, color: WireColor, source: SourceId) -> NetworkId {
        let id = self.new_network(color, NetworkFlags::empty());
        if let Some(network) = self.networks.last_mut() {
            network.sources.push(source);
        }
        id
    }

    fn register<C: Color>(
        &mut self,
        kind: SourceKind,
        red_input: Option<NetworkId>,
        green_input: Option<NetworkId>,
    ) -> (SourceId, Connector<C>) {
        let id = SourceId(self.sources.len() as u32);
        let red_output = C::RED.then(|| self.new_output(WireColor::Red, id));
        let green_output = C::GREEN.then(|| self.new_output(WireColor::Green, id));
        self.sources.push(Source {
            kind,
            red_input,
            green_input,
            red_output,
            green_output,
            output_relevant: false,
        });
        (id, Connector::from_parts(red_output, green_output))
    }

    /// Register a constant combinator.
    pub fn constant<C: Color>(&mut self, com: ConstCom<C>) -> Result<Connector<C>, GraphError> {
        self.ensure_building()?;
        let (_, connector) = self.register(SourceKind::Constant(*com.data()), None, None);
        Ok(connector)
    }

    /// Register a decider or arithmetic combinator reading from `input`.
    pub fn feed<I, K>(&mut self, input: Wire<I>, com: K) -> Result<Connector<K::Color>, GraphError>
    where
        K: Combinator,
    {
        self.ensure_building()?;
        for id in input.ids() {
            self.index_of(id)?;
        }
        let (source, connector) = self.register(com.into_kind(), input.red, input.green);
        for id in input.ids() {
            self.network_mut(id)?.targets.push(source);
        }
        Ok(connector)
    }

    /// Register a combinator reading a red-green connector directly.
    ///
    /// Only the red half is wired to the input, so both halves must carry
    /// the same signals, as a constant combinator's do. The connector stays
    /// open and can still be merged.
    pub fn feed_connector<K>(
        &mut self,
        connector: Connector<RedGreen>,
        com: K,
    ) -> Result<Connector<K::Color>, GraphError>
    where
        K: Combinator,
    {
        self.ensure_building()?;
        if let Some(id) = connector.red {
            self.index_of(id)?;
        }
        let (source, out) = self.register(com.into_kind(), connector.red, None);
        if let Some(id) = connector.red {
            self.network_mut(id)?.targets.push(source);
        }
        Ok(out)
    }

    /// Turn a connector into a wire. Idempotent.
    pub fn wire<C>(&mut self, connector: Connector<C>) -> Result<Wire<C>, GraphError> {
        self.ensure_building()?;
        for id in connector.ids() {
            self.network_mut(id)?.flags.insert(NetworkFlags::COMPLETED);
        }
        Ok(Wire::from_parts(connector.red, connector.green))
    }

    /// A placeholder wire for feedback. Close it with [`Circuit::close_loop`].
    pub fn loop_wire<C: Color>(&mut self) -> Result<Wire<C>, GraphError> {
        self.ensure_building()?;
        let flags = NetworkFlags::LOOP | NetworkFlags::COMPLETED;
        let red = C::RED.then(|| self.new_network(WireColor::Red, flags));
        let green = C::GREEN.then(|| self.new_network(WireColor::Green, flags));
        Ok(Wire::from_parts(red, green))
    }

    /// Join two open connectors. Sources of `left` come first.
    pub fn merge<C>(
        &mut self,
        left: Connector<C>,
        right: Connector<C>,
    ) -> Result<Connector<C>, GraphError> {
        self.ensure_building()?;
        for (l, r) in pairs(&left, &right) {
            self.check_connector_merge(l, r)?;
        }
        for (l, r) in pairs(&left, &right) {
            self.absorb(l, r)?;
        }
        Ok(left)
    }

    /// Feed `connector` into a loop wire. Allowed once per loop wire.
    pub fn close_loop<C>(
        &mut self,
        wire: Wire<C>,
        connector: Connector<C>,
    ) -> Result<Wire<C>, GraphError> {
        self.ensure_building()?;
        for (w, c) in pairs(&wire, &connector) {
            self.check_loop_close(w, c)?;
        }
        for (w, c) in pairs(&wire, &connector) {
            self.absorb(w, c)?;
        }
        Ok(wire)
    }

    /// Flag the handle's networks as external outputs.
    pub fn mark_as_output(&mut self, handle: &impl NetworkHandle) -> Result<(), GraphError> {
        self.ensure_building()?;
        for id in handle.ids() {
            self.network_mut(id)?.flags.insert(NetworkFlags::MAIN_OUTPUT);
        }
        Ok(())
    }

    fn check_pair(&self, l: NetworkId, r: NetworkId) -> Result<(&Network, &Network), GraphError> {
        let (li, ri) = (self.index_of(l)?, self.index_of(r)?);
        if li == ri {
            return Err(GraphError::SelfMerge);
        }
        let (a, b) = (&self.networks[li], &self.networks[ri]);
        if a.color != b.color {
            return Err(GraphError::ColorMismatch {
                left: a.color,
                right: b.color,
            });
        }
        Ok((a, b))
    }

    fn check_connector_merge(&self, l: NetworkId, r: NetworkId) -> Result<(), GraphError> {
        let (a, b) = self.check_pair(l, r)?;
        if a.flags.contains(NetworkFlags::COMPLETED) || b.flags.contains(NetworkFlags::COMPLETED) {
            return Err(GraphError::CompletedMerge);
        }
        Ok(())
    }

    fn check_loop_close(&self, wire: NetworkId, connector: NetworkId) -> Result<(), GraphError> {
        let (w, c) = self.check_pair(wire, connector)?;
        if !w.flags.contains(NetworkFlags::LOOP) {
            return Err(GraphError::NotALoop(wire));
        }
        if !w.sources.is_empty() {
            return Err(GraphError::LoopAlreadyClosed(wire));
        }
        if c.flags.contains(NetworkFlags::COMPLETED) {
            return Err(GraphError::CompletedMerge);
        }
        Ok(())
    }

    /// Move everything from `from` into `into` and drop `from`'s pool slot.
    fn absorb(&mut self, into: NetworkId, from: NetworkId) -> Result<(), GraphError> {
        let mut keep = self.index_of(into)?;
        let gone = self.index_of(from)?;
        let tail = self.networks.len() - 1;
        let absorbed = self.networks.swap_remove(gone);
        if gone != tail {
            for id in &self.networks[gone].inverse_lookup {
                self.lookup[id.0 as usize] = gone as u32;
            }
            if keep == tail {
                keep = gone;
            }
        }
        for id in &absorbed.inverse_lookup {
            self.lookup[id.0 as usize] = keep as u32;
        }
        let survivor = &mut self.networks[keep];
        debug!(
            "merged network {:?} into {:?} ({} + {} sources)",
            from,
            into,
            survivor.sources.len(),
            absorbed.sources.len()
        );
        survivor.sources.extend(absorbed.sources);
        survivor.targets.extend(absorbed.targets);
        survivor.inverse_lookup.extend(absorbed.inverse_lookup);
        survivor.flags |= absorbed.flags;
        Ok(())
    }

    // -- priming ------------------------------------------------------------

    /// Freeze the graph and prepare `history_len` ticks of value history.
    ///
    /// Marks every combinator reachable from a main output, seeds each
    /// network with its constant combinators' output and switches the
    /// circuit to simulation.
    pub fn prime(&mut self, history_len: usize) -> Result<(), GraphError> {
        self.ensure_building()?;
        if history_len < 2 {
            return Err(GraphError::HistoryTooShort(history_len));
        }
        self.mark_output_relevant()?;

        let mut order: Vec<usize> = (0..self.networks.len()).collect();
        order.sort_by_key(|&i| self.networks[i].first_id());
        self.order = order;

        for network in &mut self.networks {
            network.values = vec![SignalSet::new(); history_len];
        }
        for source in &self.sources {
            let SourceKind::Constant(data) = &source.kind else {
                continue;
            };
            for id in source.outputs() {
                let seed = &mut self.networks[self.lookup[id.0 as usize] as usize].values[0];
                for (_, value) in data.filled() {
                    add_signal(seed, value.signal, value.count);
                }
            }
        }
        for network in &mut self.networks {
            prune(&mut network.values[0]);
        }

        self.history_len = history_len;
        self.sim_index = 1;
        self.ticks = 0;
        debug!(
            "primed circuit: {} networks, {} combinators ({} output relevant), history {}",
            self.networks.len(),
            self.sources.len(),
            self.sources.iter().filter(|s| s.output_relevant).count(),
            history_len
        );
        Ok(())
    }

    /// Flag networks and combinators that feed a main output.
    fn mark_output_relevant(&mut self) -> Result<(), GraphError> {
        for network in &mut self.networks {
            network.flags.remove(NetworkFlags::OUTPUT_RELEVANT);
        }
        for source in &mut self.sources {
            source.output_relevant = false;
        }

        let mut stack: Vec<usize> = (0..self.networks.len())
            .filter(|&i| self.networks[i].is_main_output())
            .collect();
        while let Some(index) = stack.pop() {
            let network = &mut self.networks[index];
            if network.is_output_relevant() {
                continue;
            }
            network.flags.insert(NetworkFlags::OUTPUT_RELEVANT);
            if network.sources.is_empty() {
                return Err(GraphError::UnclosedLoop(network.first_id()));
            }
            for &id in &network.sources {
                let source = &mut self.sources[id.0 as usize];
                source.output_relevant = true;
                stack.extend(source.inputs().map(|n| self.lookup[n.0 as usize] as usize));
            }
        }
        Ok(())
    }

    // -- history ------------------------------------------------------------

    /// Completed ticks since priming.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn history_len(&self) -> usize {
        self.history_len
    }

    /// Values of the handle's networks `ago` ticks back, red and green summed.
    pub fn history(&self, handle: &impl NetworkHandle, ago: usize) -> Result<SignalSet, GraphError> {
        if self.is_building() {
            return Err(GraphError::NotCompiled);
        }
        let available = (self.ticks + 1).min(self.history_len as u64) as usize;
        if ago >= available {
            return Err(GraphError::HistoryOutOfRange { ago, available });
        }
        let slot = (self.sim_index - 1 + self.history_len - ago) % self.history_len;
        let mut out = SignalSet::new();
        for id in handle.ids() {
            for (&signal, &value) in &self.network(id)?.values[slot] {
                add_signal(&mut out, signal, value);
            }
        }
        prune(&mut out);
        Ok(out)
    }

    /// The most recent values of the handle's networks.
    pub fn last_values(&self, handle: &impl NetworkHandle) -> Result<SignalSet, GraphError> {
        self.history(handle, 0)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
