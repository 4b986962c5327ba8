//! Entity placement and wire routing.
//!
//! Output-relevant combinators are placed left to right, one per column.
//! Each network is then routed along its connections in column order:
//! neighbours within direct reach are wired together, larger gaps are
//! bridged by a row of medium electric poles above the combinators. Every
//! network that needs poles owns one row of its color, so runs of different
//! networks never touch.
//!
//! Rows only use heights whose residue modulo `pole_reach` is neither 1 nor
//! 2. Poles climbing from an input stub use residue 1 and poles climbing from
//! an output stub residue 2, which keeps climbs off every row and off each
//! other. Stubs sit at `pole_reach - 1` (inputs) and `pole_reach` (outputs);
//! [`BlueprintConfig::validate`] rejects row steps that would put a row there.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use combinet_core::id::SourceId;
use combinet_logic::{Circuit, GraphError, Network, SourceKind, WireColor};
use log::debug;

use crate::config::BlueprintConfig;
use crate::error::BlueprintError;

/// Height of combinators that have an input and an output.
const TWO_PORT_Y: f64 = 0.5;
/// Height of constant combinators.
const CONSTANT_Y: f64 = 1.0;

// ---------------------------------------------------------------------------
// Placed entities
// ---------------------------------------------------------------------------

/// Circuit connection point of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Port {
    /// The only point of a constant combinator or pole.
    Standard,
    Input,
    Output,
}

impl Port {
    /// Key of the port in an entity's `connections` map.
    pub fn key(self) -> &'static str {
        match self {
            Port::Standard | Port::Input => "1",
            Port::Output => "2",
        }
    }

    /// `circuit_id` written when wiring to this port.
    pub fn circuit_id(self) -> Option<u8> {
        match self {
            Port::Standard => None,
            Port::Input => Some(1),
            Port::Output => Some(2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placed {
    Combinator { source: SourceId, kind: SourceKind },
    Pole,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedEntity {
    pub placed: Placed,
    pub x: i64,
    /// Grid height, growing upwards. The JSON position negates it.
    pub y: f64,
}

/// An entity index with a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Endpoint {
    pub entity: usize,
    pub port: Port,
}

impl Endpoint {
    fn pole(entity: usize) -> Self {
        Self {
            entity,
            port: Port::Standard,
        }
    }
}

/// One wire. Endpoints are stored in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Link {
    pub color: WireColor,
    pub a: Endpoint,
    pub b: Endpoint,
}

/// A network's attachment to one placed combinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    pub end: Endpoint,
    pub x: i64,
    /// Pole-routed wires leaving this connection.
    pub wires: u32,
}

impl Connection {
    pub fn new(entity: usize, port: Port, x: i64) -> Self {
        Self {
            end: Endpoint { entity, port },
            x,
            wires: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Entities and wires of a compiled circuit. Combinators come first, in
/// registration order, followed by poles in placement order.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub entities: Vec<PlacedEntity>,
    pub links: BTreeSet<Link>,
    combinators: usize,
    poles: BTreeMap<(i64, i64), usize>,
    rows: [u32; 2],
}

impl Layout {
    /// Place and route every output-relevant part of a primed circuit.
    pub fn plan(circuit: &Circuit, config: &BlueprintConfig) -> Result<Self, BlueprintError> {
        if circuit.is_building() {
            return Err(GraphError::NotCompiled.into());
        }
        config.validate()?;
        let mut layout = Layout::default();
        let mut entity_of: HashMap<SourceId, usize> = HashMap::new();
        for (source, data) in circuit.sources().filter(|(_, s)| s.output_relevant) {
            let index = layout.entities.len();
            let y = if data.kind.is_constant() {
                CONSTANT_Y
            } else {
                TWO_PORT_Y
            };
            layout.entities.push(PlacedEntity {
                placed: Placed::Combinator {
                    source,
                    kind: data.kind,
                },
                x: index as i64,
                y,
            });
            entity_of.insert(source, index);
        }
        layout.combinators = layout.entities.len();

        for network in circuit.networks() {
            if !network.is_output_relevant() {
                continue;
            }
            let mut connections = connections_of(circuit, network, &entity_of);
            layout.route(network.color(), &mut connections, network.is_main_output(), config);
        }

        debug!(
            "layout: {} combinators, {} poles, {} wires",
            layout.combinators,
            layout.pole_count(),
            layout.links.len()
        );
        Ok(layout)
    }

    pub fn combinator_count(&self) -> usize {
        self.combinators
    }

    pub fn pole_count(&self) -> usize {
        self.poles.len()
    }

    /// Pole positions, sorted.
    pub fn pole_positions(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.poles.keys().copied()
    }

    /// Wire one network. `connections` is sorted in place.
    pub fn route(
        &mut self,
        color: WireColor,
        connections: &mut [Connection],
        main_output: bool,
        config: &BlueprintConfig,
    ) {
        connections.sort_by_key(|c| c.x);

        for k in 1..connections.len() {
            let (left, right) = (connections[k - 1], connections[k]);
            if right.x - left.x <= i64::from(config.direct_wire_reach) {
                self.link(color, left.end, right.end);
            } else {
                connections[k - 1].wires += 1;
                connections[k].wires += 1;
            }
        }
        if main_output {
            if let Some(last) = connections.last_mut() {
                last.wires += 1;
            }
        }
        if connections.iter().all(|c| c.wires == 0) {
            return;
        }

        let row = self.next_row(color, config);
        let reach = i64::from(config.pole_reach);
        let mut run: Option<(i64, usize)> = None;
        for con in connections.iter().filter(|c| c.wires > 0) {
            let top = self.climb(color, con, row, config);
            run = match run {
                Some((last_x, last_pole)) => {
                    self.extend_run(color, last_x, last_pole, con.x, row, reach);
                    if con.wires == 1 { None } else { Some((con.x, top)) }
                }
                None => Some((con.x, top)),
            };
        }
        if main_output {
            if let Some((x, pole)) = run {
                let tap = self.combinators as i64 + i64::from(config.output_tap_offset);
                self.extend_run(color, x, pole, tap, row, reach);
            }
        }
    }

    /// Claim the next pole row of `color`.
    fn next_row(&mut self, color: WireColor, config: &BlueprintConfig) -> i64 {
        let counter = &mut self.rows[color as usize];
        let row = row_height(*counter, config);
        *counter += 1;
        row
    }

    /// Stub pole next to the combinator, then straight up to `row`. Returns
    /// the pole on the row.
    fn climb(
        &mut self,
        color: WireColor,
        con: &Connection,
        row: i64,
        config: &BlueprintConfig,
    ) -> usize {
        let reach = i64::from(config.pole_reach);
        let (cap, residue) = match con.end.port {
            Port::Input => (reach - 1, 1),
            Port::Output | Port::Standard => (reach, 2),
        };
        let mut y = row.min(cap);
        let mut pole = self.pole_at(con.x, y);
        self.link(color, con.end, Endpoint::pole(pole));
        while row - y > reach {
            y = next_with_residue(y, residue, reach);
            pole = self.step(color, pole, con.x, y);
        }
        if y < row {
            pole = self.step(color, pole, con.x, row);
        }
        pole
    }

    /// Poles along `row` from `from_x` to `to_x`, at most `reach` apart.
    fn extend_run(
        &mut self,
        color: WireColor,
        from_x: i64,
        from_pole: usize,
        to_x: i64,
        row: i64,
        reach: i64,
    ) -> usize {
        let (mut x, mut pole) = (from_x, from_pole);
        while x < to_x {
            x = (x + reach).min(to_x);
            pole = self.step(color, pole, x, row);
        }
        pole
    }

    /// Place (or reuse) the pole at `(x, y)` and wire it to `from`.
    fn step(&mut self, color: WireColor, from: usize, x: i64, y: i64) -> usize {
        let pole = self.pole_at(x, y);
        self.link(color, Endpoint::pole(from), Endpoint::pole(pole));
        pole
    }

    fn pole_at(&mut self, x: i64, y: i64) -> usize {
        *self.poles.entry((x, y)).or_insert_with(|| {
            let index = self.entities.len();
            self.entities.push(PlacedEntity {
                placed: Placed::Pole,
                x,
                y: y as f64,
            });
            index
        })
    }

    fn link(&mut self, color: WireColor, a: Endpoint, b: Endpoint) {
        if a == b {
            return;
        }
        let (a, b) = if a < b { (a, b) } else { (b, a) };
        self.links.insert(Link { color, a, b });
    }
}

/// Height of the `n`-th pole row of one color (0-based).
pub fn row_height(n: u32, config: &BlueprintConfig) -> i64 {
    let reach = i64::from(config.pole_reach);
    let band = reach - 2;
    let raw = (i64::from(n) + 1) * i64::from(config.row_step);
    (raw - 1) / band * reach + (raw - 1) % band + 3
}

/// Smallest height above `y` congruent to `residue` modulo `modulus`.
fn next_with_residue(y: i64, residue: i64, modulus: i64) -> i64 {
    let step = (residue - y).rem_euclid(modulus);
    y + if step == 0 { modulus } else { step }
}

/// Sources then targets of `network` that were placed.
fn connections_of(
    circuit: &Circuit,
    network: &Network,
    entity_of: &HashMap<SourceId, usize>,
) -> Vec<Connection> {
    let place = |id: &SourceId, port: Port| {
        entity_of
            .get(id)
            .map(|&entity| Connection::new(entity, port, entity as i64))
    };
    let sources = network.sources().iter().filter_map(|id| {
        let constant = circuit.source(*id).is_some_and(|s| s.kind.is_constant());
        place(id, if constant { Port::Standard } else { Port::Output })
    });
    let targets = network.targets().iter().filter_map(|id| place(id, Port::Input));
    sources.chain(targets).collect()
}

// ===========================================================================
// Tests
// ===========================================================================
