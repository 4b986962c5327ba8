//! Blueprint compiler for combinator circuits.
//!
//! [`compile`] primes a [`Circuit`], lays out every combinator that feeds a
//! main output together with the medium electric poles needed to route long
//! wires, and returns the importable blueprint string.

pub mod config;
pub mod encode;
pub mod error;
pub mod json;
pub mod layout;

use std::collections::BTreeMap;

use combinet_logic::{Circuit, SourceKind};
use log::{debug, warn};

pub use config::BlueprintConfig;
pub use encode::{decode_blueprint, encode_document};
pub use error::BlueprintError;
pub use json::BlueprintDocument;
pub use layout::Layout;

use json::{Blueprint, ConnectionPoint, ControlBehavior, Entity, Icon, Position, SignalId};
use layout::{Placed, PlacedEntity};

pub const POLE_NAME: &str = "medium-electric-pole";

/// Entity name of a combinator kind.
pub fn entity_name(kind: &SourceKind) -> &'static str {
    match kind {
        SourceKind::Constant(_) => "constant-combinator",
        SourceKind::Decider(_) => "decider-combinator",
        SourceKind::Arithmetic(_) => "arithmetic-combinator",
    }
}

/// Prime `circuit` if it is still being built, then compile it.
pub fn compile(circuit: &mut Circuit, config: &BlueprintConfig) -> Result<String, BlueprintError> {
    if circuit.is_building() {
        circuit.prime(config.history_len)?;
    }
    let document = build_document(circuit, config)?;
    let blueprint = encode_document(&document)?;
    debug!(
        "compiled blueprint: {} entities, {} bytes",
        document.blueprint.entities.len(),
        blueprint.len()
    );
    Ok(blueprint)
}

/// The first call compiles the circuit and returns its blueprint. Every
/// later call advances the simulation one tick and returns an empty string.
pub fn compile_first_or_simulate(
    circuit: &mut Circuit,
    history_len: usize,
) -> Result<String, BlueprintError> {
    if circuit.is_building() {
        let config = BlueprintConfig {
            history_len,
            ..BlueprintConfig::default()
        };
        compile(circuit, &config)
    } else {
        circuit.tick()?;
        Ok(String::new())
    }
}

/// Lay out a primed circuit and describe it as a blueprint document.
pub fn build_document(
    circuit: &Circuit,
    config: &BlueprintConfig,
) -> Result<BlueprintDocument, BlueprintError> {
    let layout = Layout::plan(circuit, config)?;

    let mut entities: Vec<Entity> = layout
        .entities
        .iter()
        .enumerate()
        .map(|(index, placed)| entity(index, placed))
        .collect();
    for link in &layout.links {
        for (from, to) in [(link.a, link.b), (link.b, link.a)] {
            entities[from.entity]
                .connections
                .entry(from.port.key().to_string())
                .or_default()
                .color_mut(link.color)
                .push(ConnectionPoint {
                    entity_id: to.entity as u32 + 1,
                    circuit_id: to.port.circuit_id(),
                });
        }
    }

    Ok(BlueprintDocument {
        blueprint: Blueprint {
            icons: vec![Icon {
                signal: SignalId::item("decider-combinator"),
                index: 1,
            }],
            entities,
            item: "blueprint".to_string(),
            label: config.label.clone(),
            version: config.version,
        },
    })
}

fn entity(index: usize, placed: &PlacedEntity) -> Entity {
    let (name, control_behavior) = match &placed.placed {
        Placed::Pole => (POLE_NAME, None),
        Placed::Combinator { kind, .. } => (entity_name(kind), Some(control_behavior(kind))),
    };
    Entity {
        entity_number: index as u32 + 1,
        position: Position {
            x: placed.x as f64,
            y: -placed.y,
        },
        direction: 0,
        name: name.to_string(),
        control_behavior,
        connections: BTreeMap::new(),
    }
}

fn control_behavior(kind: &SourceKind) -> ControlBehavior {
    match kind {
        SourceKind::Constant(data) => data.into(),
        SourceKind::Decider(data) => {
            if let Some(value) = data.value.filter(|&v| v != 1) {
                warn!("decider output value {value} cannot be stored in a blueprint; the game emits 1");
            }
            data.into()
        }
        SourceKind::Arithmetic(data) => data.into(),
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use combinet_logic::test_utils::*;
    use combinet_logic::{AriOperand, Each, GraphError, On};

    fn doubled_coal() -> Circuit {
        let mut circuit = Circuit::new();
        let c = constant_of(&mut circuit, &[(coal(), 21)]);
        let w = circuit.wire(c.r()).unwrap();
        let out = circuit.feed(w, (Each * 2).on(Each).r()).unwrap();
        circuit.mark_as_output(&out).unwrap();
        circuit
    }

    #[test]
    fn document_header() {
        let mut circuit = doubled_coal();
        circuit.prime(4).unwrap();
        let config = BlueprintConfig {
            label: Some("double".to_string()),
            ..BlueprintConfig::default()
        };
        let document = build_document(&circuit, &config).unwrap();
        let blueprint = &document.blueprint;
        assert_eq!(blueprint.item, "blueprint");
        assert_eq!(blueprint.version, 73018310664);
        assert_eq!(blueprint.label.as_deref(), Some("double"));
        assert_eq!(blueprint.icons[0].signal, SignalId::item("decider-combinator"));
        let names: Vec<_> = blueprint.entities.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["constant-combinator", "arithmetic-combinator", POLE_NAME, POLE_NAME]
        );
    }

    #[test]
    fn connections_are_symmetric() {
        let mut circuit = doubled_coal();
        circuit.prime(4).unwrap();
        let document = build_document(&circuit, &BlueprintConfig::default()).unwrap();
        let entities = &document.blueprint.entities;

        let constant = &entities[0];
        assert_eq!(constant.position, Position { x: 0.0, y: -1.0 });
        assert_eq!(
            constant.connections["1"].red,
            vec![ConnectionPoint {
                entity_id: 2,
                circuit_id: Some(1)
            }]
        );
        let arithmetic = &entities[1];
        assert_eq!(arithmetic.position, Position { x: 1.0, y: -0.5 });
        assert_eq!(
            arithmetic.connections["1"].red,
            vec![ConnectionPoint {
                entity_id: 1,
                circuit_id: None
            }]
        );
        assert_eq!(
            arithmetic.connections["2"].red,
            vec![ConnectionPoint {
                entity_id: 3,
                circuit_id: None
            }]
        );
        assert!(arithmetic.connections["2"].green.is_empty());
    }

    #[test]
    fn compile_primes_once_then_simulates() {
        let mut circuit = doubled_coal();
        let blueprint = compile_first_or_simulate(&mut circuit, 8).unwrap();
        assert!(blueprint.starts_with('0'));
        assert_eq!(circuit.history_len(), 8);
        assert_eq!(compile_first_or_simulate(&mut circuit, 8).unwrap(), "");
        assert_eq!(circuit.ticks(), 1);
    }

    #[test]
    fn compile_round_trips_through_decode() {
        let mut circuit = Circuit::new();
        let c = constant_of(&mut circuit, &[(signal_a(), 3)]);
        let w = circuit.wire(c.g()).unwrap();
        let out = circuit
            .feed(w, AriOperand::pow(2, signal_a()).on(signal_b()).g())
            .unwrap();
        circuit.mark_as_output(&out).unwrap();
        let config = BlueprintConfig::default();
        let blueprint = compile(&mut circuit, &config).unwrap();
        let decoded = decode_blueprint(&blueprint).unwrap();
        assert_eq!(decoded, build_document(&circuit, &config).unwrap());
    }

    #[test]
    fn unprimed_document_is_an_error() {
        let circuit = doubled_coal();
        let err = build_document(&circuit, &BlueprintConfig::default()).unwrap_err();
        assert!(matches!(err, BlueprintError::Graph(GraphError::NotCompiled)));
    }
}
