//! Serde model of the blueprint JSON document.
//!
//! Only the subset of the game's schema that combinator circuits need.
//! Optional and empty fields are skipped so the output matches what the game
//! itself exports.

use std::collections::BTreeMap;

use combinet_logic::{
    AriComData, AriLeft, AriOutput, AriRight, ConstComData, DeciComData, DeciLeft,
    DeciOutputType, DeciRight, Signal, WildCard, WireColor,
};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlueprintDocument {
    pub blueprint: Blueprint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    pub icons: Vec<Icon>,
    pub entities: Vec<Entity>,
    pub item: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub version: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Icon {
    pub signal: SignalId,
    pub index: u32,
}

/// `{"type": ..., "name": ...}` as the game writes signals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignalId {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
}

impl SignalId {
    pub fn item(name: &str) -> Self {
        Self {
            kind: "item".to_string(),
            name: name.to_string(),
        }
    }
}

impl From<Signal> for SignalId {
    fn from(signal: Signal) -> Self {
        Self {
            kind: signal.kind().as_str().to_string(),
            name: signal.game_name().to_string(),
        }
    }
}

impl From<WildCard> for SignalId {
    fn from(wildcard: WildCard) -> Self {
        Self {
            kind: "virtual".to_string(),
            name: wildcard.game_name().to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub entity_number: u32,
    pub position: Position,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub direction: u8,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_behavior: Option<ControlBehavior>,
    /// Port key ("1" or "2") -> wires on that port.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub connections: BTreeMap<String, PortConnections>,
}

fn is_zero(v: &u8) -> bool {
    *v == 0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortConnections {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub red: Vec<ConnectionPoint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub green: Vec<ConnectionPoint>,
}

impl PortConnections {
    pub fn color(&self, color: WireColor) -> &[ConnectionPoint] {
        match color {
            WireColor::Red => &self.red,
            WireColor::Green => &self.green,
        }
    }

    pub fn color_mut(&mut self, color: WireColor) -> &mut Vec<ConnectionPoint> {
        match color {
            WireColor::Red => &mut self.red,
            WireColor::Green => &mut self.green,
        }
    }
}

/// The far end of a wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionPoint {
    pub entity_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circuit_id: Option<u8>,
}

// ---------------------------------------------------------------------------
// Control behavior
// ---------------------------------------------------------------------------

/// Untagged: the variant is recognised by its single key. `Constant` comes
/// last because its `filters` may be absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ControlBehavior {
    Decider {
        decider_conditions: DeciderConditions,
    },
    Arithmetic {
        arithmetic_conditions: ArithmeticConditions,
    },
    Constant {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        filters: Vec<Filter>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub signal: SignalId,
    pub count: i32,
    /// 1-based slot.
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeciderConditions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_signal: Option<SignalId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_signal: Option<SignalId>,
    pub comparator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_signal: Option<SignalId>,
    pub copy_count_from_input: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArithmeticConditions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_constant: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_signal: Option<SignalId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_constant: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_signal: Option<SignalId>,
    pub operation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_signal: Option<SignalId>,
}

impl From<&ConstComData> for ControlBehavior {
    fn from(data: &ConstComData) -> Self {
        let filters = data
            .filled()
            .map(|(slot, value)| Filter {
                signal: value.signal.into(),
                count: value.count,
                index: slot as u32 + 1,
            })
            .collect();
        ControlBehavior::Constant { filters }
    }
}

fn deci_left_signal(left: DeciLeft) -> SignalId {
    match left {
        DeciLeft::Any => WildCard::Any.into(),
        DeciLeft::All => WildCard::All.into(),
        DeciLeft::Each => WildCard::Each.into(),
        DeciLeft::Signal(s) => s.into(),
    }
}

impl From<&DeciComData> for ControlBehavior {
    fn from(data: &DeciComData) -> Self {
        let (constant, second_signal) = match data.right {
            DeciRight::Constant(c) => (Some(c), None),
            DeciRight::Signal(s) => (None, Some(s.into())),
        };
        let output_signal = match data.output {
            DeciOutputType::All => SignalId::from(WildCard::All),
            DeciOutputType::Each => SignalId::from(WildCard::Each),
            DeciOutputType::Signal(s) => s.into(),
        };
        ControlBehavior::Decider {
            decider_conditions: DeciderConditions {
                first_signal: Some(deci_left_signal(data.left)),
                constant,
                second_signal,
                comparator: data.mode.game_syntax().to_string(),
                output_signal: Some(output_signal),
                copy_count_from_input: data.value.is_none(),
            },
        }
    }
}

impl From<&AriComData> for ControlBehavior {
    fn from(data: &AriComData) -> Self {
        let (first_constant, first_signal) = match data.left {
            AriLeft::Constant(c) => (Some(c), None),
            AriLeft::Each => (None, Some(WildCard::Each.into())),
            AriLeft::Signal(s) => (None, Some(s.into())),
        };
        let (second_constant, second_signal) = match data.right {
            AriRight::Constant(c) => (Some(c), None),
            AriRight::Signal(s) => (None, Some(s.into())),
        };
        let output_signal = match data.output {
            AriOutput::Each => WildCard::Each.into(),
            AriOutput::Signal(s) => s.into(),
        };
        ControlBehavior::Arithmetic {
            arithmetic_conditions: ArithmeticConditions {
                first_constant,
                first_signal,
                second_constant,
                second_signal,
                operation: data.mode.game_syntax().to_string(),
                output_signal: Some(output_signal),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combinet_logic::test_utils::*;
    use combinet_logic::{
        AriOperand, ConstCom, DeciOperand, DeciOutputTarget, Each, INPUT, On, Then,
    };
    use serde_json::json;

    #[test]
    fn constant_filters_are_one_based() {
        let mut com = ConstCom::new([coal().count(5)]).unwrap();
        com.set(3, Some(signal_a().count(-2))).unwrap();
        let value = serde_json::to_value(ControlBehavior::from(com.data())).unwrap();
        assert_eq!(
            value,
            json!({"filters": [
                {"signal": {"type": "item", "name": "coal"}, "count": 5, "index": 1},
                {"signal": {"type": "virtual", "name": "signal-A"}, "count": -2, "index": 4},
            ]})
        );
    }

    #[test]
    fn decider_conditions_shape() {
        let com = Each.gt(signal_a()).then(Each.out(INPUT));
        let value = serde_json::to_value(ControlBehavior::from(com.data())).unwrap();
        assert_eq!(
            value,
            json!({"decider_conditions": {
                "first_signal": {"type": "virtual", "name": "signal-each"},
                "second_signal": {"type": "virtual", "name": "signal-A"},
                "comparator": ">",
                "output_signal": {"type": "virtual", "name": "signal-each"},
                "copy_count_from_input": true,
            }})
        );
        let com = coal().ne(3).then(signal_b().out(1));
        let value = serde_json::to_value(ControlBehavior::from(com.data())).unwrap();
        assert_eq!(value["decider_conditions"]["constant"], json!(3));
        assert_eq!(value["decider_conditions"]["comparator"], json!("≠"));
        assert_eq!(value["decider_conditions"]["copy_count_from_input"], json!(false));
    }

    #[test]
    fn arithmetic_conditions_shape() {
        let com = AriOperand::pow(2, signal_a()).on(iron_plate());
        let value = serde_json::to_value(ControlBehavior::from(com.data())).unwrap();
        assert_eq!(
            value,
            json!({"arithmetic_conditions": {
                "first_constant": 2,
                "second_signal": {"type": "virtual", "name": "signal-A"},
                "operation": "^",
                "output_signal": {"type": "item", "name": "iron-plate"},
            }})
        );
    }

    #[test]
    fn untagged_control_behavior_round_trips() {
        let com = (Each * 4).on(Each);
        let behavior = ControlBehavior::from(com.data());
        let text = serde_json::to_string(&behavior).unwrap();
        let back: ControlBehavior = serde_json::from_str(&text).unwrap();
        assert_eq!(back, behavior);
        let empty: ControlBehavior = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, ControlBehavior::Constant { filters: vec![] });
    }

    #[test]
    fn empty_connections_are_skipped() {
        let entity = Entity {
            entity_number: 1,
            position: Position { x: 0.0, y: -9.0 },
            direction: 0,
            name: "medium-electric-pole".to_string(),
            control_behavior: None,
            connections: BTreeMap::new(),
        };
        let value = serde_json::to_value(&entity).unwrap();
        assert_eq!(
            value,
            json!({"entity_number": 1, "position": {"x": 0.0, "y": -9.0},
                   "name": "medium-electric-pole"})
        );
    }
}
