//! Interned signal handles.
//!
//! A [`Signal`] points into a `'static` [`Registry`], so it is `Copy` and
//! usable as an ordered map key. The combinator operators in [`crate::arithmetic`]
//! are implemented directly on it.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use combinet_core::{Registry, RegistryError, SignalDescription, SignalKind, builtin};
use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Signal handle
// ---------------------------------------------------------------------------

/// A handle to an interned [`SignalDescription`]. Cheap to copy.
///
/// Equality is by description; ordering is by `(kind, index, code_name)` so
/// signal sets iterate in a stable order.
#[derive(Clone, Copy)]
pub struct Signal(&'static SignalDescription);

impl Signal {
    pub fn new(description: &'static SignalDescription) -> Self {
        Self(description)
    }

    /// Look up a signal by code name in `registry`.
    pub fn lookup(
        registry: &'static Registry,
        kind: SignalKind,
        code_name: &str,
    ) -> Result<Self, RegistryError> {
        registry.get(kind, code_name).map(Signal)
    }

    /// An item signal from the bundled registry.
    pub fn item(code_name: &str) -> Result<Self, RegistryError> {
        Self::lookup(builtin()?, SignalKind::Item, code_name)
    }

    pub fn fluid(code_name: &str) -> Result<Self, RegistryError> {
        Self::lookup(builtin()?, SignalKind::Fluid, code_name)
    }

    pub fn virtual_signal(code_name: &str) -> Result<Self, RegistryError> {
        Self::lookup(builtin()?, SignalKind::Virtual, code_name)
    }

    /// Reverse lookup in the bundled registry from a blueprint name.
    pub fn from_game_name(kind: SignalKind, game_name: &str) -> Option<Self> {
        builtin().ok()?.by_game_name(kind, game_name).map(Signal)
    }

    pub fn description(self) -> &'static SignalDescription {
        self.0
    }

    pub fn code_name(self) -> &'static str {
        &self.0.code_name
    }

    pub fn game_name(self) -> &'static str {
        &self.0.game_name
    }

    pub fn kind(self) -> SignalKind {
        self.0.kind
    }

    pub fn index(self) -> u32 {
        self.0.index
    }

    /// Pair this signal with a count, e.g. for a constant combinator slot.
    pub fn count(self, count: i32) -> SignalValue {
        SignalValue {
            signal: self,
            count,
        }
    }

    fn key(&self) -> (SignalKind, u32, &str) {
        (self.0.kind, self.0.index, &self.0.code_name)
    }
}

impl PartialEq for Signal {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.0, other.0) || self.0 == other.0
    }
}

impl Eq for Signal {}

impl PartialOrd for Signal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Signal {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key()
            .cmp(&other.key())
            .then_with(|| self.0.game_name.cmp(&other.0.game_name))
    }
}

impl Hash for Signal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signal({})", self.0.code_name)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.code_name)
    }
}

#[derive(Serialize)]
struct SignalRef<'a> {
    #[serde(rename = "type")]
    kind: SignalKind,
    name: &'a str,
}

/// Serializes as the blueprint's `{"type": .., "name": ..}` object.
impl Serialize for Signal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SignalRef {
            kind: self.kind(),
            name: self.game_name(),
        }
        .serialize(serializer)
    }
}

// ---------------------------------------------------------------------------
// Signal value
// ---------------------------------------------------------------------------

/// A signal paired with a count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SignalValue {
    pub signal: Signal,
    pub count: i32,
}

// ===========================================================================
// Tests
// ===========================================================================
