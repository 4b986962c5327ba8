//! Signal registry.
//!
//! Signals are registered on a [`RegistryBuilder`], frozen into a
//! [`Registry`], and then given a `'static` lifetime so signal handles can
//! point straight into it. The game's 1.0-era signal list ships as a RON
//! fixture and is available through [`builtin`].

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::Deserialize;

use crate::signal::{SignalDescription, SignalKind};

const BUILTIN_SIGNALS: &str = include_str!("../data/signals.ron");

static BUILTIN: LazyLock<Result<Registry, RegistryError>> =
    LazyLock::new(|| Registry::from_ron(BUILTIN_SIGNALS));

/// The registry of game signals bundled with the crate, loaded on first use.
pub fn builtin() -> Result<&'static Registry, RegistryError> {
    BUILTIN.as_ref().map_err(Clone::clone)
}

// ===========================================================================
// Errors
// ===========================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("unknown {kind} signal '{name}'")]
    UnknownSignal { kind: SignalKind, name: String },

    #[error("duplicate {kind} signal '{name}'")]
    Duplicate { kind: SignalKind, name: String },

    #[error("failed to parse signal list: {0}")]
    Fixture(String),
}

// ===========================================================================
// Builder
// ===========================================================================

/// Derive the in-game name from a code name.
pub fn game_name_for(kind: SignalKind, code_name: &str) -> String {
    match kind {
        SignalKind::Item | SignalKind::Fluid => code_name.replace('_', "-"),
        SignalKind::Virtual => format!("signal-{code_name}"),
    }
}

fn slot(kind: SignalKind) -> usize {
    match kind {
        SignalKind::Item => 0,
        SignalKind::Fluid => 1,
        SignalKind::Virtual => 2,
    }
}

/// Collects signal descriptions before they are frozen.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    descriptions: Vec<SignalDescription>,
    by_code: [HashMap<String, usize>; 3],
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a signal whose game name follows the usual naming rule.
    pub fn register(&mut self, kind: SignalKind, code_name: &str) -> Result<(), RegistryError> {
        self.register_named(kind, code_name, &game_name_for(kind, code_name))
    }

    /// Register a signal with an explicit game name.
    pub fn register_named(
        &mut self,
        kind: SignalKind,
        code_name: &str,
        game_name: &str,
    ) -> Result<(), RegistryError> {
        let names = &mut self.by_code[slot(kind)];
        if names.contains_key(code_name) {
            return Err(RegistryError::Duplicate {
                kind,
                name: code_name.to_string(),
            });
        }
        let index = names.len() as u32;
        names.insert(code_name.to_string(), self.descriptions.len());
        self.descriptions.push(SignalDescription {
            code_name: code_name.to_string(),
            game_name: game_name.to_string(),
            kind,
            index,
        });
        Ok(())
    }

    pub fn build(self) -> Registry {
        let mut by_game: [HashMap<String, usize>; 3] = Default::default();
        for (i, d) in self.descriptions.iter().enumerate() {
            by_game[slot(d.kind)].insert(d.game_name.clone(), i);
        }
        Registry {
            descriptions: self.descriptions,
            by_code: self.by_code,
            by_game,
        }
    }
}

// ===========================================================================
// Registry
// ===========================================================================

#[derive(Debug, Deserialize)]
struct SignalList {
    items: Vec<String>,
    fluids: Vec<String>,
    #[serde(rename = "virtual")]
    virtuals: Vec<String>,
}

/// A frozen set of signal descriptions.
///
/// Lookups hand out `'static` descriptions and therefore need a `'static`
/// registry: use [`builtin`] or [`Registry::leak`].
#[derive(Debug)]
pub struct Registry {
    descriptions: Vec<SignalDescription>,
    by_code: [HashMap<String, usize>; 3],
    by_game: [HashMap<String, usize>; 3],
}

impl Registry {
    /// Parse a RON signal list with `items`, `fluids` and `virtual` name arrays.
    pub fn from_ron(source: &str) -> Result<Self, RegistryError> {
        let list: SignalList =
            ron::from_str(source).map_err(|e| RegistryError::Fixture(e.to_string()))?;
        let mut builder = RegistryBuilder::new();
        for name in &list.items {
            builder.register(SignalKind::Item, name)?;
        }
        for name in &list.fluids {
            builder.register(SignalKind::Fluid, name)?;
        }
        for name in &list.virtuals {
            builder.register(SignalKind::Virtual, name)?;
        }
        Ok(builder.build())
    }

    /// Give the registry a `'static` lifetime so signals can be handed out.
    pub fn leak(self) -> &'static Registry {
        Box::leak(Box::new(self))
    }

    pub fn len(&self) -> usize {
        self.descriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptions.is_empty()
    }

    /// Look up a signal by code name.
    pub fn get(
        &'static self,
        kind: SignalKind,
        code_name: &str,
    ) -> Result<&'static SignalDescription, RegistryError> {
        self.by_code[slot(kind)]
            .get(code_name)
            .map(|&i| &self.descriptions[i])
            .ok_or_else(|| RegistryError::UnknownSignal {
                kind,
                name: code_name.to_string(),
            })
    }

    pub fn item(&'static self, code_name: &str) -> Result<&'static SignalDescription, RegistryError> {
        self.get(SignalKind::Item, code_name)
    }

    pub fn fluid(&'static self, code_name: &str) -> Result<&'static SignalDescription, RegistryError> {
        self.get(SignalKind::Fluid, code_name)
    }

    pub fn virtual_signal(
        &'static self,
        code_name: &str,
    ) -> Result<&'static SignalDescription, RegistryError> {
        self.get(SignalKind::Virtual, code_name)
    }

    /// Reverse lookup from the name used in blueprint JSON.
    pub fn by_game_name(
        &'static self,
        kind: SignalKind,
        game_name: &str,
    ) -> Option<&'static SignalDescription> {
        self.by_game[slot(kind)]
            .get(game_name)
            .map(|&i| &self.descriptions[i])
    }

    /// All descriptions in registration order.
    pub fn descriptions(&'static self) -> impl Iterator<Item = &'static SignalDescription> {
        self.descriptions.iter()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
