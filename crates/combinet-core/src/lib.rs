//! Core types for the combinet circuit compiler.
//!
//! Holds the signal descriptions every other crate refers to, the registry
//! that loads them and the id newtypes shared by the graph and the blueprint
//! layout. Descriptions handed out by a `'static` registry are what signal
//! handles point at.

pub mod id;
pub mod registry;
pub mod signal;

pub use registry::{Registry, RegistryBuilder, RegistryError, builtin};
pub use signal::{SignalDescription, SignalKind};
