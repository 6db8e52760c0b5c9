//! Gadget – an actor-wrapper generator
//!
//! Given an interface (a named set of method signatures) and optionally a set
//! of constructor functions, this crate generates a thread-safe agent that:
//! - Owns one value implementing the interface, exclusively
//! - Serializes every call through a single run loop over rendezvous channels
//! - Exposes the interface's methods as blocking request/response calls
//! - Supports lifecycle control: start, stop and terminal close
//!
//! The pipeline is schema → [`synth`] → [`render`]; [`runtime`] is the small
//! support library that generated agents link against (or inline with `-I`).

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// Generator configuration
pub mod config;
/// Rust rendering of synthesized agents
pub mod render;
/// Lifecycle support used by generated agents
pub mod runtime;
/// Interface and constructor signatures
pub mod schema;
/// Signature-to-protocol synthesis
pub mod synth;

// Re-export key types for convenience
pub use config::{GeneratorConfig, OutputFormat};
pub use render::{RenderOptions, render_agent, render_spec_json};
pub use schema::SchemaPool;
pub use synth::{AgentRequest, AgentSpec, SynthError, SynthResult, generate};

/// Current version of the generator
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
