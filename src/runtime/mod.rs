//! Runtime support linked by generated agents
//!
//! Generated code imports these types (or, with `-I`, carries its own copy of
//! [`lifecycle`] inline). The generator itself uses [`AgentState`] and
//! [`AgentSignal`] to derive the run loop's transition table, so the table a
//! generated file documents is the one its loop executes.

pub mod lifecycle;

pub use lifecycle::{
    Agent, AgentError, AgentSignal, AgentState, Control, Flow, Lifecycle, StateCell,
};

/// Source text of [`lifecycle`], inlined into generated files on request.
pub const LIFECYCLE_SOURCE: &str = include_str!("lifecycle.rs");
