//! Signature-to-protocol synthesis
//!
//! Data flows one way: schema → [`normalize`] → [`protocol`] →
//! [`assemble`] / [`run_loop`] / [`constructor`] → [`AgentSpec`]. Every stage is
//! a pure function of its input; nothing here holds state between runs, so
//! generating twice from the same pool yields an equal `AgentSpec`.

/// Actor layout: ownership, channels, signal, and state fields.
pub mod assemble;
/// Factories forwarding to wrapped constructors.
pub mod constructor;
/// Error taxonomy for synthesis.
pub mod error;
/// Field naming for method and constructor signatures.
pub mod normalize;
/// Per-method request/response shapes.
pub mod protocol;
/// Dispatch loop and lifecycle transition table.
pub mod run_loop;

use std::collections::HashMap;

use blake3::Hasher;
use serde::Serialize;
use tracing::{debug, warn};

pub use assemble::{ActorLayout, ChannelSpec, MethodSpec, StateField, WrappedField};
pub use constructor::ConstructorSpec;
pub use error::{ErrorKind, FieldRole, SynthError, SynthResult};
pub use normalize::{NormalizedField, NormalizedSignature};
pub use protocol::{MessageShape, MethodProtocol};
pub use run_loop::{DispatchArm, RunLoopSpec, SideEffect, Transition};

use crate::schema::SchemaPool;

/// What to generate: one interface and the constructors to wrap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentRequest {
    /// Interface to wrap.
    pub interface: String,
    /// Constructors to emit factories for, in order.
    pub constructors: Vec<String>,
}

impl AgentRequest {
    /// Request an agent for `interface` with no factories.
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            constructors: Vec::new(),
        }
    }

    /// Also emit a factory for `constructor`.
    pub fn constructor(mut self, constructor: impl Into<String>) -> Self {
        self.constructors.push(constructor.into());
        self
    }
}

/// Complete description of one agent, ready to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentSpec {
    /// Static shape.
    pub layout: ActorLayout,
    /// Dispatch algorithm.
    pub run_loop: RunLoopSpec,
    /// Factories, in request order.
    pub constructors: Vec<ConstructorSpec>,
}

impl AgentSpec {
    /// Wrapped interface name.
    pub fn interface(&self) -> &str {
        &self.layout.interface
    }

    /// Stable blake3 hash of the names and types this spec was built from.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Hasher::new();
        hasher.update(self.layout.interface.as_bytes());

        for method in &self.layout.methods {
            hasher.update(b"|method|");
            hasher.update(method.name.as_bytes());
            for shape in [&method.request, &method.response] {
                hasher.update(b"|");
                hasher.update(shape.type_name.as_bytes());
                for field in &shape.fields {
                    hasher.update(b"|");
                    hasher.update(field.name.as_bytes());
                    hasher.update(b":");
                    hasher.update(field.ty.as_str().as_bytes());
                }
            }
        }

        for ctor in &self.constructors {
            hasher.update(b"|ctor|");
            hasher.update(ctor.wrapped_constructor.as_bytes());
            for param in &ctor.params {
                hasher.update(b"|");
                hasher.update(param.name.as_bytes());
                hasher.update(b":");
                hasher.update(param.ty.as_str().as_bytes());
            }
            hasher.update(b"->");
            hasher.update(ctor.wrapped_type.as_str().as_bytes());
        }

        hasher.finalize().to_hex().to_string()
    }
}

/// Synthesize the agent described by `request` from `pool`.
pub fn generate(pool: &SchemaPool, request: &AgentRequest) -> SynthResult<AgentSpec> {
    let interface = pool.interface(&request.interface)?;
    debug!(
        interface = %interface.name,
        methods = interface.methods.len(),
        "synthesizing agent"
    );

    let layout = assemble::assemble(interface)?;
    let run_loop = run_loop::synthesize(&layout);

    let mut constructors: Vec<ConstructorSpec> = Vec::with_capacity(request.constructors.len());
    let mut factories: HashMap<String, String> = HashMap::new();
    for name in &request.constructors {
        if constructors.iter().any(|ctor| &ctor.wrapped_constructor == name) {
            warn!(constructor = %name, "constructor requested more than once; emitting it once");
            continue;
        }

        let ctor = constructor::synthesize(pool, name)?;
        if let Some(other) = factories.insert(ctor.factory.clone(), name.clone()) {
            return Err(SynthError::unsupported(
                name,
                format!(
                    "factory `{}` would also be generated for constructor `{}`",
                    ctor.factory, other
                ),
            ));
        }
        debug!(constructor = %name, factory = %ctor.factory, "constructor synthesized");
        constructors.push(ctor);
    }

    Ok(AgentSpec {
        layout,
        run_loop,
        constructors,
    })
}
