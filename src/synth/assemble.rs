//! Actor assembly
//!
//! Lays out the static shape of an agent: the exclusively owned wrapped
//! implementation, one rendezvous request/response channel pair per method,
//! the signal channel, and the state field.

use std::collections::HashSet;

use serde::{Serialize, Serializer};

use super::error::{SynthError, SynthResult};
use super::normalize::check_identifier;
use super::protocol::{MessageShape, MethodProtocol, synthesize_interface};
use crate::runtime::AgentState;
use crate::schema::InterfaceSchema;

/// Field holding the wrapped implementation.
pub const WRAPPED_FIELD: &str = "wrapped";
/// Field holding the lifecycle signal channel.
pub const SIGNAL_FIELD: &str = "signal";
/// Field holding the run state.
pub const STATE_FIELD: &str = "state";
/// Message type carried by the signal channel.
pub const SIGNAL_MESSAGE: &str = "AgentSignal";
/// Capacity of every agent channel: a send completes only when received.
pub const RENDEZVOUS: usize = 0;

/// Method names taken by the agent's own surface.
const AGENT_SURFACE: &[&str] = &["spawn", "start", "stop", "close", "state"];

/// A channel field of the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelSpec {
    /// Field name.
    pub field: String,
    /// Message type name.
    pub message: String,
    /// Buffer capacity.
    pub capacity: usize,
}

impl ChannelSpec {
    fn rendezvous(field: String, message: String) -> Self {
        Self {
            field,
            message,
            capacity: RENDEZVOUS,
        }
    }
}

/// The field that exclusively owns the wrapped implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrappedField {
    /// Field name.
    pub field: String,
    /// Interface the owned value must implement.
    pub bound: String,
}

/// The run-state field, written only by the run loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateField {
    /// Field name.
    pub field: String,
    /// State when the agent is constructed.
    #[serde(serialize_with = "serialize_state")]
    pub initial: AgentState,
}

/// Everything the agent holds for one wrapped method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodSpec {
    /// Method name.
    pub name: String,
    /// Argument message.
    pub request: MessageShape,
    /// Result message.
    pub response: MessageShape,
    /// Channel carrying requests to the run loop.
    pub request_channel: ChannelSpec,
    /// Channel carrying responses back to the caller.
    pub response_channel: ChannelSpec,
}

/// Static shape of an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActorLayout {
    /// Wrapped interface name.
    pub interface: String,
    /// Caller-facing handle type name.
    pub agent: String,
    /// Run-loop type name.
    pub loop_type: String,
    /// Ownership of the wrapped implementation.
    pub wrapped: WrappedField,
    /// Lifecycle signal channel.
    pub signal: ChannelSpec,
    /// Run state.
    pub state: StateField,
    /// Per-method channels, in declaration order.
    pub methods: Vec<MethodSpec>,
}

impl ActorLayout {
    /// Whether the agent only exposes lifecycle control.
    pub fn is_lifecycle_only(&self) -> bool {
        self.methods.is_empty()
    }
}

/// Assemble the layout for `interface`.
pub fn assemble(interface: &InterfaceSchema) -> SynthResult<ActorLayout> {
    check_identifier(&interface.name, &interface.name)?;
    check_methods(interface)?;

    let methods: Vec<MethodSpec> = synthesize_interface(interface)?
        .into_iter()
        .map(method_spec)
        .collect();

    // Results are bound as locals in the run loop next to the reply channel.
    for method in &methods {
        let reply = &method.response_channel.field;
        if method.response.field_names().any(|name| name == reply) {
            return Err(SynthError::unsupported(
                &method.name,
                format!("result `{}` shadows the reply channel", reply),
            ));
        }
    }

    Ok(ActorLayout {
        interface: interface.name.clone(),
        agent: format!("{}Agent", interface.name),
        loop_type: format!("{}AgentLoop", interface.name),
        wrapped: WrappedField {
            field: WRAPPED_FIELD.to_string(),
            bound: interface.name.clone(),
        },
        signal: ChannelSpec::rendezvous(SIGNAL_FIELD.to_string(), SIGNAL_MESSAGE.to_string()),
        state: StateField {
            field: STATE_FIELD.to_string(),
            initial: AgentState::Started,
        },
        methods,
    })
}

fn check_methods(interface: &InterfaceSchema) -> SynthResult<()> {
    let mut seen = HashSet::new();

    for method in &interface.methods {
        check_identifier(&interface.name, &method.name)?;

        if AGENT_SURFACE.contains(&method.name.as_str()) {
            return Err(SynthError::unsupported(
                &interface.name,
                format!("method `{}` collides with the agent's lifecycle control", method.name),
            ));
        }

        if !seen.insert(method.name.as_str()) {
            return Err(SynthError::unsupported(
                &interface.name,
                format!("method `{}` is declared twice", method.name),
            ));
        }
    }

    Ok(())
}

fn method_spec(protocol: MethodProtocol) -> MethodSpec {
    let request_channel = ChannelSpec::rendezvous(
        format!("req_{}", protocol.method),
        protocol.request.type_name.clone(),
    );
    let response_channel = ChannelSpec::rendezvous(
        format!("res_{}", protocol.method),
        protocol.response.type_name.clone(),
    );

    MethodSpec {
        name: protocol.method,
        request: protocol.request,
        response: protocol.response,
        request_channel,
        response_channel,
    }
}

pub(crate) fn serialize_state<S: Serializer>(
    state: &AgentState,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(state.as_str())
}
