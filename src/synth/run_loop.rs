//! Run-loop synthesis
//!
//! The run loop waits on the signal channel and every request channel at
//! once, services exactly one ready channel per iteration, and replies on the
//! matching response channel before it selects again. Lifecycle transitions
//! come from [`AgentState::on_signal`], the same function generated loops
//! execute through [`crate::runtime::Control::apply`].

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use super::assemble::ActorLayout;
use crate::runtime::{AgentSignal, AgentState};

/// Side effect of a lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SideEffect {
    /// Nothing beyond the state change.
    None,
    /// Drop every channel end and return from the loop.
    ReleaseChannels,
}

impl SideEffect {
    /// Human-readable name.
    pub fn as_str(self) -> &'static str {
        match self {
            SideEffect::None => "none",
            SideEffect::ReleaseChannels => "release channels",
        }
    }
}

/// One row of the lifecycle transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// State before the signal.
    pub from: AgentState,
    /// Signal received.
    pub signal: AgentSignal,
    /// State after the signal.
    pub to: AgentState,
    /// What else happens.
    pub effect: SideEffect,
}

impl Serialize for Transition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut row = serializer.serialize_struct("Transition", 4)?;
        row.serialize_field("from", self.from.as_str())?;
        row.serialize_field("signal", self.signal.as_str())?;
        row.serialize_field("to", self.to.as_str())?;
        row.serialize_field("effect", &self.effect)?;
        row.end()
    }
}

/// How the loop services one method's requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchArm {
    /// Wrapped method to invoke.
    pub method: String,
    /// Channel the request arrives on.
    pub request_channel: String,
    /// Channel the response leaves on.
    pub response_channel: String,
    /// Response type to build.
    pub response_type: String,
    /// Request fields passed as arguments, in order.
    pub arguments: Vec<String>,
    /// Locals bound to the call's results, in order; also the response fields.
    pub results: Vec<String>,
}

/// The dispatch algorithm of an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunLoopSpec {
    /// Lifecycle transitions from every non-terminal state.
    pub transitions: Vec<Transition>,
    /// One arm per method, in declaration order.
    pub arms: Vec<DispatchArm>,
}

/// Every transition the run loop can take.
///
/// `Closed` has no rows: the loop has returned by the time it is entered, so
/// no signal is ever applied to it.
pub fn transition_table() -> Vec<Transition> {
    AgentState::ALL
        .into_iter()
        .filter(|state| !state.is_terminal())
        .flat_map(|from| {
            AgentSignal::ALL.into_iter().map(move |signal| {
                let to = from.on_signal(signal);
                let effect = if to.is_terminal() {
                    SideEffect::ReleaseChannels
                } else {
                    SideEffect::None
                };
                Transition {
                    from,
                    signal,
                    to,
                    effect,
                }
            })
        })
        .collect()
}

/// Build the run loop for `layout`.
pub fn synthesize(layout: &ActorLayout) -> RunLoopSpec {
    let arms = layout
        .methods
        .iter()
        .map(|method| DispatchArm {
            method: method.name.clone(),
            request_channel: method.request_channel.field.clone(),
            response_channel: method.response_channel.field.clone(),
            response_type: method.response.type_name.clone(),
            arguments: method.request.field_names().map(str::to_string).collect(),
            results: method.response.field_names().map(str::to_string).collect(),
        })
        .collect();

    RunLoopSpec {
        transitions: transition_table(),
        arms,
    }
}
