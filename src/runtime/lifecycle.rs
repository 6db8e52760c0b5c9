//! Lifecycle plumbing shared by every generated agent.
//!
//! An agent is split in two halves that share one rendezvous signal channel,
//! its acknowledgement channel and one [`StateCell`]:
//! - [`Lifecycle`], held by the caller-facing handle, sends signals and reads
//!   the state.
//! - [`Control`], moved onto the run-loop thread, receives signals and is the
//!   only writer of the state.
//!
//! This file is self-contained (it depends only on `crossbeam-channel`,
//! `parking_lot`, `thiserror` and `tracing`) so it can be inlined verbatim
//! into generated code.

use std::fmt;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, RecvError, Sender, bounded};
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Lifecycle commands carried on an agent's signal channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentSignal {
    /// Resume (or keep) the `Started` state.
    Start,
    /// Move to the `Stopped` state.
    Stop,
    /// Terminate the run loop and release every channel.
    Close,
}

impl AgentSignal {
    /// Every signal, in declaration order.
    pub const ALL: [AgentSignal; 3] = [AgentSignal::Start, AgentSignal::Stop, AgentSignal::Close];

    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            AgentSignal::Start => "start",
            AgentSignal::Stop => "stop",
            AgentSignal::Close => "close",
        }
    }
}

impl fmt::Display for AgentSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run state of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AgentState {
    /// Dispatching calls.
    Started = 0,
    /// Stopped by request. Calls are still dispatched.
    Stopped = 1,
    /// Terminal: the run loop has exited.
    Closed = 2,
}

impl AgentState {
    /// Every state, in declaration order.
    pub const ALL: [AgentState; 3] = [AgentState::Started, AgentState::Stopped, AgentState::Closed];

    /// State reached from `self` after receiving `signal`.
    ///
    /// `Closed` absorbs every signal.
    pub fn on_signal(self, signal: AgentSignal) -> AgentState {
        match (self, signal) {
            (AgentState::Closed, _) => AgentState::Closed,
            (_, AgentSignal::Start) => AgentState::Started,
            (_, AgentSignal::Stop) => AgentState::Stopped,
            (_, AgentSignal::Close) => AgentState::Closed,
        }
    }

    /// Whether the run loop exits on entering this state.
    pub fn is_terminal(self) -> bool {
        self == AgentState::Closed
    }

    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            AgentState::Started => "started",
            AgentState::Stopped => "stopped",
            AgentState::Closed => "closed",
        }
    }

    fn from_raw(raw: u8) -> AgentState {
        match raw {
            0 => AgentState::Started,
            1 => AgentState::Stopped,
            _ => AgentState::Closed,
        }
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by agent handles.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The run loop has exited; the call or signal was never accepted.
    #[error("agent is closed")]
    Closed,

    /// The run-loop thread could not be spawned.
    #[error("failed to launch agent run loop: {0}")]
    Launch(#[from] io::Error),
}

/// Lifecycle control implemented by every generated agent.
pub trait Agent {
    /// Request the `Started` state.
    fn start(&self) -> Result<(), AgentError>;

    /// Request the `Stopped` state.
    fn stop(&self) -> Result<(), AgentError>;

    /// Close the agent and wait for its run loop to exit.
    fn close(&self) -> Result<(), AgentError>;

    /// Best-effort snapshot of the run state.
    fn state(&self) -> AgentState;
}

/// Run state shared between the two halves of an agent.
///
/// Only [`Control`] writes it; readers get a snapshot that may lag behind a
/// signal the loop is still applying.
#[derive(Debug, Clone)]
pub struct StateCell(Arc<AtomicU8>);

impl StateCell {
    /// Create a cell holding `state`.
    pub fn new(state: AgentState) -> Self {
        Self(Arc::new(AtomicU8::new(state as u8)))
    }

    /// Read the current state.
    pub fn load(&self) -> AgentState {
        AgentState::from_raw(self.0.load(Ordering::Acquire))
    }

    fn store(&self, state: AgentState) {
        self.0.store(state as u8, Ordering::Release);
    }
}

/// What the run loop does after applying a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep dispatching.
    Continue,
    /// Return from the run loop, dropping every channel end it owns.
    Exit,
}

impl Flow {
    /// Whether the loop must return.
    pub fn is_exit(self) -> bool {
        self == Flow::Exit
    }
}

/// Caller half of an agent's lifecycle.
pub struct Lifecycle {
    name: String,
    signal: Sender<AgentSignal>,
    applied: Receiver<AgentState>,
    state: StateCell,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Lifecycle {
    /// Spawn `body` on a new thread named `name`, handing it the loop half.
    ///
    /// Returns as soon as the thread is spawned; the agent starts in
    /// [`AgentState::Started`].
    pub fn launch<F>(name: &str, body: F) -> Result<Self, AgentError>
    where
        F: FnOnce(Control) + Send + 'static,
    {
        let (signal_tx, signal_rx) = bounded(0);
        let (applied_tx, applied_rx) = bounded(0);
        let state = StateCell::new(AgentState::Started);
        let control = Control {
            name: name.to_string(),
            signal: signal_rx,
            applied: applied_tx,
            state: state.clone(),
        };

        let task = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || body(control))?;
        debug!(agent = name, "run loop launched");

        Ok(Self {
            name: name.to_string(),
            signal: signal_tx,
            applied: applied_rx,
            state,
            task: Mutex::new(Some(task)),
        })
    }

    /// Agent name (also the run-loop thread name).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Send [`AgentSignal::Start`].
    pub fn start(&self) -> Result<(), AgentError> {
        self.send(AgentSignal::Start).map(drop)
    }

    /// Send [`AgentSignal::Stop`].
    pub fn stop(&self) -> Result<(), AgentError> {
        self.send(AgentSignal::Stop).map(drop)
    }

    /// Send [`AgentSignal::Close`] and join the run-loop thread.
    pub fn close(&self) -> Result<(), AgentError> {
        self.send(AgentSignal::Close)?;
        let task = self.task.lock().take();
        if let Some(task) = task {
            if task.join().is_err() {
                warn!(agent = %self.name, "run loop panicked before exiting");
            }
        }
        debug!(agent = %self.name, "agent closed");
        Ok(())
    }

    /// Best-effort snapshot of the run state.
    pub fn state(&self) -> AgentState {
        self.state.load()
    }

    /// Deliver `signal` and wait until the loop has applied it.
    fn send(&self, signal: AgentSignal) -> Result<AgentState, AgentError> {
        self.signal.send(signal).map_err(|_| AgentError::Closed)?;
        self.applied.recv().map_err(|_| AgentError::Closed)
    }
}

impl fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lifecycle")
            .field("name", &self.name)
            .field("state", &self.state.load())
            .finish()
    }
}

/// Loop half of an agent's lifecycle.
///
/// Dropping it marks the agent `Closed`, whether the loop returned normally or
/// unwound.
pub struct Control {
    name: String,
    signal: Receiver<AgentSignal>,
    applied: Sender<AgentState>,
    state: StateCell,
}

impl Control {
    /// Receiver the run loop selects on alongside its request channels.
    pub fn signals(&self) -> &Receiver<AgentSignal> {
        &self.signal
    }

    /// Current run state.
    pub fn state(&self) -> AgentState {
        self.state.load()
    }

    /// Apply a received signal and tell the loop whether to keep going.
    ///
    /// A disconnected signal channel means every handle is gone, which closes
    /// the agent.
    pub fn apply(&self, signal: Result<AgentSignal, RecvError>) -> Flow {
        let next = match signal {
            Ok(signal) => {
                let current = self.state.load();
                let next = current.on_signal(signal);
                trace!(agent = %self.name, %signal, from = %current, to = %next, "lifecycle transition");
                self.state.store(next);
                // The sender stays blocked until the new state is visible.
                if self.applied.send(next).is_err() {
                    debug!(agent = %self.name, "signal sender went away");
                }
                next
            }
            Err(RecvError) => {
                debug!(agent = %self.name, "all handles dropped");
                self.state.store(AgentState::Closed);
                AgentState::Closed
            }
        };

        if next.is_terminal() {
            Flow::Exit
        } else {
            Flow::Continue
        }
    }
}

impl Drop for Control {
    fn drop(&mut self) {
        self.state.store(AgentState::Closed);
    }
}
