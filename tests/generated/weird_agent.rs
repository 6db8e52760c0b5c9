// THIS CODE WAS GENERATED BY gadget 0.1.0
// ANY CHANGES TO THIS FILE MAY BE OVERWRITTEN
//
// agent for: Weird
// schema fingerprint: checked separately by tests/render_golden.rs

use crossbeam_channel::{Receiver, Sender, bounded, select};
use self::agent_runtime::{Agent, AgentError, AgentState, Control, Lifecycle};
use super::weird::*;

/// Lifecycle support inlined by `gadget -I`.
#[allow(dead_code)]
pub mod agent_runtime {
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
}

/// Arguments of `Weird::unnamed_args`.
pub struct WeirdUnnamedArgsRequest {
    pub arg1: i64,
    pub arg2: String,
    pub arg3: Thing,
}

/// Results of `Weird::unnamed_args`.
pub struct WeirdUnnamedArgsResponse {
    pub val1: Thing,
    pub val2: i64,
    pub val3: String,
    pub val4: bool,
    pub val5: Option<Error>,
}

/// Arguments of `Weird::repeated_types`.
pub struct WeirdRepeatedTypesRequest {
    pub a: i64,
    pub b: i64,
    pub foo: Thing,
}

/// Results of `Weird::repeated_types`.
pub struct WeirdRepeatedTypesResponse {
    pub x: Thing,
    pub y: Thing,
    pub z: Thing,
    pub err: Option<Error>,
}

/// Arguments of `Weird::mixed_args`.
pub struct WeirdMixedArgsRequest {
    pub a: i64,
    pub b: String,
    pub c: Thing,
    pub d: Thing,
}

/// Results of `Weird::mixed_args`.
pub struct WeirdMixedArgsResponse {
    pub x: i64,
    pub y: i64,
    pub z: i64,
    pub thang: Thing,
}

/// Arguments of `Weird::unnamed_duplicate_types`.
pub struct WeirdUnnamedDuplicateTypesRequest {
    pub arg1: i64,
    pub arg2: i64,
    pub arg3: String,
    pub arg4: Thing,
    pub arg5: String,
    pub arg6: Thing,
}

/// Results of `Weird::unnamed_duplicate_types`.
pub struct WeirdUnnamedDuplicateTypesResponse {
    pub val1: Thing,
    pub val2: i64,
    pub val3: Thing,
    pub val4: i64,
    pub val5: Option<Error>,
}

/// Serializes every call on a `Weird` through a single run loop.
pub struct WeirdAgent {
    /// Owns the `signal` channel (capacity 0) and the `state` field (initially started).
    lifecycle: Lifecycle,
    req_unnamed_args: Sender<WeirdUnnamedArgsRequest>,
    res_unnamed_args: Receiver<WeirdUnnamedArgsResponse>,
    req_repeated_types: Sender<WeirdRepeatedTypesRequest>,
    res_repeated_types: Receiver<WeirdRepeatedTypesResponse>,
    req_mixed_args: Sender<WeirdMixedArgsRequest>,
    res_mixed_args: Receiver<WeirdMixedArgsResponse>,
    req_unnamed_duplicate_types: Sender<WeirdUnnamedDuplicateTypesRequest>,
    res_unnamed_duplicate_types: Receiver<WeirdUnnamedDuplicateTypesResponse>,
}

/// Run-loop half of `WeirdAgent`; the only owner of the wrapped value.
struct WeirdAgentLoop<W> {
    wrapped: W,
    req_unnamed_args: Receiver<WeirdUnnamedArgsRequest>,
    res_unnamed_args: Sender<WeirdUnnamedArgsResponse>,
    req_repeated_types: Receiver<WeirdRepeatedTypesRequest>,
    res_repeated_types: Sender<WeirdRepeatedTypesResponse>,
    req_mixed_args: Receiver<WeirdMixedArgsRequest>,
    res_mixed_args: Sender<WeirdMixedArgsResponse>,
    req_unnamed_duplicate_types: Receiver<WeirdUnnamedDuplicateTypesRequest>,
    res_unnamed_duplicate_types: Sender<WeirdUnnamedDuplicateTypesResponse>,
}

impl WeirdAgent {
    /// Take exclusive ownership of `wrapped` and launch the run loop.
    pub fn spawn<W>(wrapped: W) -> Result<Self, AgentError>
    where
        W: Weird + Send + 'static,
    {
        let (req_unnamed_args_tx, req_unnamed_args_rx) = bounded(0);
        let (res_unnamed_args_tx, res_unnamed_args_rx) = bounded(0);
        let (req_repeated_types_tx, req_repeated_types_rx) = bounded(0);
        let (res_repeated_types_tx, res_repeated_types_rx) = bounded(0);
        let (req_mixed_args_tx, req_mixed_args_rx) = bounded(0);
        let (res_mixed_args_tx, res_mixed_args_rx) = bounded(0);
        let (req_unnamed_duplicate_types_tx, req_unnamed_duplicate_types_rx) = bounded(0);
        let (res_unnamed_duplicate_types_tx, res_unnamed_duplicate_types_rx) = bounded(0);

        let agent_loop = WeirdAgentLoop {
            wrapped,
            req_unnamed_args: req_unnamed_args_rx,
            res_unnamed_args: res_unnamed_args_tx,
            req_repeated_types: req_repeated_types_rx,
            res_repeated_types: res_repeated_types_tx,
            req_mixed_args: req_mixed_args_rx,
            res_mixed_args: res_mixed_args_tx,
            req_unnamed_duplicate_types: req_unnamed_duplicate_types_rx,
            res_unnamed_duplicate_types: res_unnamed_duplicate_types_tx,
        };
        let lifecycle = Lifecycle::launch("WeirdAgent", move |control| agent_loop.run(control))?;

        Ok(Self {
            lifecycle,
            req_unnamed_args: req_unnamed_args_tx,
            res_unnamed_args: res_unnamed_args_rx,
            req_repeated_types: req_repeated_types_tx,
            res_repeated_types: res_repeated_types_rx,
            req_mixed_args: req_mixed_args_tx,
            res_mixed_args: res_mixed_args_rx,
            req_unnamed_duplicate_types: req_unnamed_duplicate_types_tx,
            res_unnamed_duplicate_types: res_unnamed_duplicate_types_rx,
        })
    }

    /// Forward `Weird::unnamed_args` to the run loop and wait for its results.
    pub fn unnamed_args(&self, arg1: i64, arg2: String, arg3: Thing) -> Result<(Thing, i64, String, bool, Option<Error>), AgentError> {
        self.req_unnamed_args.send(WeirdUnnamedArgsRequest { arg1, arg2, arg3 }).map_err(|_| AgentError::Closed)?;
        let res = self.res_unnamed_args.recv().map_err(|_| AgentError::Closed)?;
        Ok((res.val1, res.val2, res.val3, res.val4, res.val5))
    }

    /// Forward `Weird::repeated_types` to the run loop and wait for its results.
    pub fn repeated_types(&self, a: i64, b: i64, foo: Thing) -> Result<(Thing, Thing, Thing, Option<Error>), AgentError> {
        self.req_repeated_types.send(WeirdRepeatedTypesRequest { a, b, foo }).map_err(|_| AgentError::Closed)?;
        let res = self.res_repeated_types.recv().map_err(|_| AgentError::Closed)?;
        Ok((res.x, res.y, res.z, res.err))
    }

    /// Forward `Weird::mixed_args` to the run loop and wait for its results.
    pub fn mixed_args(&self, a: i64, b: String, c: Thing, d: Thing) -> Result<(i64, i64, i64, Thing), AgentError> {
        self.req_mixed_args.send(WeirdMixedArgsRequest { a, b, c, d }).map_err(|_| AgentError::Closed)?;
        let res = self.res_mixed_args.recv().map_err(|_| AgentError::Closed)?;
        Ok((res.x, res.y, res.z, res.thang))
    }

    /// Forward `Weird::unnamed_duplicate_types` to the run loop and wait for its results.
    pub fn unnamed_duplicate_types(&self, arg1: i64, arg2: i64, arg3: String, arg4: Thing, arg5: String, arg6: Thing) -> Result<(Thing, i64, Thing, i64, Option<Error>), AgentError> {
        self.req_unnamed_duplicate_types.send(WeirdUnnamedDuplicateTypesRequest { arg1, arg2, arg3, arg4, arg5, arg6 }).map_err(|_| AgentError::Closed)?;
        let res = self.res_unnamed_duplicate_types.recv().map_err(|_| AgentError::Closed)?;
        Ok((res.val1, res.val2, res.val3, res.val4, res.val5))
    }
}

impl Agent for WeirdAgent {
    fn start(&self) -> Result<(), AgentError> {
        self.lifecycle.start()
    }

    fn stop(&self) -> Result<(), AgentError> {
        self.lifecycle.stop()
    }

    fn close(&self) -> Result<(), AgentError> {
        self.lifecycle.close()
    }

    fn state(&self) -> AgentState {
        self.lifecycle.state()
    }
}

impl<W: Weird> WeirdAgentLoop<W> {
    /// Service one ready channel per iteration until closed.
    ///
    /// | state | signal | next | effect |
    /// |-------|--------|------|--------|
    /// | started | start | started | none |
    /// | started | stop | stopped | none |
    /// | started | close | closed | release channels |
    /// | stopped | start | started | none |
    /// | stopped | stop | stopped | none |
    /// | stopped | close | closed | release channels |
    fn run(self, control: Control) {
        #[allow(unused_mut)]
        let Self {
            mut wrapped,
            req_unnamed_args,
            res_unnamed_args,
            req_repeated_types,
            res_repeated_types,
            req_mixed_args,
            res_mixed_args,
            req_unnamed_duplicate_types,
            res_unnamed_duplicate_types,
        } = self;

        loop {
            select! {
                recv(control.signals()) -> signal => {
                    if control.apply(signal).is_exit() {
                        return;
                    }
                }
                recv(req_unnamed_args) -> msg => {
                    let Ok(msg) = msg else {
                        return;
                    };
                    let (val1, val2, val3, val4, val5) = wrapped.unnamed_args(msg.arg1, msg.arg2, msg.arg3);
                    if res_unnamed_args.send(WeirdUnnamedArgsResponse { val1, val2, val3, val4, val5 }).is_err() {
                        return;
                    }
                }
                recv(req_repeated_types) -> msg => {
                    let Ok(msg) = msg else {
                        return;
                    };
                    let (x, y, z, err) = wrapped.repeated_types(msg.a, msg.b, msg.foo);
                    if res_repeated_types.send(WeirdRepeatedTypesResponse { x, y, z, err }).is_err() {
                        return;
                    }
                }
                recv(req_mixed_args) -> msg => {
                    let Ok(msg) = msg else {
                        return;
                    };
                    let (x, y, z, thang) = wrapped.mixed_args(msg.a, msg.b, msg.c, msg.d);
                    if res_mixed_args.send(WeirdMixedArgsResponse { x, y, z, thang }).is_err() {
                        return;
                    }
                }
                recv(req_unnamed_duplicate_types) -> msg => {
                    let Ok(msg) = msg else {
                        return;
                    };
                    let (val1, val2, val3, val4, val5) = wrapped.unnamed_duplicate_types(msg.arg1, msg.arg2, msg.arg3, msg.arg4, msg.arg5, msg.arg6);
                    if res_unnamed_duplicate_types.send(WeirdUnnamedDuplicateTypesResponse { val1, val2, val3, val4, val5 }).is_err() {
                        return;
                    }
                }
            }
        }
    }
}

/// Build a `Thing` with `Thing::new` and wrap it in a running `WeirdAgent`.
pub fn thing_new_agent(a: i64, b: i64) -> Result<WeirdAgent, AgentError> {
    let wrapped = Thing::new(a, b);
    WeirdAgent::spawn(wrapped)
}
