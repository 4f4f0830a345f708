//! The target object owned by the host debugger, and the interface implemented per core family.

use std::fmt;

use crate::{architecture::Architecture, config::TargetConfig, Error};

/// The run state of a target, as tracked by the debugger.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum TargetState {
    /// The target was not examined yet, nothing is known about it.
    #[default]
    Unknown,
    /// The core is running.
    Running,
    /// The core is halted, and its context was captured.
    Halted,
    /// Reset was asserted, or the core was halted during examination. The core
    /// is expected to be halted, but no debug entry has happened yet.
    Reset,
    /// The core is executing code on behalf of the debugger.
    DebugRunning,
}

impl TargetState {
    /// Name of the state, as used by the host framework.
    pub fn name(&self) -> &'static str {
        match self {
            TargetState::Unknown => "unknown",
            TargetState::Running => "running",
            TargetState::Halted => "halted",
            TargetState::Reset => "reset",
            TargetState::DebugRunning => "debug-running",
        }
    }
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Notifications sent to the host when the run state changes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TargetEvent {
    /// The core halted.
    Halted,
    /// The core halted after executing code on behalf of the debugger.
    DebugHalted,
    /// The core was resumed.
    Resumed,
    /// The core was resumed to execute code on behalf of the debugger.
    DebugResumed,
}

/// The result of polling a target.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The hardware agrees with the tracked state.
    Unchanged,
    /// The core runs, although it was not known to be running.
    ResumedExternally,
    /// The core halted. The event was sent to the registered callbacks.
    Halted(TargetEvent),
}

/// The result of examining a target.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExamineOutcome {
    /// The target was examined before, nothing was done.
    AlreadyExamined,
    /// The core halted and the target is in [`TargetState::Reset`].
    Halted,
    /// The core kept running after the forced halt.
    StillRunning,
}

type EventCallback = Box<dyn FnMut(TargetEvent) + Send>;

/// A debuggable target.
///
/// The host debugger owns the target and passes it into every operation of
/// [`TargetInterface`]. Only the core implementations change the state and the
/// examined flag.
pub struct Target {
    name: String,
    state: TargetState,
    examined: bool,
    reset_halt: bool,
    event_callbacks: Vec<EventCallback>,
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("examined", &self.examined)
            .field("reset_halt", &self.reset_halt)
            .field("event_callbacks", &self.event_callbacks.len())
            .finish()
    }
}

impl Target {
    /// Creates a new, unexamined target.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: TargetState::Unknown,
            examined: false,
            reset_halt: false,
            event_callbacks: vec![],
        }
    }

    /// Creates a new, unexamined target from its description.
    pub fn from_config(config: &TargetConfig) -> Self {
        let mut target = Self::new(config.name.clone());
        target.reset_halt = config.reset_halt;
        target
    }

    /// The name of the target.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The current run state.
    pub fn state(&self) -> TargetState {
        self.state
    }

    /// Returns `true` once the target was examined.
    pub fn was_examined(&self) -> bool {
        self.examined
    }

    /// Returns `true` if the core should be halted right after reset.
    pub fn reset_halt(&self) -> bool {
        self.reset_halt
    }

    /// Configures whether the core is halted right after reset.
    pub fn set_reset_halt(&mut self, reset_halt: bool) {
        self.reset_halt = reset_halt;
    }

    /// Registers a callback which receives every event of this target.
    pub fn register_event_callback(&mut self, callback: impl FnMut(TargetEvent) + Send + 'static) {
        self.event_callbacks.push(Box::new(callback));
    }

    pub(crate) fn set_state(&mut self, state: TargetState) {
        if self.state != state {
            tracing::trace!("{}: {} -> {}", self.name, self.state, state);
        }
        self.state = state;
    }

    pub(crate) fn set_examined(&mut self) {
        self.examined = true;
    }

    pub(crate) fn call_event_callbacks(&mut self, event: TargetEvent) {
        tracing::debug!("{}: target event {:?}", self.name, event);

        for callback in self.event_callbacks.iter_mut() {
            callback(event);
        }
    }
}

/// The run control operations the host debugger invokes on a target.
///
/// Implemented once per core family. The host never calls two operations at
/// the same time on one target.
pub trait TargetInterface {
    /// Returns the core family of this implementation.
    fn architecture(&self) -> Architecture;

    /// Performs setup after creation, like constructing the register cache.
    fn init_target(&mut self, target: &mut Target) -> Result<(), Error>;

    /// Brings an unexamined core into a known state. Does nothing if the
    /// target was examined before.
    fn examine(&mut self, target: &mut Target) -> Result<ExamineOutcome, Error>;

    /// Reads the run state of the core and updates the state of the target.
    ///
    /// A newly observed halt captures the context of the core and notifies the
    /// registered callbacks.
    fn poll(&mut self, target: &mut Target) -> Result<PollOutcome, Error>;

    /// Asserts the reset lines and puts the target into [`TargetState::Reset`].
    fn assert_reset(&mut self, target: &mut Target) -> Result<(), Error>;

    /// Releases the reset lines. The resulting state is observed by the next poll.
    fn deassert_reset(&mut self, target: &mut Target) -> Result<(), Error>;

    /// Requests the core to halt, and waits until it reports halted.
    fn halt(&mut self, target: &mut Target) -> Result<(), Error>;

    /// Resumes a halted core.
    ///
    /// With `debug_execution` set, the target enters
    /// [`TargetState::DebugRunning`], and the next halt is reported as
    /// [`TargetEvent::DebugHalted`].
    fn resume(&mut self, target: &mut Target, debug_execution: bool) -> Result<(), Error>;
}
