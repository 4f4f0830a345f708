//! All the interface bits for ARC.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use crate::{
    architecture::Architecture,
    config::{TargetConfig, Timing},
    probe::ArcJtagAccess,
    reset::ResetConfig,
    target::{ExamineOutcome, PollOutcome, Target, TargetEvent, TargetInterface, TargetState},
    Error,
};

use self::{
    register_cache::RegisterCache,
    registers::{AuxDebug, AuxRegister, Identity, JtagStatus, Status32, ARC_REGISTERS, AUX_PC},
    sequences::{ArcDebugSequence, DefaultArcSequence},
};

pub mod register_cache;
pub mod registers;
pub mod sequences;

/// Marks the private state of an ARC target.
const ARC_COMMON_MAGIC: u32 = 0xB32E_B324;

/// Errors for the ARC run control.
#[derive(thiserror::Error, Debug)]
pub enum ArcError {
    /// The core did not halt in time.
    #[error("Timeout while waiting for the core to halt")]
    Timeout,
    /// The operation requires a halted core.
    #[error("Core is running but operation requires it to be halted")]
    NotHalted,
}

/// Private state of an ARC target, allocated when the target is created.
#[derive(Debug)]
pub struct ArcCoreState {
    common_magic: u32,

    register_cache: RegisterCache,

    /// Contents of the `IDENTITY` register, read during examination.
    identity: Option<Identity>,
}

impl ArcCoreState {
    pub(crate) fn new() -> Self {
        Self {
            common_magic: ARC_COMMON_MAGIC,
            register_cache: RegisterCache::new(),
            identity: None,
        }
    }

    /// Returns `true` if this state belongs to an ARC target.
    pub fn is_arc(&self) -> bool {
        self.common_magic == ARC_COMMON_MAGIC
    }
}

/// Run control of a single ARC core.
pub struct ArcCore<'probe> {
    interface: &'probe mut dyn ArcJtagAccess,
    state: ArcCoreState,
    reset_config: ResetConfig,
    timing: Timing,
    sequence: Arc<dyn ArcDebugSequence>,
}

impl<'probe> ArcCore<'probe> {
    /// Creates the run control for the core behind `interface`, using the default debug sequence.
    pub fn create(
        interface: &'probe mut dyn ArcJtagAccess,
        config: &TargetConfig,
    ) -> Result<Self, Error> {
        Self::create_with_sequence(interface, config, DefaultArcSequence::create())
    }

    /// Creates the run control for the core behind `interface`, using a chip specific debug sequence.
    pub fn create_with_sequence(
        interface: &'probe mut dyn ArcJtagAccess,
        config: &TargetConfig,
        sequence: Arc<dyn ArcDebugSequence>,
    ) -> Result<Self, Error> {
        tracing::debug!("Creating ARC target {}", config.name);

        Ok(Self {
            interface,
            state: ArcCoreState::new(),
            reset_config: config.reset,
            timing: config.timing,
            sequence,
        })
    }

    /// The private state of the target.
    pub fn core_state(&self) -> &ArcCoreState {
        &self.state
    }

    /// The register cache of the core.
    pub fn register_cache(&self) -> &RegisterCache {
        &self.state.register_cache
    }

    /// Contents of the `IDENTITY` register, available once the target was examined.
    pub fn identity(&self) -> Option<Identity> {
        self.state.identity
    }

    fn jtag_status(&mut self) -> Result<JtagStatus, Error> {
        Ok(JtagStatus(self.interface.status()?))
    }

    fn read_aux<R: AuxRegister>(&mut self) -> Result<R, Error> {
        let value = self.interface.read_aux_reg(R::ADDRESS)?;
        tracing::trace!("{}: {:#010x}", R::NAME, value);
        Ok(R::from(value))
    }

    fn write_aux<R: AuxRegister>(&mut self, register: R) -> Result<(), Error> {
        self.interface.write_aux_reg(R::ADDRESS, register.into())?;
        Ok(())
    }

    /// Sets the force halt bit of the `DEBUG` register.
    fn force_halt(&mut self) -> Result<(), Error> {
        let mut debug: AuxDebug = self.read_aux()?;
        debug.set_force_halt(true);
        self.write_aux(debug)
    }

    fn wait_for_core_halted(&mut self, timeout: Duration) -> Result<(), Error> {
        // Wait until halted state is active again.
        let start = Instant::now();

        while self.jtag_status()?.running() {
            if start.elapsed() >= timeout {
                return Err(ArcError::Timeout.into());
            }
            // Wait a bit before polling again.
            self.interface.sleep(Duration::from_millis(1));
        }

        Ok(())
    }

    /// Moves the target to halted, captures the core context and notifies the host.
    fn enter_halted(&mut self, target: &mut Target, event: TargetEvent) -> Result<PollOutcome, Error> {
        target.set_state(TargetState::Halted);

        self.sequence
            .debug_entry(&mut *self.interface, &mut self.state.register_cache)?;

        target.call_event_callbacks(event);

        Ok(PollOutcome::Halted(event))
    }
}

impl TargetInterface for ArcCore<'_> {
    fn architecture(&self) -> Architecture {
        Architecture::Arc
    }

    fn init_target(&mut self, target: &mut Target) -> Result<(), Error> {
        tracing::debug!("Initializing target {}", target.name());

        self.state.register_cache.build(ARC_REGISTERS);

        Ok(())
    }

    fn examine(&mut self, target: &mut Target) -> Result<ExamineOutcome, Error> {
        self.interface.startup()?;

        if target.was_examined() {
            tracing::debug!("Target {} was already examined", target.name());
            return Ok(ExamineOutcome::AlreadyExamined);
        }

        let idcode = self.interface.idcode()?;
        tracing::debug!("JTAG ID: {:#010x}", idcode);
        let status = self.jtag_status()?;
        tracing::debug!("JTAG status: {:#010x}", u32::from(status));

        tracing::debug!("Bringing ARC core into halt state");
        self.force_halt()?;
        self.interface.sleep(self.timing.force_halt_settle());

        let status = self.jtag_status()?;
        tracing::debug!("JTAG status: {:#010x}", u32::from(status));

        let identity: Identity = self.read_aux()?;
        tracing::debug!(
            "CPU ID: {:#010x} ({}, core {})",
            u32::from(identity),
            identity.family(),
            identity.arc_number()
        );
        self.state.identity = Some(identity);

        let pc = self.interface.read_aux_reg(AUX_PC)?;
        tracing::debug!("current PC: {:#010x}", pc);

        self.state.register_cache.build(ARC_REGISTERS);

        let outcome = if self.jtag_status()?.running() {
            tracing::warn!("Target {} is still running after forced halt", target.name());
            target.set_state(TargetState::Running);
            ExamineOutcome::StillRunning
        } else {
            tracing::debug!("Target {} is halted", target.name());
            // Halted after restart, no debug entry has happened yet.
            target.set_state(TargetState::Reset);
            ExamineOutcome::Halted
        };

        target.set_examined();

        Ok(outcome)
    }

    fn poll(&mut self, target: &mut Target) -> Result<PollOutcome, Error> {
        let status = self.jtag_status()?;

        if status.running() {
            if target.state() == TargetState::Running {
                return Ok(PollOutcome::Unchanged);
            }

            tracing::warn!(
                "Target {} is running, but was {}",
                target.name(),
                target.state()
            );
            target.set_state(TargetState::Running);
            return Ok(PollOutcome::ResumedExternally);
        }

        match target.state() {
            TargetState::Running | TargetState::Reset => {
                tracing::debug!("ARC core is halted or in reset");
                self.enter_halted(target, TargetEvent::Halted)
            }
            TargetState::DebugRunning => {
                tracing::debug!("ARC core halted after debug execution");
                self.enter_halted(target, TargetEvent::DebugHalted)
            }
            TargetState::Halted | TargetState::Unknown => Ok(PollOutcome::Unchanged),
        }
    }

    fn assert_reset(&mut self, target: &mut Target) -> Result<(), Error> {
        tracing::debug!("assert_reset, target state: {}", target.state());

        let driven = self
            .reset_config
            .assert_sequence()
            .into_iter()
            .try_for_each(|lines| self.interface.set_reset_lines(lines.trst, lines.srst));

        // Even a partially driven sequence may have reset the core, so the
        // cached context is dropped before any error is returned.
        target.set_state(TargetState::Reset);
        self.state.register_cache.invalidate();

        if let Err(error) = driven {
            tracing::warn!("Failed to assert reset on {}: {}", target.name(), error);
            return Err(error.into());
        }

        self.interface.sleep(self.timing.reset_settle());

        if target.reset_halt() {
            self.halt(target)?;
        }

        Ok(())
    }

    fn deassert_reset(&mut self, target: &mut Target) -> Result<(), Error> {
        tracing::debug!("deassert_reset, target state: {}", target.state());

        let lines = self.reset_config.deassert_sequence();
        self.interface.set_reset_lines(lines.trst, lines.srst)?;

        Ok(())
    }

    fn halt(&mut self, target: &mut Target) -> Result<(), Error> {
        tracing::debug!("halt, target state: {}", target.state());

        if target.state() == TargetState::Halted {
            tracing::debug!("Target {} is already halted", target.name());
            return Ok(());
        }

        self.force_halt()?;
        self.wait_for_core_halted(self.timing.halt_timeout())
    }

    fn resume(&mut self, target: &mut Target, debug_execution: bool) -> Result<(), Error> {
        tracing::debug!(
            "resume, target state: {}, debug execution: {}",
            target.state(),
            debug_execution
        );

        if target.state() != TargetState::Halted {
            return Err(ArcError::NotHalted.into());
        }

        self.state.register_cache.invalidate();

        let mut status32: Status32 = self.read_aux()?;
        status32.set_halted(false);
        self.write_aux(status32)?;

        if debug_execution {
            target.set_state(TargetState::DebugRunning);
            target.call_event_callbacks(TargetEvent::DebugResumed);
        } else {
            target.set_state(TargetState::Running);
            target.call_event_callbacks(TargetEvent::Resumed);
        }

        Ok(())
    }
}
