//! # Run control for ARC cores over JTAG
//!
//! This crate implements the target state machine of an ARC core that is
//! attached through a JTAG debug transport: it polls the run/halt status of the
//! core, sequences the reset lines according to the wiring of the probe, and
//! performs the one-time examination that brings the core into a known state.
//!
//! The JTAG transport itself is provided by the caller through the
//! [`ArcJtagAccess`] trait, and the target object is owned by the host
//! debugger, which passes it into every operation of [`TargetInterface`].
//!
//! # Examples
//!
//! ## Bringing up a core
//!
//! ```no_run
//! # use arc_ocd::Error;
//! use arc_ocd::{ArcJtagAccess, Target, TargetConfig, TargetInterface};
//!
//! fn bring_up(probe: &mut dyn ArcJtagAccess) -> Result<(), Error> {
//!     let config = TargetConfig::from_yaml_str(
//!         "name: arc700\nreset:\n  has_srst: true\nreset_halt: true\n",
//!     )?;
//!     let mut target = Target::from_config(&config);
//!
//!     let mut core = config.architecture.create_target(probe, &config)?;
//!     core.init_target(&mut target)?;
//!     core.examine(&mut target)?;
//!
//!     // The host polls periodically to observe halts.
//!     core.poll(&mut target)?;
//!     Ok(())
//! }
//! ```
//!
//! arc-ocd is built around 3 main interfaces: the [ArcJtagAccess] transport,
//! the host owned [Target], and the [TargetInterface] implemented per core family.

#[warn(missing_docs)]
pub mod architecture;
#[warn(missing_docs)]
pub mod config;
mod error;
#[warn(missing_docs)]
mod probe;
#[warn(missing_docs)]
pub mod reset;
#[warn(missing_docs)]
mod target;

pub use crate::architecture::{
    arc::{
        sequences::{ArcDebugSequence, DefaultArcSequence},
        ArcCore, ArcCoreState, ArcError,
    },
    Architecture,
};
pub use crate::config::{ConfigError, TargetConfig, Timing};
pub use crate::error::Error;
pub use crate::probe::{ArcJtagAccess, DebugProbeError};
pub use crate::reset::{ResetConfig, ResetLines};
pub use crate::target::{
    ExamineOutcome, PollOutcome, Target, TargetEvent, TargetInterface, TargetState,
};

// Exports only used in tests
#[cfg(any(test, feature = "test"))]
pub use crate::probe::fake_probe::{FailOn, FakeProbe, Operation as ProbeOperation};
