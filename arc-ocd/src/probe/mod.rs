//! The JTAG transport used to talk to an ARC core.
//!
//! Shifting of the scan chain is left to the probe driver. The state machine
//! only needs the register level primitives of the ARC JTAG interface and
//! control over the reset lines, which are described by [`ArcJtagAccess`].

#[cfg(any(test, feature = "test"))]
pub(crate) mod fake_probe;

use std::time::Duration;

/// This error occurs whenever the debug probe logic encounters an error while operating the relevant debug probe.
#[derive(thiserror::Error, Debug)]
pub enum DebugProbeError {
    /// The probe is not attached to a target.
    #[error("You need to be attached to the target to perform this action")]
    NotAttached,
    /// A JTAG transaction did not complete in time.
    #[error("Operation timed out")]
    Timeout,
    /// The probe does not implement the requested command.
    #[error("Command not supported by probe")]
    CommandNotSupportedByProbe,
    /// The ARC JTAG interface reported a failed transaction.
    #[error("The JTAG transaction failed, status {0:#06x}")]
    TransactionFailed(u32),
    /// An error which is specific to the debug probe in use occurred.
    #[error("An error specific to a probe type occured")]
    ProbeSpecific(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// Any other error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Low level access to the ARC JTAG interface.
///
/// Implemented by probe drivers. All register accesses are expected to be
/// complete once the call returns.
pub trait ArcJtagAccess {
    /// Brings the JTAG link up, or confirms that it is still up.
    fn startup(&mut self) -> Result<(), DebugProbeError>;

    /// Reads the raw value of the ARC JTAG status register.
    fn status(&mut self) -> Result<u32, DebugProbeError>;

    /// Reads the JTAG IDCODE of the TAP.
    fn idcode(&mut self) -> Result<u32, DebugProbeError>;

    /// Reads the auxiliary register at `address`.
    fn read_aux_reg(&mut self, address: u32) -> Result<u32, DebugProbeError>;

    /// Writes `value` to the auxiliary register at `address`.
    fn write_aux_reg(&mut self, address: u32, value: u32) -> Result<(), DebugProbeError>;

    /// Drives the test reset and system reset lines. `true` means asserted.
    ///
    /// Probes without one of the lines ignore the request for that line.
    fn set_reset_lines(&mut self, trst: bool, srst: bool) -> Result<(), DebugProbeError>;

    /// Waits for `duration` before the next operation is issued.
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
