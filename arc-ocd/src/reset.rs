//! Reset line configuration of the probe and the signal sequences derived from it.

use serde::{Deserialize, Serialize};

/// Describes which reset lines the probe has and how they are wired to the target.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResetConfig {
    /// The probe drives a system reset (srst) line.
    pub has_srst: bool,
    /// Asserting srst also resets the TAP, as if trst were asserted.
    pub srst_pulls_trst: bool,
    /// The JTAG interface stays usable while srst is asserted.
    pub srst_no_gating: bool,
}

/// Levels of the reset lines, `true` meaning asserted.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ResetLines {
    /// Test reset.
    pub trst: bool,
    /// System reset.
    pub srst: bool,
}

impl ResetLines {
    /// Both lines released.
    pub const RELEASED: ResetLines = ResetLines {
        trst: false,
        srst: false,
    };

    /// Only system reset asserted.
    pub const SRST: ResetLines = ResetLines {
        trst: false,
        srst: true,
    };

    /// System reset and test reset asserted together.
    pub const SRST_AND_TRST: ResetLines = ResetLines {
        trst: true,
        srst: true,
    };
}

impl ResetConfig {
    /// Returns the levels to drive, in order, to put the target into reset.
    ///
    /// srst is asserted on its own first if that does not gate the JTAG
    /// interface. If srst resets the TAP as well, the combined level is used
    /// instead, and srst is never asserted twice in a row.
    pub fn assert_sequence(&self) -> Vec<ResetLines> {
        let mut sequence = Vec::with_capacity(2);
        let mut srst_asserted = false;

        // some cores support connecting while srst is asserted
        if !self.srst_pulls_trst && self.srst_no_gating {
            sequence.push(ResetLines::SRST);
            srst_asserted = true;
        }

        if self.has_srst {
            if self.srst_pulls_trst {
                sequence.push(ResetLines::SRST_AND_TRST);
            } else if !srst_asserted {
                sequence.push(ResetLines::SRST);
            }
        }

        sequence
    }

    /// Returns the levels which take the target out of reset.
    pub fn deassert_sequence(&self) -> ResetLines {
        ResetLines::RELEASED
    }
}
