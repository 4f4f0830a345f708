//! All the interface bits for the different architectures.

use serde::{Deserialize, Serialize};

use crate::{config::TargetConfig, probe::ArcJtagAccess, target::TargetInterface, Error};

pub mod arc;

/// The core family of a target.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Architecture {
    /// Synopsys ARC cores with the ARC JTAG debug interface (ARC600, ARC700, ARC EM).
    #[default]
    Arc,
}

impl Architecture {
    /// Creates the run control implementation for this core family.
    ///
    /// The transport is borrowed for as long as the returned interface lives.
    pub fn create_target<'probe>(
        self,
        interface: &'probe mut dyn ArcJtagAccess,
        config: &TargetConfig,
    ) -> Result<Box<dyn TargetInterface + 'probe>, Error> {
        match self {
            Architecture::Arc => Ok(Box::new(arc::ArcCore::create(interface, config)?)),
        }
    }
}
