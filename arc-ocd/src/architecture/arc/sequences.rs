//! Debug sequences for ARC targets with special requirements.

use std::{fmt::Debug, sync::Arc};

use crate::{
    architecture::arc::{
        register_cache::RegisterCache,
        registers::{RegisterId, AUX_PC, AUX_STATUS32},
    },
    probe::ArcJtagAccess,
};

/// A interface to operate debug sequences for ARC targets.
///
/// Should be implemented on a custom handle for chips that require special sequence code.
pub trait ArcDebugSequence: Send + Sync + Debug {
    /// Executed when the core enters debug state, after it was observed halted.
    ///
    /// Captures the context of the halted core into the register cache.
    fn debug_entry(
        &self,
        interface: &mut dyn ArcJtagAccess,
        register_cache: &mut RegisterCache,
    ) -> Result<(), crate::Error> {
        for address in [AUX_PC, AUX_STATUS32] {
            let value = interface.read_aux_reg(address)?;
            register_cache.store(RegisterId::Aux(address), value);
        }

        for (_, entry) in register_cache.iter() {
            if let Some(value) = entry.value() {
                tracing::debug!("Debug entry, {}: {:#010x}", entry.name(), value);
            }
        }

        Ok(())
    }
}

/// The default sequences that is used for ARC chips that do not specify a specific sequence.
#[derive(Debug)]
pub struct DefaultArcSequence(pub(crate) ());

impl DefaultArcSequence {
    /// Creates a new default ARC debug sequence.
    pub fn create() -> Arc<dyn ArcDebugSequence> {
        Arc::new(Self(()))
    }
}

impl ArcDebugSequence for DefaultArcSequence {}
