use crate::config::ConfigError;
use crate::{ArcError, DebugProbeError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("An error with the usage of the probe occured")]
    Probe(#[from] DebugProbeError),
    #[error("An ARC specific error occured")]
    Arc(#[from] ArcError),
    #[error("The target configuration is invalid")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Returns the transport error if this error was caused by the debug probe.
    pub fn as_probe_error(&self) -> Option<&DebugProbeError> {
        match self {
            Error::Probe(e) => Some(e),
            _ => None,
        }
    }
}
