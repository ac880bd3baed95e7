//! Error types shared across the core
//!
//! None of these escape a component as control flow: the sequencer folds
//! [`InitError`] into its fatal flag, and the backend policy folds
//! [`BackendError`] into "not loaded" or an unknown wait estimate.

use thiserror::Error;

use crate::hal::TransportError;
use crate::init::InitPhase;

/// A collaborator could not be constructed
#[derive(Debug, Error)]
pub enum SubsystemError {
    #[error("{0} not detected")]
    NotDetected(&'static str),

    #[error("{0} failed to initialize")]
    InitFailed(&'static str),

    #[error("{0}")]
    Other(String),
}

/// Failure of one initialization phase
#[derive(Debug, Error)]
pub enum InitError {
    #[error("{phase} initialization failed: {source}")]
    Subsystem {
        phase: InitPhase,
        #[source]
        source: SubsystemError,
    },

    #[error("UI initialization failed: requires display and touch")]
    UiPrerequisites,
}

impl InitError {
    pub fn phase(&self) -> InitPhase {
        match self {
            InitError::Subsystem { phase, .. } => *phase,
            InitError::UiPrerequisites => InitPhase::Ui,
        }
    }
}

/// Backend call did not produce a usable answer
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("network unavailable")]
    NoNetwork,

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unparsable payload")]
    Unparsable,

    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("request already in flight")]
    InFlight,
}

/// Resident table errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("resident registry full ({capacity} records)")]
    Full { capacity: usize },

    #[error("invalid resident UID: {0}")]
    InvalidUid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_error_messages() {
        let err = InitError::Subsystem {
            phase: InitPhase::Display,
            source: SubsystemError::NotDetected("ILI9341"),
        };
        assert_eq!(err.to_string(), "Display initialization failed: ILI9341 not detected");
        assert_eq!(err.phase(), InitPhase::Display);
        assert_eq!(InitError::UiPrerequisites.phase(), InitPhase::Ui);
    }
}
