//! error.rs — loader error taxonomy
//!
//! Every variant keeps the firmware [`Status`] it came from so the fatal
//! path can hand it back to the firmware as the application exit status.

use thiserror::Error;
use uefi::Status;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BootError {
    #[error("image checksum computation failed ({0:?})")]
    IntegrityComputation(Status),

    #[error("unable to update BCB contents ({0:?})")]
    Persist(Status),

    #[error("restart request declined ({0:?})")]
    Restart(Status),

    #[error("fastboot mode failed ({0:?})")]
    ModeTransport(Status),

    #[error("crashmode transport failed ({0:?})")]
    Diagnostics(Status),

    #[error("slot management initialization failed ({0:?})")]
    SlotInit(Status),

    #[error("start arguments unavailable ({0:?})")]
    StartArguments(Status),

    #[error("companion controller notification failed ({0:?})")]
    Companion(Status),

    /// Image length or location does not fit the 32-bit control-block fields.
    #[error("boot image outside the 32-bit hand-off window")]
    ImageOutOfRange,

    #[error("invalid loader configuration: {0}")]
    Config(&'static str),
}

impl BootError {
    /// Firmware status carried by this error.
    pub fn status(&self) -> Status {
        match *self {
            BootError::IntegrityComputation(s)
            | BootError::Persist(s)
            | BootError::Restart(s)
            | BootError::ModeTransport(s)
            | BootError::Diagnostics(s)
            | BootError::SlotInit(s)
            | BootError::StartArguments(s)
            | BootError::Companion(s) => s,
            BootError::ImageOutOfRange => Status::BUFFER_TOO_SMALL,
            BootError::Config(_) => Status::UNSUPPORTED,
        }
    }
}
