//! config.rs — loader configuration resolved at start-up
//!
//! Build options become plain values here so routing decisions are made
//! at run time and every combination stays testable on the host.

use crate::error::BootError;

/// Partition label of the bootloader control block.
pub const MISC_LABEL: &str = "misc";

/// Where a `CrashDiagnostics` target is served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrashTransport {
    /// Dedicated crashmode session over the companion (adb) transport.
    Companion,
    /// No companion transport: crashmode falls back to fastboot.
    Fastboot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderConfig {
    pub crash_transport: CrashTransport,
    pub user_build: bool,
    pub misc_label: &'static str,
}

impl LoaderConfig {
    /// Configuration described by the enabled Cargo features.
    pub fn from_build() -> Self {
        Self {
            crash_transport: if cfg!(feature = "crashmode-adb") {
                CrashTransport::Companion
            } else {
                CrashTransport::Fastboot
            },
            user_build: cfg!(feature = "user"),
            misc_label: MISC_LABEL,
        }
    }

    /// Reject combinations that must never ship.
    pub fn validate(&self) -> Result<(), BootError> {
        if self.user_build && self.crash_transport == CrashTransport::Companion {
            return Err(BootError::Config("adb in crashmode MUST be disabled on a USER build"));
        }
        if self.misc_label.is_empty() {
            return Err(BootError::Config("empty control block label"));
        }
        Ok(())
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            crash_transport: CrashTransport::Fastboot,
            user_build: false,
            misc_label: MISC_LABEL,
        }
    }
}
