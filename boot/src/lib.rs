//! ABL Boot-Mode Dispatcher — UEFI pre-OS loader core
//!
//! Drives the loader's boot modes until a definitive boot target is chosen:
//! - Interactive flashing (fastboot) cycles, including `fastboot boot`
//!   image hand-off across a warm reset
//! - Crash diagnostics (crashmode) over the companion transport
//! - Direct restarts into any other boot target
//!
//! Every firmware service is reached through the traits in [`platform`], so the
//! whole state machine runs unchanged against the real UEFI bindings in `efi`
//! or against scripted collaborators in tests.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod bcb;
pub mod cmdline;
pub mod config;
pub mod crashmode;
pub mod crc32;
pub mod dispatch;
pub mod error;
pub mod fastboot_mode;
pub mod image;
pub mod platform;
pub mod target;

#[cfg(target_os = "uefi")]
pub mod efi;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{CrashTransport, LoaderConfig};
pub use dispatch::Dispatcher;
pub use error::BootError;
pub use target::{BootTarget, ResetKind};
