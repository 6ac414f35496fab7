//! efi — firmware bindings for the dispatcher
//!
//! - [`platform::EfiPlatform`]: boot/runtime services, lock state, BCB writes
//! - [`transport`]: vendor fastboot and crashmode protocols
//! - [`protocols`]: vendor protocol layouts located by GUID
//! - [`misc`]: raw control block writes to the `misc` GPT partition

pub mod misc;
pub mod platform;
pub mod protocols;
pub mod transport;

pub use platform::EfiPlatform;
pub use transport::{EfiCrashMode, EfiFastboot};
