//! platform.rs — firmware collaborators consumed by the dispatcher
//!
//! The dispatcher never talks to firmware directly. Each blocking service it
//! needs is one method here; the UEFI bindings live in `efi`, and tests use
//! scripted stand-ins. All calls return synchronously; nothing is retried.

use alloc::string::String;
use alloc::vec::Vec;
use core::convert::Infallible;

use crate::bcb::BootloaderMessage;
use crate::error::BootError;
use crate::fastboot_mode::FlashCycle;
use crate::target::{BootTarget, ResetKind};

/// Boot services, runtime services and device policy.
pub trait Platform {
    /// Whether the device accepts arbitrary images (`fastboot boot`).
    fn device_is_unlocked(&self) -> bool;

    /// Integrity checksum over `data` (CRC-32).
    fn compute_checksum(&self, data: &[u8]) -> Result<u32, BootError>;

    /// Overwrite the whole control block stored under `label`.
    fn write_control_block(&mut self, label: &str, msg: &BootloaderMessage) -> Result<(), BootError>;

    /// Restart into `target`. Only ever returns on failure.
    fn restart(&mut self, target: BootTarget, kind: ResetKind) -> Result<Infallible, BootError>;

    /// Tell the companion controller the loader is up. Best effort.
    fn notify_companion_ready(&mut self) -> Result<(), BootError>;

    /// Arguments the loader image was started with, in order.
    fn start_arguments(&self) -> Result<Vec<String>, BootError>;

    /// Bring up A/B slot bookkeeping. Called once before dispatching.
    fn slot_init(&mut self) -> Result<(), BootError>;
}

/// An image buffer staged in memory by the fastboot transport.
///
/// Dropping the value releases the buffer back to the firmware. The
/// hand-off record stores only [`StagedImage::location`], so an image
/// submitted for boot must stay resident until the warm reset completes.
pub trait StagedImage {
    fn bytes(&self) -> &[u8];

    /// Physical address of the first byte.
    fn location(&self) -> usize;
}

/// Interactive flashing (fastboot) session.
pub trait FlashTransport {
    type Image: StagedImage;

    /// Run one session cycle, leaving any staged images and the chosen
    /// target in `cycle`. `Err` means the transport itself failed; "no
    /// image, no target yet" is a normal `Ok` outcome.
    fn start(&mut self, cycle: &mut FlashCycle<Self::Image>) -> Result<(), BootError>;
}

/// Crash diagnostics (crashmode) session over the companion transport.
pub trait DiagnosticsTransport {
    fn init(&mut self) -> Result<(), BootError>;

    /// Service one round of the transport.
    fn run(&mut self) -> Result<(), BootError>;

    /// Target requested by the host so far; `Unknown` while undecided.
    fn boot_target(&self) -> BootTarget;

    fn exit(&mut self);
}
