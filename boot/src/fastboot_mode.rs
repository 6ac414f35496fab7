//! fastboot_mode.rs — interactive flashing cycle runner
//!
//! Runs fastboot sessions back to back until the host picks a target:
//!  1. Reset the working target and staged images
//!  2. Run one transport cycle
//!  3. Hand any staged boot image to [`process_boot_image`]
//!  4. Loop while the target is undecided, cold-reset into normal boot or
//!     fastboot, hand any other target back to the dispatcher

use log::{debug, error, info, warn};

use crate::error::BootError;
use crate::image::process_boot_image;
use crate::platform::{FlashTransport, Platform};
use crate::target::{BootTarget, ResetKind};

/// Working state of one fastboot cycle, filled in by the transport.
#[derive(Debug)]
pub struct FlashCycle<I> {
    pub target: BootTarget,
    /// Image staged by `fastboot boot`.
    pub boot_image: Option<I>,
    /// Auxiliary EFI image staged alongside it, if any.
    pub aux_image: Option<I>,
}

impl<I> FlashCycle<I> {
    pub fn new() -> Self {
        Self { target: BootTarget::Unknown, boot_image: None, aux_image: None }
    }

    /// Clear everything a previous cycle left behind, releasing its buffers.
    pub fn reset(&mut self) {
        self.target = BootTarget::Unknown;
        self.boot_image = None;
        self.aux_image = None;
    }

    #[inline]
    pub fn is_reset(&self) -> bool {
        self.target == BootTarget::Unknown && self.boot_image.is_none() && self.aux_image.is_none()
    }
}

impl<I> Default for FlashCycle<I> {
    fn default() -> Self {
        Self::new()
    }
}

/// Drive fastboot until it yields a target, writing it to `target`.
///
/// Returns `Err(ModeTransport)` when the transport or the boot image
/// submission fails; `target` then holds whatever the last cycle left.
pub fn enter_fastboot_mode<P, F>(
    platform: &mut P,
    transport: &mut F,
    misc_label: &str,
    target: &mut BootTarget,
) -> Result<(), BootError>
where
    P: Platform,
    F: FlashTransport,
{
    if let Err(e) = platform.notify_companion_ready() {
        warn!("notify ioc ready failed: {}", e);
    }

    let mut cycle = FlashCycle::new();
    loop {
        cycle.reset();
        *target = BootTarget::Unknown;

        if let Err(e) = transport.start(&mut cycle) {
            error!("Fastboot mode failed: {}", e);
            return Err(BootError::ModeTransport(e.status()));
        }
        *target = cycle.target;

        if let Err(e) = process_boot_image(platform, misc_label, cycle.boot_image.as_ref()) {
            error!("Process bootimage failed: {}", e);
            drop(cycle.boot_image.take());
            return Err(BootError::ModeTransport(e.status()));
        }

        match *target {
            BootTarget::Unknown => {
                debug!("fastboot cycle ended without a target, continuing");
                continue;
            }
            BootTarget::NormalBoot | BootTarget::InteractiveFlash => {
                info!("fastboot requested {}, cold reset", target);
                if let Err(e) = platform.restart(*target, ResetKind::Cold) {
                    error!("Failed to reboot to {}: {}", target, e);
                }
                return Ok(());
            }
            other => {
                info!("leaving fastboot for {}", other);
                return Ok(());
            }
        }
    }
}
