//! image.rs — `fastboot boot` image hand-off
//!
//! Instead of flashing, the host may hand the loader an image to boot right
//! away. The image is left where fastboot staged it, described in the BCB
//! and the platform is warm-reset so RAM survives for the next stage.

use core::convert::Infallible;

use log::{error, info, warn};

use crate::bcb::{self, BootloaderMessage};
use crate::error::BootError;
use crate::platform::{Platform, StagedImage};
use crate::target::{BootTarget, ResetKind};

/// Submit a staged boot image for direct boot.
///
/// `None` is a no-op. On a locked device the request is silently dropped.
/// Otherwise the image is checksummed, recorded in the control block under
/// `misc_label` and the platform is warm-reset; success never returns.
///
/// Ownership stays with the caller on every path: on failure the caller
/// releases the buffer, on success the reset makes the question moot.
pub fn process_boot_image<P, I>(
    platform: &mut P,
    misc_label: &str,
    image: Option<&I>,
) -> Result<(), BootError>
where
    P: Platform,
    I: StagedImage,
{
    let image = match image {
        Some(image) => image,
        None => return Ok(()),
    };

    if !platform.device_is_unlocked() {
        warn!("fastboot boot ignored, device is locked");
        return Ok(());
    }

    match submit(platform, misc_label, image)? {}
}

fn submit<P, I>(platform: &mut P, misc_label: &str, image: &I) -> Result<Infallible, BootError>
where
    P: Platform,
    I: StagedImage,
{
    let bytes = image.bytes();
    let crc = platform.compute_checksum(bytes).map_err(|e| {
        error!("CalculateCrc32 failed: {}", e);
        e
    })?;

    let length = u32::try_from(bytes.len()).map_err(|_| {
        error!("boot image too large for hand-off: {} bytes", bytes.len());
        BootError::ImageOutOfRange
    })?;
    let location = u32::try_from(image.location()).map_err(|_| {
        error!("boot image at {:#x} is above the 4 GiB hand-off window", image.location());
        BootError::ImageOutOfRange
    })?;

    let mut msg = BootloaderMessage::zeroed();
    bcb::encode(&mut msg, length, crc, location);

    platform.write_control_block(misc_label, &msg).map_err(|e| {
        error!("Unable to update BCB contents: {}", e);
        e
    })?;

    info!(
        "boot image staged: {} bytes @ {:#010x}, crc {:#010x}; warm reset",
        length, location, crc
    );

    platform.restart(BootTarget::NormalBoot, ResetKind::Warm).map_err(|e| {
        error!("Warm reset failed: {}", e);
        e
    })
}
