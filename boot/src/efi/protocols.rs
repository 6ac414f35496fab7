//! protocols.rs — vendor protocols provided by the platform firmware
//!
//! Fastboot, crashmode, the companion (IOC) link and slot management are
//! separate firmware drivers. The dispatcher only needs their entry points,
//! laid out here as C-ABI protocol tables.

use uefi::prelude::*;
use uefi::proto::unsafe_protocol;
use uefi::proto::ProtocolPointer;
use uefi::table::boot::{BootServices, ScopedProtocol};

/// One fastboot session cycle. Buffers returned through `boot_image` and
/// `aux_image` are pool allocations owned by the caller afterwards.
#[repr(C)]
#[unsafe_protocol("1f3d2c47-8a0b-4b65-9f2e-5a7c0d1e6b31")]
pub struct FastbootProtocol {
    pub start: unsafe extern "efiapi" fn(
        this: *mut FastbootProtocol,
        boot_image: *mut *mut u8,
        boot_size: *mut usize,
        aux_image: *mut *mut u8,
        aux_size: *mut usize,
        target: *mut u32,
    ) -> Status,
}

/// adb-backed crash diagnostics.
#[repr(C)]
#[unsafe_protocol("6b0e94d2-3c5a-4f18-a7e9-21d4c8b05f7a")]
pub struct CrashModeProtocol {
    pub init: unsafe extern "efiapi" fn(this: *mut CrashModeProtocol) -> Status,
    pub run: unsafe extern "efiapi" fn(this: *mut CrashModeProtocol) -> Status,
    pub boot_target: unsafe extern "efiapi" fn(this: *mut CrashModeProtocol) -> u32,
    pub exit: unsafe extern "efiapi" fn(this: *mut CrashModeProtocol),
}

/// Link to the IOC companion controller.
#[repr(C)]
#[unsafe_protocol("c2a81f53-0d7e-4e9b-b46c-93f5e10a2d84")]
pub struct CompanionProtocol {
    pub notify_ready: unsafe extern "efiapi" fn(this: *mut CompanionProtocol) -> Status,
}

/// A/B slot bookkeeping.
#[repr(C)]
#[unsafe_protocol("8e47b1c9-5f2d-4a36-8c0b-7d19e3a4f562")]
pub struct SlotProtocol {
    pub init: unsafe extern "efiapi" fn(this: *mut SlotProtocol) -> Status,
}

/// Locate the first handle carrying `P` and open it exclusively.
pub fn open_first<P>(bt: &BootServices) -> uefi::Result<ScopedProtocol<'_, P>>
where
    P: ProtocolPointer + ?Sized,
{
    let handle = bt.get_handle_for_protocol::<P>()?;
    bt.open_protocol_exclusive::<P>(handle)
}
