//! platform.rs — [`Platform`] over UEFI boot and runtime services

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::convert::Infallible;

use log::debug;
use uefi::prelude::*;
use uefi::proto::loaded_image::LoadedImage;
use uefi::table::runtime::{ResetType, VariableAttributes, VariableVendor};
use uefi::{cstr16, guid};

use crate::bcb::BootloaderMessage;
use crate::cmdline::split_load_options;
use crate::crc32::crc32;
use crate::efi::misc::write_partition_head;
use crate::efi::protocols::{open_first, CompanionProtocol, SlotProtocol};
use crate::error::BootError;
use crate::platform::Platform;
use crate::target::{BootTarget, ResetKind};

/// Vendor GUID of loader-owned variables (`LoaderEntryOneShot`, `OEMLock`).
const LOADER_VENDOR: VariableVendor = VariableVendor(guid!("4a67b082-0a4c-41cf-b6c7-440b29bb8c4f"));

/// `OEMLock` bit set when the device is unlocked.
const OEM_LOCK_UNLOCKED: u8 = 1 << 0;

pub struct EfiPlatform<'a> {
    image: Handle,
    st: &'a SystemTable<Boot>,
}

impl<'a> EfiPlatform<'a> {
    pub fn new(image: Handle, st: &'a SystemTable<Boot>) -> Self {
        Self { image, st }
    }

    fn set_oneshot(&self, label: &str) -> Result<(), Status> {
        let attrs = VariableAttributes::NON_VOLATILE
            | VariableAttributes::BOOTSERVICE_ACCESS
            | VariableAttributes::RUNTIME_ACCESS;

        // Empty data deletes the entry; a missing entry is already deleted.
        let mut data = Vec::new();
        if !label.is_empty() {
            for unit in label.encode_utf16().chain(core::iter::once(0)) {
                data.extend_from_slice(&unit.to_le_bytes());
            }
        }

        match self.st.runtime_services().set_variable(
            cstr16!("LoaderEntryOneShot"),
            &LOADER_VENDOR,
            attrs,
            &data,
        ) {
            Ok(()) => Ok(()),
            Err(e) if data.is_empty() && e.status() == Status::NOT_FOUND => Ok(()),
            Err(e) => Err(e.status()),
        }
    }
}

impl Platform for EfiPlatform<'_> {
    fn device_is_unlocked(&self) -> bool {
        let mut buf = [0u8; 1];
        match self
            .st
            .runtime_services()
            .get_variable(cstr16!("OEMLock"), &LOADER_VENDOR, &mut buf)
        {
            Ok((data, _)) => data.first().map_or(false, |b| b & OEM_LOCK_UNLOCKED != 0),
            Err(_) => false,
        }
    }

    fn compute_checksum(&self, data: &[u8]) -> Result<u32, BootError> {
        Ok(crc32(data))
    }

    fn write_control_block(&mut self, label: &str, msg: &BootloaderMessage) -> Result<(), BootError> {
        write_partition_head(self.st.boot_services(), self.image, label, msg.as_bytes()).map_err(BootError::Persist)
    }

    fn restart(&mut self, target: BootTarget, kind: ResetKind) -> Result<Infallible, BootError> {
        let rt = self.st.runtime_services();
        if target == BootTarget::PowerOff {
            rt.reset(ResetType::SHUTDOWN, Status::SUCCESS, None);
        }

        let label = target
            .oneshot_label()
            .ok_or(BootError::Restart(Status::INVALID_PARAMETER))?;
        self.set_oneshot(label).map_err(BootError::Restart)?;

        let reset = match kind {
            ResetKind::Cold => ResetType::COLD,
            ResetKind::Warm => ResetType::WARM,
        };
        debug!("reset {:?} into '{}'", kind, label);
        rt.reset(reset, Status::SUCCESS, None)
    }

    fn notify_companion_ready(&mut self) -> Result<(), BootError> {
        let mut ioc = open_first::<CompanionProtocol>(self.st.boot_services())
            .map_err(|e| BootError::Companion(e.status()))?;
        let this: *mut CompanionProtocol = &mut *ioc;
        // SAFETY: `this` points at the protocol instance we hold open.
        let status = unsafe { (ioc.notify_ready)(this) };
        if status.is_error() {
            return Err(BootError::Companion(status));
        }
        Ok(())
    }

    fn start_arguments(&self) -> Result<Vec<String>, BootError> {
        let bt = self.st.boot_services();
        let loaded = bt
            .open_protocol_exclusive::<LoadedImage>(self.image)
            .map_err(|e| BootError::StartArguments(e.status()))?;
        let options = loaded
            .load_options_as_cstr16()
            .map_err(|_| BootError::StartArguments(Status::INVALID_PARAMETER))?;
        Ok(split_load_options(&options.to_string()))
    }

    fn slot_init(&mut self) -> Result<(), BootError> {
        let mut slot = open_first::<SlotProtocol>(self.st.boot_services())
            .map_err(|e| BootError::SlotInit(e.status()))?;
        let this: *mut SlotProtocol = &mut *slot;
        // SAFETY: `this` points at the protocol instance we hold open.
        let status = unsafe { (slot.init)(this) };
        if status.is_error() {
            return Err(BootError::SlotInit(status));
        }
        Ok(())
    }
}
