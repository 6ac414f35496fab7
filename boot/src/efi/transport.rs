//! transport.rs — fastboot and crashmode sessions over vendor protocols

use core::ptr::{self, NonNull};
use core::slice;

use log::warn;
use uefi::prelude::*;
use uefi::table::boot::{BootServices, ScopedProtocol};

use crate::efi::protocols::{open_first, CrashModeProtocol, FastbootProtocol};
use crate::error::BootError;
use crate::fastboot_mode::FlashCycle;
use crate::platform::{DiagnosticsTransport, FlashTransport, StagedImage};
use crate::target::BootTarget;

/// Pool buffer handed over by the fastboot driver; freed on drop.
pub struct PoolImage<'a> {
    bt: &'a BootServices,
    ptr: NonNull<u8>,
    len: usize,
}

impl<'a> PoolImage<'a> {
    /// Take ownership of a pool allocation. A null pointer means "no image".
    ///
    /// # Safety
    /// `ptr` must be null or a pool allocation of at least `len` bytes that
    /// nothing else frees.
    unsafe fn adopt(bt: &'a BootServices, ptr: *mut u8, len: usize) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self { bt, ptr, len })
    }
}

impl StagedImage for PoolImage<'_> {
    fn bytes(&self) -> &[u8] {
        // SAFETY: adopt() contract; the buffer lives until drop.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    fn location(&self) -> usize {
        self.ptr.as_ptr() as usize
    }
}

impl Drop for PoolImage<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.bt.free_pool(self.ptr.as_ptr()) {
            warn!("free_pool failed: {:?}", e.status());
        }
    }
}

pub struct EfiFastboot<'a> {
    bt: &'a BootServices,
    proto: ScopedProtocol<'a, FastbootProtocol>,
}

impl<'a> EfiFastboot<'a> {
    pub fn open(bt: &'a BootServices) -> Result<Self, BootError> {
        let proto = open_first::<FastbootProtocol>(bt).map_err(|e| BootError::ModeTransport(e.status()))?;
        Ok(Self { bt, proto })
    }
}

impl<'a> FlashTransport for EfiFastboot<'a> {
    type Image = PoolImage<'a>;

    fn start(&mut self, cycle: &mut FlashCycle<PoolImage<'a>>) -> Result<(), BootError> {
        let mut boot = ptr::null_mut();
        let mut boot_size = 0usize;
        let mut aux = ptr::null_mut();
        let mut aux_size = 0usize;
        let mut raw_target = BootTarget::Unknown.as_raw();

        let this: *mut FastbootProtocol = &mut *self.proto;
        // SAFETY: `this` is the open protocol instance; all out-pointers are
        // live locals.
        let status = unsafe {
            (self.proto.start)(this, &mut boot, &mut boot_size, &mut aux, &mut aux_size, &mut raw_target)
        };

        // Adopt buffers before checking status so a failed cycle still frees them.
        // SAFETY: the protocol hands ownership of both pool buffers to us.
        cycle.boot_image = unsafe { PoolImage::adopt(self.bt, boot, boot_size) };
        cycle.aux_image = unsafe { PoolImage::adopt(self.bt, aux, aux_size) };
        cycle.target = BootTarget::from_raw(raw_target);

        if status.is_error() {
            return Err(BootError::ModeTransport(status));
        }
        Ok(())
    }
}

pub struct EfiCrashMode<'a> {
    proto: ScopedProtocol<'a, CrashModeProtocol>,
}

impl<'a> EfiCrashMode<'a> {
    pub fn open(bt: &'a BootServices) -> Result<Self, BootError> {
        let proto = open_first::<CrashModeProtocol>(bt).map_err(|e| BootError::Diagnostics(e.status()))?;
        Ok(Self { proto })
    }

    fn this(&mut self) -> *mut CrashModeProtocol {
        &mut *self.proto
    }
}

impl DiagnosticsTransport for EfiCrashMode<'_> {
    fn init(&mut self) -> Result<(), BootError> {
        let this = self.this();
        // SAFETY: `this` is the open protocol instance.
        let status = unsafe { (self.proto.init)(this) };
        if status.is_error() {
            return Err(BootError::Diagnostics(status));
        }
        Ok(())
    }

    fn run(&mut self) -> Result<(), BootError> {
        let this = self.this();
        // SAFETY: as above.
        let status = unsafe { (self.proto.run)(this) };
        if status.is_error() {
            return Err(BootError::Diagnostics(status));
        }
        Ok(())
    }

    fn boot_target(&self) -> BootTarget {
        let this = &*self.proto as *const CrashModeProtocol as *mut CrashModeProtocol;
        // SAFETY: the driver only reads its own state here.
        BootTarget::from_raw(unsafe { (self.proto.boot_target)(this) })
    }

    fn exit(&mut self) {
        let this = self.this();
        // SAFETY: as above.
        unsafe { (self.proto.exit)(this) }
    }
}
