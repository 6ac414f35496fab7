//! crashmode.rs — crash diagnostics over the companion transport

use log::{debug, error, info};

use crate::error::BootError;
use crate::platform::DiagnosticsTransport;
use crate::target::BootTarget;

/// Serve the diagnostics transport until the host picks a target or the
/// transport fails. The transport is always shut down before returning.
pub fn enter_crashmode<D>(transport: &mut D, target: &mut BootTarget) -> Result<(), BootError>
where
    D: DiagnosticsTransport,
{
    if let Err(e) = transport.init() {
        error!("Failed to initialize adb: {}", e);
        return Err(e);
    }
    debug!("adb implementation is initialized");

    let mut ret = Ok(());
    loop {
        if let Err(e) = transport.run() {
            error!("crashmode transport failed: {}", e);
            ret = Err(e);
            break;
        }

        let requested = transport.boot_target();
        if requested != BootTarget::Unknown {
            info!("crashmode requested {}", requested);
            *target = requested;
            break;
        }
    }
    transport.exit();

    ret
}

/// Diagnostics transport for builds without one; cannot be constructed.
#[derive(Debug)]
pub enum NoCrashMode {}

impl DiagnosticsTransport for NoCrashMode {
    fn init(&mut self) -> Result<(), BootError> {
        match *self {}
    }

    fn run(&mut self) -> Result<(), BootError> {
        match *self {}
    }

    fn boot_target(&self) -> BootTarget {
        match *self {}
    }

    fn exit(&mut self) {
        match *self {}
    }
}
