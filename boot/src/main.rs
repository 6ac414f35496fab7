//! ABL boot dispatcher — UEFI application entry
//!
//! Binds the dispatcher to firmware: installs the UEFI logger, opens the
//! vendor fastboot (and, when configured, crashmode) protocols and hands
//! control to the dispatch loop, which only returns on a fatal start-up
//! failure.

#![cfg_attr(target_os = "uefi", no_std)]
#![cfg_attr(target_os = "uefi", no_main)]

#[cfg(target_os = "uefi")]
use abl_dispatch::efi::{EfiCrashMode, EfiFastboot, EfiPlatform};
#[cfg(target_os = "uefi")]
use abl_dispatch::{CrashTransport, Dispatcher, LoaderConfig};
#[cfg(target_os = "uefi")]
use log::{error, info, warn};
#[cfg(target_os = "uefi")]
use uefi::prelude::*;

#[cfg(target_os = "uefi")]
#[entry]
fn efi_main(image: Handle, mut system_table: SystemTable<Boot>) -> Status {
    if uefi_services::init(&mut system_table).is_err() {
        return Status::LOAD_ERROR;
    }
    info!("ABL boot dispatcher starting");

    let config = LoaderConfig::from_build();
    let bt = system_table.boot_services();

    let fastboot = match EfiFastboot::open(bt) {
        Ok(fastboot) => fastboot,
        Err(e) => {
            error!("Fastboot protocol unavailable: {}", e);
            return e.status();
        }
    };

    let crashmode = match config.crash_transport {
        CrashTransport::Companion => match EfiCrashMode::open(bt) {
            Ok(adb) => Some(adb),
            Err(e) => {
                warn!("Crashmode protocol unavailable: {}", e);
                None
            }
        },
        CrashTransport::Fastboot => None,
    };

    let platform = EfiPlatform::new(image, &system_table);
    match Dispatcher::new(platform, fastboot, crashmode, config).run() {
        Ok(never) => match never {},
        Err(e) => e.status(),
    }
}

#[cfg(not(target_os = "uefi"))]
fn main() {
    eprintln!("abl_dispatch is a UEFI application; build it for x86_64-unknown-uefi");
    std::process::exit(1);
}
