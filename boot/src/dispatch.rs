//! dispatch.rs — top-level boot-mode dispatcher
//!
//! The dispatcher owns the current [`BootTarget`] and never settles: each
//! [`Dispatcher::step`] routes the target to a mode runner or a restart and
//! yields the next target. Interactive targets loop back into fastboot
//! forever; any other target is a cold restart, which does not return.

use core::convert::Infallible;

use log::{error, info, warn};

use crate::cmdline::check_command_line;
use crate::config::{CrashTransport, LoaderConfig};
use crate::crashmode::enter_crashmode;
use crate::error::BootError;
use crate::fastboot_mode::enter_fastboot_mode;
use crate::platform::{DiagnosticsTransport, FlashTransport, Platform};
use crate::target::{BootTarget, ResetKind};

/// What the dispatcher does with a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Fastboot,
    CrashMode,
    Restart(BootTarget),
}

/// Routing table of the dispatch loop.
pub fn route(target: BootTarget, crash: CrashTransport) -> Route {
    match target {
        BootTarget::Unknown | BootTarget::InteractiveFlash => Route::Fastboot,
        BootTarget::CrashDiagnostics => match crash {
            CrashTransport::Companion => Route::CrashMode,
            CrashTransport::Fastboot => Route::Fastboot,
        },
        other => Route::Restart(other),
    }
}

pub struct Dispatcher<P, F, D> {
    platform: P,
    fastboot: F,
    crashmode: Option<D>,
    config: LoaderConfig,
    startup: Result<(), BootError>,
}

impl<P, F, D> Dispatcher<P, F, D>
where
    P: Platform,
    F: FlashTransport,
    D: DiagnosticsTransport,
{
    /// The configuration is validated as supplied. A `Companion` crash
    /// transport without a diagnostics collaborator is then downgraded to
    /// `Fastboot`. A validation failure is returned by [`Dispatcher::run`].
    pub fn new(platform: P, fastboot: F, crashmode: Option<D>, mut config: LoaderConfig) -> Self {
        let startup = config.validate();
        if config.crash_transport == CrashTransport::Companion && crashmode.is_none() {
            warn!("crashmode transport unavailable, serving crashmode over fastboot");
            config.crash_transport = CrashTransport::Fastboot;
        }
        Self { platform, fastboot, crashmode, config, startup }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn fastboot(&self) -> &F {
        &self.fastboot
    }

    pub fn crashmode(&self) -> Option<&D> {
        self.crashmode.as_ref()
    }

    /// Run one dispatch transition and return the next target.
    ///
    /// A restart only comes back if the firmware refused it; the same
    /// target is then re-evaluated on the next step.
    pub fn step(&mut self, target: BootTarget) -> BootTarget {
        let mut next = target;
        match route(target, self.config.crash_transport) {
            Route::Fastboot => {
                // Failures are already reported; the target says where to go.
                let _ = enter_fastboot_mode(
                    &mut self.platform,
                    &mut self.fastboot,
                    self.config.misc_label,
                    &mut next,
                );
            }
            Route::CrashMode => {
                // `new` downgrades the route when there is no collaborator.
                if let Some(adb) = self.crashmode.as_mut() {
                    let _ = enter_crashmode(adb, &mut next);
                }
            }
            Route::Restart(target) => {
                info!("rebooting to {}", target);
                if let Err(e) = self.platform.restart(target, ResetKind::Cold) {
                    error!("Failed to reboot to {}: {}", target, e);
                }
            }
        }
        next
    }

    /// Select the initial target, bring up slot management and dispatch
    /// forever. Only returns when start-up fails.
    pub fn run(mut self) -> Result<Infallible, BootError> {
        if let Err(e) = self.startup {
            error!("{}", e);
            return Err(e);
        }

        let mut target = check_command_line(&self.platform);

        if let Err(e) = self.platform.slot_init() {
            error!("Slot management initialization failed: {}", e);
            return Err(e);
        }

        loop {
            target = self.step(target);
        }
    }
}
