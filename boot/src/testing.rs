//! Scripted firmware stand-ins for unit tests.

use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::Cell;
use core::convert::Infallible;

use uefi::Status;

use crate::bcb::BootloaderMessage;
use crate::crc32::crc32;
use crate::error::BootError;
use crate::fastboot_mode::FlashCycle;
use crate::platform::{DiagnosticsTransport, FlashTransport, Platform, StagedImage};
use crate::target::{BootTarget, ResetKind};

pub const STAGING_BASE: usize = 0x0010_0000;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Shared tally that stays readable after its owner is moved or consumed.
#[derive(Debug, Clone, Default)]
pub struct Counter(Rc<Cell<usize>>);

impl Counter {
    pub fn count(&self) -> usize {
        self.0.get()
    }

    pub fn bump(&self) {
        self.0.set(self.0.get() + 1);
    }
}

/// Counts buffer releases shared between a transport and its images.
pub type Release = Counter;

#[derive(Debug)]
pub struct MockImage {
    data: Vec<u8>,
    location: usize,
    release: Release,
}

impl MockImage {
    pub fn new(data: Vec<u8>, location: usize, release: &Release) -> Self {
        Self { data, location, release: release.clone() }
    }
}

impl StagedImage for MockImage {
    fn bytes(&self) -> &[u8] {
        &self.data
    }

    fn location(&self) -> usize {
        self.location
    }
}

impl Drop for MockImage {
    fn drop(&mut self) {
        self.release.bump();
    }
}

/// Platform whose restarts always "fail", so control comes back to the test.
pub struct MockPlatform {
    pub unlocked: bool,
    pub checksum_result: Result<(), BootError>,
    pub checksum_calls: Cell<usize>,
    pub write_result: Result<(), BootError>,
    pub writes: Vec<(String, BootloaderMessage)>,
    pub restarts: Vec<(BootTarget, ResetKind)>,
    pub companion_result: Result<(), BootError>,
    pub companion_calls: usize,
    pub args: Result<Vec<String>, BootError>,
    pub slot_result: Result<(), BootError>,
    pub slot_calls: Counter,
}

impl MockPlatform {
    pub fn unlocked() -> Self {
        init_logging();
        Self {
            unlocked: true,
            checksum_result: Ok(()),
            checksum_calls: Cell::new(0),
            write_result: Ok(()),
            writes: Vec::new(),
            restarts: Vec::new(),
            companion_result: Ok(()),
            companion_calls: 0,
            args: Ok(alloc::vec!["app.efi".to_string()]),
            slot_result: Ok(()),
            slot_calls: Counter::default(),
        }
    }

    pub fn locked() -> Self {
        Self { unlocked: false, ..Self::unlocked() }
    }

    pub fn with_args(mut self, args: &[&str]) -> Self {
        self.args = Ok(args.iter().map(|a| a.to_string()).collect());
        self
    }
}

impl Platform for MockPlatform {
    fn device_is_unlocked(&self) -> bool {
        self.unlocked
    }

    fn compute_checksum(&self, data: &[u8]) -> Result<u32, BootError> {
        self.checksum_calls.set(self.checksum_calls.get() + 1);
        self.checksum_result.map(|_| crc32(data))
    }

    fn write_control_block(&mut self, label: &str, msg: &BootloaderMessage) -> Result<(), BootError> {
        self.write_result?;
        self.writes.push((label.to_string(), msg.clone()));
        Ok(())
    }

    fn restart(&mut self, target: BootTarget, kind: ResetKind) -> Result<Infallible, BootError> {
        self.restarts.push((target, kind));
        Err(BootError::Restart(Status::ABORTED))
    }

    fn notify_companion_ready(&mut self) -> Result<(), BootError> {
        self.companion_calls += 1;
        self.companion_result
    }

    fn start_arguments(&self) -> Result<Vec<String>, BootError> {
        self.args.clone()
    }

    fn slot_init(&mut self) -> Result<(), BootError> {
        self.slot_calls.bump();
        self.slot_result
    }
}

/// What one scripted fastboot cycle yields.
pub enum CycleOutcome {
    Fail(Status),
    Session { target: BootTarget, boot: Option<Vec<u8>>, aux: Option<Vec<u8>> },
}

impl CycleOutcome {
    pub fn target(target: BootTarget) -> Self {
        CycleOutcome::Session { target, boot: None, aux: None }
    }

    pub fn staged(target: BootTarget, boot: Vec<u8>) -> Self {
        CycleOutcome::Session { target, boot: Some(boot), aux: None }
    }

    pub fn with_aux(target: BootTarget, boot: Vec<u8>, aux: Vec<u8>) -> Self {
        CycleOutcome::Session { target, boot: Some(boot), aux: Some(aux) }
    }
}

/// Fastboot transport replaying a fixed script; fails once it runs dry.
pub struct ScriptedFastboot {
    script: VecDeque<CycleOutcome>,
    release: Release,
    pub cycles: Counter,
    pub dirty_entries: usize,
}

impl ScriptedFastboot {
    pub fn new(release: &Release, script: Vec<CycleOutcome>) -> Self {
        Self { script: script.into(), release: release.clone(), cycles: Counter::default(), dirty_entries: 0 }
    }
}

impl FlashTransport for ScriptedFastboot {
    type Image = MockImage;

    fn start(&mut self, cycle: &mut FlashCycle<MockImage>) -> Result<(), BootError> {
        self.cycles.bump();
        if !cycle.is_reset() {
            self.dirty_entries += 1;
        }
        match self.script.pop_front() {
            None => Err(BootError::ModeTransport(Status::ABORTED)),
            Some(CycleOutcome::Fail(status)) => Err(BootError::ModeTransport(status)),
            Some(CycleOutcome::Session { target, boot, aux }) => {
                cycle.target = target;
                cycle.boot_image = boot.map(|d| MockImage::new(d, STAGING_BASE, &self.release));
                cycle.aux_image = aux.map(|d| MockImage::new(d, STAGING_BASE, &self.release));
                Ok(())
            }
        }
    }
}

pub enum CrashStep {
    Fail(Status),
    Poll(BootTarget),
}

/// Crashmode transport replaying a fixed script; fails once it runs dry.
pub struct ScriptedCrashMode {
    pub init_result: Result<(), BootError>,
    script: VecDeque<CrashStep>,
    current: BootTarget,
    pub runs: usize,
    pub exits: usize,
}

impl ScriptedCrashMode {
    pub fn new(script: Vec<CrashStep>) -> Self {
        Self {
            init_result: Ok(()),
            script: script.into(),
            current: BootTarget::Unknown,
            runs: 0,
            exits: 0,
        }
    }
}

impl DiagnosticsTransport for ScriptedCrashMode {
    fn init(&mut self) -> Result<(), BootError> {
        self.init_result
    }

    fn run(&mut self) -> Result<(), BootError> {
        self.runs += 1;
        match self.script.pop_front() {
            None => Err(BootError::Diagnostics(Status::ABORTED)),
            Some(CrashStep::Fail(status)) => Err(BootError::Diagnostics(status)),
            Some(CrashStep::Poll(target)) => {
                self.current = target;
                Ok(())
            }
        }
    }

    fn boot_target(&self) -> BootTarget {
        self.current
    }

    fn exit(&mut self) {
        self.exits += 1;
    }
}
