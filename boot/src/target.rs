//! target.rs — boot targets and reset kinds
//!
//! A [`BootTarget`] is pure control-flow data: what the loader should do
//! next. The numeric codes are the ABI shared with the vendor fastboot and
//! crashmode protocols; the one-shot labels are what the next boot stage
//! reads back from `LoaderEntryOneShot`.

use core::fmt;

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BootTarget {
    #[default]
    Unknown = 0,
    NormalBoot = 1,
    Recovery = 2,
    InteractiveFlash = 3,
    /// Restart straight into interactive flashing.
    FlashModeTransition = 4,
    Charger = 5,
    PowerOff = 6,
    CrashDiagnostics = 7,
}

impl BootTarget {
    /// Decode a transport wire code. Unrecognized codes mean "no decision yet".
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            1 => BootTarget::NormalBoot,
            2 => BootTarget::Recovery,
            3 => BootTarget::InteractiveFlash,
            4 => BootTarget::FlashModeTransition,
            5 => BootTarget::Charger,
            6 => BootTarget::PowerOff,
            7 => BootTarget::CrashDiagnostics,
            _ => BootTarget::Unknown,
        }
    }

    #[inline]
    pub fn as_raw(self) -> u32 {
        self as u32
    }

    /// Label written to the one-shot loader entry before restarting.
    /// `None` when the target has no next-boot entry (unknown, power off).
    pub fn oneshot_label(self) -> Option<&'static str> {
        match self {
            BootTarget::NormalBoot => Some(""),
            BootTarget::Recovery => Some("recovery"),
            BootTarget::InteractiveFlash | BootTarget::FlashModeTransition => Some("bootloader"),
            BootTarget::Charger => Some("charging"),
            BootTarget::CrashDiagnostics => Some("crashmode"),
            BootTarget::Unknown | BootTarget::PowerOff => None,
        }
    }
}

impl fmt::Display for BootTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BootTarget::Unknown => "unknown",
            BootTarget::NormalBoot => "normal boot",
            BootTarget::Recovery => "recovery",
            BootTarget::InteractiveFlash => "fastboot",
            BootTarget::FlashModeTransition => "bootloader",
            BootTarget::Charger => "charger",
            BootTarget::PowerOff => "power off",
            BootTarget::CrashDiagnostics => "crashmode",
        };
        f.write_str(name)
    }
}

/// Whether platform memory is expected to survive the restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetKind {
    Cold,
    /// Keeps RAM contents; required for the boot image hand-off.
    Warm,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_codes_decode_to_their_variant() {
        for t in [
            BootTarget::Unknown,
            BootTarget::NormalBoot,
            BootTarget::Recovery,
            BootTarget::InteractiveFlash,
            BootTarget::FlashModeTransition,
            BootTarget::Charger,
            BootTarget::PowerOff,
            BootTarget::CrashDiagnostics,
        ] {
            assert_eq!(BootTarget::from_raw(t.as_raw()), t);
        }
    }

    #[test]
    fn unknown_wire_code_is_no_decision() {
        assert_eq!(BootTarget::from_raw(0xFFFF_FFFF), BootTarget::Unknown);
        assert_eq!(BootTarget::from_raw(42), BootTarget::Unknown);
    }

    #[test]
    fn flash_targets_share_the_bootloader_entry() {
        assert_eq!(BootTarget::InteractiveFlash.oneshot_label(), Some("bootloader"));
        assert_eq!(BootTarget::FlashModeTransition.oneshot_label(), Some("bootloader"));
        assert_eq!(BootTarget::NormalBoot.oneshot_label(), Some(""));
        assert_eq!(BootTarget::PowerOff.oneshot_label(), None);
    }
}
