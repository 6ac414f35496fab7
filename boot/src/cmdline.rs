//! cmdline.rs — start-up target selection
//!
//! The loader image may be started with `-c` to come up in crashmode
//! instead of fastboot. Argument parsing is best effort: any failure to
//! read the arguments falls back to fastboot.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use log::{info, warn};

use crate::platform::Platform;
use crate::target::BootTarget;

/// Start-up flag selecting crashmode.
pub const CRASHMODE_FLAG: &str = "-c";

/// Pick the initial target from the loader's start-up arguments.
pub fn check_command_line<P: Platform>(platform: &P) -> BootTarget {
    match platform.start_arguments() {
        Ok(args) => {
            let target = select_target(&args);
            info!("initial target: {}", target);
            target
        }
        Err(e) => {
            warn!("Failed to read start arguments: {}", e);
            BootTarget::InteractiveFlash
        }
    }
}

/// `CrashDiagnostics` if any token is exactly [`CRASHMODE_FLAG`], else
/// `InteractiveFlash`.
pub fn select_target<S: AsRef<str>>(args: &[S]) -> BootTarget {
    let mut target = BootTarget::InteractiveFlash;
    for arg in args {
        if arg.as_ref() == CRASHMODE_FLAG {
            target = BootTarget::CrashDiagnostics;
        }
    }
    target
}

/// Split a loaded-image command line into argument tokens.
pub fn split_load_options(options: &str) -> Vec<String> {
    options
        .split(|c: char| c.is_whitespace() || c == '\0')
        .filter(|tok| !tok.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BootError;
    use crate::testing::MockPlatform;
    use pretty_assertions::assert_eq;
    use uefi::Status;

    #[test]
    fn default_is_fastboot() {
        assert_eq!(select_target(&["app.efi"]), BootTarget::InteractiveFlash);
        assert_eq!(select_target::<&str>(&[]), BootTarget::InteractiveFlash);
    }

    #[test]
    fn crash_flag_selects_crashmode() {
        assert_eq!(select_target(&["app.efi", "-c"]), BootTarget::CrashDiagnostics);
        assert_eq!(select_target(&["-c", "app.efi", "-v"]), BootTarget::CrashDiagnostics);
    }

    #[test]
    fn flag_must_match_exactly() {
        assert_eq!(select_target(&["app.efi", "-crash", "c", "-C"]), BootTarget::InteractiveFlash);
    }

    #[test]
    fn argument_failure_falls_back_to_fastboot() {
        let mut platform = MockPlatform::unlocked();
        platform.args = Err(BootError::StartArguments(Status::UNSUPPORTED));
        assert_eq!(check_command_line(&platform), BootTarget::InteractiveFlash);
    }

    #[test]
    fn reads_arguments_from_platform() {
        let platform = MockPlatform::unlocked().with_args(&["app.efi", "-c"]);
        assert_eq!(check_command_line(&platform), BootTarget::CrashDiagnostics);
    }

    #[test]
    fn load_options_split_on_whitespace() {
        assert_eq!(
            split_load_options("  \\EFI\\BOOT\\kf4abl.efi   -c\t\0"),
            vec!["\\EFI\\BOOT\\kf4abl.efi".to_string(), "-c".to_string()]
        );
        assert!(split_load_options("").is_empty());
    }
}
