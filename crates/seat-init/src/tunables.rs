//! One-shot writes of fixed values to host tunables.
//!
//! These are all open-write-close against proc and sysfs files that exist
//! once stage-two mounts are in place. Best-effort: a missing backlight on
//! external power is normal, not a boot failure.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

use tracing::warn;

/// (file, value) pairs written once during boot.
const TUNABLES: &[(&str, &str)] = &[
    ("/proc/sys/fs/protected_symlinks", "1"),
    ("/proc/sys/fs/protected_hardlinks", "1"),
    ("/proc/sys/fs/protected_fifos", "1"),
    ("/proc/sys/fs/protected_regular", "1"),
    ("/proc/sys/vm/admin_reserve_kbytes", "0"),
    ("/proc/sys/vm/dirty_background_ratio", "75"),
    ("/proc/sys/vm/dirty_expire_centisecs", "90000"),
    ("/proc/sys/vm/dirty_writeback_centisecs", "90000"),
    ("/proc/sys/vm/dirty_ratio", "75"),
    ("/proc/sys/vm/overcommit_memory", "2"),
    ("/proc/sys/vm/overcommit_ratio", "100"),
    ("/proc/sys/vm/user_reserve_kbytes", "0"),
    ("/proc/sys/vm/stat_interval", "10"),
    ("/sys/class/backlight/nv_backlight/brightness", "80"),
    (
        "/sys/class/power_supply/BAT0/charge_control_end_threshold",
        "80",
    ),
];

/// Write `value` to an existing tunable file. The file is not created:
/// a missing path means the kernel does not expose the knob.
fn write_tunable(path: &Path, value: &str) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .custom_flags(libc::O_CLOEXEC)
        .open(path)?;
    file.write_all(value.as_bytes())
}

/// Apply every tunable, logging failures and continuing.
pub fn apply() {
    for &(path, value) in TUNABLES {
        if let Err(e) = write_tunable(Path::new(path), value) {
            warn!(path, error = %e, "failed to write tunable");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_value_to_existing_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        write_tunable(file.path(), "80").unwrap();
        assert_eq!(std::fs::read_to_string(file.path()).unwrap(), "80");
    }

    #[test]
    fn missing_file_is_an_error_not_a_creation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist");
        let err = write_tunable(&path, "1").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(!path.exists());
    }
}
