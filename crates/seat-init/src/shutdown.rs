//! Power-off.

use nix::sys::reboot::{RebootMode, reboot};
use tracing::error;

/// Flush filesystem caches and ask the kernel to power the machine off.
///
/// On success this does not return. If it fails there is nothing left to
/// try; the caller logs and the process idles as PID 1 must.
#[allow(irrefutable_let_patterns)]
pub fn power_off() {
    // SAFETY: sync() has no preconditions; it flushes pending filesystem
    // writes to storage.
    unsafe { libc::sync() };

    if let Err(e) = reboot(RebootMode::RB_POWER_OFF) {
        error!(error = %e, "power-off request failed");
    }
}
