//! PID 1 for a single-seat workstation.
//!
//! This binary is the first user-space process. It has no parent to
//! supervise it and no shell to fall back on, so every failure is logged
//! and boot continues best-effort:
//! 1. Mount /dev and move diagnostics to the kernel log
//! 2. Mount the fixed filesystem list and write the host tunables
//! 3. Configure the network on a worker thread while the device manager
//!    and the graphical session start on this one
//! 4. Join the worker
//! 5. Reap children until the session child exits, then tear the rest down
//! 6. Sync and power off

mod config;
mod mounts;
mod netcfg;
mod shutdown;
mod supervise;
mod tunables;

use std::fs::DirBuilder;
use std::io;
use std::os::unix::fs::DirBuilderExt;
use std::thread;

use nix::unistd::{Gid, Pid, Uid, chown};
use tracing::{error, info, warn};

use crate::supervise::SessionIdentity;

fn main() {
    // Stderr only: stdout and stderr both end up in /dev/kmsg once the
    // redirect is in place. No timestamps, the clock is not set yet.
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .without_time()
        .init();
    info!("boot starting");

    // PID 1 has nothing to read; close the slot so no child inherits a
    // console it should not have.
    // SAFETY: fd 0 is open at entry and never used again.
    if unsafe { libc::close(0) } == -1 {
        warn!(error = %io::Error::last_os_error(), "failed to close stdin");
    }

    // Step 1: device filesystem, then diagnostics into the kernel log.
    match mounts::early_devfs() {
        Ok(()) => {
            if let Err(e) = mounts::redirect_to_kmsg() {
                warn!(error = %e, "could not redirect diagnostics to the kernel log");
            }
        }
        Err(e) => warn!(error = %e, "failed to mount /dev"),
    }

    // Step 2: remaining mounts and host tunables, single-threaded, so the
    // concurrent stage never observes a half-configured system.
    mounts::mount_all();
    tunables::apply();

    // Step 3: network on a worker; device manager and session here.
    let net_worker = match thread::Builder::new()
        .name("netcfg".into())
        .spawn(netcfg::configure)
    {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!(error = %e, "could not start network worker; skipping network configuration");
            None
        }
    };

    start_device_manager();
    let session_pid = start_session();

    // Step 4: hard barrier; supervision begins with network state settled.
    if let Some(handle) = net_worker
        && handle.join().is_err()
    {
        error!("network configuration worker panicked");
    }

    // Step 5: supervise until the session child is gone and every other
    // child has been collected.
    info!("entering supervision");
    if let Err(e) = supervise::reap_loop(
        session_pid,
        supervise::wait_any,
        supervise::terminate_process_group,
    ) {
        error!(error = %e, "child wait failed; proceeding to shutdown");
    }

    // Step 6: no children left. Flush and power off.
    info!("powering off");
    shutdown::power_off();
    error!("power-off request returned; nothing left to try");
}

/// Start the device-manager daemon and run its trigger and settle helpers,
/// blocking on each helper. If the daemon itself cannot start there is
/// nothing for the helpers to talk to, so they are skipped.
fn start_device_manager() {
    let env = [("PATH", config::SEARCH_PATH)];

    match supervise::spawn_daemon(config::DEVD, &[], &env) {
        Ok(child) => info!(pid = child.id(), "device manager started"),
        Err(e) => {
            warn!(error = %e, "failed to start device manager; continuing without it");
            return;
        }
    }

    let helper_invocations: [&[&str]; 3] = [
        &["trigger", "--type", "subsystems", "--action=add"],
        &["trigger", "--type", "devices", "--action=add"],
        &["settle"],
    ];
    for args in helper_invocations {
        match supervise::run_blocking(config::DEVADM, args, &env) {
            Ok(status) if !status.success() => {
                warn!(?args, %status, "device manager helper failed");
            }
            Ok(_) => {}
            Err(e) => warn!(?args, error = %e, "could not run device manager helper"),
        }
    }
}

/// Prepare the session runtime directory and spawn the graphical session.
/// Returns the distinguished pid whose exit triggers shutdown, or `None` if
/// the session could not be spawned at all.
fn start_session() -> Option<Pid> {
    match DirBuilder::new()
        .mode(0o700)
        .create(config::SESSION_RUNTIME_DIR)
    {
        Ok(()) => {
            if let Err(e) = chown(
                config::SESSION_RUNTIME_DIR,
                Some(Uid::from_raw(config::SESSION_UID)),
                Some(Gid::from_raw(config::SESSION_GID)),
            ) {
                warn!(error = %e, "failed to chown session runtime directory");
            }
        }
        Err(e) => warn!(error = %e, "failed to create session runtime directory"),
    }

    let identity = SessionIdentity {
        uid: config::SESSION_UID,
        gid: config::SESSION_GID,
        groups: config::SESSION_GROUPS,
    };
    match supervise::spawn_session(
        config::COMPOSITOR,
        config::SESSION_TTY,
        config::SESSION_HOME,
        identity,
        &config::session_env(),
    ) {
        Ok(pid) => {
            info!(pid = pid.as_raw(), "graphical session started");
            Some(pid)
        }
        Err(e) => {
            error!(error = %e, "failed to spawn graphical session");
            None
        }
    }
}
