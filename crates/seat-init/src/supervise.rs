//! Child process spawning and reaping.
//!
//! Two kinds of children exist: daemons (device manager and its helpers),
//! which inherit our descriptors and identity, and the graphical session,
//! which gets its own session, a controlling terminal, and an irreversible
//! privilege drop before exec. The exit of the session child is the one
//! event that ends supervision and powers the machine off.

use std::ffi::CString;
use std::io;
use std::process::{Child, Command, ExitStatus};
use std::ptr;

use nix::errno::Errno;
use nix::sys::signal::{Signal, kill};
use nix::sys::wait::wait;
use nix::unistd::{ForkResult, Pid, fork};
use tracing::warn;

/// Identity the session child drops to before exec.
#[derive(Debug, Clone, Copy)]
pub struct SessionIdentity<'a> {
    pub uid: u32,
    pub gid: u32,
    /// Supplementary groups, applied before the gid and uid changes.
    pub groups: &'a [u32],
}

/// Fatal outcomes inside the session child, each with a distinct exit code
/// the parent can read back from the reaped status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionFailure {
    /// setgroups failed.
    Groups,
    /// setresgid failed.
    GroupId,
    /// setresuid failed.
    UserId,
    /// execvpe returned.
    Exec,
}

impl SessionFailure {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Groups => 1,
            Self::GroupId => 2,
            Self::UserId => 3,
            Self::Exec => 4,
        }
    }
}

/// Spawn a daemon child that inherits our descriptors, identity, and
/// terminal, with a cleared environment plus the given entries.
pub fn spawn_daemon(path: &str, args: &[&str], env: &[(&str, &str)]) -> io::Result<Child> {
    Command::new(path)
        .args(args)
        .env_clear()
        .envs(env.iter().copied())
        .spawn()
}

/// Spawn a daemon child and block until it exits.
pub fn run_blocking(path: &str, args: &[&str], env: &[(&str, &str)]) -> io::Result<ExitStatus> {
    spawn_daemon(path, args, env)?.wait()
}

/// Spawn the graphical session child.
///
/// The child starts its own session, takes `tty` as its controlling terminal
/// with stdio bound to it (best-effort), drops to `identity`, changes into
/// `home` (best-effort), and replaces itself with `target` under the fixed
/// `env`. Privilege-drop or exec failure terminates the child with a
/// [`SessionFailure`] exit code; the parent is unaffected either way.
pub fn spawn_session(
    target: &str,
    tty: &str,
    home: &str,
    identity: SessionIdentity<'_>,
    env: &[(String, String)],
) -> Result<Pid, Errno> {
    // Everything the child needs is allocated here, before the fork: between
    // fork and exec only async-signal-safe calls are allowed.
    let target_c = CString::new(target).map_err(|_| Errno::EINVAL)?;
    let tty_c = CString::new(tty).map_err(|_| Errno::EINVAL)?;
    let home_c = CString::new(home).map_err(|_| Errno::EINVAL)?;
    let argv = [target_c.clone()];
    let mut envp = Vec::with_capacity(env.len());
    for (key, value) in env {
        envp.push(CString::new(format!("{key}={value}")).map_err(|_| Errno::EINVAL)?);
    }
    let argv_ptrs: Vec<*const libc::c_char> = argv
        .iter()
        .map(|s| s.as_ptr())
        .chain(std::iter::once(ptr::null()))
        .collect();
    let envp_ptrs: Vec<*const libc::c_char> = envp
        .iter()
        .map(|s| s.as_ptr())
        .chain(std::iter::once(ptr::null()))
        .collect();
    let groups: Vec<libc::gid_t> = identity.groups.iter().copied().collect();

    // SAFETY: the child branch calls only async-signal-safe functions and
    // never returns; the parent continues normally.
    match unsafe { fork() }? {
        ForkResult::Parent { child } => Ok(child),
        ForkResult::Child => session_child(
            &target_c,
            &argv_ptrs,
            &envp_ptrs,
            &tty_c,
            &home_c,
            identity,
            &groups,
        ),
    }
}

/// Write a fixed message straight to stderr.
///
/// The session child runs between fork and exec, where the locking loggers
/// of the parent must not be touched; a bare write(2) is async-signal-safe.
fn child_log(msg: &str) {
    // SAFETY: fd 2 is open and msg points to a live buffer of the given
    // length. A failed diagnostic write is not actionable.
    let _ = unsafe { libc::write(2, msg.as_ptr() as *const libc::c_void, msg.len()) };
}

fn session_child(
    target: &CString,
    argv: &[*const libc::c_char],
    envp: &[*const libc::c_char],
    tty: &CString,
    home: &CString,
    identity: SessionIdentity<'_>,
    groups: &[libc::gid_t],
) -> ! {
    // SAFETY: all calls below are async-signal-safe; every pointer comes
    // from a CString or slice allocated before the fork and still live.
    unsafe {
        if libc::setsid() == -1 {
            child_log("session: setsid failed\n");
        }

        // Best-effort controlling terminal: a session without its own tty is
        // still preferable to none at all.
        let fd = libc::open(tty.as_ptr(), libc::O_RDWR | libc::O_CLOEXEC | libc::O_NOCTTY);
        if fd == -1 {
            child_log("session: failed to open terminal\n");
        } else {
            if libc::dup2(fd, 0) == -1 || libc::dup2(fd, 1) == -1 || libc::dup2(fd, 2) == -1 {
                child_log("session: failed to bind stdio to terminal\n");
            } else if libc::ioctl(fd, libc::TIOCSCTTY, 1) == -1 {
                child_log("session: failed to acquire controlling terminal\n");
            }
            if libc::close(fd) == -1 {
                child_log("session: failed to close terminal fd\n");
            }
        }

        // Privilege drop, in order: supplementary groups, then real/
        // effective/saved gid, then uid. The session must never run
        // privileged, so each failure ends the child here.
        if libc::setgroups(groups.len(), groups.as_ptr()) == -1 {
            child_log("session: setgroups failed\n");
            libc::_exit(SessionFailure::Groups.exit_code());
        }
        let gid = identity.gid;
        if libc::setresgid(gid, gid, gid) == -1 {
            child_log("session: setresgid failed\n");
            libc::_exit(SessionFailure::GroupId.exit_code());
        }
        let uid = identity.uid;
        if libc::setresuid(uid, uid, uid) == -1 {
            child_log("session: setresuid failed\n");
            libc::_exit(SessionFailure::UserId.exit_code());
        }

        if libc::chdir(home.as_ptr()) == -1 {
            child_log("session: chdir to home failed\n");
        }

        libc::execvpe(target.as_ptr(), argv.as_ptr(), envp.as_ptr());
        child_log("session: exec failed\n");
        libc::_exit(SessionFailure::Exec.exit_code());
    }
}

/// Block until any child terminates and return its pid.
pub fn wait_any() -> Result<Pid, Errno> {
    wait().map(|status| status.pid().unwrap_or(Pid::from_raw(-1)))
}

/// Send SIGTERM to every process in our process group.
pub fn terminate_process_group() {
    if let Err(e) = kill(Pid::from_raw(0), Signal::SIGTERM) {
        warn!(error = %e, "failed to signal process group");
    }
}

/// Reap children until none remain.
///
/// `wait_next` is the blocking wait primitive; whenever the reaped pid
/// equals the distinguished `session` pid, `on_session_exit` runs exactly
/// once, and reaping continues so that anything it terminates is still
/// collected. `ECHILD` ends the loop normally; any other wait failure is
/// fatal and propagates to the caller.
pub fn reap_loop<W, F>(
    session: Option<Pid>,
    mut wait_next: W,
    mut on_session_exit: F,
) -> Result<(), Errno>
where
    W: FnMut() -> Result<Pid, Errno>,
    F: FnMut(),
{
    let mut fired = false;
    loop {
        match wait_next() {
            Ok(pid) => {
                if session == Some(pid) && !fired {
                    fired = true;
                    on_session_exit();
                }
            }
            Err(Errno::ECHILD) => return Ok(()),
            Err(e) => return Err(e),
        }
    }
}
