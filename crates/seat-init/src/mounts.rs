//! Filesystem bring-up.
//!
//! The device filesystem comes first so diagnostics can move to the kernel
//! log; everything else is a fixed list of mounts attempted in order. None
//! of them is fatal: a workstation with /boot missing still beats one that
//! never reaches the compositor.

use std::fs::{DirBuilder, OpenOptions};
use std::io;
use std::os::fd::AsRawFd;
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt};

use nix::mount::{MsFlags, mount};
use tracing::warn;

const TMPFS_FLAGS: MsFlags = MsFlags::MS_NOATIME
    .union(MsFlags::MS_NODEV)
    .union(MsFlags::MS_NOEXEC)
    .union(MsFlags::MS_NOSUID);

/// Mount devtmpfs on /dev. This is the only mount the orchestrator treats
/// specially: it gates the kernel-log redirect.
pub fn early_devfs() -> nix::Result<()> {
    mount(
        Some("none"),
        "/dev",
        Some("devtmpfs"),
        MsFlags::empty(),
        None::<&str>,
    )
}

/// Point our stdout and stderr at /dev/kmsg so everything logged from here
/// on shows up in the kernel ring buffer.
pub fn redirect_to_kmsg() -> io::Result<()> {
    let kmsg = OpenOptions::new()
        .write(true)
        .custom_flags(libc::O_CLOEXEC)
        .open("/dev/kmsg")?;
    let fd = kmsg.as_raw_fd();
    // SAFETY: fd is a valid open descriptor and 1/2 are the standard output
    // and error slots; dup2 clears close-on-exec on the duplicates, so
    // children inherit the redirect. Errors are checked below.
    if unsafe { libc::dup2(fd, 1) } == -1 || unsafe { libc::dup2(fd, 2) } == -1 {
        return Err(io::Error::last_os_error());
    }
    // kmsg drops here, closing the original descriptor.
    Ok(())
}

fn try_mount(source: &str, target: &str, fstype: &str, flags: MsFlags, data: Option<&str>) {
    if let Err(e) = mount(Some(source), target, Some(fstype), flags, data) {
        warn!(target, error = %e, "mount failed");
    }
}

/// Create a mount point with the given mode. Returns false (after logging)
/// if the directory cannot be created, in which case the mount is skipped.
fn try_mkdir(path: &str, mode: u32) -> bool {
    match DirBuilder::new().mode(mode).create(path) {
        Ok(()) => true,
        Err(e) => {
            warn!(path, error = %e, "mkdir failed");
            false
        }
    }
}

/// The fixed mount list. Every entry is attempted regardless of earlier
/// failures.
pub fn mount_all() {
    try_mount("none", "/tmp", "tmpfs", TMPFS_FLAGS, None);
    try_mount("none", "/run", "tmpfs", TMPFS_FLAGS, None);
    try_mount("none", "/proc", "proc", MsFlags::empty(), None);
    try_mount("none", "/sys", "sysfs", MsFlags::empty(), None);

    if try_mkdir("/dev/shm", 0o1744) {
        try_mount("none", "/dev/shm", "tmpfs", TMPFS_FLAGS, None);
    }
    if try_mkdir("/dev/pts", 0o744) {
        try_mount("none", "/dev/pts", "devpts", MsFlags::empty(), None);
    }

    try_mount(
        "/dev/nvme0n1p2",
        "/data",
        "btrfs",
        MsFlags::MS_NOATIME,
        Some("subvol=/@data,commit=900"),
    );
    try_mount(
        "/dev/nvme0n1p1",
        "/boot",
        "vfat",
        MsFlags::MS_NOATIME,
        Some("umask=0077"),
    );
}
