//! Machine-specific constants.
//!
//! This init boots exactly one machine, so everything that would be
//! configuration elsewhere is compiled in: no parsing at runtime and nothing
//! to fail before logging is up.

/// Restricted executable search path handed to every child.
pub const SEARCH_PATH: &str = "/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin:/opt/bin";

/// Device-manager daemon and its control utility.
pub const DEVD: &str = "/sbin/udevd";
pub const DEVADM: &str = "/sbin/udevadm";

/// The graphical session executable and the terminal it owns.
pub const COMPOSITOR: &str = "/usr/bin/sway";
pub const SESSION_TTY: &str = "/dev/tty0";

/// Session user identity. Group order matters: supplementary groups are set
/// first, then the gid, then the uid.
pub const SESSION_UID: u32 = 1000;
pub const SESSION_GID: u32 = 1000;
pub const SESSION_GROUPS: &[u32] = &[1000, 10, 18, 27, 97];
pub const SESSION_HOME: &str = "/home/ada";

/// Per-boot runtime directory for the session, created fresh on the tmpfs.
pub const SESSION_RUNTIME_DIR: &str = "/run/xdg-runtime-dir";

/// Interface indices as enumerated by this machine's kernel.
pub const LOOPBACK_INDEX: i32 = 1;
pub const PRIMARY_INDEX: i32 = 2;

/// Static IPv4 configuration for the primary interface.
pub const PRIMARY_ADDR: [u8; 4] = [192, 168, 1, 26];
pub const PRIMARY_PREFIX_LEN: u8 = 24;
pub const PRIMARY_BROADCAST: [u8; 4] = [255, 255, 255, 0];
pub const GATEWAY_ADDR: [u8; 4] = [192, 168, 1, 254];

/// Minimal fixed environment for the graphical session.
pub fn session_env() -> Vec<(String, String)> {
    vec![
        ("HOME".into(), SESSION_HOME.into()),
        ("MOZ_ENABLE_WAYLAND".into(), "1".into()),
        ("PATH".into(), SEARCH_PATH.into()),
        ("WLR_SESSION".into(), "direct".into()),
        ("XDG_RUNTIME_DIR".into(), SESSION_RUNTIME_DIR.into()),
        ("XDG_SEAT".into(), "seat0".into()),
    ]
}
