//! Routing-socket client for one-shot kernel network configuration.
//!
//! A [`RtnlConnection`] owns one netlink route socket and the sequence
//! counter for requests sent on it. The protocol is synchronous
//! request/acknowledge: a request is fully sent and its reply fully drained
//! before the next request goes out, so the connection is used strictly
//! half-duplex with one outstanding request at a time.
//!
//! Message encoding and reply parsing live in the `rtnl-proto` crate.

use std::io;
use std::mem;
use std::os::fd::{AsRawFd, FromRawFd, IntoRawFd, OwnedFd};
use std::ptr;

use rtnl_proto::Request;

/// Error from a routing-socket operation, carrying the underlying OS error.
#[derive(Debug, thiserror::Error)]
pub enum RtnlError {
    #[error("failed to create netlink socket: {0}")]
    Socket(#[source] io::Error),
    #[error("failed to bind netlink socket: {0}")]
    Bind(#[source] io::Error),
    #[error("failed to send netlink request: {0}")]
    Send(#[source] io::Error),
    #[error("short write on netlink socket: sent {sent} of {len} bytes")]
    ShortSend { sent: usize, len: usize },
    #[error("failed to receive netlink reply: {0}")]
    Recv(#[source] io::Error),
}

/// Zeroed kernel address for the routing protocol (pid 0 = the kernel).
fn kernel_addr() -> libc::sockaddr_nl {
    // SAFETY: sockaddr_nl is a plain C struct for which all-zeroes is a
    // valid value.
    let mut addr: libc::sockaddr_nl = unsafe { mem::zeroed() };
    addr.nl_family = libc::AF_NETLINK as libc::sa_family_t;
    addr
}

/// One open routing socket plus the request sequence counter.
///
/// The sequence number strictly increases per request and is never reused
/// within the connection's lifetime. Dropping the connection closes the
/// socket; [`RtnlConnection::close`] does the same but reports failure.
pub struct RtnlConnection {
    fd: OwnedFd,
    seq: u32,
}

impl RtnlConnection {
    /// Create and bind the routing socket.
    ///
    /// On failure there is no usable connection and no cleanup is required
    /// of the caller.
    pub fn open() -> Result<Self, RtnlError> {
        // SAFETY: creating a netlink socket with valid constants; the fd is
        // checked for errors below.
        let fd = unsafe {
            libc::socket(
                libc::AF_NETLINK,
                libc::SOCK_RAW | libc::SOCK_CLOEXEC,
                libc::NETLINK_ROUTE,
            )
        };
        if fd < 0 {
            return Err(RtnlError::Socket(io::Error::last_os_error()));
        }

        let addr = kernel_addr();
        // SAFETY: fd is a valid socket from above, addr is a properly
        // initialized sockaddr_nl of the size passed. Errors are checked
        // below.
        let ret = unsafe {
            libc::bind(
                fd,
                &addr as *const libc::sockaddr_nl as *const libc::sockaddr,
                mem::size_of::<libc::sockaddr_nl>() as libc::socklen_t,
            )
        };
        if ret < 0 {
            let err = io::Error::last_os_error();
            // SAFETY: fd is a valid open socket descriptor and we are about
            // to return an error.
            unsafe { libc::close(fd) };
            return Err(RtnlError::Bind(err));
        }

        // SAFETY: fd is a valid, bound socket descriptor; ownership
        // transfers to the OwnedFd.
        let fd = unsafe { OwnedFd::from_raw_fd(fd) };
        Ok(Self { fd, seq: 0 })
    }

    /// Assign the next sequence number to `req` and transmit the whole
    /// encoded buffer to the kernel in one write.
    ///
    /// Returns the sequence number used. A send failure does not close the
    /// connection.
    pub fn send(&mut self, req: &mut Request) -> Result<u32, RtnlError> {
        self.seq += 1;
        req.set_seq(self.seq);

        let bytes = req.as_bytes();
        let addr = kernel_addr();
        // SAFETY: the fd is a valid socket, the buffer pointer/length come
        // from a live slice, and addr is a valid sockaddr_nl. Errors are
        // checked below.
        let ret = unsafe {
            libc::sendto(
                self.fd.as_raw_fd(),
                bytes.as_ptr() as *const libc::c_void,
                bytes.len(),
                0,
                &addr as *const libc::sockaddr_nl as *const libc::sockaddr,
                mem::size_of::<libc::sockaddr_nl>() as libc::socklen_t,
            )
        };
        if ret < 0 {
            return Err(RtnlError::Send(io::Error::last_os_error()));
        }
        let sent = ret as usize;
        if sent != bytes.len() {
            return Err(RtnlError::ShortSend {
                sent,
                len: bytes.len(),
            });
        }
        Ok(self.seq)
    }

    /// Receive the pending reply datagram.
    ///
    /// The exact datagram size is discovered with a non-destructive peek and
    /// the returned buffer is allocated to exactly that size; ownership
    /// passes to the caller.
    pub fn recv_reply(&self) -> Result<Vec<u8>, RtnlError> {
        // SAFETY: peeking with a null buffer and MSG_TRUNC returns the size
        // of the pending datagram without consuming it. Errors are checked
        // below.
        let len = unsafe {
            libc::recv(
                self.fd.as_raw_fd(),
                ptr::null_mut(),
                0,
                libc::MSG_PEEK | libc::MSG_TRUNC,
            )
        };
        if len < 0 {
            return Err(RtnlError::Recv(io::Error::last_os_error()));
        }

        let mut buf = vec![0u8; len as usize];
        // SAFETY: buf is a live allocation of exactly `len` bytes; the
        // kernel writes at most that much. Errors are checked below.
        let ret = unsafe {
            libc::recv(
                self.fd.as_raw_fd(),
                buf.as_mut_ptr() as *mut libc::c_void,
                buf.len(),
                0,
            )
        };
        if ret < 0 {
            return Err(RtnlError::Recv(io::Error::last_os_error()));
        }
        buf.truncate(ret as usize);
        Ok(buf)
    }

    /// Send `req` and drain its acknowledgement, returning the kernel's
    /// error code (0 = success).
    ///
    /// Because the connection is half-duplex with one outstanding request,
    /// the next datagram on the socket answers the request just sent.
    pub fn transact(&mut self, req: &mut Request) -> Result<i32, RtnlError> {
        self.send(req)?;
        let reply = self.recv_reply()?;
        Ok(rtnl_proto::error_code(&reply).unwrap_or(0))
    }

    /// Sequence number of the most recently sent request.
    pub fn last_seq(&self) -> u32 {
        self.seq
    }

    /// Close the socket, reporting failure.
    ///
    /// Dropping the connection also closes the socket but swallows the
    /// result.
    pub fn close(self) -> io::Result<()> {
        let fd = self.fd.into_raw_fd();
        // SAFETY: fd was a valid owned descriptor and is closed exactly once
        // here; ownership was released by into_raw_fd.
        let ret = unsafe { libc::close(fd) };
        if ret < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}
