//! Rtnetlink binary protocol for kernel network configuration.
//!
//! ## Wire Format
//!
//! Every request is a single datagram: a 16-byte netlink header, a
//! type-specific fixed struct, then zero or more TLV attributes, each padded
//! to a 4-byte boundary. All integers are native-endian (the kernel reads
//! the structs as C ABI types).
//!
//! ```text
//! [4B length][2B type][2B flags][4B seq][4B pid]  <- nlmsghdr
//! [fixed struct: ifinfomsg | ifaddrmsg | rtmsg]
//! [2B rta_len][2B rta_type][value][pad to 4]      <- repeated
//! ```
//!
//! ## Request Types
//!
//! | Type | Name        | Fixed struct | Attributes                        |
//! |------|-------------|--------------|-----------------------------------|
//! | 19   | set-link    | ifinfomsg    | (none)                            |
//! | 20   | new-address | ifaddrmsg    | IFA_LOCAL, IFA_ADDRESS, IFA_BROADCAST |
//! | 24   | new-route   | rtmsg        | RTA_GATEWAY, RTA_OIF              |
//!
//! Replies arrive as one datagram holding one or more netlink frames; an
//! error frame (type 2) carries a signed code, 0 meaning the request was
//! acknowledged.

/// Netlink header size.
pub const NLMSG_HDRLEN: usize = 16;

/// Alignment boundary for netlink payloads and attributes.
pub const NLMSG_ALIGNTO: usize = 4;

/// Attribute (TLV) header size: 2-byte length + 2-byte type.
pub const RTA_HDRLEN: usize = 4;

/// Physical capacity of a request buffer. Large enough for every request
/// variant this crate builds, small enough to live on the stack.
pub const REQUEST_CAPACITY: usize = 128;

// Message types.
pub const NLMSG_ERROR: u16 = 2;
pub const RTM_SETLINK: u16 = 19;
pub const RTM_NEWADDR: u16 = 20;
pub const RTM_NEWROUTE: u16 = 24;

// Header flag bits.
pub const NLM_F_REQUEST: u16 = 0x01;
pub const NLM_F_ACK: u16 = 0x04;
pub const NLM_F_EXCL: u16 = 0x200;
pub const NLM_F_CREATE: u16 = 0x400;

// Address families.
pub const AF_UNSPEC: u8 = 0;
pub const AF_INET: u8 = 2;

/// Link flag: interface is administratively up.
pub const IFF_UP: u32 = 0x1;

// Address attribute types.
pub const IFA_ADDRESS: u16 = 1;
pub const IFA_LOCAL: u16 = 2;
pub const IFA_BROADCAST: u16 = 4;

// Route attribute types.
pub const RTA_OIF: u16 = 4;
pub const RTA_GATEWAY: u16 = 5;

// Route fixed-struct values.
pub const RT_TABLE_MAIN: u8 = 254;
pub const RTPROT_BOOT: u8 = 3;
pub const RT_SCOPE_UNIVERSE: u8 = 0;
pub const RTN_UNICAST: u8 = 1;

const IFINFOMSG_LEN: usize = 16;
const IFADDRMSG_LEN: usize = 8;
const RTMSG_LEN: usize = 12;

/// Protocol error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// Appending would exceed the buffer's declared capacity. Nothing was
    /// written; the buffer content is unchanged.
    Overflow { needed: usize, capacity: usize },
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overflow { needed, capacity } => {
                write!(f, "request too large: {needed} bytes (capacity {capacity})")
            }
        }
    }
}

impl std::error::Error for BuildError {}

/// Round `len` up to the next alignment boundary.
pub const fn nlmsg_align(len: usize) -> usize {
    (len + NLMSG_ALIGNTO - 1) & !(NLMSG_ALIGNTO - 1)
}

/// Read a `u16` from `data` at `offset`. Returns `None` if out of bounds.
fn read_u16_at(data: &[u8], offset: usize) -> Option<u16> {
    let bytes: [u8; 2] = data.get(offset..offset + 2)?.try_into().ok()?;
    Some(u16::from_ne_bytes(bytes))
}

/// Read a `u32` from `data` at `offset`. Returns `None` if out of bounds.
fn read_u32_at(data: &[u8], offset: usize) -> Option<u32> {
    let bytes: [u8; 4] = data.get(offset..offset + 4)?.try_into().ok()?;
    Some(u32::from_ne_bytes(bytes))
}

/// Read an `i32` from `data` at `offset`. Returns `None` if out of bounds.
fn read_i32_at(data: &[u8], offset: usize) -> Option<i32> {
    let bytes: [u8; 4] = data.get(offset..offset + 4)?.try_into().ok()?;
    Some(i32::from_ne_bytes(bytes))
}

// ---------------------------------------------------------------------------
// Encode
// ---------------------------------------------------------------------------

/// Builder for a request message in a fixed-capacity buffer.
///
/// Tracks the current length against [`REQUEST_CAPACITY`]; every append is
/// bounds-checked before any byte is written.
pub struct RequestBuilder {
    buf: [u8; REQUEST_CAPACITY],
    len: usize,
}

impl RequestBuilder {
    /// Start a request with the given message type and header flags. The
    /// sequence number is left at 0; the connection assigns it at send time.
    pub fn new(msg_type: u16, flags: u16) -> Self {
        let mut b = Self {
            buf: [0u8; REQUEST_CAPACITY],
            len: NLMSG_HDRLEN,
        };
        b.write_at(4, &msg_type.to_ne_bytes());
        b.write_at(6, &flags.to_ne_bytes());
        b
    }

    /// Copy `bytes` into the buffer at `offset`. Silently ignores writes past
    /// the end; callers check capacity first.
    fn write_at(&mut self, offset: usize, bytes: &[u8]) {
        if let Some(dst) = self.buf.get_mut(offset..offset + bytes.len()) {
            dst.copy_from_slice(bytes);
        }
    }

    /// Append raw bytes (the fixed, type-specific struct).
    pub fn push_fixed(&mut self, bytes: &[u8]) -> Result<(), BuildError> {
        let needed = self.len + bytes.len();
        if needed > REQUEST_CAPACITY {
            return Err(BuildError::Overflow {
                needed,
                capacity: REQUEST_CAPACITY,
            });
        }
        self.write_at(self.len, bytes);
        self.len = needed;
        Ok(())
    }

    /// Append a TLV attribute, aligning the previous content first.
    ///
    /// The overflow check runs before anything is written: on `Err` the
    /// buffer and length are exactly as they were.
    pub fn push_attr(&mut self, attr_type: u16, value: &[u8]) -> Result<(), BuildError> {
        let offset = nlmsg_align(self.len);
        let rta_len = RTA_HDRLEN + value.len();
        let needed = offset + rta_len;
        if needed > REQUEST_CAPACITY {
            return Err(BuildError::Overflow {
                needed,
                capacity: REQUEST_CAPACITY,
            });
        }
        // rta_len fits in u16: needed <= REQUEST_CAPACITY < u16::MAX.
        self.write_at(offset, &(rta_len as u16).to_ne_bytes());
        self.write_at(offset + 2, &attr_type.to_ne_bytes());
        self.write_at(offset + RTA_HDRLEN, value);
        self.len = needed;
        Ok(())
    }

    /// Current encoded length (header included).
    pub fn len(&self) -> usize {
        self.len
    }

    /// A request is never empty; the header alone is 16 bytes.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Patch the total length into the header and return the finished
    /// request.
    pub fn finish(mut self) -> Request {
        let total = self.len;
        self.write_at(0, &(total as u32).to_ne_bytes());
        Request {
            buf: self.buf,
            len: total,
        }
    }
}

/// A finished, self-contained request message.
pub struct Request {
    buf: [u8; REQUEST_CAPACITY],
    len: usize,
}

impl Request {
    /// The encoded message, exactly `declared total length` bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.buf.get(..self.len).unwrap_or_default()
    }

    /// Sequence number currently in the header.
    pub fn seq(&self) -> u32 {
        read_u32_at(&self.buf, 8).unwrap_or(0)
    }

    /// Overwrite the header sequence number. Called by the connection just
    /// before transmission.
    pub fn set_seq(&mut self, seq: u32) {
        if let Some(dst) = self.buf.get_mut(8..12) {
            dst.copy_from_slice(&seq.to_ne_bytes());
        }
    }
}

/// Build a set-link-flags request: change the flag bits selected by `change`
/// on interface `index` to the values in `flags`.
///
/// Link changes are plain REQUEST|ACK; create/exclusive semantics do not
/// apply to an existing interface.
pub fn set_link_flags(index: i32, flags: u32, change: u32) -> Result<Request, BuildError> {
    let mut b = RequestBuilder::new(RTM_SETLINK, NLM_F_REQUEST | NLM_F_ACK);
    let mut ifi = [0u8; IFINFOMSG_LEN];
    write_field(&mut ifi, 0, &[AF_UNSPEC]);
    // bytes 1..4: padding + device type, both zero
    write_field(&mut ifi, 4, &index.to_ne_bytes());
    write_field(&mut ifi, 8, &flags.to_ne_bytes());
    write_field(&mut ifi, 12, &change.to_ne_bytes());
    b.push_fixed(&ifi)?;
    Ok(b.finish())
}

/// Build a new-address request assigning an IPv4 address to interface
/// `index`. `local` and `address` are the local and peer addresses (equal on
/// broadcast media), `prefix_len` the netmask width.
pub fn new_address(
    index: u32,
    local: [u8; 4],
    address: [u8; 4],
    broadcast: [u8; 4],
    prefix_len: u8,
) -> Result<Request, BuildError> {
    let mut b = RequestBuilder::new(
        RTM_NEWADDR,
        NLM_F_REQUEST | NLM_F_CREATE | NLM_F_EXCL | NLM_F_ACK,
    );
    let mut ifa = [0u8; IFADDRMSG_LEN];
    write_field(&mut ifa, 0, &[AF_INET, prefix_len, 0, RT_SCOPE_UNIVERSE]);
    write_field(&mut ifa, 4, &index.to_ne_bytes());
    b.push_fixed(&ifa)?;
    b.push_attr(IFA_LOCAL, &local)?;
    b.push_attr(IFA_ADDRESS, &address)?;
    b.push_attr(IFA_BROADCAST, &broadcast)?;
    Ok(b.finish())
}

/// Build a new-route request for a default unicast route through `gateway`
/// out of interface `oif`, in the main table.
pub fn new_route(oif: u32, gateway: [u8; 4]) -> Result<Request, BuildError> {
    let mut b = RequestBuilder::new(
        RTM_NEWROUTE,
        NLM_F_REQUEST | NLM_F_CREATE | NLM_F_EXCL | NLM_F_ACK,
    );
    let mut rt = [0u8; RTMSG_LEN];
    write_field(
        &mut rt,
        0,
        &[
            AF_INET,
            0, // dst_len: default route
            0, // src_len
            0, // tos
            RT_TABLE_MAIN,
            RTPROT_BOOT,
            RT_SCOPE_UNIVERSE,
            RTN_UNICAST,
        ],
    );
    // bytes 8..12: rtm_flags, zero
    b.push_fixed(&rt)?;
    b.push_attr(RTA_GATEWAY, &gateway)?;
    b.push_attr(RTA_OIF, &oif.to_ne_bytes())?;
    Ok(b.finish())
}

fn write_field(buf: &mut [u8], offset: usize, bytes: &[u8]) {
    if let Some(dst) = buf.get_mut(offset..offset + bytes.len()) {
        dst.copy_from_slice(bytes);
    }
}

// ---------------------------------------------------------------------------
// Decode
// ---------------------------------------------------------------------------

/// Decoded netlink header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    pub len: u32,
    pub msg_type: u16,
    pub flags: u16,
    pub seq: u32,
    pub pid: u32,
}

/// Decode the netlink header at the start of `buf`. Returns `None` if the
/// buffer is shorter than a header.
pub fn decode_header(buf: &[u8]) -> Option<MessageHeader> {
    Some(MessageHeader {
        len: read_u32_at(buf, 0)?,
        msg_type: read_u16_at(buf, 4)?,
        flags: read_u16_at(buf, 6)?,
        seq: read_u32_at(buf, 8)?,
        pid: read_u32_at(buf, 12)?,
    })
}

/// A decoded TLV attribute borrowing its value from the message buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attr<'a> {
    pub attr_type: u16,
    pub value: &'a [u8],
}

/// Iterator over the TLV attributes of a message, starting after the fixed
/// struct of `fixed_len` bytes.
pub fn attrs(msg: &[u8], fixed_len: usize) -> AttrIter<'_> {
    AttrIter {
        buf: msg,
        offset: nlmsg_align(NLMSG_HDRLEN + fixed_len),
    }
}

pub struct AttrIter<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> Iterator for AttrIter<'a> {
    type Item = Attr<'a>;

    fn next(&mut self) -> Option<Attr<'a>> {
        let rta_len = read_u16_at(self.buf, self.offset)? as usize;
        if rta_len < RTA_HDRLEN {
            return None;
        }
        let attr_type = read_u16_at(self.buf, self.offset + 2)?;
        let value = self.buf.get(self.offset + RTA_HDRLEN..self.offset + rta_len)?;
        self.offset = nlmsg_align(self.offset + rta_len);
        Some(Attr { attr_type, value })
    }
}

/// Structural fields of a set-link message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkMessage {
    pub family: u8,
    pub index: i32,
    pub flags: u32,
    pub change: u32,
}

/// Decode a set-link request built by [`set_link_flags`].
pub fn decode_link(buf: &[u8]) -> Option<(MessageHeader, LinkMessage)> {
    let hdr = decode_header(buf)?;
    let link = LinkMessage {
        family: buf.get(NLMSG_HDRLEN).copied()?,
        index: read_i32_at(buf, NLMSG_HDRLEN + 4)?,
        flags: read_u32_at(buf, NLMSG_HDRLEN + 8)?,
        change: read_u32_at(buf, NLMSG_HDRLEN + 12)?,
    };
    Some((hdr, link))
}

/// Structural fields of a new-address message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressMessage {
    pub family: u8,
    pub prefix_len: u8,
    pub scope: u8,
    pub index: u32,
    pub local: Option<[u8; 4]>,
    pub address: Option<[u8; 4]>,
    pub broadcast: Option<[u8; 4]>,
}

/// Decode a new-address request built by [`new_address`].
pub fn decode_address(buf: &[u8]) -> Option<(MessageHeader, AddressMessage)> {
    let hdr = decode_header(buf)?;
    let mut addr = AddressMessage {
        family: buf.get(NLMSG_HDRLEN).copied()?,
        prefix_len: buf.get(NLMSG_HDRLEN + 1).copied()?,
        scope: buf.get(NLMSG_HDRLEN + 3).copied()?,
        index: read_u32_at(buf, NLMSG_HDRLEN + 4)?,
        local: None,
        address: None,
        broadcast: None,
    };
    for attr in attrs(buf, IFADDRMSG_LEN) {
        let value: Option<[u8; 4]> = attr.value.try_into().ok();
        match attr.attr_type {
            IFA_LOCAL => addr.local = value,
            IFA_ADDRESS => addr.address = value,
            IFA_BROADCAST => addr.broadcast = value,
            _ => {}
        }
    }
    Some((hdr, addr))
}

/// Structural fields of a new-route message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteMessage {
    pub family: u8,
    pub table: u8,
    pub protocol: u8,
    pub scope: u8,
    pub route_type: u8,
    pub gateway: Option<[u8; 4]>,
    pub oif: Option<u32>,
}

/// Decode a new-route request built by [`new_route`].
pub fn decode_route(buf: &[u8]) -> Option<(MessageHeader, RouteMessage)> {
    let hdr = decode_header(buf)?;
    let mut route = RouteMessage {
        family: buf.get(NLMSG_HDRLEN).copied()?,
        table: buf.get(NLMSG_HDRLEN + 4).copied()?,
        protocol: buf.get(NLMSG_HDRLEN + 5).copied()?,
        scope: buf.get(NLMSG_HDRLEN + 6).copied()?,
        route_type: buf.get(NLMSG_HDRLEN + 7).copied()?,
        gateway: None,
        oif: None,
    };
    for attr in attrs(buf, RTMSG_LEN) {
        match attr.attr_type {
            RTA_GATEWAY => route.gateway = attr.value.try_into().ok(),
            RTA_OIF => {
                let bytes: Option<[u8; 4]> = attr.value.try_into().ok();
                route.oif = bytes.map(u32::from_ne_bytes);
            }
            _ => {}
        }
    }
    Some((hdr, route))
}

/// Scan the netlink frames in a reply datagram for an error record.
///
/// Returns the signed code embedded in the first error frame (0 is an
/// acknowledgement), or `None` if no error record is present within the
/// bounds of `buf`. A reply may carry several frames; all are scanned.
pub fn error_code(buf: &[u8]) -> Option<i32> {
    let mut offset = 0;
    loop {
        let frame = buf.get(offset..)?;
        let hdr = decode_header(frame)?;
        let frame_len = hdr.len as usize;
        if frame_len < NLMSG_HDRLEN || frame_len > frame.len() {
            // Malformed or truncated frame; nothing further can be trusted.
            return None;
        }
        if hdr.msg_type == NLMSG_ERROR {
            return read_i32_at(frame, NLMSG_HDRLEN);
        }
        offset += nlmsg_align(frame_len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Encode a netlink frame for reply-parsing tests.
    fn frame(msg_type: u16, payload: &[u8]) -> Vec<u8> {
        let len = NLMSG_HDRLEN + payload.len();
        let mut buf = Vec::with_capacity(nlmsg_align(len));
        buf.extend_from_slice(&(len as u32).to_ne_bytes());
        buf.extend_from_slice(&msg_type.to_ne_bytes());
        buf.extend_from_slice(&0u16.to_ne_bytes());
        buf.extend_from_slice(&1u32.to_ne_bytes());
        buf.extend_from_slice(&0u32.to_ne_bytes());
        buf.extend_from_slice(payload);
        buf.resize(nlmsg_align(len), 0);
        buf
    }

    #[test]
    fn link_roundtrip() {
        let req = set_link_flags(2, IFF_UP, IFF_UP).unwrap();
        let (hdr, link) = decode_link(req.as_bytes()).unwrap();
        assert_eq!(hdr.msg_type, RTM_SETLINK);
        assert_eq!(hdr.flags, NLM_F_REQUEST | NLM_F_ACK);
        assert_eq!(hdr.len as usize, req.as_bytes().len());
        assert_eq!(link.family, AF_UNSPEC);
        assert_eq!(link.index, 2);
        assert_eq!(link.flags, IFF_UP);
        assert_eq!(link.change, IFF_UP);
    }

    #[test]
    fn link_negative_index_roundtrip() {
        let req = set_link_flags(-1, 0, IFF_UP).unwrap();
        let (_, link) = decode_link(req.as_bytes()).unwrap();
        assert_eq!(link.index, -1);
        assert_eq!(link.flags, 0);
    }

    #[test]
    fn address_roundtrip() {
        let local = [192, 168, 1, 26];
        let brd = [255, 255, 255, 0];
        let req = new_address(2, local, local, brd, 24).unwrap();
        let (hdr, addr) = decode_address(req.as_bytes()).unwrap();
        assert_eq!(hdr.msg_type, RTM_NEWADDR);
        assert_eq!(
            hdr.flags,
            NLM_F_REQUEST | NLM_F_CREATE | NLM_F_EXCL | NLM_F_ACK
        );
        assert_eq!(addr.family, AF_INET);
        assert_eq!(addr.prefix_len, 24);
        assert_eq!(addr.scope, RT_SCOPE_UNIVERSE);
        assert_eq!(addr.index, 2);
        assert_eq!(addr.local, Some(local));
        assert_eq!(addr.address, Some(local));
        assert_eq!(addr.broadcast, Some(brd));
    }

    #[test]
    fn route_roundtrip() {
        let gw = [192, 168, 1, 254];
        let req = new_route(2, gw).unwrap();
        let (hdr, route) = decode_route(req.as_bytes()).unwrap();
        assert_eq!(hdr.msg_type, RTM_NEWROUTE);
        assert_eq!(route.family, AF_INET);
        assert_eq!(route.table, RT_TABLE_MAIN);
        assert_eq!(route.protocol, RTPROT_BOOT);
        assert_eq!(route.scope, RT_SCOPE_UNIVERSE);
        assert_eq!(route.route_type, RTN_UNICAST);
        assert_eq!(route.gateway, Some(gw));
        assert_eq!(route.oif, Some(2));
    }

    #[test]
    fn declared_length_counts_aligned_attributes() {
        // Three 4-byte attributes: each is 4 header + 4 value, already
        // aligned, so total = 16 + 8 + 3 * 8.
        let req = new_address(2, [10, 0, 0, 1], [10, 0, 0, 1], [10, 0, 0, 255], 8).unwrap();
        let hdr = decode_header(req.as_bytes()).unwrap();
        assert_eq!(hdr.len as usize, NLMSG_HDRLEN + 8 + 3 * 8);
        assert_eq!(req.as_bytes().len(), hdr.len as usize);
    }

    #[test]
    fn odd_sized_attribute_is_padded_before_the_next() {
        let mut b = RequestBuilder::new(RTM_NEWADDR, NLM_F_REQUEST);
        b.push_fixed(&[0u8; 8]).unwrap();
        b.push_attr(IFA_LOCAL, &[0xAA; 3]).unwrap();
        // 16 + 8 = 24, attr = 4 + 3 = 7, so len is 31 and the next attr
        // must start at 32.
        assert_eq!(b.len(), 31);
        b.push_attr(IFA_ADDRESS, &[0xBB; 4]).unwrap();
        assert_eq!(b.len(), 40);
        let req = b.finish();
        let got: Vec<_> = attrs(req.as_bytes(), 8).collect();
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].attr_type, IFA_LOCAL);
        assert_eq!(got[0].value, &[0xAA; 3]);
        assert_eq!(got[1].attr_type, IFA_ADDRESS);
        assert_eq!(got[1].value, &[0xBB; 4]);
    }

    #[test]
    fn oversized_attribute_rejected_before_write() {
        let mut b = RequestBuilder::new(RTM_NEWADDR, NLM_F_REQUEST);
        b.push_fixed(&[0u8; 8]).unwrap();
        b.push_attr(IFA_LOCAL, &[1, 2, 3, 4]).unwrap();
        let len_before = b.len();
        let snapshot = b.finish();

        // Rebuild the same prefix and try to overflow it.
        let mut b = RequestBuilder::new(RTM_NEWADDR, NLM_F_REQUEST);
        b.push_fixed(&[0u8; 8]).unwrap();
        b.push_attr(IFA_LOCAL, &[1, 2, 3, 4]).unwrap();
        let big = [0u8; REQUEST_CAPACITY];
        let err = b.push_attr(IFA_BROADCAST, &big).unwrap_err();
        assert!(matches!(err, BuildError::Overflow { .. }));

        // Prior content and length are untouched.
        assert_eq!(b.len(), len_before);
        assert_eq!(b.finish().as_bytes(), snapshot.as_bytes());
    }

    #[test]
    fn seq_patching() {
        let mut req = set_link_flags(1, IFF_UP, IFF_UP).unwrap();
        assert_eq!(req.seq(), 0);
        req.set_seq(7);
        assert_eq!(req.seq(), 7);
        assert_eq!(decode_header(req.as_bytes()).unwrap().seq, 7);
    }

    #[test]
    fn error_code_no_error_record() {
        // A reply of non-error frames only.
        let mut reply = frame(RTM_NEWADDR, &[0u8; 8]);
        reply.extend_from_slice(&frame(3, &[])); // NLMSG_DONE
        assert_eq!(error_code(&reply), None);
    }

    #[test]
    fn error_code_found_behind_other_frames() {
        let mut reply = frame(RTM_NEWADDR, &[0u8; 8]);
        reply.extend_from_slice(&frame(RTM_NEWROUTE, &[0u8; 12]));
        reply.extend_from_slice(&frame(NLMSG_ERROR, &(-13i32).to_ne_bytes()));
        assert_eq!(error_code(&reply), Some(-13));
    }

    #[test]
    fn error_code_ack_is_zero() {
        let reply = frame(NLMSG_ERROR, &0i32.to_ne_bytes());
        assert_eq!(error_code(&reply), Some(0));
    }

    #[test]
    fn error_code_respects_truncation_bound() {
        let reply = frame(NLMSG_ERROR, &(-13i32).to_ne_bytes());
        // Cut the datagram short of the declared frame length: the error
        // record must not be trusted.
        assert_eq!(error_code(&reply[..NLMSG_HDRLEN + 2]), None);
        assert_eq!(error_code(&[]), None);
    }

    #[test]
    fn error_code_ignores_frame_with_undersized_length() {
        let mut bad = frame(RTM_NEWADDR, &[]);
        // Corrupt the declared length below the header size.
        bad[0..4].copy_from_slice(&4u32.to_ne_bytes());
        assert_eq!(error_code(&bad), None);
    }
}
