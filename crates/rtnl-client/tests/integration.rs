//! Integration tests against the real kernel routing socket.
//!
//! Opening a routing socket requires no privilege, and a set-link request
//! with an empty change mask modifies nothing, so these tests are safe to
//! run anywhere a netlink socket is available. Environments that deny
//! netlink sockets entirely (some sandboxes) are skipped, not failed.

use rtnl_client::RtnlConnection;

const LOOPBACK_INDEX: i32 = 1;

fn open_or_skip() -> Option<RtnlConnection> {
    match RtnlConnection::open() {
        Ok(conn) => Some(conn),
        Err(e) => {
            eprintln!("skipping: routing socket unavailable: {e}");
            None
        }
    }
}

#[test]
fn sequence_numbers_strictly_increase() {
    let Some(mut conn) = open_or_skip() else {
        return;
    };

    let mut seen = Vec::new();
    for _ in 0..3 {
        // Empty change mask: the kernel acknowledges without touching the
        // interface.
        let mut req = rtnl_proto::set_link_flags(LOOPBACK_INDEX, 0, 0).unwrap();
        let seq = conn.send(&mut req).unwrap();
        assert_eq!(req.seq(), seq);
        seen.push(seq);
        // Drain the acknowledgement before the next request goes out.
        let reply = conn.recv_reply().unwrap();
        assert!(!reply.is_empty());
    }

    for pair in seen.windows(2) {
        assert!(pair[0] < pair[1], "sequence repeated or regressed: {seen:?}");
    }
    conn.close().unwrap();
}

#[test]
fn noop_link_transact_is_acknowledged() {
    let Some(mut conn) = open_or_skip() else {
        return;
    };

    let mut req = rtnl_proto::set_link_flags(LOOPBACK_INDEX, 0, 0).unwrap();
    let code = conn.transact(&mut req).unwrap();
    // 0 on acknowledgement; a negated errno if policy rejects the request.
    assert!(code <= 0, "unexpected positive code {code}");
    conn.close().unwrap();
}
