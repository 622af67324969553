//! Network configuration, run on the background worker thread.
//!
//! Four requests, issued strictly one at a time on a single routing
//! connection: bring the loopback up, bring the primary interface up, assign
//! its address, add the default gateway route. A rejected request is logged
//! and the rest are still attempted; a dead network is survivable, an
//! aborted boot is not.

use rtnl_client::RtnlConnection;
use rtnl_proto::{BuildError, IFF_UP, Request};
use tracing::{debug, error, warn};

use crate::config;

/// The fixed request sequence, in issue order.
fn request_plan() -> Result<Vec<(&'static str, Request)>, BuildError> {
    Ok(vec![
        (
            "loopback link up",
            rtnl_proto::set_link_flags(config::LOOPBACK_INDEX, IFF_UP, IFF_UP)?,
        ),
        (
            "primary link up",
            rtnl_proto::set_link_flags(config::PRIMARY_INDEX, IFF_UP, IFF_UP)?,
        ),
        (
            "primary address",
            rtnl_proto::new_address(
                config::PRIMARY_INDEX as u32,
                config::PRIMARY_ADDR,
                config::PRIMARY_ADDR,
                config::PRIMARY_BROADCAST,
                config::PRIMARY_PREFIX_LEN,
            )?,
        ),
        (
            "gateway route",
            rtnl_proto::new_route(config::PRIMARY_INDEX as u32, config::GATEWAY_ADDR)?,
        ),
    ])
}

/// Run the whole configuration sequence. Never panics and never blocks the
/// caller beyond its own send/receive pairs; all failures end up in the log.
pub fn configure() {
    let plan = match request_plan() {
        Ok(plan) => plan,
        Err(e) => {
            error!(error = %e, "could not build network requests");
            return;
        }
    };

    let mut conn = match RtnlConnection::open() {
        Ok(conn) => conn,
        Err(e) => {
            error!(error = %e, "could not open routing socket");
            return;
        }
    };

    for (label, mut req) in plan {
        match conn.transact(&mut req) {
            Ok(0) => debug!(request = label, "acknowledged"),
            Ok(code) => warn!(request = label, code, "kernel rejected request"),
            Err(e) => warn!(request = label, error = %e, "request failed"),
        }
    }

    if let Err(e) = conn.close() {
        warn!(error = %e, "failed to close routing socket");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtnl_proto::{RTM_NEWADDR, RTM_NEWROUTE, RTM_SETLINK};

    #[test]
    fn plan_is_ordered_links_then_address_then_route() {
        let plan = request_plan().unwrap();
        let types: Vec<u16> = plan
            .iter()
            .map(|(_, req)| rtnl_proto::decode_header(req.as_bytes()).unwrap().msg_type)
            .collect();
        assert_eq!(types, [RTM_SETLINK, RTM_SETLINK, RTM_NEWADDR, RTM_NEWROUTE]);
    }

    #[test]
    fn plan_carries_the_machine_constants() {
        let plan = request_plan().unwrap();

        let (_, lo) = rtnl_proto::decode_link(plan[0].1.as_bytes()).unwrap();
        assert_eq!(lo.index, config::LOOPBACK_INDEX);
        assert_eq!(lo.flags, IFF_UP);
        assert_eq!(lo.change, IFF_UP);

        let (_, primary) = rtnl_proto::decode_link(plan[1].1.as_bytes()).unwrap();
        assert_eq!(primary.index, config::PRIMARY_INDEX);

        let (_, addr) = rtnl_proto::decode_address(plan[2].1.as_bytes()).unwrap();
        assert_eq!(addr.index, config::PRIMARY_INDEX as u32);
        assert_eq!(addr.prefix_len, config::PRIMARY_PREFIX_LEN);
        assert_eq!(addr.local, Some(config::PRIMARY_ADDR));
        assert_eq!(addr.address, Some(config::PRIMARY_ADDR));
        assert_eq!(addr.broadcast, Some(config::PRIMARY_BROADCAST));

        let (_, route) = rtnl_proto::decode_route(plan[3].1.as_bytes()).unwrap();
        assert_eq!(route.oif, Some(config::PRIMARY_INDEX as u32));
        assert_eq!(route.gateway, Some(config::GATEWAY_ADDR));
    }
}
