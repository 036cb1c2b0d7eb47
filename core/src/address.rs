// Public address resolution
//
// When a public hostname is configured, advertisement collapses to a single
// canonical multiaddr: the edge terminates TLS on 443 and forwards to the
// internal websocket port, so the advertised address reflects the fronted
// port, never the internal bind port. Without a hostname the swarm
// advertises whatever it discovered — degraded, but keeps local
// development functional.

use libp2p::Multiaddr;

/// Port the TLS-terminating edge exposes to the public internet.
pub const PUBLIC_TLS_PORT: u16 = 443;

/// Build the canonical advertised address, `/dns4/<host>/tcp/443/wss`.
///
/// Pure given its input; a hostname that does not form a valid multiaddr is
/// logged and treated as absent rather than failing startup.
pub fn resolve_public_address(public_hostname: Option<&str>) -> Option<Multiaddr> {
    let host = public_hostname?;
    let raw = format!("/dns4/{}/tcp/{}/wss", host, PUBLIC_TLS_PORT);
    match raw.parse::<Multiaddr>() {
        Ok(addr) => Some(addr),
        Err(e) => {
            tracing::warn!("Failed to build public multiaddr from {:?}: {}", host, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hostname_builds_canonical_address() {
        let addr = resolve_public_address(Some("relay.example.com")).unwrap();
        assert_eq!(addr.to_string(), "/dns4/relay.example.com/tcp/443/wss");
    }

    #[test]
    fn test_external_port_is_always_443() {
        // The internal listen port is irrelevant to the advertised address
        let addr = resolve_public_address(Some("relay.onrender.com")).unwrap();
        assert!(addr.to_string().contains("/tcp/443/"));
    }

    #[test]
    fn test_no_hostname_is_absent() {
        assert!(resolve_public_address(None).is_none());
    }

    #[test]
    fn test_malformed_hostname_is_absent() {
        assert!(resolve_public_address(Some("relay/evil.example.com")).is_none());
    }
}
