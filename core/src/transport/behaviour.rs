// Combined NetworkBehaviour for the relay node
//
// Three protocols and nothing else:
// - relay: circuit relay v2 hop — accepts reservations and relays circuits
//   between peers that cannot reach each other directly
// - identify: pushes our advertised address to connected peers
// - ping: connection liveness

use libp2p::{identify, ping, relay, swarm::NetworkBehaviour};
use std::time::Duration;

/// The relay node behaviour.
#[derive(NetworkBehaviour)]
pub struct RelayBehaviour {
    /// Circuit relay v2 hop. Reservation and circuit limits stay at the
    /// library defaults; this node only decides to be a hop, not how the
    /// protocol meters itself.
    pub relay: relay::Behaviour,
    /// Peer identification and address advertisement
    pub identify: identify::Behaviour,
    /// Keepalive
    pub ping: ping::Behaviour,
}

impl RelayBehaviour {
    /// Create the behaviour.
    ///
    /// `single_address_mode` hides discovered listen addresses from
    /// identify, so peers only ever learn the one canonical public address.
    pub fn new(keypair: &libp2p::identity::Keypair, single_address_mode: bool) -> Self {
        let peer_id = keypair.public().to_peer_id();

        let relay = relay::Behaviour::new(peer_id, relay::Config::default());

        let identify = identify::Behaviour::new(
            identify::Config::new("/waypoint/id/1.0.0".to_string(), keypair.public())
                .with_push_listen_addr_updates(true)
                .with_hide_listen_addrs(single_address_mode)
                .with_interval(Duration::from_secs(60)),
        );

        let ping = ping::Behaviour::new(ping::Config::new());

        Self {
            relay,
            identify,
            ping,
        }
    }
}
