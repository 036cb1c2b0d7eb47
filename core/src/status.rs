// Status snapshot — read-only identity/address view
//
// Both inputs are immutable after startup, so a snapshot taken at startup
// is always current; queries render fresh strings from it and can never go
// stale or race.

use libp2p::multiaddr::Protocol;
use libp2p::{Multiaddr, PeerId};

/// Body returned by the address query when no public hostname is configured.
pub const NO_PUBLIC_HOSTNAME: &str = "no-public-hostname-set";

#[derive(Debug, Clone)]
pub struct StatusSnapshot {
    peer_id: PeerId,
    public_address: Option<Multiaddr>,
}

impl StatusSnapshot {
    pub fn new(peer_id: PeerId, public_address: Option<Multiaddr>) -> Self {
        Self {
            peer_id,
            public_address,
        }
    }

    /// The node identifier, base58.
    pub fn peer_id(&self) -> String {
        self.peer_id.to_string()
    }

    /// The fully qualified address clients dial, `<addr>/p2p/<peer id>`,
    /// or the explicit marker when no public hostname was configured.
    pub fn dial_address(&self) -> String {
        match &self.public_address {
            Some(addr) => addr.clone().with(Protocol::P2p(self.peer_id)).to_string(),
            None => NO_PUBLIC_HOSTNAME.to_string(),
        }
    }
}
