// Waypoint Core — rendezvous relay node
//
// A peer behind a NAT needs one stable, dialable address. Everything in
// this crate exists to keep that address, and the identity behind it,
// stable across restarts and redeploys.

pub mod address;
pub mod config;
pub mod identity;
pub mod status;
pub mod transport;

pub use address::{resolve_public_address, PUBLIC_TLS_PORT};
pub use config::RelayConfig;
pub use identity::{load_or_create, IdentityError, IdentityExport, RelayIdentity};
pub use status::{StatusSnapshot, NO_PUBLIC_HOSTNAME};
pub use transport::{start_relay_node, RelayCommand, RelayHandle};

// Re-export libp2p types we expose
pub use libp2p::{Multiaddr, PeerId};
