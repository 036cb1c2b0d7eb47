// Transport module — libp2p swarm and the relay-hop service

pub mod behaviour;
pub mod swarm;

pub use behaviour::RelayBehaviour;
pub use swarm::{start_relay_node, RelayCommand, RelayHandle};
