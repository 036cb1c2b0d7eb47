// libp2p swarm setup — the running relay node
//
// Builds the swarm with the node identity, binds the internal plain
// websocket listener (the edge terminates TLS), registers the canonical
// public address as the swarm's external address, and runs the event loop
// as a background task behind a small command channel.

use super::behaviour::{RelayBehaviour, RelayBehaviourEvent};
use crate::identity::RelayIdentity;
use anyhow::Result;
use futures::StreamExt;
use libp2p::swarm::SwarmEvent;
use libp2p::{identify, relay, Multiaddr, PeerId};
use std::time::Duration;
use tokio::sync::mpsc;

/// Commands that can be sent to the swarm task
#[derive(Debug)]
pub enum RelayCommand {
    /// Get the addresses the swarm is currently listening on
    GetListenAddrs { reply: mpsc::Sender<Vec<Multiaddr>> },
    /// Shut down the swarm, closing listeners and dropping reservations
    Shutdown,
}

/// Handle to communicate with the running swarm task
#[derive(Clone)]
pub struct RelayHandle {
    peer_id: PeerId,
    command_tx: mpsc::Sender<RelayCommand>,
}

impl RelayHandle {
    /// The node identifier, derived from the identity keypair.
    pub fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    /// Get the currently bound listen addresses
    pub async fn listen_addrs(&self) -> Result<Vec<Multiaddr>> {
        let (reply_tx, mut reply_rx) = mpsc::channel(1);
        self.command_tx
            .send(RelayCommand::GetListenAddrs { reply: reply_tx })
            .await
            .map_err(|_| anyhow::anyhow!("Relay task not running"))?;

        reply_rx
            .recv()
            .await
            .ok_or_else(|| anyhow::anyhow!("No reply from relay task"))
    }

    /// Shut down the relay node
    pub async fn shutdown(&self) -> Result<()> {
        self.command_tx
            .send(RelayCommand::Shutdown)
            .await
            .map_err(|_| anyhow::anyhow!("Relay task not running"))
    }
}

/// Build and start the relay node, returning a handle for communication.
///
/// Fatal by design: a relay with no listening transport or no relay
/// capability provides no value, so any construction failure propagates
/// instead of degrading.
pub async fn start_relay_node(
    identity: &RelayIdentity,
    listen_port: u16,
    public_address: Option<Multiaddr>,
) -> Result<RelayHandle> {
    let single_address_mode = public_address.is_some();

    let mut swarm = libp2p::SwarmBuilder::with_existing_identity(identity.keypair().clone())
        .with_tokio()
        .with_tcp(
            libp2p::tcp::Config::default(),
            libp2p::noise::Config::new,
            libp2p::yamux::Config::default,
        )?
        .with_websocket(libp2p::noise::Config::new, libp2p::yamux::Config::default)
        .await?
        .with_behaviour(|key| RelayBehaviour::new(key, single_address_mode))?
        .with_swarm_config(|cfg| {
            cfg.with_idle_connection_timeout(Duration::from_secs(300))
        })
        .build();

    // Plain websocket inside; wss is the edge's job
    let listen: Multiaddr = format!("/ip4/0.0.0.0/tcp/{}/ws", listen_port).parse()?;
    swarm.listen_on(listen)?;

    if let Some(addr) = public_address {
        // Treat the canonical address as confirmed reachable. The swarm's
        // own reachability heuristics cannot verify an edge-fronted
        // address, and would otherwise refuse to advertise it.
        swarm.add_external_address(addr);
    }

    let peer_id = identity.peer_id();
    let (command_tx, mut command_rx) = mpsc::channel::<RelayCommand>(32);
    let handle = RelayHandle {
        peer_id,
        command_tx,
    };

    // Spawn the swarm event loop
    tokio::spawn(async move {
        let mut listen_addrs: Vec<Multiaddr> = Vec::new();

        loop {
            tokio::select! {
                event = swarm.select_next_some() => {
                    match event {
                        SwarmEvent::NewListenAddr { address, .. } => {
                            tracing::info!("Listening on {}", address);
                            listen_addrs.push(address);
                        }

                        SwarmEvent::ExpiredListenAddr { address, .. } => {
                            tracing::warn!("Listen address expired: {}", address);
                            listen_addrs.retain(|a| a != &address);
                        }

                        SwarmEvent::ExternalAddrConfirmed { address } => {
                            tracing::info!("Advertising public address {}", address);
                        }

                        SwarmEvent::ConnectionEstablished { peer_id, endpoint, .. } => {
                            tracing::debug!(
                                "Connected to {} via {}",
                                peer_id,
                                endpoint.get_remote_address()
                            );
                        }

                        SwarmEvent::ConnectionClosed { peer_id, .. } => {
                            tracing::debug!("Disconnected from {}", peer_id);
                        }

                        SwarmEvent::Behaviour(RelayBehaviourEvent::Relay(event)) => {
                            handle_relay_event(event);
                        }

                        SwarmEvent::Behaviour(RelayBehaviourEvent::Identify(
                            identify::Event::Received { peer_id, info, .. }
                        )) => {
                            tracing::debug!(
                                "Identified {} ({})",
                                peer_id,
                                info.protocol_version
                            );
                        }

                        _ => {}
                    }
                }

                Some(command) = command_rx.recv() => {
                    match command {
                        RelayCommand::GetListenAddrs { reply } => {
                            let _ = reply.send(listen_addrs.clone()).await;
                        }

                        RelayCommand::Shutdown => {
                            tracing::info!("Relay shutting down");
                            break;
                        }
                    }
                }
            }
        }
        // Dropping the swarm closes listeners and active circuits
    });

    Ok(handle)
}

fn handle_relay_event(event: relay::Event) {
    match event {
        relay::Event::ReservationReqAccepted { src_peer_id, renewed } => {
            if renewed {
                tracing::debug!("Relay reservation renewed for {}", src_peer_id);
            } else {
                tracing::info!("Relay reservation accepted for {}", src_peer_id);
            }
        }
        relay::Event::ReservationReqDenied { src_peer_id } => {
            tracing::debug!("Relay reservation denied for {}", src_peer_id);
        }
        relay::Event::ReservationTimedOut { src_peer_id } => {
            tracing::debug!("Relay reservation timed out for {}", src_peer_id);
        }
        relay::Event::CircuitReqAccepted { src_peer_id, dst_peer_id } => {
            tracing::info!("Relaying circuit {} -> {}", src_peer_id, dst_peer_id);
        }
        relay::Event::CircuitReqDenied { src_peer_id, dst_peer_id } => {
            tracing::debug!("Circuit denied {} -> {}", src_peer_id, dst_peer_id);
        }
        relay::Event::CircuitClosed { src_peer_id, dst_peer_id, error } => {
            match error {
                Some(e) => tracing::debug!(
                    "Circuit {} -> {} closed with error: {}",
                    src_peer_id,
                    dst_peer_id,
                    e
                ),
                None => tracing::debug!("Circuit {} -> {} closed", src_peer_id, dst_peer_id),
            }
        }
        _ => {}
    }
}
