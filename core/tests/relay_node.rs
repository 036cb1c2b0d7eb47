// End-to-end relay node tests: bind, advertise, accept a connection

use futures::StreamExt;
use libp2p::swarm::SwarmEvent;
use libp2p::Multiaddr;
use std::time::Duration;
use waypoint_core::{
    resolve_public_address, start_relay_node, RelayHandle, RelayIdentity, StatusSnapshot,
};

async fn wait_for_listen_addrs(handle: &RelayHandle) -> Vec<Multiaddr> {
    for _ in 0..50 {
        let addrs = handle.listen_addrs().await.unwrap();
        if !addrs.is_empty() {
            return addrs;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    panic!("relay never reported a listen address");
}

#[tokio::test]
async fn test_relay_binds_websocket_listener() {
    let identity = RelayIdentity::generate();
    let handle = start_relay_node(&identity, 0, None).await.unwrap();

    assert_eq!(handle.peer_id(), identity.peer_id());

    let addrs = wait_for_listen_addrs(&handle).await;
    for addr in &addrs {
        assert!(
            addr.to_string().ends_with("/ws"),
            "expected a websocket listener, got {}",
            addr
        );
    }

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_client_can_dial_relay() {
    let identity = RelayIdentity::generate();
    let handle = start_relay_node(&identity, 0, None).await.unwrap();

    let addrs = wait_for_listen_addrs(&handle).await;
    let local = addrs
        .iter()
        .find(|a| a.to_string().contains("127.0.0.1"))
        .expect("no loopback listen address")
        .clone();

    let mut client = libp2p::SwarmBuilder::with_new_identity()
        .with_tokio()
        .with_tcp(
            libp2p::tcp::Config::default(),
            libp2p::noise::Config::new,
            libp2p::yamux::Config::default,
        )
        .unwrap()
        .with_websocket(libp2p::noise::Config::new, libp2p::yamux::Config::default)
        .await
        .unwrap()
        .with_behaviour(|_| libp2p::ping::Behaviour::new(libp2p::ping::Config::new()))
        .unwrap()
        .build();

    client.dial(local).unwrap();

    let connected = tokio::time::timeout(Duration::from_secs(20), async {
        loop {
            match client.select_next_some().await {
                SwarmEvent::ConnectionEstablished { peer_id, .. } => break peer_id,
                SwarmEvent::OutgoingConnectionError { error, .. } => {
                    panic!("dial failed: {}", error);
                }
                _ => {}
            }
        }
    })
    .await
    .expect("timed out dialing the relay");

    assert_eq!(connected, identity.peer_id());

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_advertised_address_matches_status_surface() {
    // Scenario A composition: hostname + identity produce the exact dial
    // string the status surface reports, regardless of the internal port.
    let identity = RelayIdentity::generate();
    let public = resolve_public_address(Some("relay.example.com"));

    let handle = start_relay_node(&identity, 0, public.clone()).await.unwrap();
    let snapshot = StatusSnapshot::new(handle.peer_id(), public);

    assert_eq!(
        snapshot.dial_address(),
        format!("/dns4/relay.example.com/tcp/443/wss/p2p/{}", identity.peer_id())
    );

    handle.shutdown().await.unwrap();
}
