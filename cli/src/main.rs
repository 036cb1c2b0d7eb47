// waypoint — public rendezvous relay node
//
// Deployed behind a TLS-terminating edge: peers dial
// /dns4/<host>/tcp/443/wss, the edge forwards to the internal plain
// websocket port, and this process relays circuits between them.

mod status;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use waypoint_core::{identity, resolve_public_address, RelayConfig, StatusSnapshot};

#[derive(Parser)]
#[command(name = "waypoint")]
#[command(about = "Waypoint — public rendezvous relay for NAT'd peers", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the relay node (default when no command is given)
    Start {
        /// Internal websocket listen port
        #[arg(long)]
        listen_port: Option<u16>,
        /// Status HTTP port
        #[arg(long)]
        status_port: Option<u16>,
        /// Public hostname to advertise
        #[arg(long)]
        public_host: Option<String>,
    },
    /// Show or export identity information
    Identity {
        #[command(subcommand)]
        action: Option<IdentityAction>,
    },
}

#[derive(Subcommand)]
enum IdentityAction {
    Show,
    Export,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        // The bare binary is the deploy entry point
        None => cmd_start(None, None, None).await,
        Some(Commands::Start {
            listen_port,
            status_port,
            public_host,
        }) => cmd_start(listen_port, status_port, public_host).await,
        Some(Commands::Identity { action }) => cmd_identity(action).await,
    }
}

async fn cmd_start(
    listen_port: Option<u16>,
    status_port: Option<u16>,
    public_host: Option<String>,
) -> Result<()> {
    let mut config = RelayConfig::from_env();
    if let Some(port) = listen_port {
        config.listen_port = port;
    }
    if let Some(port) = status_port {
        config.status_port = port;
    }
    if let Some(host) = public_host {
        config.public_hostname = Some(host);
    }

    if config.status_port == config.listen_port {
        tracing::warn!(
            "Status port and websocket port are both {}; one of the binds will fail",
            config.status_port
        );
    }

    let identity =
        identity::load_or_create(&config).context("Failed to load or create identity")?;

    let public_address = resolve_public_address(config.public_hostname.as_deref());
    if public_address.is_none() {
        tracing::warn!(
            "No public hostname configured; advertising discovered listen addresses only"
        );
    }

    let handle = waypoint_core::start_relay_node(&identity, config.listen_port, public_address.clone())
        .await
        .context("Failed to start relay node")?;

    let snapshot = StatusSnapshot::new(handle.peer_id(), public_address.clone());

    println!("{}", "Waypoint relay — started".bold());
    println!("{} Peer ID: {}", "✓".green(), snapshot.peer_id().bright_cyan());
    if public_address.is_some() {
        println!(
            "{} Public relay address: {}",
            "✓".green(),
            snapshot.dial_address().bright_green()
        );
    }

    tokio::spawn(status::serve(config.status_port, snapshot));

    // Run until told otherwise; nothing in the process bounds its lifetime
    shutdown_signal().await?;
    tracing::info!("Shutdown signal received");
    handle.shutdown().await?;

    Ok(())
}

async fn cmd_identity(action: Option<IdentityAction>) -> Result<()> {
    let config = RelayConfig::from_env();
    let identity =
        identity::load_or_create(&config).context("Failed to load or create identity")?;

    match action {
        None | Some(IdentityAction::Show) => {
            println!("{}", "Identity Information".bold());
            println!("  Peer ID: {}", identity.peer_id().to_string().bright_cyan());
        }
        Some(IdentityAction::Export) => {
            let export = identity.export()?;
            println!("{}", "⚠️  Contains the private key — keep it secure!".bright_red().bold());
            println!("{}", serde_json::to_string_pretty(&export)?);
        }
    }

    Ok(())
}

async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    Ok(())
}
