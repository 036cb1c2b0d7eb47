// Environment-driven configuration
//
// The relay runs behind a Render-style edge that injects configuration as
// environment variables, so that is the only configuration source. Empty
// values are treated as unset.

use std::path::PathBuf;

/// Port the status HTTP server binds. Render-style platforms inject this.
pub const STATUS_PORT_ENV: &str = "PORT";
/// Internal websocket listen port. Must differ from the fronted port.
pub const LISTEN_PORT_ENV: &str = "WAYPOINT_WS_PORT";
/// Platform-provided public hostname (set automatically on Render).
pub const PLATFORM_HOSTNAME_ENV: &str = "RENDER_EXTERNAL_HOSTNAME";
/// Explicit public hostname, for local testing or non-platform deploys.
pub const PUBLIC_HOSTNAME_ENV: &str = "WAYPOINT_PUBLIC_HOST";
/// Base64-encoded private key. Keeps the PeerId stable across redeploys.
pub const PRIVATE_KEY_ENV: &str = "WAYPOINT_PRIVATE_KEY_B64";
/// Override for the private-key file path.
pub const KEY_FILE_ENV: &str = "WAYPOINT_KEY_FILE";

pub const DEFAULT_STATUS_PORT: u16 = 4000;
pub const DEFAULT_LISTEN_PORT: u16 = 10001;
pub const DEFAULT_KEY_FILE: &str = "private_key";

/// Resolved runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Port for the status/health HTTP server.
    pub status_port: u16,
    /// Internal plain-websocket listen port for peer connections.
    pub listen_port: u16,
    /// Public DNS name peers dial through the edge, if any.
    pub public_hostname: Option<String>,
    /// Injected base64 private key, if any.
    pub private_key_b64: Option<String>,
    /// Where a freshly generated key is persisted.
    pub key_file: PathBuf,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            status_port: DEFAULT_STATUS_PORT,
            listen_port: DEFAULT_LISTEN_PORT,
            public_hostname: None,
            private_key_b64: None,
            key_file: PathBuf::from(DEFAULT_KEY_FILE),
        }
    }
}

impl RelayConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an injectable lookup function.
    ///
    /// Tests pass a closure over a map instead of mutating the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        // The platform sets its hostname automatically; the explicit
        // variable is the fallback for local testing and other hosts.
        let public_hostname = get(PLATFORM_HOSTNAME_ENV).or_else(|| get(PUBLIC_HOSTNAME_ENV));

        Self {
            status_port: parse_port(STATUS_PORT_ENV, get(STATUS_PORT_ENV), DEFAULT_STATUS_PORT),
            listen_port: parse_port(LISTEN_PORT_ENV, get(LISTEN_PORT_ENV), DEFAULT_LISTEN_PORT),
            public_hostname,
            private_key_b64: get(PRIVATE_KEY_ENV),
            key_file: get(KEY_FILE_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_KEY_FILE)),
        }
    }
}

fn parse_port(key: &str, value: Option<String>, default: u16) -> u16 {
    match value {
        None => default,
        Some(raw) => match raw.parse() {
            Ok(port) => port,
            Err(_) => {
                tracing::warn!("{} is not a valid port ({:?}), using {}", key, raw, default);
                default
            }
        },
    }
}
