// Identity loading — injected key first, key file second, fresh generation last
//
// Redeploys lose local disk, so the primary durability mechanism is the
// injected environment key; the key file only covers the fresh-generation
// path between restarts on the same disk.

use super::keys::{IdentityError, RelayIdentity};
use crate::config::{RelayConfig, PRIVATE_KEY_ENV};
use std::io;
use std::path::Path;

/// Load the node identity, or create and persist one.
///
/// Resolution order:
/// 1. `WAYPOINT_PRIVATE_KEY_B64` — malformed material is fatal; falling back
///    would silently mint a different PeerId than the operator intended.
/// 2. The key file — a corrupt or unreadable file is treated as absent.
/// 3. Fresh generation. Persistence is best-effort and the encoded key is
///    logged so the operator can capture it into configuration.
pub fn load_or_create(config: &RelayConfig) -> Result<RelayIdentity, IdentityError> {
    if let Some(encoded) = config.private_key_b64.as_deref() {
        let identity = RelayIdentity::from_base64(encoded)?;
        tracing::info!("Loaded private key from {}", PRIVATE_KEY_ENV);
        return Ok(identity);
    }

    match std::fs::read(&config.key_file) {
        Ok(bytes) => match RelayIdentity::from_bytes(&bytes) {
            Ok(identity) => {
                tracing::info!(path = %config.key_file.display(), "Loaded existing private key file");
                return Ok(identity);
            }
            Err(e) => {
                tracing::warn!(
                    path = %config.key_file.display(),
                    "Private key file is corrupt, generating a new identity: {}",
                    e
                );
            }
        },
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(
                path = %config.key_file.display(),
                "Could not read private key file, generating a new identity: {}",
                e
            );
        }
    }

    let identity = RelayIdentity::generate();
    tracing::info!("Generated new identity: {}", identity.peer_id());

    match identity.to_bytes() {
        Ok(bytes) => {
            if let Err(e) = write_key_file(&config.key_file, &bytes) {
                tracing::warn!(
                    path = %config.key_file.display(),
                    "Failed to persist private key (identity remains valid for this run): {}",
                    e
                );
            }
        }
        Err(e) => tracing::warn!("Failed to serialize private key for persistence: {}", e),
    }

    if let Ok(encoded) = identity.to_base64() {
        tracing::info!(
            "Set {}={} to keep this PeerId across redeploys",
            PRIVATE_KEY_ENV,
            &*encoded
        );
    }

    Ok(identity)
}

fn write_key_file(path: &Path, bytes: &[u8]) -> io::Result<()> {
    std::fs::write(path, bytes)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config_with_key_file(path: &Path) -> RelayConfig {
        RelayConfig {
            key_file: path.to_path_buf(),
            ..RelayConfig::default()
        }
    }

    #[test]
    fn test_injected_key_wins_over_file() {
        let dir = tempdir().unwrap();
        let key_file = dir.path().join("private_key");

        let on_disk = RelayIdentity::generate();
        std::fs::write(&key_file, &*on_disk.to_bytes().unwrap()).unwrap();

        let injected = RelayIdentity::generate();
        let config = RelayConfig {
            private_key_b64: Some(injected.to_base64().unwrap().to_string()),
            ..config_with_key_file(&key_file)
        };

        let loaded = load_or_create(&config).unwrap();
        assert_eq!(loaded.peer_id(), injected.peer_id());
    }

    #[test]
    fn test_malformed_injected_key_is_fatal() {
        let dir = tempdir().unwrap();
        let config = RelayConfig {
            private_key_b64: Some("%%% not base64 %%%".to_string()),
            ..config_with_key_file(&dir.path().join("private_key"))
        };

        let err = load_or_create(&config).unwrap_err();
        assert!(matches!(err, IdentityError::Base64(_)));
    }

    #[test]
    fn test_fresh_generation_persists_key_file() {
        let dir = tempdir().unwrap();
        let key_file = dir.path().join("private_key");
        let config = config_with_key_file(&key_file);

        let first = load_or_create(&config).unwrap();
        assert!(key_file.exists());

        // Second load picks up the persisted key
        let second = load_or_create(&config).unwrap();
        assert_eq!(first.peer_id(), second.peer_id());
    }

    #[test]
    fn test_corrupt_key_file_regenerated() {
        let dir = tempdir().unwrap();
        let key_file = dir.path().join("private_key");
        std::fs::write(&key_file, b"garbage").unwrap();

        let config = config_with_key_file(&key_file);
        let identity = load_or_create(&config).unwrap();

        // The regenerated key replaced the corrupt file
        let on_disk = std::fs::read(&key_file).unwrap();
        let restored = RelayIdentity::from_bytes(&on_disk).unwrap();
        assert_eq!(identity.peer_id(), restored.peer_id());
    }

    #[test]
    fn test_unwritable_key_file_is_not_fatal() {
        let config = config_with_key_file(Path::new("/nonexistent-dir/private_key"));
        let identity = load_or_create(&config).unwrap();
        assert_eq!(identity.peer_id().to_string().len(), 52);
    }
}
