// Cryptographic key management
//
// The keypair is an Ed25519 libp2p keypair; the PeerId peers use to
// address and verify this node is derived from its public half. Serialized
// form is the libp2p protobuf private-key encoding, base64 (standard
// alphabet) when it travels through an environment variable.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use libp2p::identity::Keypair;
use libp2p::PeerId;
use thiserror::Error;
use zeroize::Zeroizing;

/// Errors from identity encoding and decoding.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("invalid base64 key material: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("malformed private key: {0}")]
    Malformed(#[source] libp2p::identity::DecodingError),
    #[error("could not serialize private key: {0}")]
    Serialize(#[source] libp2p::identity::DecodingError),
}

/// The node's keypair. Exactly one exists per running process and it never
/// changes during the process lifetime.
#[derive(Clone, Debug)]
pub struct RelayIdentity {
    keypair: Keypair,
}

impl RelayIdentity {
    /// Generate a fresh Ed25519 keypair.
    pub fn generate() -> Self {
        Self {
            keypair: Keypair::generate_ed25519(),
        }
    }

    /// The identifier peers dial this node by.
    pub fn peer_id(&self) -> PeerId {
        self.keypair.public().to_peer_id()
    }

    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }

    /// Serialize the private key.
    /// Returns a `Zeroizing<Vec<u8>>` that wipes the secret material on drop.
    pub fn to_bytes(&self) -> Result<Zeroizing<Vec<u8>>, IdentityError> {
        self.keypair
            .to_protobuf_encoding()
            .map(Zeroizing::new)
            .map_err(IdentityError::Serialize)
    }

    /// Deserialize a private key from its protobuf encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, IdentityError> {
        let keypair = Keypair::from_protobuf_encoding(bytes).map_err(IdentityError::Malformed)?;
        Ok(Self { keypair })
    }

    /// Encode the private key as base64, suitable for an environment variable.
    pub fn to_base64(&self) -> Result<Zeroizing<String>, IdentityError> {
        let bytes = self.to_bytes()?;
        Ok(Zeroizing::new(BASE64.encode(&*bytes)))
    }

    /// Decode a private key from its base64 encoding.
    pub fn from_base64(encoded: &str) -> Result<Self, IdentityError> {
        let bytes = Zeroizing::new(BASE64.decode(encoded.trim())?);
        Self::from_bytes(&bytes)
    }

    /// Backup blob for `waypoint identity export`.
    pub fn export(&self) -> Result<IdentityExport, IdentityError> {
        Ok(IdentityExport {
            peer_id: self.peer_id().to_string(),
            private_key_b64: self.to_base64()?.to_string(),
        })
    }
}

/// Identity backup payload. Contains the private key — handle with care.
#[derive(serde::Serialize)]
pub struct IdentityExport {
    pub peer_id: String,
    pub private_key_b64: String,
}
