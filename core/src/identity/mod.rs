// Node identity — the durable keypair behind the relay's PeerId

mod keys;
mod store;

pub use keys::{IdentityError, IdentityExport, RelayIdentity};
pub use store::load_or_create;
