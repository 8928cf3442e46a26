mod cipher;
pub mod errors;
pub mod profile;
pub mod store;
pub mod vault;

pub use errors::StoreError;
pub use profile::{filter_by_auth, AuthConfig, AuthKind, ConnectionProfile};
pub use store::ProfileStore;
pub use vault::{KeyringVault, SecretVault};
