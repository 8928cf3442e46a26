pub mod credentials;
pub mod errors;
pub mod transport;

pub use credentials::CredentialStrategy;
pub use errors::{ConnectionError, ErrorKind, ProxyError, SigningError, TransportError};
pub use transport::{HttpTransport, Transport, TransportResponse};
