//! TLS for the form transport.
//!
//! [`HttpTransport`](super::HttpTransport) hands a connected `TcpStream` to
//! a [`TlsConnector`] for `https` actions, so the transport never depends
//! on a concrete TLS library. The rustls connector is behind the
//! `tls-rustls` feature (on by default).

use std::io::{Read, Write};
use std::net::TcpStream;

use vitrine_types::error::Result;

/// A byte stream the transport can write a request to and read a response
/// from: a plain socket or a TLS session over one.
pub trait Connection: Read + Write {}

impl<T: Read + Write> Connection for T {}

/// Wraps a connected socket in a TLS client session.
pub trait TlsConnector {
    /// `server_name` is used for SNI and certificate verification.
    fn connect(&self, stream: TcpStream, server_name: &str) -> Result<Box<dyn Connection>>;
}

#[cfg(feature = "tls-rustls")]
pub use rustls_connector::RustlsConnector;

#[cfg(feature = "tls-rustls")]
mod rustls_connector {
    use std::net::TcpStream;
    use std::sync::Arc;

    use rustls::ClientConfig;
    use rustls_pki_types::ServerName;
    use vitrine_types::error::{Result, VitrineError};

    use super::{Connection, TlsConnector};

    /// rustls + ring client trusting Mozilla's root CA bundle.
    pub struct RustlsConnector {
        config: Arc<ClientConfig>,
    }

    impl RustlsConnector {
        pub fn new() -> Result<Self> {
            let roots =
                rustls::RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
            let provider = Arc::new(rustls::crypto::ring::default_provider());
            let config = ClientConfig::builder_with_provider(provider)
                .with_safe_default_protocol_versions()
                .map_err(|e| VitrineError::Transport(format!("TLS config: {e}")))?
                .with_root_certificates(roots)
                .with_no_client_auth();
            Ok(Self {
                config: Arc::new(config),
            })
        }
    }

    impl TlsConnector for RustlsConnector {
        fn connect(&self, stream: TcpStream, server_name: &str) -> Result<Box<dyn Connection>> {
            let sni = ServerName::try_from(server_name.to_owned())
                .map_err(|e| VitrineError::Transport(format!("invalid server name: {e}")))?;
            let conn = rustls::ClientConnection::new(Arc::clone(&self.config), sni)
                .map_err(|e| VitrineError::Transport(format!("TLS init: {e}")))?;
            // The handshake runs on first write.
            Ok(Box::new(rustls::StreamOwned::new(conn, stream)))
        }
    }
}
