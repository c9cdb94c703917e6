//! rustls-backed HTTPS support for the `download` command.
//!
//! Compiled only with the `tls` feature. Certificate validation uses
//! the bundled webpki root store; client certificates are not used.

use std::net::TcpStream;
use std::sync::{Arc, OnceLock};

use rustls::{ClientConfig, ClientConnection, RootCertStore, StreamOwned};
use rustls_pki_types::ServerName;
use squall_types::error::{Result, SquallError};

/// Process-wide client configuration, built once on first use.
fn client_config() -> Arc<ClientConfig> {
    static CONFIG: OnceLock<Arc<ClientConfig>> = OnceLock::new();
    Arc::clone(CONFIG.get_or_init(|| {
        let roots = RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        Arc::new(
            ClientConfig::builder()
                .with_root_certificates(roots)
                .with_no_client_auth(),
        )
    }))
}

/// Upgrade an established TCP connection to TLS for `host`.
///
/// The handshake itself happens lazily on first read or write.
pub fn connect(stream: TcpStream, host: &str) -> Result<StreamOwned<ClientConnection, TcpStream>> {
    let server_name = ServerName::try_from(host.to_string())
        .map_err(|_| SquallError::Net(format!("invalid server name: {host}")))?;
    let conn = ClientConnection::new(client_config(), server_name)
        .map_err(|e| SquallError::Net(format!("TLS setup failed: {e}")))?;
    Ok(StreamOwned::new(conn, stream))
}
