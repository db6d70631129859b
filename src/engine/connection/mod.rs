//! Container engine connection from a resolved endpoint descriptor.

use bollard::Docker;

use crate::endpoint::EndpointDescriptor;
use crate::error::{DaemonError, DockhandError};

/// Connection timeout in seconds for daemon API calls.
///
/// Every call through the constructed client inherits this timeout; the
/// crate imposes no additional per-call deadline of its own.
const CONNECTION_TIMEOUT_SECS: u64 = 120;

/// Constructs daemon clients from resolved endpoint descriptors.
pub struct EngineConnector;

impl EngineConnector {
    /// Construct a client for the given descriptor.
    ///
    /// Client construction validates the endpoint configuration but does
    /// not contact the daemon; transport failures surface on the first
    /// call made through the client.
    ///
    /// # Errors
    ///
    /// Returns `DaemonError::ConnectionFailed` if a client cannot be
    /// configured for the endpoint (for example, unreadable TLS material
    /// files).
    pub fn connect(descriptor: &EndpointDescriptor) -> Result<Docker, DockhandError> {
        let connected = match descriptor {
            EndpointDescriptor::LocalSocket { path } => Docker::connect_with_socket(
                &format!("unix://{path}"),
                CONNECTION_TIMEOUT_SECS,
                bollard::API_DEFAULT_VERSION,
            ),
            EndpointDescriptor::NamedPipe { path } => Docker::connect_with_socket(
                path,
                CONNECTION_TIMEOUT_SECS,
                bollard::API_DEFAULT_VERSION,
            ),
            EndpointDescriptor::TcpPlain { host, port } => Docker::connect_with_http(
                &format!("http://{host}:{port}"),
                CONNECTION_TIMEOUT_SECS,
                bollard::API_DEFAULT_VERSION,
            ),
            EndpointDescriptor::TcpTls { host, port, tls } => Docker::connect_with_ssl(
                &format!("https://{host}:{port}"),
                tls.key_path().as_std_path(),
                tls.certificate_path().as_std_path(),
                tls.authority_path().as_std_path(),
                CONNECTION_TIMEOUT_SECS,
                bollard::API_DEFAULT_VERSION,
            ),
        };

        connected.map_err(|error| {
            DockhandError::from(DaemonError::ConnectionFailed {
                message: error.to_string(),
            })
        })
    }
}
