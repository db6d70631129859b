//! Endpoint resolution from connection indicators.
//!
//! This module turns the small set of environment-style indicators that
//! express connection intent (endpoint URI, TLS-verification flag, TLS
//! material directory, port override) into a concrete, validated
//! [`EndpointDescriptor`]. Resolution performs no I/O except reading TLS
//! material from disk, and both the operational commands and the
//! diagnostic utility consume the same resolver, so the two can never
//! drift apart.

mod tls;

pub use tls::{CA_FILE, CERT_FILE, KEY_FILE, MATERIAL_FILES, TlsMaterial};

#[cfg(test)]
mod tests_tls;

use camino::Utf8PathBuf;

use crate::error::ResolveError;

/// Environment variable carrying the daemon endpoint URI.
pub const ENDPOINT_VAR: &str = "DOCKER_HOST";

/// Environment variable carrying the TLS-verification flag.
pub const TLS_VERIFY_VAR: &str = "DOCKER_TLS_VERIFY";

/// Environment variable carrying the TLS material directory.
pub const CERT_DIR_VAR: &str = "DOCKER_CERT_PATH";

/// Environment variable carrying the explicit port override.
pub const PORT_VAR: &str = "DOCKER_PORT";

/// Environment variables checked in order for the home directory used in
/// `~` expansion.
const HOME_VARS: &[&str] = &["HOME", "USERPROFILE"];

/// Default daemon port for plaintext TCP connections.
pub const DEFAULT_PLAIN_PORT: u16 = 2375;

/// Default daemon port when TLS is in effect.
pub const DEFAULT_TLS_PORT: u16 = 2376;

/// Default socket path on Unix platforms.
#[cfg(unix)]
const DEFAULT_SOCKET_PATH: &str = "/var/run/docker.sock";

/// Default named pipe on Windows platforms.
#[cfg(windows)]
const DEFAULT_PIPE: &str = "npipe:////./pipe/docker_engine";

const UNIX_SCHEME: &str = "unix://";
const NPIPE_SCHEME: &str = "npipe://";
const TCP_SCHEME: &str = "tcp://";
const HTTP_SCHEME: &str = "http://";
const HTTPS_SCHEME: &str = "https://";

/// Connection indicators captured from the environment or supplied by a
/// caller.
///
/// Absence of every indicator signals "use the local default transport".
/// Empty values are treated as absent, matching the conventions of the
/// daemon's own tooling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointIndicators {
    /// The daemon endpoint URI (`unix://`, `npipe://`, `tcp://`,
    /// `http://`, `https://`, or bare `host[:port]`).
    pub endpoint: Option<String>,

    /// The TLS-verification flag; truthy only for the literal values
    /// `"1"` and `"true"`.
    pub tls_verify: Option<String>,

    /// Directory containing `ca.pem`, `cert.pem`, and `key.pem`; may
    /// begin with `~`.
    pub cert_dir: Option<String>,

    /// Explicit port override, as an integer string.
    pub port: Option<String>,

    /// Home directory used to expand a leading `~` in the certificate
    /// path.
    pub home: Option<String>,
}

impl EndpointIndicators {
    /// Capture indicators from an environment provider.
    ///
    /// Reads `DOCKER_HOST`, `DOCKER_TLS_VERIFY`, `DOCKER_CERT_PATH`, and
    /// `DOCKER_PORT` verbatim, plus `HOME`/`USERPROFILE` for `~`
    /// expansion. Empty values are treated as absent.
    #[must_use]
    pub fn from_env<E: mockable::Env>(env: &E) -> Self {
        let read = |name: &str| env.string(name).filter(|value| !value.is_empty());
        Self {
            endpoint: read(ENDPOINT_VAR),
            tls_verify: read(TLS_VERIFY_VAR),
            cert_dir: read(CERT_DIR_VAR),
            port: read(PORT_VAR),
            home: HOME_VARS
                .iter()
                .filter_map(|name| env.string(name))
                .find(|value| !value.is_empty()),
        }
    }

    /// Whether TLS verification was explicitly requested.
    ///
    /// Only the literal values `"1"` and `"true"` count; `"0"`,
    /// `"false"`, the empty string, and anything else are false.
    #[must_use]
    pub fn tls_verify_requested(&self) -> bool {
        matches!(self.tls_verify.as_deref(), Some("1" | "true"))
    }

    /// Resolve the indicators into a validated endpoint descriptor.
    ///
    /// Resolution order: the verification-without-certificates
    /// precondition is checked before anything else; an absent endpoint
    /// URI yields the platform-local default; otherwise the URI is
    /// classified by scheme and, for TCP endpoints, the port is chosen by
    /// precedence (explicit override, then URL port, then the protocol
    /// default) and TLS material is loaded when TLS is in effect.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::MissingCertPath`] when verification is
    /// requested without a certificate directory,
    /// [`ResolveError::HomeDirectoryUnresolvable`] and
    /// [`ResolveError::CertificateLoadFailed`] for certificate problems
    /// under explicit verification, [`ResolveError::InvalidPort`] for an
    /// unusable port override, and [`ResolveError::EmptyHost`] when the
    /// URI yields no host.
    pub fn resolve(&self) -> Result<ResolvedEndpoint, ResolveError> {
        let verify = self.tls_verify_requested();
        if verify && self.cert_dir.is_none() {
            return Err(ResolveError::MissingCertPath);
        }

        let Some(endpoint) = self.endpoint.as_deref() else {
            return Ok(ResolvedEndpoint::settled(EndpointDescriptor::local_default()));
        };

        if let Some(path) = endpoint.strip_prefix(UNIX_SCHEME) {
            return Ok(ResolvedEndpoint::settled(EndpointDescriptor::LocalSocket {
                path: Utf8PathBuf::from(path),
            }));
        }
        if endpoint.starts_with(NPIPE_SCHEME) {
            return Ok(ResolvedEndpoint::settled(EndpointDescriptor::NamedPipe {
                path: String::from(endpoint),
            }));
        }

        self.resolve_tcp(endpoint, verify)
    }

    /// Resolve a TCP-style endpoint (with or without a recognised scheme).
    fn resolve_tcp(&self, endpoint: &str, verify: bool) -> Result<ResolvedEndpoint, ResolveError> {
        let (rest, implies_tls) = strip_tcp_scheme(endpoint);
        let (host, url_port) = split_host_port(rest);
        if host.is_empty() {
            return Err(ResolveError::EmptyHost {
                endpoint: String::from(endpoint),
            });
        }

        let port = self.resolved_port(url_port, verify || implies_tls)?;

        let mut warnings = Vec::new();
        let descriptor = if verify {
            self.verified_tls_descriptor(host, port)?
        } else if implies_tls {
            self.opportunistic_tls_descriptor(host, port, &mut warnings)
        } else {
            EndpointDescriptor::TcpPlain {
                host: String::from(host),
                port,
            }
        };

        Ok(ResolvedEndpoint {
            descriptor,
            warnings,
        })
    }

    /// Choose the port by precedence: explicit override, URL port, then
    /// the protocol default.
    fn resolved_port(&self, url_port: Option<u16>, tls_in_effect: bool) -> Result<u16, ResolveError> {
        self.port.as_deref().map_or_else(
            || {
                Ok(url_port.unwrap_or(if tls_in_effect {
                    DEFAULT_TLS_PORT
                } else {
                    DEFAULT_PLAIN_PORT
                }))
            },
            parse_port,
        )
    }

    /// Build the TLS descriptor for explicitly requested verification.
    ///
    /// Every failure here is fatal: the operator stated a security
    /// requirement, so nothing may silently degrade.
    fn verified_tls_descriptor(
        &self,
        host: &str,
        port: u16,
    ) -> Result<EndpointDescriptor, ResolveError> {
        // Checked at resolution entry; re-checked so this helper is total.
        let Some(dir) = self.cert_dir.as_deref() else {
            return Err(ResolveError::MissingCertPath);
        };
        let expanded = expand_home(dir, self.home.as_deref()).ok_or_else(|| {
            ResolveError::HomeDirectoryUnresolvable {
                path: String::from(dir),
            }
        })?;
        let tls = TlsMaterial::load(&expanded)
            .map_err(|source| ResolveError::CertificateLoadFailed {
                dir: expanded,
                source,
            })?;
        Ok(EndpointDescriptor::TcpTls {
            host: String::from(host),
            port,
            tls,
        })
    }

    /// Build the descriptor for TLS implied by an `https://` scheme
    /// without explicit verification.
    ///
    /// Certificate problems degrade to a warning and a plaintext
    /// descriptor rather than failing resolution.
    fn opportunistic_tls_descriptor(
        &self,
        host: &str,
        port: u16,
        warnings: &mut Vec<String>,
    ) -> EndpointDescriptor {
        let plain = EndpointDescriptor::TcpPlain {
            host: String::from(host),
            port,
        };
        let Some(dir) = self.cert_dir.as_deref() else {
            return plain;
        };
        let Some(expanded) = expand_home(dir, self.home.as_deref()) else {
            warnings.push(format!(
                "certificate path '{dir}' starts with '~' but no home directory is available; \
                 connecting without client certificates"
            ));
            return plain;
        };
        match TlsMaterial::load(&expanded) {
            Ok(tls) => EndpointDescriptor::TcpTls {
                host: String::from(host),
                port,
                tls,
            },
            Err(error) => {
                warnings.push(format!(
                    "could not load TLS material from '{expanded}': {error}; \
                     connecting without client certificates"
                ));
                plain
            }
        }
    }
}

/// The resolved, validated endpoint configuration.
///
/// A descriptor is immutable once constructed; it is never mutated, only
/// replaced by a fresh resolution.
#[derive(Debug, PartialEq, Eq)]
pub enum EndpointDescriptor {
    /// A local Unix socket.
    LocalSocket {
        /// Filesystem path of the socket.
        path: Utf8PathBuf,
    },

    /// A Windows named pipe.
    NamedPipe {
        /// The full pipe URI, `npipe://` prefix retained.
        path: String,
    },

    /// A plaintext TCP endpoint.
    TcpPlain {
        /// Daemon host name or address; never empty.
        host: String,
        /// Daemon port.
        port: u16,
    },

    /// A mutually authenticated TLS endpoint.
    TcpTls {
        /// Daemon host name or address; never empty.
        host: String,
        /// Daemon port.
        port: u16,
        /// The loaded TLS material; exclusive to this descriptor.
        tls: TlsMaterial,
    },
}

impl EndpointDescriptor {
    /// The platform-local default transport, used when no endpoint URI is
    /// present.
    #[cfg(unix)]
    #[must_use]
    pub fn local_default() -> Self {
        Self::LocalSocket {
            path: Utf8PathBuf::from(DEFAULT_SOCKET_PATH),
        }
    }

    /// The platform-local default transport, used when no endpoint URI is
    /// present.
    #[cfg(windows)]
    #[must_use]
    pub fn local_default() -> Self {
        Self::NamedPipe {
            path: String::from(DEFAULT_PIPE),
        }
    }

    /// The TLS material carried by this descriptor, if any.
    #[must_use]
    pub const fn tls_material(&self) -> Option<&TlsMaterial> {
        match self {
            Self::TcpTls { tls, .. } => Some(tls),
            Self::LocalSocket { .. } | Self::NamedPipe { .. } | Self::TcpPlain { .. } => None,
        }
    }
}

impl std::fmt::Display for EndpointDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LocalSocket { path } => write!(f, "unix socket '{path}'"),
            Self::NamedPipe { path } => write!(f, "named pipe '{path}'"),
            Self::TcpPlain { host, port } => write!(f, "tcp://{host}:{port} (plaintext)"),
            Self::TcpTls { host, port, .. } => write!(f, "https://{host}:{port} (mutual TLS)"),
        }
    }
}

/// Resolution output: the descriptor plus any degraded-mode warnings
/// collected on the way.
#[derive(Debug, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    /// The validated endpoint descriptor.
    pub descriptor: EndpointDescriptor,

    /// Non-fatal notices, e.g. certificate loading skipped under implied
    /// TLS.
    pub warnings: Vec<String>,
}

impl ResolvedEndpoint {
    /// A resolution that produced no warnings.
    const fn settled(descriptor: EndpointDescriptor) -> Self {
        Self {
            descriptor,
            warnings: Vec::new(),
        }
    }
}

/// Strip a recognised TCP-style scheme, reporting whether the scheme
/// implies TLS. Unrecognised input is treated as a bare `host[:port]`.
fn strip_tcp_scheme(endpoint: &str) -> (&str, bool) {
    if let Some(rest) = endpoint.strip_prefix(HTTPS_SCHEME) {
        return (rest, true);
    }
    let rest = endpoint
        .strip_prefix(TCP_SCHEME)
        .or_else(|| endpoint.strip_prefix(HTTP_SCHEME))
        .unwrap_or(endpoint);
    (rest, false)
}

/// Split `host[:port]` on the first colon.
///
/// A port that does not parse as a non-zero `u16` is discarded, falling
/// through to the explicit override or protocol default.
fn split_host_port(rest: &str) -> (&str, Option<u16>) {
    rest.split_once(':').map_or((rest, None), |(host, port)| {
        (host, port.parse::<u16>().ok().filter(|value| *value != 0))
    })
}

/// Parse an explicit port override, rejecting anything outside
/// `[1, 65535]`.
fn parse_port(raw: &str) -> Result<u16, ResolveError> {
    raw.parse::<u16>()
        .ok()
        .filter(|value| *value != 0)
        .ok_or_else(|| ResolveError::InvalidPort {
            value: String::from(raw),
        })
}

/// Expand a leading `~` to the home directory.
///
/// Only the `~` itself is rewritten; the remainder of the path is
/// concatenated as-is. Returns `None` when expansion is needed but no
/// home directory is available.
fn expand_home(path: &str, home: Option<&str>) -> Option<Utf8PathBuf> {
    path.strip_prefix('~').map_or_else(
        || Some(Utf8PathBuf::from(path)),
        |rest| home.map(|home_dir| Utf8PathBuf::from(format!("{home_dir}{rest}"))),
    )
}
