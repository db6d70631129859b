//! Semantic error types for the dockhand application.
//!
//! This module defines the error hierarchy for dockhand, following the
//! principle of using semantic error enums (via `thiserror`) for conditions
//! the caller might inspect or map to actionable guidance, while reserving
//! opaque errors (`eyre::Report`) for the application boundary.
//!
//! Diagnostic-stage failures are deliberately absent from this hierarchy:
//! a failed probe is data in a [`crate::diagnostics::DiagnosticReport`],
//! not an error.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur while resolving connection indicators into an
/// endpoint descriptor.
///
/// All variants are fail-fast: resolution aborts before any daemon contact
/// is attempted.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// TLS verification was requested without a certificate directory.
    ///
    /// Surfaced before any other parsing or I/O, because a half-configured
    /// verification intent must not fall back to an unverified connection.
    #[error(
        "TLS verification is enabled but no certificate directory is configured; \
         set the certificate directory to the location of ca.pem, cert.pem, and key.pem"
    )]
    MissingCertPath,

    /// The certificate directory could not be read under explicit TLS
    /// verification.
    #[error("failed to load TLS material from '{dir}': {source}")]
    CertificateLoadFailed {
        /// The expanded certificate directory.
        dir: Utf8PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A `~`-prefixed certificate path could not be expanded because no
    /// home directory is available.
    #[error("certificate path '{path}' starts with '~' but no home directory is available")]
    HomeDirectoryUnresolvable {
        /// The unexpanded certificate path.
        path: String,
    },

    /// The explicit port override is not a valid port number.
    #[error("invalid port override '{value}': expected an integer between 1 and 65535")]
    InvalidPort {
        /// The rejected override value.
        value: String,
    },

    /// The endpoint URI yielded an empty host.
    #[error("endpoint '{endpoint}' has an empty host")]
    EmptyHost {
        /// The offending endpoint URI.
        endpoint: String,
    },
}

/// Errors that can occur while talking to the container-engine daemon.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Failed to construct a client for the resolved endpoint.
    #[error("failed to connect to container engine: {message}")]
    ConnectionFailed {
        /// A description of the connection failure.
        message: String,
    },

    /// A passthrough operation was rejected by the daemon.
    #[error("{operation} failed: {message}")]
    OperationFailed {
        /// The operation that failed (e.g. `list containers`).
        operation: String,
        /// A description of the failure.
        message: String,
    },

    /// A container-create request was built without an image.
    #[error("an image reference is required to create a container")]
    MissingImage,

    /// A port publication could not be parsed.
    #[error("invalid port mapping '{spec}': expected HOST:CONTAINER[/PROTOCOL]")]
    InvalidPortMapping {
        /// The rejected publication spec.
        spec: String,
    },

    /// A label could not be parsed.
    #[error("invalid label '{value}': expected KEY=VALUE")]
    InvalidLabel {
        /// The rejected label value.
        value: String,
    },
}

/// Top-level error type for the dockhand application.
///
/// Aggregates the domain-specific errors into a single type. At the
/// application boundary (main.rs) these are converted to `eyre::Report`
/// for human-readable error reporting.
#[derive(Debug, Error)]
pub enum DockhandError {
    /// An error occurred during endpoint resolution.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// An error occurred while talking to the daemon.
    #[error(transparent)]
    Daemon(#[from] DaemonError),
}

/// A specialised `Result` type for dockhand operations.
pub type Result<T> = std::result::Result<T, DockhandError>;
