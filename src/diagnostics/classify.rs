//! Probe-failure classification.
//!
//! Converts low-level client errors into a coarse cause so diagnostic
//! output can point at the actual problem instead of a bare error string.
//! Classification inspects the error's source chain for `std::io::Error`
//! kinds first, then falls back to message inspection.

use std::io;

/// Coarse cause of a failed daemon probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeFailure {
    /// The daemon (or an intermediary) actively refused the connection.
    ConnectionRefused,
    /// The endpoint host name could not be resolved.
    HostUnresolvable,
    /// The probe timed out.
    TimedOut,
    /// TLS certificate negotiation failed.
    CertificateError,
    /// No more specific cause could be determined.
    Unknown,
}

/// Message fragments that indicate a name-resolution failure.
const DNS_FRAGMENTS: &[&str] = &[
    "failed to lookup address",
    "dns error",
    "name or service not known",
    "nodename nor servname",
];

impl ProbeFailure {
    /// Classify a client error.
    #[must_use]
    pub fn classify(error: &bollard::errors::Error) -> Self {
        if matches!(error, bollard::errors::Error::RequestTimeoutError) {
            return Self::TimedOut;
        }
        let direct_kind = match error {
            bollard::errors::Error::IOError { err } => Some(err.kind()),
            _ => io_error_kind_in_chain(error),
        };
        match direct_kind {
            Some(io::ErrorKind::ConnectionRefused) => Self::ConnectionRefused,
            Some(io::ErrorKind::TimedOut) => Self::TimedOut,
            _ => Self::classify_message(&error.to_string()),
        }
    }

    /// Classify by message content when no error kind was conclusive.
    fn classify_message(message: &str) -> Self {
        let lowered = message.to_lowercase();
        if lowered.contains("connection refused") {
            return Self::ConnectionRefused;
        }
        if DNS_FRAGMENTS
            .iter()
            .any(|fragment| lowered.contains(fragment))
        {
            return Self::HostUnresolvable;
        }
        if lowered.contains("timed out") || lowered.contains("timeout") {
            return Self::TimedOut;
        }
        if lowered.contains("certificate") {
            return Self::CertificateError;
        }
        Self::Unknown
    }

    /// A remediation hint for this cause, if one applies.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConnectionRefused => Some("connection refused - is the daemon running?"),
            Self::HostUnresolvable => Some("host not found - check the endpoint address"),
            Self::TimedOut => Some("connection timed out - check network and firewall settings"),
            Self::CertificateError => {
                Some("certificate error - verify the TLS certificate configuration")
            }
            Self::Unknown => None,
        }
    }
}

impl std::fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::ConnectionRefused => "connection refused",
            Self::HostUnresolvable => "host unresolvable",
            Self::TimedOut => "timed out",
            Self::CertificateError => "certificate error",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Walk the error source chain looking for an `io::Error` kind.
fn io_error_kind_in_chain(error: &dyn std::error::Error) -> Option<io::ErrorKind> {
    let mut current: Option<&(dyn std::error::Error + 'static)> = error.source();
    while let Some(err) = current {
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            return Some(io_err.kind());
        }
        current = err.source();
    }
    None
}
