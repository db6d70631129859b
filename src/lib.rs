//! Remote-operations passthrough for container-engine daemons.
//!
//! `dockhand` exposes a small catalogue of container, image, network, and
//! volume operations that map almost one-to-one onto calls against a
//! container-engine control API. The interesting machinery is on the way in:
//! endpoint resolution turns environment-style connection indicators into a
//! validated transport descriptor, and connection diagnostics exercise a
//! resolved endpoint through a staged probe sequence with a structured
//! report.
//!
//! # Architecture
//!
//! An [`endpoint::EndpointDescriptor`] is resolved exactly once from the
//! captured indicators, a daemon client is constructed from it, and that
//! client is passed explicitly to whichever component needs it. There is no
//! process-global client.
//!
//! # Modules
//!
//! - [`endpoint`]: indicator capture and endpoint resolution
//! - [`engine`]: daemon client construction from a resolved descriptor
//! - [`diagnostics`]: staged connection diagnostics and reporting
//! - [`ops`]: the passthrough operation catalogue
//! - [`cli`]: command-line interface definitions
//! - [`error`]: semantic error types

pub mod cli;
pub mod diagnostics;
pub mod endpoint;
pub mod engine;
pub mod error;
pub mod ops;
