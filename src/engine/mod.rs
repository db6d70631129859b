//! Daemon client construction.
//!
//! A client is always built from a resolved
//! [`crate::endpoint::EndpointDescriptor`] and passed explicitly to
//! whichever component needs it; no module-level client exists anywhere
//! in the crate.

mod connection;

pub use connection::EngineConnector;
