//! The passthrough operation catalogue.
//!
//! Each operation maps almost one-to-one onto a daemon API call: no
//! retries, no batching, no caching, no ordering logic. Engine responses
//! are reduced to compact serialisable summaries; the daemon itself
//! remains the source of truth for all lifecycle semantics.
//!
//! Every function takes the client explicitly. Callers resolve an
//! endpoint once, construct one client from it, and thread that client
//! through here.

mod containers;
mod images;
mod resources;

pub use containers::{
    ContainerBrief, ContainerStatus, CreateContainerRequest, DEFAULT_LOG_TAIL,
    DEFAULT_STOP_TIMEOUT_SECS, PortPublication, container_logs, create_container,
    inspect_container, list_containers, parse_label, remove_container, run_container,
    start_container, stop_container,
};
pub use images::{ImageBrief, PullOutcome, list_images, pull_image};
pub use resources::{
    NetworkBrief, SystemSummary, VolumeBrief, list_networks, list_volumes, system_info,
};

#[cfg(test)]
mod tests;

use crate::error::{DaemonError, DockhandError};

/// Wrap a daemon rejection into an operation-scoped error.
pub(crate) fn op_failed(operation: &str, error: &dyn std::fmt::Display) -> DockhandError {
    DockhandError::from(DaemonError::OperationFailed {
        operation: String::from(operation),
        message: error.to_string(),
    })
}
