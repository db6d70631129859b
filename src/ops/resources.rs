//! Network, volume, and system-information passthrough operations.

use bollard::Docker;
use bollard::models::{Network, SystemInfo, Volume};
use bollard::query_parameters::{ListNetworksOptions, ListVolumesOptions};
use serde::Serialize;

use super::op_failed;
use crate::error::Result;

/// Compact view of one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkBrief {
    /// Engine-assigned network ID.
    pub id: Option<String>,
    /// Network name.
    pub name: Option<String>,
    /// Driver backing the network.
    pub driver: Option<String>,
    /// Network scope (`local`, `swarm`, ...).
    pub scope: Option<String>,
}

impl From<Network> for NetworkBrief {
    fn from(network: Network) -> Self {
        Self {
            id: network.id,
            name: network.name,
            driver: network.driver,
            scope: network.scope,
        }
    }
}

/// Compact view of one volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VolumeBrief {
    /// Volume name.
    pub name: String,
    /// Driver backing the volume.
    pub driver: String,
    /// Host path where the volume data lives.
    pub mountpoint: String,
}

impl From<Volume> for VolumeBrief {
    fn from(volume: Volume) -> Self {
        Self {
            name: volume.name,
            driver: volume.driver,
            mountpoint: volume.mountpoint,
        }
    }
}

/// Daemon identification and capacity summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemSummary {
    /// Total containers known to the daemon.
    pub containers: Option<i64>,
    /// Containers currently running.
    pub containers_running: Option<i64>,
    /// Top-level images known to the daemon.
    pub images: Option<i64>,
    /// Daemon server version.
    pub server_version: Option<String>,
    /// Host operating system.
    pub operating_system: Option<String>,
    /// Host architecture.
    pub architecture: Option<String>,
    /// Number of CPUs available to the daemon.
    pub cpus: Option<i64>,
    /// Total memory available to the daemon, in bytes.
    pub memory_bytes: Option<i64>,
}

impl From<SystemInfo> for SystemSummary {
    fn from(info: SystemInfo) -> Self {
        Self {
            containers: info.containers,
            containers_running: info.containers_running,
            images: info.images,
            server_version: info.server_version,
            operating_system: info.operating_system,
            architecture: info.architecture,
            cpus: info.ncpu,
            memory_bytes: info.mem_total,
        }
    }
}

/// List networks.
///
/// # Errors
///
/// Returns `DaemonError::OperationFailed` when the daemon rejects the
/// call.
pub async fn list_networks(docker: &Docker) -> Result<Vec<NetworkBrief>> {
    let networks = docker
        .list_networks(None::<ListNetworksOptions>)
        .await
        .map_err(|error| op_failed("list networks", &error))?;
    Ok(networks.into_iter().map(NetworkBrief::from).collect())
}

/// List volumes.
///
/// # Errors
///
/// Returns `DaemonError::OperationFailed` when the daemon rejects the
/// call.
pub async fn list_volumes(docker: &Docker) -> Result<Vec<VolumeBrief>> {
    let response = docker
        .list_volumes(None::<ListVolumesOptions>)
        .await
        .map_err(|error| op_failed("list volumes", &error))?;
    Ok(response
        .volumes
        .unwrap_or_default()
        .into_iter()
        .map(VolumeBrief::from)
        .collect())
}

/// Fetch the daemon's system information.
///
/// # Errors
///
/// Returns `DaemonError::OperationFailed` when the daemon rejects the
/// call.
pub async fn system_info(docker: &Docker) -> Result<SystemSummary> {
    let info = docker
        .info()
        .await
        .map_err(|error| op_failed("system info", &error))?;
    Ok(SystemSummary::from(info))
}
