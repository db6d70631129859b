//! Container passthrough operations.

use std::collections::HashMap;

use bollard::Docker;
use bollard::models::{
    ContainerCreateBody, ContainerInspectResponse, ContainerSummary, HostConfig, PortBinding,
    PortSummary,
};
use bollard::query_parameters::{
    CreateContainerOptions, CreateContainerOptionsBuilder, InspectContainerOptions,
    ListContainersOptionsBuilder, LogsOptionsBuilder, RemoveContainerOptionsBuilder,
    StartContainerOptions, StopContainerOptionsBuilder,
};
use futures_util::TryStreamExt;
use serde::Serialize;

use super::op_failed;
use crate::error::{DaemonError, DockhandError, Result};

/// Default grace period in seconds before a stop escalates to a kill.
pub const DEFAULT_STOP_TIMEOUT_SECS: i32 = 10;

/// Default number of lines collected from the end of a container's logs.
pub const DEFAULT_LOG_TAIL: i64 = 100;

/// Compact view of one container, as returned by the list operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerBrief {
    /// Engine-assigned container ID.
    pub id: Option<String>,
    /// Primary name, with the engine's leading slash trimmed.
    pub name: Option<String>,
    /// Image reference the container was created from.
    pub image: Option<String>,
    /// Coarse lifecycle state (e.g. `running`).
    pub state: Option<String>,
    /// Human-readable status line.
    pub status: Option<String>,
    /// Published and exposed ports, one entry per port.
    pub ports: Vec<String>,
    /// Creation time as a Unix timestamp.
    pub created: Option<i64>,
}

impl From<ContainerSummary> for ContainerBrief {
    fn from(summary: ContainerSummary) -> Self {
        Self {
            id: summary.id,
            name: summary
                .names
                .as_ref()
                .and_then(|names| names.first())
                .map(|name| String::from(name.trim_start_matches('/'))),
            image: summary.image,
            state: summary.state.map(|state| state.to_string()),
            status: summary.status,
            ports: summary
                .ports
                .map(|ports| ports.iter().map(format_port).collect())
                .unwrap_or_default(),
            created: summary.created,
        }
    }
}

/// Summary of a single container after a lifecycle operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerStatus {
    /// Engine-assigned container ID.
    pub id: Option<String>,
    /// Container name, with the engine's leading slash trimmed.
    pub name: Option<String>,
    /// Image reference the container was created from.
    pub image: Option<String>,
    /// Coarse lifecycle state (e.g. `running`).
    pub state: Option<String>,
    /// Creation time as reported by the engine.
    pub created: Option<String>,
    /// Published ports, one `CONTAINER -> HOST` entry each.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
}

impl From<ContainerInspectResponse> for ContainerStatus {
    fn from(info: ContainerInspectResponse) -> Self {
        Self {
            id: info.id,
            name: info
                .name
                .map(|name| String::from(name.trim_start_matches('/'))),
            image: info.config.and_then(|config| config.image),
            state: info
                .state
                .and_then(|state| state.status)
                .map(|status| status.to_string()),
            created: info.created,
            ports: info
                .network_settings
                .and_then(|settings| settings.ports)
                .map(|ports| format_port_map(&ports))
                .unwrap_or_default(),
        }
    }
}

/// One `HOST:CONTAINER[/PROTOCOL]` port publication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortPublication {
    host_port: String,
    container_key: String,
}

impl PortPublication {
    /// Parse a publication spec of the form `HOST:CONTAINER[/PROTOCOL]`.
    ///
    /// The protocol defaults to `tcp`; both port numbers must be valid.
    ///
    /// # Errors
    ///
    /// Returns `DaemonError::InvalidPortMapping` when the spec does not
    /// parse.
    pub fn parse(spec: &str) -> Result<Self> {
        let invalid = || {
            DockhandError::from(DaemonError::InvalidPortMapping {
                spec: String::from(spec),
            })
        };

        let (host_port, container) = spec.split_once(':').ok_or_else(invalid)?;
        if host_port.parse::<u16>().is_err() {
            return Err(invalid());
        }
        let (container_port, protocol) = container
            .split_once('/')
            .map_or((container, "tcp"), |(port, protocol)| (port, protocol));
        if container_port.parse::<u16>().is_err() || protocol.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            host_port: String::from(host_port),
            container_key: format!("{container_port}/{protocol}"),
        })
    }

    /// The host port, as a string the engine accepts.
    #[must_use]
    pub fn host_port(&self) -> &str {
        &self.host_port
    }

    /// The container-side `PORT/PROTOCOL` key.
    #[must_use]
    pub fn container_key(&self) -> &str {
        &self.container_key
    }
}

/// Parse a `KEY=VALUE` label.
///
/// # Errors
///
/// Returns `DaemonError::InvalidLabel` when the value contains no `=` or
/// the key is empty.
pub fn parse_label(value: &str) -> Result<(String, String)> {
    value
        .split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, label)| (String::from(key), String::from(label)))
        .ok_or_else(|| {
            DockhandError::from(DaemonError::InvalidLabel {
                value: String::from(value),
            })
        })
}

/// Container-creation request parameters.
///
/// Built with the `with_*` methods and translated into the engine's
/// create payload on submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateContainerRequest {
    image: String,
    name: Option<String>,
    cmd: Option<Vec<String>>,
    entrypoint: Option<Vec<String>>,
    env: Option<Vec<String>>,
    labels: Option<HashMap<String, String>>,
    binds: Option<Vec<String>>,
    publications: Vec<PortPublication>,
}

impl CreateContainerRequest {
    /// Create a request for the given image.
    ///
    /// # Errors
    ///
    /// Returns `DaemonError::MissingImage` when `image` is empty or
    /// whitespace-only.
    pub fn new(image: impl Into<String>) -> Result<Self> {
        let image_value = image.into();
        let trimmed = image_value.trim();
        if trimmed.is_empty() {
            return Err(DockhandError::from(DaemonError::MissingImage));
        }

        Ok(Self {
            image: String::from(trimmed),
            name: None,
            cmd: None,
            entrypoint: None,
            env: None,
            labels: None,
            binds: None,
            publications: Vec::new(),
        })
    }

    /// Attach an optional container name.
    #[must_use]
    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name.filter(|value| !value.trim().is_empty());
        self
    }

    /// Attach an optional command vector.
    #[must_use]
    pub fn with_cmd(mut self, cmd: Option<Vec<String>>) -> Self {
        self.cmd = cmd;
        self
    }

    /// Attach an optional entrypoint, overriding the image's.
    #[must_use]
    pub fn with_entrypoint(mut self, entrypoint: Option<Vec<String>>) -> Self {
        self.entrypoint = entrypoint;
        self
    }

    /// Attach optional `KEY=value` environment entries.
    #[must_use]
    pub fn with_env(mut self, env: Option<Vec<String>>) -> Self {
        self.env = env;
        self
    }

    /// Attach optional labels.
    #[must_use]
    pub fn with_labels(mut self, labels: Option<HashMap<String, String>>) -> Self {
        self.labels = labels;
        self
    }

    /// Attach optional `HOST:CONTAINER[:MODE]` volume binds.
    #[must_use]
    pub fn with_binds(mut self, binds: Option<Vec<String>>) -> Self {
        self.binds = binds;
        self
    }

    /// Add one port publication.
    #[must_use]
    pub fn with_publication(mut self, publication: PortPublication) -> Self {
        self.publications.push(publication);
        self
    }

    /// Return the configured image.
    #[must_use]
    pub fn image(&self) -> &str {
        &self.image
    }

    /// The engine create options (the container name), if any.
    pub(super) fn build_create_options(&self) -> Option<CreateContainerOptions> {
        self.name.as_deref().map(|container_name| {
            CreateContainerOptionsBuilder::default()
                .name(container_name)
                .build()
        })
    }

    /// Translate the request into the engine's create payload.
    pub(super) fn build_body(&self) -> ContainerCreateBody {
        ContainerCreateBody {
            image: Some(self.image.clone()),
            cmd: self.cmd.clone(),
            entrypoint: self.entrypoint.clone(),
            env: self.env.clone(),
            labels: self.labels.clone(),
            exposed_ports: self.exposed_ports(),
            host_config: self.build_host_config(),
            ..ContainerCreateBody::default()
        }
    }

    fn exposed_ports(&self) -> Option<Vec<String>> {
        if self.publications.is_empty() {
            return None;
        }
        Some(
            self.publications
                .iter()
                .map(|publication| String::from(publication.container_key()))
                .collect(),
        )
    }

    fn build_host_config(&self) -> Option<HostConfig> {
        if self.binds.is_none() && self.publications.is_empty() {
            return None;
        }
        Some(HostConfig {
            binds: self.binds.clone(),
            port_bindings: self.port_bindings(),
            ..HostConfig::default()
        })
    }

    fn port_bindings(&self) -> Option<HashMap<String, Option<Vec<PortBinding>>>> {
        if self.publications.is_empty() {
            return None;
        }
        Some(
            self.publications
                .iter()
                .map(|publication| {
                    (
                        String::from(publication.container_key()),
                        Some(vec![PortBinding {
                            host_ip: None,
                            host_port: Some(String::from(publication.host_port())),
                        }]),
                    )
                })
                .collect(),
        )
    }
}

/// List containers.
///
/// # Errors
///
/// Returns `DaemonError::OperationFailed` when the daemon rejects the
/// call.
pub async fn list_containers(docker: &Docker, all: bool) -> Result<Vec<ContainerBrief>> {
    let options = ListContainersOptionsBuilder::default().all(all).build();
    let summaries = docker
        .list_containers(Some(options))
        .await
        .map_err(|error| op_failed("list containers", &error))?;
    Ok(summaries.into_iter().map(ContainerBrief::from).collect())
}

/// Create a container without starting it.
///
/// # Errors
///
/// Returns `DaemonError::OperationFailed` when the daemon rejects the
/// create or the follow-up inspect.
pub async fn create_container(
    docker: &Docker,
    request: &CreateContainerRequest,
) -> Result<ContainerStatus> {
    let response = docker
        .create_container(request.build_create_options(), request.build_body())
        .await
        .map_err(|error| op_failed("create container", &error))?;
    container_status(docker, &response.id).await
}

/// Create and start a container. This is the preferred way to launch one.
///
/// # Errors
///
/// Returns `DaemonError::OperationFailed` when any of the create, start,
/// or inspect calls is rejected.
pub async fn run_container(
    docker: &Docker,
    request: &CreateContainerRequest,
) -> Result<ContainerStatus> {
    let response = docker
        .create_container(request.build_create_options(), request.build_body())
        .await
        .map_err(|error| op_failed("create container", &error))?;
    docker
        .start_container(&response.id, None::<StartContainerOptions>)
        .await
        .map_err(|error| op_failed("start container", &error))?;
    container_status(docker, &response.id).await
}

/// Start a stopped container.
///
/// # Errors
///
/// Returns `DaemonError::OperationFailed` when the daemon rejects the
/// call.
pub async fn start_container(docker: &Docker, container: &str) -> Result<ContainerStatus> {
    docker
        .start_container(container, None::<StartContainerOptions>)
        .await
        .map_err(|error| op_failed("start container", &error))?;
    container_status(docker, container).await
}

/// Stop a running container, waiting `timeout_secs` before killing it.
///
/// # Errors
///
/// Returns `DaemonError::OperationFailed` when the daemon rejects the
/// call.
pub async fn stop_container(
    docker: &Docker,
    container: &str,
    timeout_secs: i32,
) -> Result<ContainerStatus> {
    let options = StopContainerOptionsBuilder::default().t(timeout_secs).build();
    docker
        .stop_container(container, Some(options))
        .await
        .map_err(|error| op_failed("stop container", &error))?;
    container_status(docker, container).await
}

/// Remove a container.
///
/// # Errors
///
/// Returns `DaemonError::OperationFailed` when the daemon rejects the
/// call.
pub async fn remove_container(
    docker: &Docker,
    container: &str,
    force: bool,
    volumes: bool,
) -> Result<()> {
    let options = RemoveContainerOptionsBuilder::default()
        .force(force)
        .v(volumes)
        .build();
    docker
        .remove_container(container, Some(options))
        .await
        .map_err(|error| op_failed("remove container", &error))
}

/// Fetch the engine's full inspect document for a container.
///
/// # Errors
///
/// Returns `DaemonError::OperationFailed` when the daemon rejects the
/// call or the response cannot be re-serialised.
pub async fn inspect_container(docker: &Docker, container: &str) -> Result<serde_json::Value> {
    let info = docker
        .inspect_container(container, None::<InspectContainerOptions>)
        .await
        .map_err(|error| op_failed("inspect container", &error))?;
    serde_json::to_value(&info).map_err(|error| op_failed("inspect container", &error))
}

/// Collect the last `tail` lines of a container's stdout and stderr.
///
/// The log stream is drained to completion; there is no follow mode.
///
/// # Errors
///
/// Returns `DaemonError::OperationFailed` when the daemon rejects the
/// call or the stream errors mid-read.
pub async fn container_logs(docker: &Docker, container: &str, tail: i64) -> Result<String> {
    let tail_value = tail.to_string();
    let options = LogsOptionsBuilder::default()
        .stdout(true)
        .stderr(true)
        .tail(&tail_value)
        .build();
    let chunks: Vec<_> = docker
        .logs(container, Some(options))
        .try_collect()
        .await
        .map_err(|error| op_failed("collect container logs", &error))?;
    Ok(chunks.iter().map(ToString::to_string).collect())
}

/// Inspect a container and reduce the response to a status summary.
async fn container_status(docker: &Docker, container: &str) -> Result<ContainerStatus> {
    let info = docker
        .inspect_container(container, None::<InspectContainerOptions>)
        .await
        .map_err(|error| op_failed("inspect container", &error))?;
    Ok(ContainerStatus::from(info))
}

/// Render one listed port as `PRIVATE/PROTO[ -> IP:PUBLIC]`.
pub(super) fn format_port(port: &PortSummary) -> String {
    let protocol = port
        .typ
        .as_ref()
        .map_or_else(|| String::from("tcp"), ToString::to_string);
    port.public_port.map_or_else(
        || format!("{}/{protocol}", port.private_port),
        |public| {
            format!(
                "{}/{protocol} -> {}:{public}",
                port.private_port,
                port.ip.clone().unwrap_or_else(|| String::from("0.0.0.0"))
            )
        },
    )
}

/// Render a port-binding map as sorted `CONTAINER -> IP:HOST` lines.
pub(super) fn format_port_map(ports: &HashMap<String, Option<Vec<PortBinding>>>) -> Vec<String> {
    let mut entries: Vec<String> = ports
        .iter()
        .map(|(container_key, bindings)| {
            bindings
                .as_ref()
                .and_then(|list| list.first())
                .map_or_else(
                    || container_key.clone(),
                    |binding| {
                        format!(
                            "{container_key} -> {}:{}",
                            binding
                                .host_ip
                                .clone()
                                .unwrap_or_else(|| String::from("0.0.0.0")),
                            binding.host_port.clone().unwrap_or_default()
                        )
                    },
                )
        })
        .collect();
    entries.sort();
    entries
}
