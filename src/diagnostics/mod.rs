//! Staged connection diagnostics against a resolved endpoint.
//!
//! [`ConnectionDiagnostics::run`] exercises a daemon reachable via an
//! [`EndpointDescriptor`] through a fixed probe sequence and produces a
//! [`DiagnosticReport`]: one [`StageResult`] per stage, in execution
//! order. Probe failures are captured in the report, never raised as
//! errors, so a single run always yields a complete picture.
//!
//! Stages execute strictly in order and one call at a time. The probes
//! impose no deadline of their own; the client's fixed per-call timeout
//! is the only bound on how long a stage may block. Known limitation: a
//! daemon that accepts the connection and then stalls holds a stage open
//! for the full client timeout.

mod classify;
mod probe;

pub use classify::ProbeFailure;
pub use probe::{DaemonProbe, ProbeFuture};

#[cfg(test)]
mod tests;

use bollard::models::{SystemInfo, SystemVersion};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde::Serialize;

use crate::endpoint::{EndpointDescriptor, MATERIAL_FILES, TlsMaterial};
use crate::engine::EngineConnector;

/// Outcome of a single diagnostic stage.
///
/// Outcomes are totally ordered from best to worst, so a report's overall
/// outcome is simply the maximum across its stages. A `Warn`-only report
/// is usable but degraded; any `Fail` makes the whole report a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageOutcome {
    /// The stage completed without findings.
    Pass,
    /// The stage completed with degraded-mode findings.
    Warn,
    /// The stage found a blocking problem.
    Fail,
}

impl StageOutcome {
    /// Stable lowercase name of the outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Warn => "warn",
            Self::Fail => "fail",
        }
    }
}

impl std::fmt::Display for StageOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a diagnostic stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Restates the resolved endpoint configuration; purely descriptive.
    Configuration,
    /// Per-file check of the TLS material on disk.
    Certificates,
    /// A single version/identity query against the daemon.
    Connectivity,
    /// Read-only enumeration calls plus a system-information query.
    Operations,
}

impl Stage {
    /// Stable lowercase name of the stage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Certificates => "certificates",
            Self::Connectivity => "connectivity",
            Self::Operations => "operations",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one diagnostic stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageResult {
    stage: Stage,
    outcome: StageOutcome,
    messages: Vec<String>,
}

impl StageResult {
    /// A passing stage result.
    #[must_use]
    pub const fn pass(stage: Stage, messages: Vec<String>) -> Self {
        Self {
            stage,
            outcome: StageOutcome::Pass,
            messages,
        }
    }

    /// A degraded stage result.
    #[must_use]
    pub const fn warn(stage: Stage, messages: Vec<String>) -> Self {
        Self {
            stage,
            outcome: StageOutcome::Warn,
            messages,
        }
    }

    /// A failed stage result.
    #[must_use]
    pub const fn fail(stage: Stage, messages: Vec<String>) -> Self {
        Self {
            stage,
            outcome: StageOutcome::Fail,
            messages,
        }
    }

    /// The stage this result belongs to.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    /// The stage outcome.
    #[must_use]
    pub const fn outcome(&self) -> StageOutcome {
        self.outcome
    }

    /// The stage's message lines, in emission order.
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

/// Structured report produced by one diagnostic run.
///
/// Created once per run and never mutated afterwards; nothing persists
/// across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticReport {
    stages: Vec<StageResult>,
}

impl DiagnosticReport {
    /// Assemble a report from stage results, in execution order.
    #[must_use]
    pub const fn from_stages(stages: Vec<StageResult>) -> Self {
        Self { stages }
    }

    /// The stage results, in execution order.
    #[must_use]
    pub fn stages(&self) -> &[StageResult] {
        &self.stages
    }

    /// Look up the result of a particular stage, if it ran.
    #[must_use]
    pub fn stage(&self, stage: Stage) -> Option<&StageResult> {
        self.stages.iter().find(|result| result.stage == stage)
    }

    /// The overall outcome: the worst outcome across all stages.
    #[must_use]
    pub fn overall(&self) -> StageOutcome {
        self.stages
            .iter()
            .map(StageResult::outcome)
            .max()
            .unwrap_or(StageOutcome::Pass)
    }
}

/// Sequences diagnostic probes against a daemon.
///
/// Stateless aside from the report it produces; never mutates the
/// descriptor; safe to invoke repeatedly.
pub struct ConnectionDiagnostics;

impl ConnectionDiagnostics {
    /// Run the full diagnostic sequence against a resolved endpoint.
    ///
    /// The configuration stage always runs; the certificate stage runs
    /// only for mutually authenticated TLS endpoints; the operations
    /// stage runs only when connectivity passed. A failed stage never
    /// blocks the remaining independent stages.
    pub async fn run(descriptor: &EndpointDescriptor) -> DiagnosticReport {
        let mut stages = vec![Self::configuration_stage(descriptor)];
        if let Some(tls) = descriptor.tls_material() {
            stages.push(Self::certificate_stage(tls));
        }
        match EngineConnector::connect(descriptor) {
            Ok(docker) => Self::probe_stages(&docker, &mut stages).await,
            Err(error) => stages.push(StageResult::fail(
                Stage::Connectivity,
                vec![format!("failed to initialise daemon client: {error}")],
            )),
        }
        DiagnosticReport::from_stages(stages)
    }

    /// Run the connectivity and operations stages against a probe.
    ///
    /// Operations run only when the connectivity stage passed.
    async fn probe_stages<P: DaemonProbe>(probe: &P, stages: &mut Vec<StageResult>) {
        let connectivity = Self::connectivity_stage(probe).await;
        let connected = connectivity.outcome() == StageOutcome::Pass;
        stages.push(connectivity);
        if connected {
            stages.push(Self::operations_stage(probe).await);
        }
    }

    /// Restate the resolved configuration. Always passes; performs no I/O.
    fn configuration_stage(descriptor: &EndpointDescriptor) -> StageResult {
        let mut messages = vec![format!("endpoint: {descriptor}")];
        let tls_note = descriptor.tls_material().map_or_else(
            || String::from("TLS material: not loaded"),
            |tls| format!("TLS material: loaded from '{}'", tls.dir()),
        );
        messages.push(tls_note);
        StageResult::pass(Stage::Configuration, messages)
    }

    /// Check each expected material file for existence and readability.
    fn certificate_stage(tls: &TlsMaterial) -> StageResult {
        let handle = match Dir::open_ambient_dir(tls.dir(), ambient_authority()) {
            Ok(handle) => handle,
            Err(error) => {
                return StageResult::fail(
                    Stage::Certificates,
                    vec![format!(
                        "certificate directory '{}' is not readable: {error}",
                        tls.dir()
                    )],
                );
            }
        };

        let mut messages = Vec::new();
        let mut all_present = true;
        for file in MATERIAL_FILES {
            match handle.read(file) {
                Ok(bytes) => messages.push(format!("{file}: found ({} bytes)", bytes.len())),
                Err(error) => {
                    all_present = false;
                    messages.push(format!(
                        "{file}: not readable at '{}': {error}",
                        tls.dir().join(file)
                    ));
                }
            }
        }

        if all_present {
            StageResult::pass(Stage::Certificates, messages)
        } else {
            StageResult::fail(Stage::Certificates, messages)
        }
    }

    /// Issue a single version query and capture the daemon's identity.
    async fn connectivity_stage<P: DaemonProbe>(probe: &P) -> StageResult {
        match probe.daemon_version().await {
            Ok(version) => StageResult::pass(Stage::Connectivity, version_messages(&version)),
            Err(error) => {
                let cause = ProbeFailure::classify(&error);
                let mut messages = vec![
                    format!("failed to connect: {error}"),
                    format!("cause: {cause}"),
                ];
                if let Some(hint) = cause.hint() {
                    messages.push(String::from(hint));
                }
                StageResult::fail(Stage::Connectivity, messages)
            }
        }
    }

    /// Issue the fixed sequence of read-only enumeration calls plus a
    /// system-information query.
    ///
    /// Calls after the first failure are still attempted so the report
    /// stays complete, but they do not change the stage outcome.
    async fn operations_stage<P: DaemonProbe>(probe: &P) -> StageResult {
        let mut messages = Vec::new();
        let mut first_failure: Option<String> = None;

        record_count(
            "containers",
            probe.count_containers().await,
            &mut messages,
            &mut first_failure,
        );
        record_count(
            "images",
            probe.count_images().await,
            &mut messages,
            &mut first_failure,
        );
        record_count(
            "networks",
            probe.count_networks().await,
            &mut messages,
            &mut first_failure,
        );
        record_count(
            "volumes",
            probe.count_volumes().await,
            &mut messages,
            &mut first_failure,
        );

        match probe.daemon_info().await {
            Ok(info) => messages.extend(info_messages(&info)),
            Err(error) => {
                messages.push(format!("system info failed: {error}"));
                if first_failure.is_none() {
                    first_failure = Some(String::from("system info"));
                }
            }
        }

        match first_failure {
            None => StageResult::pass(Stage::Operations, messages),
            Some(failing) => {
                messages.push(format!("first failing call: {failing}"));
                StageResult::fail(Stage::Operations, messages)
            }
        }
    }
}

/// Record one enumeration result, remembering the first failing call.
fn record_count(
    name: &str,
    result: Result<usize, bollard::errors::Error>,
    messages: &mut Vec<String>,
    first_failure: &mut Option<String>,
) {
    match result {
        Ok(count) => messages.push(format!("{name}: {count}")),
        Err(error) => {
            messages.push(format!("list {name} failed: {error}"));
            if first_failure.is_none() {
                *first_failure = Some(format!("list {name}"));
            }
        }
    }
}

/// Render the daemon's version metadata into message lines.
fn version_messages(version: &SystemVersion) -> Vec<String> {
    vec![
        String::from("daemon responded to version query"),
        format!("version: {}", text_field(version.version.as_ref())),
        format!("API version: {}", text_field(version.api_version.as_ref())),
        format!(
            "platform: {}/{}",
            text_field(version.os.as_ref()),
            text_field(version.arch.as_ref())
        ),
        format!("git commit: {}", text_field(version.git_commit.as_ref())),
        format!("build time: {}", text_field(version.build_time.as_ref())),
    ]
}

/// Render the daemon's system information into message lines.
fn info_messages(info: &SystemInfo) -> Vec<String> {
    vec![
        String::from("system info retrieved"),
        format!(
            "server version: {}",
            text_field(info.server_version.as_ref())
        ),
        format!(
            "operating system: {}",
            text_field(info.operating_system.as_ref())
        ),
        format!("architecture: {}", text_field(info.architecture.as_ref())),
        format!(
            "containers known to daemon: {} ({} running)",
            info.containers.unwrap_or(0),
            info.containers_running.unwrap_or(0)
        ),
        format!("cpus: {}", info.ncpu.unwrap_or(0)),
        format!("memory: {} GiB", info.mem_total.unwrap_or(0) >> 30),
    ]
}

/// A textual field, or `unknown` when the daemon omitted it.
fn text_field(value: Option<&String>) -> &str {
    value.map_or("unknown", String::as_str)
}
