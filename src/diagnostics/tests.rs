//! Unit tests for diagnostic stage sequencing and the report algebra.

use std::io;

use bollard::models::{SystemInfo, SystemVersion};
use mockall::mock;
use rstest::rstest;
use tempfile::TempDir;

use super::probe::ProbeFuture;
use super::{
    ConnectionDiagnostics, DaemonProbe, DiagnosticReport, Stage, StageOutcome, StageResult,
};
use crate::endpoint::{EndpointDescriptor, TlsMaterial};

mock! {
    #[derive(Debug)]
    Probe {}

    impl DaemonProbe for Probe {
        fn daemon_version<'a>(&'a self) -> ProbeFuture<'a, SystemVersion>;
        fn count_containers<'a>(&'a self) -> ProbeFuture<'a, usize>;
        fn count_images<'a>(&'a self) -> ProbeFuture<'a, usize>;
        fn count_networks<'a>(&'a self) -> ProbeFuture<'a, usize>;
        fn count_volumes<'a>(&'a self) -> ProbeFuture<'a, usize>;
        fn daemon_info<'a>(&'a self) -> ProbeFuture<'a, SystemInfo>;
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn sample_version() -> SystemVersion {
    SystemVersion {
        version: Some(String::from("27.3.1")),
        api_version: Some(String::from("1.47")),
        os: Some(String::from("linux")),
        arch: Some(String::from("x86_64")),
        git_commit: Some(String::from("deadbee")),
        build_time: Some(String::from("2026-01-01T00:00:00Z")),
        ..SystemVersion::default()
    }
}

fn sample_info() -> SystemInfo {
    SystemInfo {
        server_version: Some(String::from("27.3.1")),
        operating_system: Some(String::from("Debian GNU/Linux 13")),
        architecture: Some(String::from("x86_64")),
        containers: Some(2),
        containers_running: Some(1),
        ncpu: Some(8),
        mem_total: Some(16_i64 << 30),
        ..SystemInfo::default()
    }
}

fn refused_error() -> bollard::errors::Error {
    bollard::errors::Error::IOError {
        err: io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
    }
}

fn passing_result(stage: Stage) -> StageResult {
    StageResult::pass(stage, vec![])
}

fn message_lines(result: &StageResult) -> String {
    result.messages().join("\n")
}

/// Probe whose version query and every enumeration call succeed.
fn healthy_probe() -> MockProbe {
    let mut probe = MockProbe::new();
    probe
        .expect_daemon_version()
        .returning(|| Box::pin(async { Ok(sample_version()) }));
    probe
        .expect_count_containers()
        .returning(|| Box::pin(async { Ok(3) }));
    probe
        .expect_count_images()
        .returning(|| Box::pin(async { Ok(12) }));
    probe
        .expect_count_networks()
        .returning(|| Box::pin(async { Ok(5) }));
    probe
        .expect_count_volumes()
        .returning(|| Box::pin(async { Ok(1) }));
    probe
        .expect_daemon_info()
        .returning(|| Box::pin(async { Ok(sample_info()) }));
    probe
}

// =============================================================================
// Report algebra
// =============================================================================

#[rstest]
fn report_with_any_failed_stage_fails_overall() {
    let report = DiagnosticReport::from_stages(vec![
        passing_result(Stage::Configuration),
        passing_result(Stage::Certificates),
        passing_result(Stage::Connectivity),
        StageResult::fail(Stage::Operations, vec![]),
    ]);

    assert_eq!(report.overall(), StageOutcome::Fail);
}

#[rstest]
fn warn_only_report_is_degraded_but_better_than_failed() {
    let degraded = DiagnosticReport::from_stages(vec![
        passing_result(Stage::Configuration),
        StageResult::warn(Stage::Certificates, vec![]),
        passing_result(Stage::Connectivity),
        passing_result(Stage::Operations),
    ]);

    assert_eq!(degraded.overall(), StageOutcome::Warn);
    assert!(degraded.overall() < StageOutcome::Fail);
    assert!(StageOutcome::Pass < degraded.overall());
}

#[rstest]
fn all_passing_report_passes_overall() {
    let report = DiagnosticReport::from_stages(vec![
        passing_result(Stage::Configuration),
        passing_result(Stage::Connectivity),
    ]);

    assert_eq!(report.overall(), StageOutcome::Pass);
}

#[rstest]
fn stage_lookup_finds_results_by_identity() {
    let report = DiagnosticReport::from_stages(vec![
        passing_result(Stage::Configuration),
        StageResult::fail(Stage::Connectivity, vec![String::from("boom")]),
    ]);

    let connectivity = report
        .stage(Stage::Connectivity)
        .expect("connectivity stage should be present");
    assert_eq!(connectivity.outcome(), StageOutcome::Fail);
    assert!(report.stage(Stage::Operations).is_none());
}

#[rstest]
fn outcomes_serialise_as_lowercase_strings() {
    let value = serde_json::to_value(StageOutcome::Pass).expect("outcome should serialise");
    assert_eq!(value, serde_json::Value::String(String::from("pass")));

    let report = DiagnosticReport::from_stages(vec![StageResult::fail(
        Stage::Connectivity,
        vec![String::from("boom")],
    )]);
    let rendered = serde_json::to_value(&report).expect("report should serialise");
    assert_eq!(
        rendered
            .pointer("/stages/0/outcome")
            .and_then(serde_json::Value::as_str),
        Some("fail")
    );
    assert_eq!(
        rendered
            .pointer("/stages/0/stage")
            .and_then(serde_json::Value::as_str),
        Some("connectivity")
    );
}

// =============================================================================
// Configuration stage
// =============================================================================

#[rstest]
fn configuration_stage_always_passes_and_restates_the_endpoint() {
    let descriptor = EndpointDescriptor::TcpPlain {
        host: String::from("remotehost"),
        port: 2375,
    };

    let result = ConnectionDiagnostics::configuration_stage(&descriptor);

    assert_eq!(result.stage(), Stage::Configuration);
    assert_eq!(result.outcome(), StageOutcome::Pass);
    let lines = message_lines(&result);
    assert!(lines.contains("remotehost:2375"), "messages: {lines}");
    assert!(lines.contains("not loaded"), "messages: {lines}");
}

// =============================================================================
// Certificate stage
// =============================================================================

fn material_fixture() -> (TempDir, TlsMaterial) {
    let dir = TempDir::new().expect("temp dir should be created");
    for file in ["ca.pem", "cert.pem", "key.pem"] {
        std::fs::write(dir.path().join(file), b"pem bytes").expect("material should be written");
    }
    let utf8 = camino::Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
        .expect("temp path should be UTF-8");
    let material = TlsMaterial::load(&utf8).expect("material should load");
    (dir, material)
}

#[rstest]
fn certificate_stage_passes_when_all_files_are_readable() {
    let (_dir, material) = material_fixture();

    let result = ConnectionDiagnostics::certificate_stage(&material);

    assert_eq!(result.outcome(), StageOutcome::Pass);
    assert_eq!(result.messages().len(), 3);
}

#[rstest]
fn certificate_stage_fails_per_missing_file() {
    let (dir, material) = material_fixture();
    std::fs::remove_file(dir.path().join("key.pem")).expect("key.pem should be removed");

    let result = ConnectionDiagnostics::certificate_stage(&material);

    assert_eq!(result.outcome(), StageOutcome::Fail);
    let lines = message_lines(&result);
    assert!(lines.contains("ca.pem: found"), "messages: {lines}");
    assert!(lines.contains("key.pem: not readable"), "messages: {lines}");
}

// =============================================================================
// Connectivity and operations sequencing
// =============================================================================

#[rstest]
#[tokio::test]
async fn operations_never_run_when_connectivity_fails() {
    let mut probe = MockProbe::new();
    probe
        .expect_daemon_version()
        .returning(|| Box::pin(async { Err(refused_error()) }));
    probe.expect_count_containers().never();
    probe.expect_count_images().never();
    probe.expect_count_networks().never();
    probe.expect_count_volumes().never();
    probe.expect_daemon_info().never();

    let mut stages = Vec::new();
    ConnectionDiagnostics::probe_stages(&probe, &mut stages).await;

    assert_eq!(stages.len(), 1);
    let connectivity = stages.first().expect("connectivity stage should be present");
    assert_eq!(connectivity.stage(), Stage::Connectivity);
    assert_eq!(connectivity.outcome(), StageOutcome::Fail);
    let lines = message_lines(connectivity);
    assert!(lines.contains("cause: connection refused"), "messages: {lines}");
    assert!(lines.contains("is the daemon running?"), "messages: {lines}");
}

#[rstest]
#[tokio::test]
async fn healthy_daemon_passes_connectivity_and_operations() {
    let probe = healthy_probe();

    let mut stages = Vec::new();
    ConnectionDiagnostics::probe_stages(&probe, &mut stages).await;

    assert_eq!(stages.len(), 2);
    let connectivity = stages.first().expect("connectivity stage should be present");
    assert_eq!(connectivity.outcome(), StageOutcome::Pass);
    assert!(
        message_lines(connectivity).contains("version: 27.3.1"),
        "messages: {}",
        message_lines(connectivity)
    );

    let operations = stages.get(1).expect("operations stage should be present");
    assert_eq!(operations.outcome(), StageOutcome::Pass);
    let lines = message_lines(operations);
    assert!(lines.contains("containers: 3"), "messages: {lines}");
    assert!(lines.contains("images: 12"), "messages: {lines}");
    assert!(lines.contains("memory: 16 GiB"), "messages: {lines}");
}

#[rstest]
#[tokio::test]
async fn operations_stage_names_first_failure_but_keeps_going() {
    let mut probe = MockProbe::new();
    probe
        .expect_count_containers()
        .returning(|| Box::pin(async { Ok(3) }));
    probe
        .expect_count_images()
        .returning(|| Box::pin(async { Err(refused_error()) }));
    probe
        .expect_count_networks()
        .returning(|| Box::pin(async { Ok(5) }));
    probe
        .expect_count_volumes()
        .returning(|| Box::pin(async { Ok(0) }));
    probe
        .expect_daemon_info()
        .returning(|| Box::pin(async { Ok(sample_info()) }));

    let result = ConnectionDiagnostics::operations_stage(&probe).await;

    assert_eq!(result.outcome(), StageOutcome::Fail);
    let lines = message_lines(&result);
    assert!(lines.contains("list images failed"), "messages: {lines}");
    assert!(
        lines.contains("first failing call: list images"),
        "messages: {lines}"
    );
    // Later calls were still attempted best-effort.
    assert!(lines.contains("networks: 5"), "messages: {lines}");
    assert!(lines.contains("system info retrieved"), "messages: {lines}");
}

// =============================================================================
// Full run against an unreachable endpoint
// =============================================================================

#[rstest]
#[tokio::test]
async fn run_against_closed_port_reports_connectivity_failure_only() {
    // Port 1 on loopback is reliably closed; the daemon client reports a
    // refused connection on the first call.
    let descriptor = EndpointDescriptor::TcpPlain {
        host: String::from("127.0.0.1"),
        port: 1,
    };

    let report = ConnectionDiagnostics::run(&descriptor).await;

    assert_eq!(report.overall(), StageOutcome::Fail);
    let configuration = report
        .stage(Stage::Configuration)
        .expect("configuration stage should always run");
    assert_eq!(configuration.outcome(), StageOutcome::Pass);
    let connectivity = report
        .stage(Stage::Connectivity)
        .expect("connectivity stage should be present");
    assert_eq!(connectivity.outcome(), StageOutcome::Fail);
    assert!(report.stage(Stage::Operations).is_none());
    assert!(report.stage(Stage::Certificates).is_none());
}
