//! Unit tests for summary mapping and create-request translation.

use std::collections::HashMap;

use bollard::models::{
    ContainerInspectResponse, ContainerSummary, ImageSummary, Network, PortBinding, PortSummary,
    Volume,
};
use rstest::rstest;

use super::containers::{format_port, format_port_map};
use super::{
    ContainerBrief, ContainerStatus, CreateContainerRequest, ImageBrief, NetworkBrief,
    PortPublication, VolumeBrief, parse_label,
};
use crate::error::{DaemonError, DockhandError};

// =============================================================================
// Summary mapping
// =============================================================================

#[rstest]
fn container_brief_trims_the_leading_slash_from_names() {
    let summary = ContainerSummary {
        id: Some(String::from("abc123")),
        names: Some(vec![String::from("/web"), String::from("/alias")]),
        image: Some(String::from("nginx:latest")),
        status: Some(String::from("Up 2 hours")),
        created: Some(1_700_000_000),
        ..ContainerSummary::default()
    };

    let brief = ContainerBrief::from(summary);

    assert_eq!(brief.id.as_deref(), Some("abc123"));
    assert_eq!(brief.name.as_deref(), Some("web"));
    assert_eq!(brief.image.as_deref(), Some("nginx:latest"));
    assert_eq!(brief.status.as_deref(), Some("Up 2 hours"));
    assert_eq!(brief.created, Some(1_700_000_000));
    assert!(brief.ports.is_empty());
}

#[rstest]
fn format_port_includes_the_public_binding_when_present() {
    let published = PortSummary {
        private_port: 80,
        public_port: Some(8080),
        ip: None,
        ..PortSummary::default()
    };
    let exposed_only = PortSummary {
        private_port: 443,
        ..PortSummary::default()
    };

    assert_eq!(format_port(&published), "80/tcp -> 0.0.0.0:8080");
    assert_eq!(format_port(&exposed_only), "443/tcp");
}

#[rstest]
fn image_brief_copies_identity_fields() {
    let summary = ImageSummary {
        id: String::from("sha256:deadbeef"),
        repo_tags: vec![String::from("nginx:latest")],
        created: 1_700_000_000,
        size: 187_000_000,
        ..ImageSummary::default()
    };

    let brief = ImageBrief::from(summary);

    assert_eq!(brief.id, "sha256:deadbeef");
    assert_eq!(brief.repo_tags, vec![String::from("nginx:latest")]);
    assert_eq!(brief.created, 1_700_000_000);
    assert_eq!(brief.size, 187_000_000);
}

#[rstest]
fn network_brief_copies_identity_fields() {
    let network = Network {
        id: Some(String::from("net1")),
        name: Some(String::from("bridge")),
        driver: Some(String::from("bridge")),
        scope: Some(String::from("local")),
        ..Network::default()
    };

    let brief = NetworkBrief::from(network);

    assert_eq!(brief.id.as_deref(), Some("net1"));
    assert_eq!(brief.name.as_deref(), Some("bridge"));
    assert_eq!(brief.driver.as_deref(), Some("bridge"));
    assert_eq!(brief.scope.as_deref(), Some("local"));
}

#[rstest]
fn volume_brief_copies_identity_fields() {
    let volume = Volume {
        name: String::from("data"),
        driver: String::from("local"),
        mountpoint: String::from("/var/lib/docker/volumes/data/_data"),
        ..Volume::default()
    };

    let brief = VolumeBrief::from(volume);

    assert_eq!(brief.name, "data");
    assert_eq!(brief.driver, "local");
    assert_eq!(brief.mountpoint, "/var/lib/docker/volumes/data/_data");
}

#[rstest]
fn container_status_reduces_the_inspect_response() {
    let info = ContainerInspectResponse {
        id: Some(String::from("abc123")),
        name: Some(String::from("/web")),
        created: Some(String::from("2026-01-01T00:00:00Z")),
        ..ContainerInspectResponse::default()
    };

    let status = ContainerStatus::from(info);

    assert_eq!(status.id.as_deref(), Some("abc123"));
    assert_eq!(status.name.as_deref(), Some("web"));
    assert_eq!(status.created.as_deref(), Some("2026-01-01T00:00:00Z"));
    assert!(status.ports.is_empty());
}

#[rstest]
fn format_port_map_renders_sorted_bindings() {
    let mut ports: HashMap<String, Option<Vec<PortBinding>>> = HashMap::new();
    ports.insert(
        String::from("80/tcp"),
        Some(vec![PortBinding {
            host_ip: Some(String::from("0.0.0.0")),
            host_port: Some(String::from("8080")),
        }]),
    );
    ports.insert(String::from("443/tcp"), None);

    assert_eq!(
        format_port_map(&ports),
        vec![
            String::from("443/tcp"),
            String::from("80/tcp -> 0.0.0.0:8080"),
        ]
    );
}

// =============================================================================
// Publication and label parsing
// =============================================================================

#[rstest]
#[case::default_protocol("8080:80", "8080", "80/tcp")]
#[case::explicit_protocol("5353:53/udp", "5353", "53/udp")]
fn publication_parse_accepts_valid_specs(
    #[case] spec: &str,
    #[case] host_port: &str,
    #[case] container_key: &str,
) {
    let publication = PortPublication::parse(spec).expect("spec should parse");
    assert_eq!(publication.host_port(), host_port);
    assert_eq!(publication.container_key(), container_key);
}

#[rstest]
#[case::no_separator("8080")]
#[case::bad_host_port("x:80")]
#[case::bad_container_port("8080:x")]
#[case::empty_container("8080:")]
#[case::empty_protocol("8080:80/")]
fn publication_parse_rejects_malformed_specs(#[case] spec: &str) {
    let result = PortPublication::parse(spec);
    assert!(
        matches!(
            result,
            Err(DockhandError::Daemon(DaemonError::InvalidPortMapping { spec: ref rejected }))
                if rejected == spec
        ),
        "expected InvalidPortMapping, got: {result:?}"
    );
}

#[rstest]
fn parse_label_splits_on_the_first_equals() {
    let (key, value) = parse_label("env=prod=eu").expect("label should parse");
    assert_eq!(key, "env");
    assert_eq!(value, "prod=eu");
}

#[rstest]
#[case::no_equals("justakey")]
#[case::empty_key("=value")]
fn parse_label_rejects_malformed_values(#[case] raw: &str) {
    let result = parse_label(raw);
    assert!(
        matches!(
            result,
            Err(DockhandError::Daemon(DaemonError::InvalidLabel { .. }))
        ),
        "expected InvalidLabel, got: {result:?}"
    );
}

// =============================================================================
// Create-request translation
// =============================================================================

#[rstest]
#[case::empty("")]
#[case::whitespace("   ")]
fn create_request_requires_an_image(#[case] image: &str) {
    let result = CreateContainerRequest::new(image);
    assert!(
        matches!(
            result,
            Err(DockhandError::Daemon(DaemonError::MissingImage))
        ),
        "expected MissingImage, got: {result:?}"
    );
}

#[rstest]
fn create_request_translates_into_the_engine_payload() {
    let labels: HashMap<String, String> =
        [(String::from("env"), String::from("prod"))].into_iter().collect();
    let request = CreateContainerRequest::new("nginx:latest")
        .expect("request should build")
        .with_name(Some(String::from("web")))
        .with_cmd(Some(vec![String::from("nginx"), String::from("-g")]))
        .with_entrypoint(Some(vec![String::from("/entry.sh")]))
        .with_env(Some(vec![String::from("MODE=fast")]))
        .with_labels(Some(labels))
        .with_binds(Some(vec![String::from("/host:/container")]))
        .with_publication(PortPublication::parse("8080:80").expect("spec should parse"));

    let options = request
        .build_create_options()
        .expect("a named request should produce options");
    assert_eq!(options.name.as_deref(), Some("web"));

    let body = request.build_body();
    assert_eq!(body.image.as_deref(), Some("nginx:latest"));
    assert_eq!(
        body.cmd,
        Some(vec![String::from("nginx"), String::from("-g")])
    );
    assert_eq!(body.entrypoint, Some(vec![String::from("/entry.sh")]));
    assert_eq!(body.env, Some(vec![String::from("MODE=fast")]));
    assert_eq!(
        body.labels
            .as_ref()
            .and_then(|labels| labels.get("env"))
            .map(String::as_str),
        Some("prod")
    );

    let exposed = body.exposed_ports.expect("publication should expose a port");
    assert!(exposed.iter().any(|port| port == "80/tcp"));

    let host_config = body.host_config.expect("host config should be set");
    assert_eq!(
        host_config.binds,
        Some(vec![String::from("/host:/container")])
    );
    let bindings = host_config
        .port_bindings
        .expect("publication should bind a port");
    let binding = bindings
        .get("80/tcp")
        .and_then(Option::as_ref)
        .and_then(|list| list.first())
        .expect("one binding expected");
    assert_eq!(binding.host_port.as_deref(), Some("8080"));
}

#[rstest]
fn bare_request_omits_optional_payload_sections() {
    let request = CreateContainerRequest::new("alpine").expect("request should build");

    assert!(request.build_create_options().is_none());

    let body = request.build_body();
    assert_eq!(body.image.as_deref(), Some("alpine"));
    assert!(body.cmd.is_none());
    assert!(body.exposed_ports.is_none());
    assert!(body.host_config.is_none());
}

#[rstest]
fn blank_names_are_discarded() {
    let request = CreateContainerRequest::new("alpine")
        .expect("request should build")
        .with_name(Some(String::from("   ")));

    assert!(request.build_create_options().is_none());
}
