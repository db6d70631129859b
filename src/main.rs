//! `dockhand` application entry point.
//!
//! The binary resolves the daemon endpoint exactly once from the
//! environment indicators (with an optional `--host` override), constructs
//! a single client from the resolved descriptor, and dispatches to the
//! requested operation. `eyre` provides opaque error handling at this
//! boundary, converting domain-specific errors into human-readable
//! reports.

use std::collections::HashMap;

use bollard::Docker;
use clap::Parser;
use eyre::{Result as EyreResult, eyre};
use mockable::DefaultEnv;

use dockhand::cli::{Cli, Commands, CreateArgs, DiagnoseArgs};
use dockhand::diagnostics::{ConnectionDiagnostics, DiagnosticReport, Stage, StageOutcome};
use dockhand::endpoint::{EndpointIndicators, ResolvedEndpoint};
use dockhand::engine::EngineConnector;
use dockhand::error::Result as DockhandResult;
use dockhand::ops::{self, CreateContainerRequest, PortPublication};

/// Application entry point.
///
/// Captures connection indicators, resolves them into an endpoint
/// descriptor, and executes the selected subcommand against it.
#[tokio::main]
async fn main() -> EyreResult<()> {
    let cli = Cli::parse();

    let env = DefaultEnv::new();
    let mut indicators = EndpointIndicators::from_env(&env);
    if cli.host.is_some() {
        indicators.endpoint = cli.host.clone();
    }

    let resolved = indicators.resolve()?;
    render_warnings(&resolved);

    run(&cli, &resolved).await
}

/// Execute the CLI command against the resolved endpoint.
async fn run(cli: &Cli, resolved: &ResolvedEndpoint) -> EyreResult<()> {
    match &cli.command {
        Commands::Diagnose(args) => diagnose(resolved, args).await,
        Commands::Ps(args) => print_json(&ops::list_containers(&client(resolved)?, args.all).await?),
        Commands::Images(args) => print_json(&ops::list_images(&client(resolved)?, args.all).await?),
        Commands::Networks => print_json(&ops::list_networks(&client(resolved)?).await?),
        Commands::Volumes => print_json(&ops::list_volumes(&client(resolved)?).await?),
        Commands::Info => print_json(&ops::system_info(&client(resolved)?).await?),
        Commands::Create(args) => {
            let request = build_request(args)?;
            print_json(&ops::create_container(&client(resolved)?, &request).await?)
        }
        Commands::Run(args) => {
            let request = build_request(args)?;
            print_json(&ops::run_container(&client(resolved)?, &request).await?)
        }
        Commands::Start(args) => {
            print_json(&ops::start_container(&client(resolved)?, &args.container).await?)
        }
        Commands::Stop(args) => print_json(
            &ops::stop_container(&client(resolved)?, &args.container, args.timeout).await?,
        ),
        Commands::Rm(args) => {
            ops::remove_container(&client(resolved)?, &args.container, args.force, args.volumes)
                .await?;
            print_json(&serde_json::json!({
                "status": "removed",
                "container": args.container,
            }))
        }
        Commands::Inspect(args) => {
            print_json(&ops::inspect_container(&client(resolved)?, &args.container).await?)
        }
        Commands::Logs(args) => {
            let logs =
                ops::container_logs(&client(resolved)?, &args.container, args.tail).await?;
            print_text(&logs);
            Ok(())
        }
        Commands::Pull(args) => print_json(&ops::pull_image(&client(resolved)?, &args.image).await?),
    }
}

/// Construct the daemon client for the resolved endpoint.
fn client(resolved: &ResolvedEndpoint) -> DockhandResult<Docker> {
    EngineConnector::connect(&resolved.descriptor)
}

/// Run the staged diagnostics and render or emit the report.
///
/// Exits with an error (and therefore a non-zero code) when the overall
/// outcome is a failure; a degraded report still succeeds.
async fn diagnose(resolved: &ResolvedEndpoint, args: &DiagnoseArgs) -> EyreResult<()> {
    let report = ConnectionDiagnostics::run(&resolved.descriptor).await;
    if args.json {
        print_json(&report)?;
    } else {
        render_report(&report);
    }

    if report.overall() == StageOutcome::Fail {
        return Err(eyre!("connection diagnostics reported failures"));
    }
    Ok(())
}

/// Translate `create`/`run` arguments into an engine create request.
fn build_request(args: &CreateArgs) -> DockhandResult<CreateContainerRequest> {
    let mut request = CreateContainerRequest::new(&args.image)?
        .with_name(args.name.clone())
        .with_cmd(non_empty(&args.command))
        .with_entrypoint(non_empty(&args.entrypoint))
        .with_env(non_empty(&args.env))
        .with_binds(non_empty(&args.binds));

    if !args.labels.is_empty() {
        let labels = args
            .labels
            .iter()
            .map(|raw| ops::parse_label(raw))
            .collect::<DockhandResult<HashMap<_, _>>>()?;
        request = request.with_labels(Some(labels));
    }
    for spec in &args.publish {
        request = request.with_publication(PortPublication::parse(spec)?);
    }
    Ok(request)
}

/// An empty argument list means "not provided".
fn non_empty(values: &[String]) -> Option<Vec<String>> {
    (!values.is_empty()).then(|| values.to_vec())
}

/// Print resolution warnings to stderr.
#[expect(
    clippy::print_stderr,
    reason = "warnings go to stderr so machine-readable stdout stays clean"
)]
fn render_warnings(resolved: &ResolvedEndpoint) {
    for warning in &resolved.warnings {
        eprintln!("warning: {warning}");
    }
}

/// Print a value as pretty JSON on stdout.
#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn print_json<T: serde::Serialize>(value: &T) -> EyreResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print raw text on stdout.
#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn print_text(text: &str) {
    println!("{text}");
}

/// Render a diagnostic report for a terminal.
#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn render_report(report: &DiagnosticReport) {
    for stage in report.stages() {
        println!("\n{} {}: {}", glyph(stage.outcome()), stage.stage(), stage.outcome());
        for message in stage.messages() {
            println!("    {message}");
        }
    }
    println!("\n{} overall: {}", glyph(report.overall()), report.overall());

    if report.overall() == StageOutcome::Fail {
        render_recommendations(report);
    }
}

/// Terminal glyph for a stage outcome.
const fn glyph(outcome: StageOutcome) -> char {
    match outcome {
        StageOutcome::Pass => '✓',
        StageOutcome::Warn => '⚠',
        StageOutcome::Fail => '✗',
    }
}

/// Whether a stage ran and failed.
fn stage_failed(report: &DiagnosticReport, stage: Stage) -> bool {
    report
        .stage(stage)
        .is_some_and(|result| result.outcome() == StageOutcome::Fail)
}

/// Render remediation guidance for the failed stages.
#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn render_recommendations(report: &DiagnosticReport) {
    println!("\nrecommendations:");
    if stage_failed(report, Stage::Certificates) {
        println!("  - ensure ca.pem, cert.pem, and key.pem exist and are readable in DOCKER_CERT_PATH");
    }
    if stage_failed(report, Stage::Connectivity) {
        println!("  - local daemon: ensure the engine is running and the socket is readable");
        println!("  - remote daemon (tcp): verify DOCKER_HOST, and that the daemon listens on TCP (2375/2376)");
        println!("  - remote daemon (tls): set DOCKER_TLS_VERIFY=1 and point DOCKER_CERT_PATH at the certificate directory");
        println!("  - ssh tunnel: forward the remote socket to a local port, then target tcp://localhost:<port>");
    }
    if stage_failed(report, Stage::Operations) {
        println!("  - the daemon accepted the connection but rejected calls; check daemon logs and account permissions");
    }
}
