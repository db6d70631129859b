//! Command-line argument definitions for dockhand.

use clap::{Parser, Subcommand};

use crate::ops::{DEFAULT_LOG_TAIL, DEFAULT_STOP_TIMEOUT_SECS};

/// Command-line interface for dockhand.
#[derive(Debug, Parser)]
#[command(name = "dockhand")]
#[command(
    author,
    version,
    about = "Remote-operations passthrough and connection diagnostics for container-engine daemons"
)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Daemon endpoint URI, overriding the environment indicator.
    #[arg(long, global = true)]
    pub host: Option<String>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Probe the daemon connection and print a staged diagnostic report.
    Diagnose(DiagnoseArgs),

    /// List containers.
    Ps(PsArgs),

    /// List images.
    Images(ImagesArgs),

    /// List networks.
    Networks,

    /// List volumes.
    Volumes,

    /// Show daemon system information.
    Info,

    /// Create a container without starting it.
    Create(CreateArgs),

    /// Create and start a container.
    Run(CreateArgs),

    /// Start a stopped container.
    Start(ContainerArg),

    /// Stop a running container.
    Stop(StopArgs),

    /// Remove a container.
    Rm(RmArgs),

    /// Show the engine's full inspect document for a container.
    Inspect(ContainerArg),

    /// Fetch logs from a container.
    Logs(LogsArgs),

    /// Pull an image from a registry.
    Pull(PullArgs),
}

/// Arguments for the `diagnose` subcommand.
#[derive(Debug, Parser)]
pub struct DiagnoseArgs {
    /// Emit the report as JSON instead of rendering it.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `ps` subcommand.
#[derive(Debug, Parser)]
pub struct PsArgs {
    /// Show all containers, not just running ones.
    #[arg(long, short = 'a')]
    pub all: bool,
}

/// Arguments for the `images` subcommand.
#[derive(Debug, Parser)]
pub struct ImagesArgs {
    /// Include intermediate images.
    #[arg(long, short = 'a')]
    pub all: bool,
}

/// Arguments for the `create` and `run` subcommands.
#[derive(Debug, Parser)]
pub struct CreateArgs {
    /// Image reference (e.g. `nginx:latest`).
    #[arg(required = true)]
    pub image: String,

    /// Container name.
    #[arg(long)]
    pub name: Option<String>,

    /// Environment entries in KEY=VALUE form; repeatable.
    #[arg(long = "env", short = 'e')]
    pub env: Vec<String>,

    /// Labels in KEY=VALUE form; repeatable.
    #[arg(long = "label")]
    pub labels: Vec<String>,

    /// Port publications in HOST:CONTAINER[/PROTOCOL] form; repeatable.
    #[arg(long = "publish", short = 'p')]
    pub publish: Vec<String>,

    /// Volume binds in HOST:CONTAINER[:MODE] form; repeatable.
    #[arg(long = "bind")]
    pub binds: Vec<String>,

    /// Entrypoint element, overriding the image's; repeatable.
    #[arg(long = "entrypoint")]
    pub entrypoint: Vec<String>,

    /// Command to run in the container.
    #[arg(trailing_var_arg = true)]
    pub command: Vec<String>,
}

/// A single container ID or name argument.
#[derive(Debug, Parser)]
pub struct ContainerArg {
    /// Container ID or name.
    #[arg(required = true)]
    pub container: String,
}

/// Arguments for the `stop` subcommand.
#[derive(Debug, Parser)]
pub struct StopArgs {
    /// Container ID or name.
    #[arg(required = true)]
    pub container: String,

    /// Seconds to wait before killing the container.
    #[arg(long, default_value_t = DEFAULT_STOP_TIMEOUT_SECS)]
    pub timeout: i32,
}

/// Arguments for the `rm` subcommand.
#[derive(Debug, Parser)]
pub struct RmArgs {
    /// Container ID or name.
    #[arg(required = true)]
    pub container: String,

    /// Force removal of a running container.
    #[arg(long, short = 'f')]
    pub force: bool,

    /// Remove associated anonymous volumes.
    #[arg(long)]
    pub volumes: bool,
}

/// Arguments for the `logs` subcommand.
#[derive(Debug, Parser)]
pub struct LogsArgs {
    /// Container ID or name.
    #[arg(required = true)]
    pub container: String,

    /// Number of lines to show from the end of the logs.
    #[arg(long, default_value_t = DEFAULT_LOG_TAIL)]
    pub tail: i64,
}

/// Arguments for the `pull` subcommand.
#[derive(Debug, Parser)]
pub struct PullArgs {
    /// Image reference with optional tag (e.g. `nginx:latest`).
    #[arg(required = true)]
    pub image: String,
}
