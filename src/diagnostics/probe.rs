//! Probe seam over the daemon calls used by diagnostics.
//!
//! This abstraction exists to keep stage sequencing testable without a
//! running daemon; the production implementation is a thin delegation to
//! the Bollard client.

use std::future::Future;
use std::pin::Pin;

use bollard::Docker;
use bollard::models::{SystemInfo, SystemVersion};
use bollard::query_parameters::{
    ListContainersOptionsBuilder, ListImagesOptionsBuilder, ListNetworksOptionsBuilder,
    ListVolumesOptionsBuilder,
};

/// Boxed future type returned by [`DaemonProbe`] implementors.
pub type ProbeFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, bollard::errors::Error>> + Send + 'a>>;

/// Behaviour required to probe a daemon during diagnostics.
pub trait DaemonProbe {
    /// Query the daemon's version and identity metadata.
    fn daemon_version(&self) -> ProbeFuture<'_, SystemVersion>;

    /// Count all containers, including stopped ones.
    fn count_containers(&self) -> ProbeFuture<'_, usize>;

    /// Count top-level images.
    fn count_images(&self) -> ProbeFuture<'_, usize>;

    /// Count networks.
    fn count_networks(&self) -> ProbeFuture<'_, usize>;

    /// Count volumes.
    fn count_volumes(&self) -> ProbeFuture<'_, usize>;

    /// Query the daemon's system information.
    fn daemon_info(&self) -> ProbeFuture<'_, SystemInfo>;
}

impl DaemonProbe for Docker {
    fn daemon_version(&self) -> ProbeFuture<'_, SystemVersion> {
        Box::pin(async move { self.version().await })
    }

    fn count_containers(&self) -> ProbeFuture<'_, usize> {
        Box::pin(async move {
            let options = ListContainersOptionsBuilder::default().all(true).build();
            Ok(self.list_containers(Some(options)).await?.len())
        })
    }

    fn count_images(&self) -> ProbeFuture<'_, usize> {
        Box::pin(async move {
            let options = ListImagesOptionsBuilder::default().build();
            Ok(self.list_images(Some(options)).await?.len())
        })
    }

    fn count_networks(&self) -> ProbeFuture<'_, usize> {
        Box::pin(async move {
            let options = ListNetworksOptionsBuilder::default().build();
            Ok(self.list_networks(Some(options)).await?.len())
        })
    }

    fn count_volumes(&self) -> ProbeFuture<'_, usize> {
        Box::pin(async move {
            let options = ListVolumesOptionsBuilder::default().build();
            let response = self.list_volumes(Some(options)).await?;
            Ok(response.volumes.map_or(0, |volumes| volumes.len()))
        })
    }

    fn daemon_info(&self) -> ProbeFuture<'_, SystemInfo> {
        Box::pin(async move { self.info().await })
    }
}
