//! Image passthrough operations.

use bollard::Docker;
use bollard::models::ImageSummary;
use bollard::query_parameters::{CreateImageOptionsBuilder, ListImagesOptionsBuilder};
use futures_util::TryStreamExt;
use serde::Serialize;

use super::op_failed;
use crate::error::Result;

/// Compact view of one image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageBrief {
    /// Content-addressable image ID.
    pub id: String,
    /// Repository tags pointing at this image.
    pub repo_tags: Vec<String>,
    /// Creation time as a Unix timestamp.
    pub created: i64,
    /// Image size in bytes.
    pub size: i64,
}

impl From<ImageSummary> for ImageBrief {
    fn from(summary: ImageSummary) -> Self {
        Self {
            id: summary.id,
            repo_tags: summary.repo_tags,
            created: summary.created,
            size: summary.size,
        }
    }
}

/// Outcome of a completed image pull.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullOutcome {
    /// The image reference that was pulled.
    pub image: String,
    /// The final status line reported by the registry stream.
    pub status: String,
}

/// List images.
///
/// # Errors
///
/// Returns `DaemonError::OperationFailed` when the daemon rejects the
/// call.
pub async fn list_images(docker: &Docker, all: bool) -> Result<Vec<ImageBrief>> {
    let options = ListImagesOptionsBuilder::default().all(all).build();
    let summaries = docker
        .list_images(Some(options))
        .await
        .map_err(|error| op_failed("list images", &error))?;
    Ok(summaries.into_iter().map(ImageBrief::from).collect())
}

/// Pull an image from a registry.
///
/// The registry progress stream is drained to its terminal event; the
/// pull is complete only once the stream ends.
///
/// # Errors
///
/// Returns `DaemonError::OperationFailed` when the daemon rejects the
/// pull or the progress stream reports an error.
pub async fn pull_image(docker: &Docker, image: &str) -> Result<PullOutcome> {
    let options = CreateImageOptionsBuilder::default().from_image(image).build();
    let progress: Vec<_> = docker
        .create_image(Some(options), None, None)
        .try_collect()
        .await
        .map_err(|error| op_failed("pull image", &error))?;

    let status = progress
        .iter()
        .rev()
        .find_map(|event| event.status.clone())
        .unwrap_or_else(|| String::from("pulled"));

    Ok(PullOutcome {
        image: String::from(image),
        status,
    })
}
