//! Turning a draft into a submitted run.

use farmvibes_common::validation::parse_geojson;
use farmvibes_common::{GeoJson, SubmissionDraft, ValidationError, WorkflowRun};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::api::{ApiError, VibeClient};

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Failed to read geometry file {path:?}: {source}")]
    GeometryFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Reads and parses a GeoJSON file.
pub fn read_geometry(path: &Path) -> Result<GeoJson, SubmitError> {
    let text = std::fs::read_to_string(path).map_err(|source| SubmitError::GeometryFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_geojson(&text)?)
}

/// Validates the draft and submits it. An incomplete draft never reaches the
/// service.
pub async fn submit_draft(
    client: &VibeClient,
    draft: &SubmissionDraft,
) -> Result<WorkflowRun, SubmitError> {
    let submission = draft.validate()?;
    let run = client.submit_run(&submission).await?;
    info!(run_id = %run.id, workflow = %run.workflow, "Run submitted.");
    Ok(run)
}
