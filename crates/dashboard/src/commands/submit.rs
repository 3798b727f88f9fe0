use chrono::Utc;
use farmvibes_common::params::build_parameters;
use farmvibes_common::{DateRangeDraft, GeoJson, SubmissionDraft, ValidationError};
use std::path::PathBuf;

use super::{runs, CommandError, Context};
use crate::submission::{read_geometry, submit_draft};

/// Everything `submit` collects from the command line.
#[derive(Debug, Clone, Default)]
pub struct SubmitRequest {
    pub workflow: Option<String>,
    pub name: String,
    pub geometry: Option<PathBuf>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub last_days: Option<u32>,
    pub params: Vec<String>,
    pub follow: bool,
}

impl SubmitRequest {
    fn date_range(&self) -> Result<DateRangeDraft, ValidationError> {
        match self.last_days {
            Some(days) => DateRangeDraft::last_days(days, Utc::now().date_naive()),
            None => Ok(DateRangeDraft::new(self.start.clone(), self.end.clone())),
        }
    }
}

fn describe_geometry(geometry: &GeoJson) -> String {
    let count = geometry.feature_count();
    format!(
        "Area of interest: {} ({count} feature{})",
        geometry.geometry_type.as_str(),
        if count == 1 { "" } else { "s" }
    )
}

pub async fn submit(ctx: &Context, request: SubmitRequest) -> Result<(), CommandError> {
    let geometry = match &request.geometry {
        Some(path) => Some(read_geometry(path)?),
        None => None,
    };
    if let Some(geometry) = &geometry {
        println!("{}", describe_geometry(geometry));
    }
    let mut draft = SubmissionDraft {
        workflow: request.workflow.clone(),
        name: request.name.clone(),
        geometry,
        time_range: request.date_range()?,
        ..SubmissionDraft::default()
    };

    // Reject an incomplete draft before talking to the service at all.
    draft.validate()?;

    if let Some(workflow_name) = &draft.workflow {
        let workflow = ctx.client.describe_workflow(workflow_name).await?;
        draft.parameters = build_parameters(&workflow, request.params.iter().map(String::as_str))?;
    }

    let run = submit_draft(&ctx.client, &draft).await?;
    println!("Submitted run '{}' ({}).", run.name, run.id);

    if request.follow {
        runs::show(ctx, &run.id, true).await?;
    }
    Ok(())
}
