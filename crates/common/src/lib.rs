//! Shared data model and pure logic for the FarmVibes dashboard.
//!
//! Nothing in this crate performs I/O: the HTTP client, polling and
//! rendering live in `farmvibes-dashboard`.

pub mod classifier;
pub mod colormap;
pub mod comparison;
pub mod formatting;
pub mod models;
pub mod params;
pub mod validation;
pub mod visualization;

pub use classifier::{OutputKind, classify, resolve_kind};
pub use models::{
    GeoJson, GeometryType, Paginated, RunOutput, RunStatus, RunSubmission, SystemMetrics,
    TimeRange, Workflow, WorkflowInput, WorkflowOutput, WorkflowRun,
};
pub use validation::{DateRangeDraft, SubmissionDraft, ValidationError};
pub use visualization::Visualization;
