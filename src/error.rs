use trail_planner_core::home::ReconcileError;
use trail_planner_core::mission::{CollectionError, MissionType};
use trail_planner_core::sync::SyncError;

/// Errors that can occur during planning and vehicle operations.
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error("Timeout waiting for {0}")]
    Timeout(&'static str),

    #[error("Transfer already in progress: {0}")]
    TransferInProgress(MissionType),

    #[error("Vehicle rejected {operation}: {reason}")]
    VehicleRejected {
        operation: &'static str,
        reason: String,
    },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Plan file line {line}: {reason}")]
    PlanFile { line: usize, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Sync error: {0}")]
    Sync(SyncError),

    #[error("Home reconcile error: {0}")]
    Reconcile(ReconcileError),

    #[error("Collection error: {0}")]
    Collection(CollectionError),
}

impl From<SyncError> for PlannerError {
    fn from(err: SyncError) -> Self {
        PlannerError::Sync(err)
    }
}

impl From<ReconcileError> for PlannerError {
    fn from(err: ReconcileError) -> Self {
        PlannerError::Reconcile(err)
    }
}

impl From<CollectionError> for PlannerError {
    fn from(err: CollectionError) -> Self {
        PlannerError::Collection(err)
    }
}

pub type Result<T> = std::result::Result<T, PlannerError>;
