use crate::models::ModelName;
use thiserror::Error;

/// Failures raised by a margin model, either while loading it or while
/// scoring a feature vector.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model references unknown feature `{0}`")]
    UnknownFeature(String),

    #[error("model expects {expected} features but received {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("model produced a non-finite margin ({0})")]
    NonFinite(f64),

    #[error("model has no members")]
    Empty,

    #[error("model call failed: {0}")]
    Failed(String),
}

/// Run-level failures. Anything here aborts the whole batch; per-game
/// problems are reported as records instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("prediction unavailable for {matchup}")]
    PredictionUnavailable {
        matchup: String,
        #[source]
        source: ModelError,
    },
}

/// One or both teams of a game have no stat record for the season
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no stat record for {}", missing_list(.missing))]
pub struct MissingTeamStats {
    pub missing: Vec<ModelName>,
}

fn missing_list(missing: &[ModelName]) -> String {
    missing
        .iter()
        .map(ModelName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
