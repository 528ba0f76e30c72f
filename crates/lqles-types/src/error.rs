use thiserror::Error;

#[derive(Error, Debug)]
pub enum LqlesError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Boundary type {token:?} in {axis} direction is not valid")]
    InvalidBoundary { axis: String, token: String },

    #[error("Mismatched repeating boundary conditions: {low} {high} in {axis} direction")]
    MismatchedPeriodic {
        axis: String,
        low: String,
        high: String,
    },

    #[error("Stencil constraint violated: {0}")]
    PhysicsViolation(String),

    #[error("Linear algebra error: {0}")]
    LinAlg(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("NPY error: {0}")]
    Npy(String),
}

impl LqlesError {
    /// True for every variant raised while checking the case definition,
    /// before any numeric work starts.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            LqlesError::ConfigError(_)
                | LqlesError::InvalidBoundary { .. }
                | LqlesError::MismatchedPeriodic { .. }
                | LqlesError::Json(_)
        )
    }
}

pub type LqlesResult<T> = Result<T, LqlesError>;
