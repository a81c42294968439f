use thiserror::Error;

#[derive(Debug, Error)]
pub enum CascadeError {
    #[error("Invalid sweep: {0}")]
    InvalidSweep(String),

    #[error("Empty stackup: at least one stage is required")]
    EmptyStackup,

    #[error("Stage {stage} ({name}) has no {kind} curve")]
    MissingCurve {
        stage: usize,
        name: String,
        kind: &'static str,
    },

    #[error("Malformed curve '{curve}': {reason}")]
    MalformedCurve { curve: String, reason: String },

    #[error("Degenerate cascade gain before stage {stage} at {freq_hz} Hz (linear gain is zero)")]
    DegenerateGain { stage: usize, freq_hz: u64 },

    #[error("Non-physical noise figure at stage {stage}, {freq_hz} Hz")]
    NonPhysicalNoise { stage: usize, freq_hz: u64 },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CascadeError>;
