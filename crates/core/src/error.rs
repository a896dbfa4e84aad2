use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvalError {
    #[error("Length mismatch: {left} has {left_len} elements, {right} has {right_len}")]
    LengthMismatch {
        left: &'static str,
        left_len: usize,
        right: &'static str,
        right_len: usize,
    },

    #[error("Empty input: {what} must contain at least one element")]
    EmptyInput { what: &'static str },

    #[error("Threshold estimation failed: {reason}{}", fmt_threshold(.threshold))]
    EstimationFailure {
        reason: String,
        threshold: Option<f64>,
    },

    #[error("Invalid label {value} at index {index} (labels must be 0 or 1)")]
    InvalidLabel { index: usize, value: u8 },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(String),
}

impl EvalError {
    pub fn estimation(reason: impl Into<String>) -> Self {
        Self::EstimationFailure {
            reason: reason.into(),
            threshold: None,
        }
    }
}

impl From<serde_json::Error> for EvalError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialize(e.to_string())
    }
}

fn fmt_threshold(threshold: &Option<f64>) -> String {
    match threshold {
        Some(t) => format!(" (threshold = {t})"),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, EvalError>;
