//! JSON evaluation inputs.
//!
//! A file holds either one input object or an array of them:
//!
//! ```json
//! { "name": "machine-1-1", "init_score": [0.1, 0.3], "score": [0.2, 2.5], "label": [0, 1] }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use tsad_core::{EvalError, Result};

/// Scores and labels for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationInput {
    #[serde(default)]
    pub name: Option<String>,
    /// Calibration scores (typically the training-set scores).
    pub init_score: Vec<f64>,
    /// Operational scores to threshold.
    pub score: Vec<f64>,
    /// Ground-truth labels, parallel to `score`.
    pub label: Vec<u8>,
}

impl EvaluationInput {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("(unnamed)")
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum InputFile {
    Batch(Vec<EvaluationInput>),
    Single(EvaluationInput),
}

/// Parse inputs from a JSON string.
pub fn parse_inputs(json: &str) -> Result<Vec<EvaluationInput>> {
    let inputs = match serde_json::from_str::<InputFile>(json)? {
        InputFile::Batch(inputs) => inputs,
        InputFile::Single(input) => vec![input],
    };
    if inputs.is_empty() {
        return Err(EvalError::EmptyInput { what: "input file" });
    }
    Ok(inputs)
}

/// Read and parse inputs from a JSON file.
pub fn load_inputs(path: &Path) -> Result<Vec<EvaluationInput>> {
    let raw = std::fs::read_to_string(path)?;
    parse_inputs(&raw)
}
