use crate::error::BenchResult;
use crate::frame::Frame;
use crate::pipeline::{LABEL, PREDICTION};

/// Scores a prediction column against the true label column.
#[derive(Debug, Clone)]
pub struct Evaluator {
    label: String,
    prediction: String,
}

impl Default for Evaluator {
    fn default() -> Self {
        Evaluator {
            label: LABEL.to_string(),
            prediction: PREDICTION.to_string(),
        }
    }
}

impl Evaluator {
    pub fn new(label: &str, prediction: &str) -> Self {
        Evaluator {
            label: label.to_string(),
            prediction: prediction.to_string(),
        }
    }

    /// Fraction of rows whose prediction matches the label, in [0, 1].
    /// A missing column is a configuration error; an empty frame
    /// scores 0.0.
    pub fn accuracy(&self, frame: &Frame) -> BenchResult<f64> {
        let labels = frame.nums(&self.label)?;
        let predictions = frame.nums(&self.prediction)?;
        if labels.is_empty() {
            return Ok(0.0);
        }
        let matches = labels
            .iter()
            .zip(predictions)
            .filter(|(l, p)| l == p)
            .count();
        Ok(matches as f64 / labels.len() as f64)
    }
}
