use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::BenchResult;
use crate::frame::{Column, Frame};
use crate::pipeline::{Estimator, Transformer};

/// Terminal estimator selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierKind {
    TreeEnsemble,
    Linear,
}

/// Fixed ensemble size for the tree classifier.
pub const ENSEMBLE_SIZE: usize = 20;
/// Iteration cap for the linear classifier.
pub const MAX_ITERATIONS: usize = 100;

const LEARNING_RATE: f64 = 0.5;
const STUMP_CANDIDATE_FEATURES: usize = 32;
const ENSEMBLE_SEED: u64 = 17;

fn majority_label(labels: &[f64]) -> f64 {
    let mut counts: Vec<usize> = Vec::new();
    for &label in labels {
        let index = label as usize;
        if index >= counts.len() {
            counts.resize(index + 1, 0);
        }
        counts[index] += 1;
    }
    counts
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(&a.0)))
        .map(|(label, _)| label as f64)
        .unwrap_or(0.0)
}

/// Multinomial linear classifier trained by full-batch gradient
/// descent on the softmax objective, with a fixed iteration cap.
pub struct LinearClassifier {
    features: String,
    label: String,
    prediction: String,
    max_iterations: usize,
    learning_rate: f64,
}

impl LinearClassifier {
    pub fn new(features: &str, label: &str, prediction: &str) -> Self {
        LinearClassifier {
            features: features.to_string(),
            label: label.to_string(),
            prediction: prediction.to_string(),
            max_iterations: MAX_ITERATIONS,
            learning_rate: LEARNING_RATE,
        }
    }
}

impl Estimator for LinearClassifier {
    fn fit(&self, frame: &Frame) -> BenchResult<Box<dyn Transformer>> {
        let x = frame.vectors(&self.features)?;
        let y = frame.nums(&self.label)?;
        let dim = x.first().map(|v| v.len()).unwrap_or(0);
        let num_classes = y
            .iter()
            .map(|&label| label as usize + 1)
            .max()
            .unwrap_or(1);

        // weights[c] holds `dim` feature weights plus a trailing bias.
        let mut weights = vec![vec![0.0_f64; dim + 1]; num_classes];
        let n = x.len() as f64;
        for _ in 0..self.max_iterations {
            if x.is_empty() {
                break;
            }
            let mut gradient = vec![vec![0.0_f64; dim + 1]; num_classes];
            for (vector, &label) in x.iter().zip(y) {
                let probabilities = softmax(&weights, vector);
                for (class, p) in probabilities.iter().enumerate() {
                    let error = p - if class == label as usize { 1.0 } else { 0.0 };
                    for (g, &value) in gradient[class].iter_mut().zip(vector) {
                        *g += error * value;
                    }
                    gradient[class][dim] += error;
                }
            }
            for (row, grad) in weights.iter_mut().zip(&gradient) {
                for (w, &g) in row.iter_mut().zip(grad) {
                    *w -= self.learning_rate * g / n;
                }
            }
        }

        Ok(Box::new(FittedLinear {
            features: self.features.clone(),
            prediction: self.prediction.clone(),
            weights,
        }))
    }

    fn name(&self) -> &str {
        "linear_classifier"
    }
}

fn softmax(weights: &[Vec<f64>], vector: &[f64]) -> Vec<f64> {
    let scores: Vec<f64> = weights
        .iter()
        .map(|row| {
            let dim = row.len() - 1;
            row[..dim]
                .iter()
                .zip(vector)
                .map(|(&w, &v)| w * v)
                .sum::<f64>()
                + row[dim]
        })
        .collect();
    let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|&s| (s - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

struct FittedLinear {
    features: String,
    prediction: String,
    weights: Vec<Vec<f64>>,
}

impl Transformer for FittedLinear {
    fn transform(&self, frame: &Frame) -> BenchResult<Frame> {
        let predictions: Vec<f64> = frame
            .vectors(&self.features)?
            .iter()
            .map(|vector| {
                let probabilities = softmax(&self.weights, vector);
                argmax(&probabilities)
            })
            .collect();
        let mut out = frame.clone();
        out.insert(&self.prediction, Column::Num(predictions))?;
        Ok(out)
    }

    fn name(&self) -> &str {
        "linear_classifier"
    }
}

fn argmax(values: &[f64]) -> f64 {
    let mut best = 0;
    for (index, &value) in values.iter().enumerate() {
        if value > values[best] {
            best = index;
        }
    }
    best as f64
}

/// Ensemble of depth-one decision trees with a fixed ensemble size.
/// Each tree examines a random subset of candidate features and keeps
/// the single threshold split that classifies the training rows best;
/// prediction is a majority vote. Seeded, so fitting is deterministic.
pub struct TreeEnsembleClassifier {
    features: String,
    label: String,
    prediction: String,
    num_trees: usize,
    seed: u64,
}

impl TreeEnsembleClassifier {
    pub fn new(features: &str, label: &str, prediction: &str) -> Self {
        TreeEnsembleClassifier {
            features: features.to_string(),
            label: label.to_string(),
            prediction: prediction.to_string(),
            num_trees: ENSEMBLE_SIZE,
            seed: ENSEMBLE_SEED,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Stump {
    feature: usize,
    threshold: f64,
    below: f64,
    above: f64,
}

impl Stump {
    fn predict(&self, vector: &[f64]) -> f64 {
        if vector.get(self.feature).copied().unwrap_or(0.0) <= self.threshold {
            self.below
        } else {
            self.above
        }
    }
}

impl Estimator for TreeEnsembleClassifier {
    fn fit(&self, frame: &Frame) -> BenchResult<Box<dyn Transformer>> {
        let x = frame.vectors(&self.features)?;
        let y = frame.nums(&self.label)?;
        let dim = x.first().map(|v| v.len()).unwrap_or(0);
        let majority = majority_label(y);
        let num_classes = y
            .iter()
            .map(|&label| label as usize + 1)
            .max()
            .unwrap_or(1);

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut stumps = Vec::with_capacity(self.num_trees);
        if dim > 0 && !x.is_empty() {
            for _ in 0..self.num_trees {
                let mut best: Option<(usize, Stump)> = None;
                for _ in 0..STUMP_CANDIDATE_FEATURES {
                    let feature = rng.gen_range(0..dim);
                    let stump = build_stump(x, y, feature, majority);
                    let correct = x
                        .iter()
                        .zip(y)
                        .filter(|(vector, &label)| stump.predict(vector) == label)
                        .count();
                    if best.map(|(c, _)| correct > c).unwrap_or(true) {
                        best = Some((correct, stump));
                    }
                }
                if let Some((_, stump)) = best {
                    stumps.push(stump);
                }
            }
        }

        Ok(Box::new(FittedTreeEnsemble {
            features: self.features.clone(),
            prediction: self.prediction.clone(),
            stumps,
            majority,
            num_classes,
        }))
    }

    fn name(&self) -> &str {
        "tree_ensemble_classifier"
    }
}

fn build_stump(x: &[Vec<f64>], y: &[f64], feature: usize, majority: f64) -> Stump {
    let threshold = x.iter().map(|v| v[feature]).sum::<f64>() / x.len() as f64;
    let mut below = Vec::new();
    let mut above = Vec::new();
    for (vector, &label) in x.iter().zip(y) {
        if vector[feature] <= threshold {
            below.push(label);
        } else {
            above.push(label);
        }
    }
    Stump {
        feature,
        threshold,
        below: if below.is_empty() {
            majority
        } else {
            majority_label(&below)
        },
        above: if above.is_empty() {
            majority
        } else {
            majority_label(&above)
        },
    }
}

struct FittedTreeEnsemble {
    features: String,
    prediction: String,
    stumps: Vec<Stump>,
    majority: f64,
    num_classes: usize,
}

impl Transformer for FittedTreeEnsemble {
    fn transform(&self, frame: &Frame) -> BenchResult<Frame> {
        let predictions: Vec<f64> = frame
            .vectors(&self.features)?
            .iter()
            .map(|vector| {
                if self.stumps.is_empty() {
                    return self.majority;
                }
                let mut votes = vec![0usize; self.num_classes];
                for stump in &self.stumps {
                    let predicted = stump.predict(vector) as usize;
                    if predicted < votes.len() {
                        votes[predicted] += 1;
                    }
                }
                let mut best = 0;
                for (class, &count) in votes.iter().enumerate() {
                    if count > votes[best] {
                        best = class;
                    }
                }
                best as f64
            })
            .collect();
        let mut out = frame.clone();
        out.insert(&self.prediction, Column::Num(predictions))?;
        Ok(out)
    }

    fn name(&self) -> &str {
        "tree_ensemble_classifier"
    }
}
