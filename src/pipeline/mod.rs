pub mod classifier;
pub mod stages;

use crate::dataset::{CATEGORY, PRIMARY_TEXT, SECONDARY_TEXT};
use crate::error::BenchResult;
use crate::frame::Frame;

pub use classifier::{ClassifierKind, LinearClassifier, TreeEnsembleClassifier};
pub use stages::{
    HashingVectorizer, IdfWeighter, LabelIndexer, StopWordsRemover, Tokenizer, VectorAssembler,
};

/// Feature dimensionality of each hashed text column.
pub const HASH_DIM: usize = 1000;

/// Column the label indexer writes and classifiers read.
pub const LABEL: &str = "label";
/// Column fitted classifiers write.
pub const PREDICTION: &str = "prediction";
/// Combined feature column the terminal classifier consumes.
pub const FEATURES: &str = "features";

/// A fitted stage: rewrites a frame, typically adding one column.
pub trait Transformer {
    fn transform(&self, frame: &Frame) -> BenchResult<Frame>;
    fn name(&self) -> &str;
}

/// A trainable stage: fitting yields a [`Transformer`].
pub trait Estimator {
    fn fit(&self, frame: &Frame) -> BenchResult<Box<dyn Transformer>>;
    fn name(&self) -> &str;
}

/// One slot in a pipeline: either already a transformer or an
/// estimator that must be fitted first.
pub enum PipelineStage {
    Transform(Box<dyn Transformer>),
    Estimate(Box<dyn Estimator>),
}

/// An ordered sequence of stages ending in a terminal estimator,
/// fitted as a unit.
pub struct Pipeline {
    stages: Vec<PipelineStage>,
}

impl Pipeline {
    pub fn new(stages: Vec<PipelineStage>) -> Self {
        Pipeline { stages }
    }

    /// Fits the pipeline on `train`: estimator stages are fitted
    /// against the frame as transformed by everything before them, and
    /// each stage's output feeds the next.
    pub fn fit(self, train: &Frame) -> BenchResult<FittedPipeline> {
        let mut current = train.clone();
        let mut fitted: Vec<Box<dyn Transformer>> = Vec::with_capacity(self.stages.len());
        for stage in self.stages {
            let transformer = match stage {
                PipelineStage::Transform(t) => t,
                PipelineStage::Estimate(e) => e.fit(&current)?,
            };
            current = transformer.transform(&current)?;
            fitted.push(transformer);
        }
        Ok(FittedPipeline { stages: fitted })
    }
}

/// The result of fitting a [`Pipeline`]: applies every fitted stage in
/// order, producing a frame with a `prediction` column.
pub struct FittedPipeline {
    stages: Vec<Box<dyn Transformer>>,
}

impl FittedPipeline {
    pub fn transform(&self, frame: &Frame) -> BenchResult<Frame> {
        let mut current = frame.clone();
        for stage in &self.stages {
            current = stage.transform(&current)?;
        }
        Ok(current)
    }
}

/// Assembles the text-classification pipeline.
pub struct PipelineFactory;

impl PipelineFactory {
    /// Feature stages plus a terminal estimator, in order. This is the
    /// generic factory contract; [`classification_pipeline`] is the
    /// concrete assembly the harness uses.
    ///
    /// [`classification_pipeline`]: PipelineFactory::classification_pipeline
    pub fn with_stages(
        mut stages: Vec<PipelineStage>,
        terminal: Box<dyn Estimator>,
    ) -> Pipeline {
        stages.push(PipelineStage::Estimate(terminal));
        Pipeline::new(stages)
    }

    /// The full benchmark pipeline: tokenize, de-stopword, hash, and
    /// IDF-weight each text column independently; index the category
    /// into a numeric label with a catch-all for unseen values;
    /// assemble both weighted vectors; classify with `kind`.
    pub fn classification_pipeline(kind: ClassifierKind) -> Pipeline {
        let mut stages: Vec<PipelineStage> = Vec::new();
        for column in [PRIMARY_TEXT, SECONDARY_TEXT] {
            let tokens = format!("{}_tokens", column);
            let terms = format!("{}_terms", column);
            let tf = format!("{}_tf", column);
            let weighted = format!("{}_features", column);
            stages.push(PipelineStage::Transform(Box::new(Tokenizer::new(
                column, &tokens,
            ))));
            stages.push(PipelineStage::Transform(Box::new(StopWordsRemover::new(
                &tokens, &terms,
            ))));
            stages.push(PipelineStage::Transform(Box::new(HashingVectorizer::new(
                &terms, &tf, HASH_DIM,
            ))));
            stages.push(PipelineStage::Estimate(Box::new(IdfWeighter::new(
                &tf, &weighted,
            ))));
        }
        stages.push(PipelineStage::Estimate(Box::new(LabelIndexer::new(
            CATEGORY, LABEL,
        ))));
        let primary_features = format!("{}_features", PRIMARY_TEXT);
        let secondary_features = format!("{}_features", SECONDARY_TEXT);
        stages.push(PipelineStage::Transform(Box::new(VectorAssembler::new(
            &[primary_features.as_str(), secondary_features.as_str()],
            FEATURES,
        ))));

        let terminal: Box<dyn Estimator> = match kind {
            ClassifierKind::TreeEnsemble => {
                Box::new(TreeEnsembleClassifier::new(FEATURES, LABEL, PREDICTION))
            }
            ClassifierKind::Linear => {
                Box::new(LinearClassifier::new(FEATURES, LABEL, PREDICTION))
            }
        };
        PipelineFactory::with_stages(stages, terminal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Column;

    fn text_frame(rows: &[(&str, &str, &str)]) -> Frame {
        let mut frame = Frame::new();
        frame
            .insert(
                CATEGORY,
                Column::Str(rows.iter().map(|(c, _, _)| Some(c.to_string())).collect()),
            )
            .unwrap();
        frame
            .insert(
                PRIMARY_TEXT,
                Column::Str(rows.iter().map(|(_, p, _)| Some(p.to_string())).collect()),
            )
            .unwrap();
        frame
            .insert(
                SECONDARY_TEXT,
                Column::Str(rows.iter().map(|(_, _, s)| Some(s.to_string())).collect()),
            )
            .unwrap();
        frame
    }

    #[test]
    fn fitted_pipeline_emits_predictions_for_every_row() {
        let train = text_frame(&[
            ("news", "election results tonight", "parliament vote count"),
            ("news", "election polls open", "ballot stations busy"),
            ("sports", "midfield goal scored", "league match recap"),
            ("sports", "keeper saves penalty", "cup final highlights"),
        ]);
        let pipeline = PipelineFactory::classification_pipeline(ClassifierKind::Linear);
        let fitted = pipeline.fit(&train).unwrap();

        let scored = fitted.transform(&train).unwrap();
        let predictions = scored.nums(PREDICTION).unwrap();
        assert_eq!(predictions.len(), train.len());
        for &p in predictions {
            assert!(p >= 0.0);
            assert_eq!(p.fract(), 0.0);
        }
    }

    #[test]
    fn assembled_features_concatenate_both_text_columns() {
        let train = text_frame(&[("news", "alpha beta", "gamma delta")]);
        let pipeline = PipelineFactory::classification_pipeline(ClassifierKind::Linear);
        let fitted = pipeline.fit(&train).unwrap();
        let scored = fitted.transform(&train).unwrap();
        let features = scored.vectors(FEATURES).unwrap();
        assert_eq!(features[0].len(), 2 * HASH_DIM);
    }

    #[test]
    fn factory_contract_appends_terminal_estimator() {
        let train = text_frame(&[("news", "alpha", "beta"), ("sports", "gamma", "delta")]);
        let stages: Vec<PipelineStage> = vec![
            PipelineStage::Transform(Box::new(Tokenizer::new(PRIMARY_TEXT, "tokens"))),
            PipelineStage::Transform(Box::new(HashingVectorizer::new(
                "tokens", FEATURES, HASH_DIM,
            ))),
            PipelineStage::Estimate(Box::new(LabelIndexer::new(CATEGORY, LABEL))),
        ];
        let terminal: Box<dyn Estimator> =
            Box::new(LinearClassifier::new(FEATURES, LABEL, PREDICTION));
        let fitted = PipelineFactory::with_stages(stages, terminal)
            .fit(&train)
            .unwrap();
        let scored = fitted.transform(&train).unwrap();
        assert!(scored.has_column(PREDICTION));
    }
}
