use std::hash::{Hash, Hasher};

use rustc_hash::{FxHashMap, FxHasher};

use crate::error::BenchResult;
use crate::frame::{Column, Frame};
use crate::pipeline::{Estimator, Transformer};

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "has", "have", "he",
    "her", "his", "i", "in", "is", "it", "its", "me", "my", "not", "of", "on", "or", "she",
    "that", "the", "their", "them", "they", "this", "to", "was", "we", "were", "will", "with",
    "you", "your",
];

/// Lowercases and splits a string column on non-alphanumeric
/// boundaries. Absent values tokenize to an empty list.
pub struct Tokenizer {
    input: String,
    output: String,
}

impl Tokenizer {
    pub fn new(input: &str, output: &str) -> Self {
        Tokenizer {
            input: input.to_string(),
            output: output.to_string(),
        }
    }
}

impl Transformer for Tokenizer {
    fn transform(&self, frame: &Frame) -> BenchResult<Frame> {
        let tokens: Vec<Vec<String>> = frame
            .strings(&self.input)?
            .iter()
            .map(|value| match value {
                Some(text) => text
                    .to_lowercase()
                    .split(|c: char| !c.is_alphanumeric())
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect(),
                None => Vec::new(),
            })
            .collect();
        let mut out = frame.clone();
        out.insert(&self.output, Column::Tokens(tokens))?;
        Ok(out)
    }

    fn name(&self) -> &str {
        "tokenizer"
    }
}

/// Drops common English stop words from a token column.
pub struct StopWordsRemover {
    input: String,
    output: String,
}

impl StopWordsRemover {
    pub fn new(input: &str, output: &str) -> Self {
        StopWordsRemover {
            input: input.to_string(),
            output: output.to_string(),
        }
    }
}

impl Transformer for StopWordsRemover {
    fn transform(&self, frame: &Frame) -> BenchResult<Frame> {
        let terms: Vec<Vec<String>> = frame
            .tokens(&self.input)?
            .iter()
            .map(|tokens| {
                tokens
                    .iter()
                    .filter(|t| !STOP_WORDS.contains(&t.as_str()))
                    .cloned()
                    .collect()
            })
            .collect();
        let mut out = frame.clone();
        out.insert(&self.output, Column::Tokens(terms))?;
        Ok(out)
    }

    fn name(&self) -> &str {
        "stop_words_remover"
    }
}

/// Hashes each token into one of `dim` buckets and counts occurrences.
pub struct HashingVectorizer {
    input: String,
    output: String,
    dim: usize,
}

impl HashingVectorizer {
    pub fn new(input: &str, output: &str, dim: usize) -> Self {
        HashingVectorizer {
            input: input.to_string(),
            output: output.to_string(),
            dim,
        }
    }

    fn bucket(&self, token: &str) -> usize {
        let mut hasher = FxHasher::default();
        token.hash(&mut hasher);
        (hasher.finish() as usize) % self.dim
    }
}

impl Transformer for HashingVectorizer {
    fn transform(&self, frame: &Frame) -> BenchResult<Frame> {
        let vectors: Vec<Vec<f64>> = frame
            .tokens(&self.input)?
            .iter()
            .map(|tokens| {
                let mut counts = vec![0.0; self.dim];
                for token in tokens {
                    counts[self.bucket(token)] += 1.0;
                }
                counts
            })
            .collect();
        let mut out = frame.clone();
        out.insert(&self.output, Column::Vector(vectors))?;
        Ok(out)
    }

    fn name(&self) -> &str {
        "hashing_vectorizer"
    }
}

/// Learns inverse-document-frequency weights over a term-count vector
/// column and rescales it.
pub struct IdfWeighter {
    input: String,
    output: String,
}

impl IdfWeighter {
    pub fn new(input: &str, output: &str) -> Self {
        IdfWeighter {
            input: input.to_string(),
            output: output.to_string(),
        }
    }
}

impl Estimator for IdfWeighter {
    fn fit(&self, frame: &Frame) -> BenchResult<Box<dyn Transformer>> {
        let vectors = frame.vectors(&self.input)?;
        let dim = vectors.first().map(|v| v.len()).unwrap_or(0);
        let mut document_frequency = vec![0.0_f64; dim];
        for vector in vectors {
            for (bucket, &count) in vector.iter().enumerate() {
                if count > 0.0 {
                    document_frequency[bucket] += 1.0;
                }
            }
        }
        let n_docs = vectors.len() as f64;
        let idf: Vec<f64> = document_frequency
            .iter()
            .map(|&df| ((n_docs + 1.0) / (df + 1.0)).ln() + 1.0)
            .collect();
        Ok(Box::new(FittedIdf {
            input: self.input.clone(),
            output: self.output.clone(),
            idf,
        }))
    }

    fn name(&self) -> &str {
        "idf_weighter"
    }
}

struct FittedIdf {
    input: String,
    output: String,
    idf: Vec<f64>,
}

impl Transformer for FittedIdf {
    fn transform(&self, frame: &Frame) -> BenchResult<Frame> {
        let weighted: Vec<Vec<f64>> = frame
            .vectors(&self.input)?
            .iter()
            .map(|vector| {
                vector
                    .iter()
                    .zip(&self.idf)
                    .map(|(&count, &weight)| count * weight)
                    .collect()
            })
            .collect();
        let mut out = frame.clone();
        out.insert(&self.output, Column::Vector(weighted))?;
        Ok(out)
    }

    fn name(&self) -> &str {
        "idf_weighter"
    }
}

/// Indexes category strings into numeric labels, most frequent first.
/// Values unseen at fit time map to a reserved catch-all index instead
/// of failing.
pub struct LabelIndexer {
    input: String,
    output: String,
}

impl LabelIndexer {
    pub fn new(input: &str, output: &str) -> Self {
        LabelIndexer {
            input: input.to_string(),
            output: output.to_string(),
        }
    }
}

impl Estimator for LabelIndexer {
    fn fit(&self, frame: &Frame) -> BenchResult<Box<dyn Transformer>> {
        let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
        for value in frame.strings(&self.input)?.iter().flatten() {
            *counts.entry(value.as_str()).or_default() += 1;
        }
        let mut ordered: Vec<(&str, usize)> = counts.into_iter().collect();
        ordered.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        let mapping: FxHashMap<String, f64> = ordered
            .into_iter()
            .enumerate()
            .map(|(index, (value, _))| (value.to_string(), index as f64))
            .collect();
        let catch_all = mapping.len() as f64;
        Ok(Box::new(FittedLabelIndexer {
            input: self.input.clone(),
            output: self.output.clone(),
            mapping,
            catch_all,
        }))
    }

    fn name(&self) -> &str {
        "label_indexer"
    }
}

struct FittedLabelIndexer {
    input: String,
    output: String,
    mapping: FxHashMap<String, f64>,
    catch_all: f64,
}

impl Transformer for FittedLabelIndexer {
    fn transform(&self, frame: &Frame) -> BenchResult<Frame> {
        let labels: Vec<f64> = frame
            .strings(&self.input)?
            .iter()
            .map(|value| match value {
                Some(v) => self.mapping.get(v).copied().unwrap_or(self.catch_all),
                None => self.catch_all,
            })
            .collect();
        let mut out = frame.clone();
        out.insert(&self.output, Column::Num(labels))?;
        Ok(out)
    }

    fn name(&self) -> &str {
        "label_indexer"
    }
}

/// Concatenates vector columns into one combined feature column.
pub struct VectorAssembler {
    inputs: Vec<String>,
    output: String,
}

impl VectorAssembler {
    pub fn new(inputs: &[&str], output: &str) -> Self {
        VectorAssembler {
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            output: output.to_string(),
        }
    }
}

impl Transformer for VectorAssembler {
    fn transform(&self, frame: &Frame) -> BenchResult<Frame> {
        let mut assembled: Vec<Vec<f64>> = vec![Vec::new(); frame.len()];
        for input in &self.inputs {
            for (row, vector) in frame.vectors(input)?.iter().enumerate() {
                assembled[row].extend_from_slice(vector);
            }
        }
        let mut out = frame.clone();
        out.insert(&self.output, Column::Vector(assembled))?;
        Ok(out)
    }

    fn name(&self) -> &str {
        "vector_assembler"
    }
}
