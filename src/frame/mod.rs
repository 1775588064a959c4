use rustc_hash::FxHashMap;

use crate::error::{BenchError, BenchResult};

/// A single named column of a [`Frame`].
#[derive(Clone, Debug, PartialEq)]
pub enum Column {
    /// Nullable string values (raw text fields).
    Str(Vec<Option<String>>),
    /// Token lists produced by text-processing stages.
    Tokens(Vec<Vec<String>>),
    /// Dense feature vectors.
    Vector(Vec<Vec<f64>>),
    /// Numeric values (indexed labels, predictions).
    Num(Vec<f64>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Str(v) => v.len(),
            Column::Tokens(v) => v.len(),
            Column::Vector(v) => v.len(),
            Column::Num(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn retained(&self, keep: &[bool]) -> Column {
        fn pick<T: Clone>(values: &[T], keep: &[bool]) -> Vec<T> {
            values
                .iter()
                .zip(keep)
                .filter(|(_, &k)| k)
                .map(|(v, _)| v.clone())
                .collect()
        }
        match self {
            Column::Str(v) => Column::Str(pick(v, keep)),
            Column::Tokens(v) => Column::Tokens(pick(v, keep)),
            Column::Vector(v) => Column::Vector(pick(v, keep)),
            Column::Num(v) => Column::Num(pick(v, keep)),
        }
    }
}

/// In-memory tabular dataset: named columns of equal length.
///
/// This is the queryable dataset abstraction the filter, splitter, and
/// pipeline stages operate on. All columns share the frame's row count;
/// inserting a column of a different length is a configuration error.
#[derive(Clone, Debug, Default)]
pub struct Frame {
    len: usize,
    columns: FxHashMap<String, Column>,
}

impl Frame {
    pub fn new() -> Self {
        Frame::default()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts or replaces a column. The first column fixes the row count.
    pub fn insert(&mut self, name: &str, column: Column) -> BenchResult<()> {
        if self.columns.is_empty() {
            self.len = column.len();
        } else if column.len() != self.len {
            return Err(BenchError::Config(format!(
                "column '{}' has {} rows, frame has {}",
                name,
                column.len(),
                self.len
            )));
        }
        self.columns.insert(name.to_string(), column);
        Ok(())
    }

    pub fn column(&self, name: &str) -> BenchResult<&Column> {
        self.columns
            .get(name)
            .ok_or_else(|| BenchError::Config(format!("missing column '{}'", name)))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn strings(&self, name: &str) -> BenchResult<&[Option<String>]> {
        match self.column(name)? {
            Column::Str(v) => Ok(v),
            _ => Err(BenchError::Config(format!(
                "column '{}' is not a string column",
                name
            ))),
        }
    }

    pub fn tokens(&self, name: &str) -> BenchResult<&[Vec<String>]> {
        match self.column(name)? {
            Column::Tokens(v) => Ok(v),
            _ => Err(BenchError::Config(format!(
                "column '{}' is not a token column",
                name
            ))),
        }
    }

    pub fn vectors(&self, name: &str) -> BenchResult<&[Vec<f64>]> {
        match self.column(name)? {
            Column::Vector(v) => Ok(v),
            _ => Err(BenchError::Config(format!(
                "column '{}' is not a vector column",
                name
            ))),
        }
    }

    pub fn nums(&self, name: &str) -> BenchResult<&[f64]> {
        match self.column(name)? {
            Column::Num(v) => Ok(v),
            _ => Err(BenchError::Config(format!(
                "column '{}' is not a numeric column",
                name
            ))),
        }
    }

    /// Returns a copy containing only the rows where `keep` is true.
    /// Row order is preserved.
    pub fn retain_rows(&self, keep: &[bool]) -> Frame {
        debug_assert_eq!(keep.len(), self.len);
        let columns: FxHashMap<String, Column> = self
            .columns
            .iter()
            .map(|(name, col)| (name.clone(), col.retained(keep)))
            .collect();
        let len = keep.iter().filter(|&&k| k).count();
        Frame { len, columns }
    }
}
