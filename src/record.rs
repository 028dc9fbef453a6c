//! Per-sentence report records and the dense matrix type they carry.
//!
//! A [`SentenceRecord`] is the structured replacement for an open-ended
//! key/value mapping: every field is optional, reporters read only the
//! fields they understand, and deserialization ignores unknown fields so new
//! producers never break old reporters.

use crate::Result;

use anyhow::bail;
use serde::{Deserialize, Serialize};

/// Dense row-major 2-D matrix of `f32`.
///
/// Serialized as nested arrays (`[[...], ...]`); ragged or empty input is
/// rejected at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f32>>", into = "Vec<Vec<f32>>")]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl Matrix {
    /// Build a matrix from row vectors. All rows must have the same nonzero
    /// length.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let Some(first) = rows.first() else {
            bail!("matrix must have at least one row");
        };
        let cols = first.len();
        if cols == 0 {
            bail!("matrix must have at least one column");
        }
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                bail!("matrix row {} has {} columns, expected {}", i, row.len(), cols);
            }
            data.extend_from_slice(row);
        }
        Ok(Self { rows: rows.len(), cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Value at `(row, col)`. Panics on out-of-range indices.
    pub fn get(&self, row: usize, col: usize) -> f32 {
        assert!(row < self.rows && col < self.cols, "matrix index out of range");
        self.data[row * self.cols + col]
    }

    /// A new matrix with rows and columns swapped.
    pub fn transposed(&self) -> Self {
        let mut data = Vec::with_capacity(self.data.len());
        for c in 0..self.cols {
            for r in 0..self.rows {
                data.push(self.get(r, c));
            }
        }
        Self { rows: self.cols, cols: self.rows, data }
    }
}

impl TryFrom<Vec<Vec<f32>>> for Matrix {
    type Error = anyhow::Error;

    fn try_from(rows: Vec<Vec<f32>>) -> Result<Self> {
        Matrix::from_rows(rows)
    }
}

impl From<Matrix> for Vec<Vec<f32>> {
    fn from(matrix: Matrix) -> Self {
        (0..matrix.rows)
            .map(|r| matrix.data[r * matrix.cols..(r + 1) * matrix.cols].to_vec())
            .collect()
    }
}

/// Source-side input of one sentence: word strings for textual modalities,
/// a feature matrix for non-textual ones (e.g. speech frames).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Words(Vec<String>),
    Features(Matrix),
}

impl Source {
    pub fn words(&self) -> Option<&[String]> {
        match self {
            Source::Words(words) => Some(words),
            Source::Features(_) => None,
        }
    }

    pub fn features(&self) -> Option<&Matrix> {
        match self {
            Source::Words(_) => None,
            Source::Features(matrix) => Some(matrix),
        }
    }

    pub fn is_features(&self) -> bool {
        matches!(self, Source::Features(_))
    }

    /// Space-joined source words; empty for non-textual sources.
    pub fn joined(&self) -> String {
        match self {
            Source::Words(words) => words.join(" "),
            Source::Features(_) => String::new(),
        }
    }
}

/// Everything a model may report about one decoded sentence.
///
/// Unknown fields in serialized input are ignored, and reporters ignore
/// fields they do not consume.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentenceRecord {
    /// Source-side input, already mapped through the vocabulary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,

    /// Detokenized output sentence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Reference translation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    /// Attention weights; rows = source positions, columns = target
    /// positions, values in [0, 1].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attention: Option<Matrix>,

    /// Per-source-token segmentation decision codes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segmentation: Option<Vec<u32>>,
}

impl SentenceRecord {
    /// Merge `other` into `self`: every field `other` defines overwrites the
    /// corresponding field here. Fields `other` leaves unset are kept.
    pub fn absorb(&mut self, other: SentenceRecord) {
        if other.source.is_some() {
            self.source = other.source;
        }
        if other.output.is_some() {
            self.output = other.output;
        }
        if other.reference.is_some() {
            self.reference = other.reference;
        }
        if other.attention.is_some() {
            self.attention = other.attention;
        }
        if other.segmentation.is_some() {
            self.segmentation = other.segmentation;
        }
    }
}
