//! Matrices with labelled rows and columns.
//!
//! Every matrix in the pipeline (presence, raw values, encoded, scaled,
//! imputed) is a [`LabeledMatrix`]: languages on the rows, features or
//! derived feature columns on the columns.

use crate::core::error::{Result, WalsError};
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use serde::Serialize;
use std::collections::HashMap;

/// Dense matrix with unique row and column labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledMatrix<T> {
    row_labels: Vec<String>,
    col_labels: Vec<String>,
    #[serde(skip)]
    row_index: HashMap<String, usize>,
    #[serde(skip)]
    col_index: HashMap<String, usize>,
    values: Array2<T>,
}

fn build_index(labels: &[String], axis: &'static str) -> Result<HashMap<String, usize>> {
    let mut index = HashMap::with_capacity(labels.len());
    for (position, label) in labels.iter().enumerate() {
        if index.insert(label.clone(), position).is_some() {
            return Err(WalsError::DuplicateLabel {
                axis,
                label: label.clone(),
            });
        }
    }
    Ok(index)
}

impl<T> LabeledMatrix<T> {
    /// Create a matrix, checking label uniqueness and shape.
    pub fn new(row_labels: Vec<String>, col_labels: Vec<String>, values: Array2<T>) -> Result<Self> {
        if values.dim() != (row_labels.len(), col_labels.len()) {
            return Err(WalsError::dimension_mismatch(
                format!("{}x{}", row_labels.len(), col_labels.len()),
                format!("{}x{}", values.nrows(), values.ncols()),
            ));
        }
        let row_index = build_index(&row_labels, "row")?;
        let col_index = build_index(&col_labels, "column")?;
        Ok(LabeledMatrix {
            row_labels,
            col_labels,
            row_index,
            col_index,
            values,
        })
    }

    /// Number of rows
    pub fn nrows(&self) -> usize {
        self.row_labels.len()
    }

    /// Number of columns
    pub fn ncols(&self) -> usize {
        self.col_labels.len()
    }

    /// `(rows, columns)`
    pub fn dim(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }

    /// True when the matrix has no cells.
    pub fn is_empty(&self) -> bool {
        self.nrows() == 0 || self.ncols() == 0
    }

    /// Row labels in order
    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    /// Column labels in order
    pub fn col_labels(&self) -> &[String] {
        &self.col_labels
    }

    /// Matrix body
    pub fn values(&self) -> ArrayView2<'_, T> {
        self.values.view()
    }

    /// Consume the matrix, returning its body.
    pub fn into_values(self) -> Array2<T> {
        self.values
    }

    /// Position of a row label
    pub fn row_position(&self, label: &str) -> Option<usize> {
        self.row_index.get(label).copied()
    }

    /// Position of a column label
    pub fn col_position(&self, label: &str) -> Option<usize> {
        self.col_index.get(label).copied()
    }

    /// True when the matrix has a column with this label.
    pub fn contains_column(&self, label: &str) -> bool {
        self.col_index.contains_key(label)
    }

    /// Column by label
    pub fn column(&self, label: &str) -> Option<ArrayView1<'_, T>> {
        self.col_position(label)
            .map(|position| self.values.index_axis(Axis(1), position))
    }

    /// Cell by labels
    pub fn get(&self, row: &str, col: &str) -> Option<&T> {
        let r = self.row_position(row)?;
        let c = self.col_position(col)?;
        self.values.get((r, c))
    }
}

impl<T: Clone> LabeledMatrix<T> {
    /// Sub-matrix of the given row and column positions, in the given order.
    pub fn select(&self, rows: &[usize], cols: &[usize]) -> Self {
        let values = self
            .values
            .select(Axis(0), rows)
            .select(Axis(1), cols);
        let row_labels: Vec<String> = rows.iter().map(|&r| self.row_labels[r].clone()).collect();
        let col_labels: Vec<String> = cols.iter().map(|&c| self.col_labels[c].clone()).collect();
        let row_index = row_labels
            .iter()
            .enumerate()
            .map(|(i, label)| (label.clone(), i))
            .collect();
        let col_index = col_labels
            .iter()
            .enumerate()
            .map(|(i, label)| (label.clone(), i))
            .collect();
        LabeledMatrix {
            row_labels,
            col_labels,
            row_index,
            col_index,
            values,
        }
    }

    /// Rearrange to the given labels; labels absent from `self` get `fill`.
    pub fn reindex(&self, row_labels: &[String], col_labels: &[String], fill: T) -> Result<Self> {
        let rows: Vec<Option<usize>> = row_labels.iter().map(|l| self.row_position(l)).collect();
        let cols: Vec<Option<usize>> = col_labels.iter().map(|l| self.col_position(l)).collect();
        let values = Array2::from_shape_fn((rows.len(), cols.len()), |(i, j)| {
            match (rows[i], cols[j]) {
                (Some(r), Some(c)) => self.values[[r, c]].clone(),
                _ => fill.clone(),
            }
        });
        LabeledMatrix::new(row_labels.to_vec(), col_labels.to_vec(), values)
    }

    /// Copy without the named columns; labels that are not present are ignored.
    pub fn drop_columns<S: AsRef<str>>(&self, labels: &[S]) -> Self {
        let keep: Vec<usize> = (0..self.ncols())
            .filter(|&c| !labels.iter().any(|l| l.as_ref() == self.col_labels[c]))
            .collect();
        let rows: Vec<usize> = (0..self.nrows()).collect();
        self.select(&rows, &keep)
    }

    /// Copy keeping only the columns for which `keep` returns true.
    pub fn retain_columns<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&str, ArrayView1<'_, T>) -> bool,
    {
        let cols: Vec<usize> = (0..self.ncols())
            .filter(|&c| keep(&self.col_labels[c], self.values.index_axis(Axis(1), c)))
            .collect();
        let rows: Vec<usize> = (0..self.nrows()).collect();
        self.select(&rows, &cols)
    }

    /// Join matrices side by side. All parts must share the same row labels.
    pub fn hconcat(row_labels: Vec<String>, parts: Vec<LabeledMatrix<T>>) -> Result<Self>
    where
        T: Default,
    {
        for part in &parts {
            if part.row_labels != row_labels {
                return Err(WalsError::dimension_mismatch(
                    format!("{} rows", row_labels.len()),
                    format!("{} rows with different labels", part.nrows()),
                ));
            }
        }
        let total_cols: usize = parts.iter().map(|p| p.ncols()).sum();
        let mut values = Array2::from_elem((row_labels.len(), total_cols), T::default());
        let mut col_labels = Vec::with_capacity(total_cols);
        let mut offset = 0;
        for part in parts {
            let width = part.ncols();
            values
                .slice_mut(ndarray::s![.., offset..offset + width])
                .assign(&part.values);
            col_labels.extend(part.col_labels);
            offset += width;
        }
        LabeledMatrix::new(row_labels, col_labels, values)
    }

    /// Apply `f` to every cell, keeping the labels.
    pub fn map<U, F>(&self, f: F) -> LabeledMatrix<U>
    where
        F: FnMut(&T) -> U,
    {
        LabeledMatrix {
            row_labels: self.row_labels.clone(),
            col_labels: self.col_labels.clone(),
            row_index: self.row_index.clone(),
            col_index: self.col_index.clone(),
            values: self.values.map(f),
        }
    }

    /// Same labels, new body of identical shape.
    pub fn with_values<U>(&self, values: Array2<U>) -> Result<LabeledMatrix<U>> {
        LabeledMatrix::new(self.row_labels.clone(), self.col_labels.clone(), values)
    }
}
