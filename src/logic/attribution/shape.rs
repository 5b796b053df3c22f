//! SHAP Output Shapes - Normalisation to one positive-class row
//!
//! Explainers return attributions as a per-class list, a 3-D tensor
//! `(samples, features, classes)` or a flat 2-D matrix. Whatever the shape,
//! the rest of the crate only ever sees a single 1-D row for the positive
//! class; anything that cannot be resolved unambiguously is rejected.

use ndarray::{s, Array1, Array2, Array3, ArrayView2};

use crate::error::{InsightError, InsightResult};

/// Raw attribution output of a backend
#[derive(Debug, Clone, PartialEq)]
pub enum ShapOutput {
    /// One `(samples, features)` matrix per class
    PerClassList(Vec<Array2<f64>>),
    /// `(samples, features, classes)`
    Tensor3D(Array3<f64>),
    /// `(samples, features)` for single-output models
    Flat2D(Array2<f64>),
}

/// A value that may be reported per class (expected value, margins)
#[derive(Debug, Clone, PartialEq)]
pub enum ClassValues {
    Scalar(f64),
    PerClass(Vec<f64>),
}

/// Positive-class index for `n_classes` outputs.
///
/// One output is the positive class itself; two outputs pick index 1.
pub fn positive_class_index(n_classes: usize) -> InsightResult<usize> {
    match n_classes {
        0 => Err(InsightError::ShapeAmbiguity("no class outputs".into())),
        1 => Ok(0),
        2 => Ok(1),
        n => Err(InsightError::ShapeAmbiguity(format!(
            "{} classes; cannot pick a positive class",
            n
        ))),
    }
}

impl ClassValues {
    pub fn positive(&self) -> InsightResult<f64> {
        match self {
            ClassValues::Scalar(v) => Ok(*v),
            ClassValues::PerClass(values) => Ok(values[positive_class_index(values.len())?]),
        }
    }
}

impl From<Vec<f64>> for ClassValues {
    fn from(values: Vec<f64>) -> Self {
        if values.len() == 1 {
            ClassValues::Scalar(values[0])
        } else {
            ClassValues::PerClass(values)
        }
    }
}

fn single_row(matrix: ArrayView2<'_, f64>, n_features: usize) -> InsightResult<Array1<f64>> {
    let (rows, cols) = matrix.dim();
    if rows != 1 {
        return Err(InsightError::ShapeAmbiguity(format!(
            "expected attributions for exactly one sample, got {}",
            rows
        )));
    }
    if cols != n_features {
        return Err(InsightError::ShapeAmbiguity(format!(
            "expected {} feature attributions, got {}",
            n_features, cols
        )));
    }
    Ok(matrix.row(0).to_owned())
}

impl ShapOutput {
    pub fn describe(&self) -> String {
        match self {
            ShapOutput::PerClassList(list) => format!(
                "list of {} arrays{}",
                list.len(),
                list.first().map(|a| format!(" of {:?}", a.dim())).unwrap_or_default()
            ),
            ShapOutput::Tensor3D(t) => format!("3-D array {:?}", t.dim()),
            ShapOutput::Flat2D(m) => format!("2-D array {:?}", m.dim()),
        }
    }

    /// Collapse to one positive-class attribution row of length `n_features`
    pub fn positive_row(&self, n_features: usize) -> InsightResult<Array1<f64>> {
        let row = match self {
            ShapOutput::PerClassList(list) => {
                let index = positive_class_index(list.len())?;
                single_row(list[index].view(), n_features)?
            }
            ShapOutput::Tensor3D(tensor) => {
                let (_, _, classes) = tensor.dim();
                let index = positive_class_index(classes)?;
                single_row(tensor.slice(s![.., .., index]), n_features)?
            }
            ShapOutput::Flat2D(matrix) => single_row(matrix.view(), n_features)?,
        };
        log::trace!("Normalised {} to a row of {}", self.describe(), row.len());
        Ok(row)
    }
}
