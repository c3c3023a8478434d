use crate::domain::ports::Transformer;
use crate::utils::error::{PredictorError, Result};
use ndarray::{Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// Standardises every column to zero mean and unit variance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    #[cfg(test)]
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    #[cfg(test)]
    pub fn scale(&self) -> &[f64] {
        &self.scale
    }
}

impl Transformer for StandardScaler {
    fn fit(x: ArrayView2<f64>) -> Result<Self> {
        if x.nrows() == 0 {
            return Err(PredictorError::training("cannot fit scaler on zero rows"));
        }

        let mut mean = Vec::with_capacity(x.ncols());
        let mut scale = Vec::with_capacity(x.ncols());
        for column in x.axis_iter(Axis(1)) {
            let m = column.sum() / column.len() as f64;
            // 母體標準差 (ddof = 0)
            let var = column.iter().map(|v| (v - m).powi(2)).sum::<f64>() / column.len() as f64;
            let std = var.sqrt();
            mean.push(m);
            scale.push(if std > 0.0 && std.is_finite() { std } else { 1.0 });
        }

        Ok(Self { mean, scale })
    }

    fn transform(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.mean.len() {
            return Err(PredictorError::ShapeMismatch {
                stage: "scaler".to_string(),
                expected: self.mean.len(),
                found: x.ncols(),
            });
        }

        let mut out = x.to_owned();
        for ((mut column, &m), &s) in out
            .axis_iter_mut(Axis(1))
            .zip(&self.mean)
            .zip(&self.scale)
        {
            column.mapv_inplace(|v| (v - m) / s);
        }
        Ok(out)
    }

    fn n_features(&self) -> usize {
        self.mean.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_fit_population_statistics() {
        let x = array![[1.0, 10.0], [3.0, 10.0]];
        let scaler = StandardScaler::fit(x.view()).unwrap();

        assert_eq!(scaler.mean(), &[2.0, 10.0]);
        // 常數欄位的 scale 固定為 1
        assert_eq!(scaler.scale(), &[1.0, 1.0]);
    }

    #[test]
    fn test_transform_standardises_columns() {
        let x = array![[0.0, 5.0, 1.0], [2.0, 5.0, 3.0], [4.0, 5.0, 5.0]];
        let scaler = StandardScaler::fit(x.view()).unwrap();
        let out = scaler.transform(x.view()).unwrap();

        assert_eq!(out.dim(), x.dim());
        for column in out.axis_iter(Axis(1)) {
            assert!(column.sum().abs() < 1e-12);
        }
        assert!(out.column(1).iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_single_row_keeps_shape() {
        let scaler = StandardScaler::fit(array![[1.0, 2.0, 3.0], [3.0, 4.0, 5.0]].view()).unwrap();
        let out = scaler.transform(array![[2.0, 3.0, 4.0]].view()).unwrap();
        assert_eq!(out.dim(), (1, 3));
        assert_eq!(out, array![[0.0, 0.0, 0.0]]);
    }

    #[test]
    fn test_fit_rejects_empty_input() {
        let x = Array2::<f64>::zeros((0, 3));
        assert!(StandardScaler::fit(x.view()).is_err());
    }
}
