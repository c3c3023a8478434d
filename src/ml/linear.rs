use crate::domain::ports::Regressor;
use crate::utils::error::{PredictorError, Result};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// Ordinary least squares with an intercept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearRegression {
    #[cfg(test)]
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    #[cfg(test)]
    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

/// Gaussian elimination with partial pivoting. `None` when the system is singular.
fn solve(mut a: Array2<f64>, mut b: Array1<f64>) -> Option<Array1<f64>> {
    let n = b.len();
    let tolerance = a.diag().iter().fold(0.0_f64, |m, v| m.max(v.abs())) * 1e-12;

    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[[i, col]].abs().total_cmp(&a[[j, col]].abs()))?;
        if a[[pivot, col]].abs() <= tolerance {
            return None;
        }
        if pivot != col {
            for k in 0..n {
                a.swap([col, k], [pivot, k]);
            }
            b.swap(col, pivot);
        }

        for row in col + 1..n {
            let factor = a[[row, col]] / a[[col, col]];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[[row, k]] -= factor * a[[col, k]];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut solution = Array1::zeros(n);
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[[row, k]] * solution[k]).sum();
        solution[row] = (b[row] - tail) / a[[row, row]];
    }
    Some(solution)
}

impl Regressor for LinearRegression {
    fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(PredictorError::training(format!(
                "feature rows ({}) and targets ({}) differ",
                x.nrows(),
                y.len()
            )));
        }
        let n = x.nrows();
        if n == 0 {
            return Err(PredictorError::training("cannot fit linear regression on zero rows"));
        }

        let x_mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| PredictorError::training("empty feature matrix"))?;
        let y_mean = y.sum() / n as f64;
        let xc = &x - &x_mean;
        let yc = y.mapv(|v| v - y_mean);

        // 置中後截距可分離；變異為 0 的欄位係數設為 0
        let active: Vec<usize> = (0..x.ncols())
            .filter(|&j| xc.column(j).iter().any(|v| v.abs() > 0.0))
            .collect();

        let mut coefficients = vec![0.0; x.ncols()];
        if !active.is_empty() {
            let xa = xc.select(Axis(1), &active);
            let gram = xa.t().dot(&xa);
            let rhs = xa.t().dot(&yc);
            let solved = solve(gram, rhs).ok_or_else(|| {
                PredictorError::training("features are collinear; normal equations are singular")
            })?;
            for (&j, &c) in active.iter().zip(solved.iter()) {
                coefficients[j] = c;
            }
        }

        let intercept = y_mean
            - coefficients
                .iter()
                .zip(x_mean.iter())
                .map(|(c, m)| c * m)
                .sum::<f64>();

        self.coefficients = coefficients;
        self.intercept = intercept;
        tracing::debug!(
            "Linear regression fitted: coefficients={:?}, intercept={}",
            self.coefficients,
            self.intercept
        );
        Ok(())
    }

    fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        if self.coefficients.is_empty() {
            return Err(PredictorError::prediction("linear regression has not been fitted"));
        }
        if x.ncols() != self.coefficients.len() {
            return Err(PredictorError::ShapeMismatch {
                stage: "linear regression".to_string(),
                expected: self.coefficients.len(),
                found: x.ncols(),
            });
        }

        let coefficients = Array1::from(self.coefficients.clone());
        Ok(x.dot(&coefficients) + self.intercept)
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }
}
