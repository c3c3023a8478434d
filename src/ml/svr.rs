use crate::domain::ports::Regressor;
use crate::utils::error::{PredictorError, Result};
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

const TOLERANCE: f64 = 1e-6;

/// Epsilon-insensitive support vector regression with an RBF kernel.
///
/// The dual is solved by cyclic coordinate descent. The intercept is folded
/// into the kernel as a constant `+ 1` term, which removes the equality
/// constraint of the textbook dual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportVectorRegressor {
    pub c: f64,
    pub epsilon: f64,
    pub max_iter: usize,
    gamma: f64,
    n_features: usize,
    support_vectors: Vec<Vec<f64>>,
    dual_coef: Vec<f64>,
}

impl SupportVectorRegressor {
    pub fn new(c: f64, epsilon: f64) -> Self {
        Self {
            c,
            epsilon,
            max_iter: 1000,
            gamma: 1.0,
            n_features: 0,
            support_vectors: Vec::new(),
            dual_coef: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn support_vector_count(&self) -> usize {
        self.support_vectors.len()
    }

    /// Checks a deserialized model: one coefficient per support vector, every
    /// vector as wide as the fitted input.
    pub fn check(&self) -> Result<()> {
        if self.n_features == 0 {
            return Err(PredictorError::prediction("support vector regressor has not been fitted"));
        }
        if self.dual_coef.len() != self.support_vectors.len() {
            return Err(PredictorError::prediction(format!(
                "{} support vectors but {} coefficients",
                self.support_vectors.len(),
                self.dual_coef.len()
            )));
        }
        if let Some(bad) = self
            .support_vectors
            .iter()
            .find(|sv| sv.len() != self.n_features)
        {
            return Err(PredictorError::ShapeMismatch {
                stage: "svr".to_string(),
                expected: self.n_features,
                found: bad.len(),
            });
        }
        Ok(())
    }

    fn kernel(&self, a: ArrayView1<f64>, b: &[f64]) -> f64 {
        let distance: f64 = a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum();
        (-self.gamma * distance).exp()
    }
}

impl Default for SupportVectorRegressor {
    fn default() -> Self {
        Self::new(1.0, 0.1)
    }
}

/// `1 / (n_features * Var(X))` over every cell; 1.0 when X is constant.
fn scale_gamma(x: ArrayView2<f64>) -> f64 {
    let var = x.var(0.0);
    if var > 0.0 {
        1.0 / (x.ncols() as f64 * var)
    } else {
        1.0
    }
}

impl Regressor for SupportVectorRegressor {
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
            return Err(PredictorError::training("cannot fit svr on zero rows"));
        }
        if !(self.c > 0.0) || !(self.epsilon >= 0.0) {
            return Err(PredictorError::training(format!(
                "svr needs c > 0 and epsilon >= 0 (c={}, epsilon={})",
                self.c, self.epsilon
            )));
        }

        self.gamma = scale_gamma(x);
        let rows: Vec<Vec<f64>> = x.axis_iter(Axis(0)).map(|r| r.to_vec()).collect();

        // beta = alpha - alpha*；grad = Q·beta - y，Q = K + 1，對角線固定為 2
        let diag = 2.0;
        let mut beta = vec![0.0; n];
        let mut grad: Vec<f64> = y.iter().map(|v| -v).collect();
        let mut converged = false;

        for pass in 0..self.max_iter {
            let mut max_step: f64 = 0.0;
            for i in 0..n {
                let unconstrained = beta[i] - grad[i] / diag;
                let shrunk =
                    unconstrained.signum() * (unconstrained.abs() - self.epsilon / diag).max(0.0);
                let updated = shrunk.clamp(-self.c, self.c);
                let step = updated - beta[i];
                if step == 0.0 {
                    continue;
                }

                beta[i] = updated;
                let row_i = x.row(i);
                for (j, g) in grad.iter_mut().enumerate() {
                    *g += step * (self.kernel(row_i, &rows[j]) + 1.0);
                }
                max_step = max_step.max(step.abs());
            }

            if max_step <= TOLERANCE * self.c.max(1.0) {
                tracing::trace!(passes = pass + 1, "svr converged");
                converged = true;
                break;
            }
        }
        if !converged {
            tracing::warn!(
                "⚠️ SVR stopped after {} passes without converging",
                self.max_iter
            );
        }

        let (support_vectors, dual_coef): (Vec<Vec<f64>>, Vec<f64>) = rows
            .into_iter()
            .zip(beta)
            .filter(|(_, b)| *b != 0.0)
            .unzip();
        self.support_vectors = support_vectors;
        self.dual_coef = dual_coef;
        self.n_features = x.ncols();

        tracing::debug!(
            "SVR fitted: {} support vectors of {} rows, gamma={}",
            self.support_vectors.len(),
            n,
            self.gamma
        );
        Ok(())
    }

    fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        if self.n_features == 0 {
            return Err(PredictorError::prediction("support vector regressor has not been fitted"));
        }
        if x.ncols() != self.n_features {
            return Err(PredictorError::ShapeMismatch {
                stage: "svr".to_string(),
                expected: self.n_features,
                found: x.ncols(),
            });
        }

        Ok(x.axis_iter(Axis(0))
            .map(|row| {
                self.support_vectors
                    .iter()
                    .zip(&self.dual_coef)
                    .map(|(sv, coef)| coef * (self.kernel(row, sv) + 1.0))
                    .sum::<f64>()
            })
            .collect())
    }

    fn n_features(&self) -> usize {
        self.n_features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    fn line(points: usize) -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((points, 1), |(i, _)| -2.0 + 4.0 * i as f64 / (points - 1) as f64);
        let y = x.column(0).to_owned();
        (x, y)
    }

    #[test]
    fn test_targets_inside_tube_need_no_support_vectors() {
        let x = array![[0.0], [1.0], [2.0]];
        let y = array![0.05, 0.0, -0.05];
        let mut svr = SupportVectorRegressor::new(1.0, 0.1);
        svr.fit(x.view(), y.view()).unwrap();

        assert_eq!(svr.support_vector_count(), 0);
        assert_eq!(svr.predict(x.view()).unwrap(), array![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_follows_smooth_target() {
        let (x, y) = line(21);
        let mut svr = SupportVectorRegressor::new(100.0, 0.01);
        svr.max_iter = 20_000;
        svr.fit(x.view(), y.view()).unwrap();

        let predicted = svr.predict(x.view()).unwrap();
        for (p, t) in predicted.iter().zip(y.iter()) {
            assert!((p - t).abs() < 0.25, "predicted {} for {}", p, t);
        }
        let ends = svr.predict(array![[-1.5], [1.5]].view()).unwrap();
        assert!(ends[1] > ends[0]);
    }

    #[test]
    fn test_gamma_scales_with_feature_variance() {
        let x = array![[0.0, 2.0], [2.0, 0.0]];
        // 所有格子的變異數為 1
        assert_eq!(scale_gamma(x.view()), 0.5);
        assert_eq!(scale_gamma(array![[3.0], [3.0]].view()), 1.0);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let (x, y) = line(15);
        let mut a = SupportVectorRegressor::default();
        let mut b = SupportVectorRegressor::default();
        a.fit(x.view(), y.view()).unwrap();
        b.fit(x.view(), y.view()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_predict_checks_fit_and_width() {
        let svr = SupportVectorRegressor::default();
        assert!(matches!(
            svr.predict(array![[1.0]].view()),
            Err(PredictorError::PredictionError { .. })
        ));

        let (x, y) = line(5);
        let mut svr = SupportVectorRegressor::default();
        svr.fit(x.view(), y.view()).unwrap();
        assert!(svr.check().is_ok());
        assert!(matches!(
            svr.predict(array![[1.0, 2.0, 3.0]].view()),
            Err(PredictorError::ShapeMismatch { expected: 1, found: 3, .. })
        ));
    }

    #[test]
    fn test_invalid_hyperparameters_are_rejected() {
        let (x, y) = line(5);
        let mut svr = SupportVectorRegressor::new(0.0, 0.1);
        assert!(matches!(
            svr.fit(x.view(), y.view()),
            Err(PredictorError::TrainingError { .. })
        ));
    }
}
