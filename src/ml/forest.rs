use crate::domain::ports::Regressor;
use crate::ml::tree::RegressionTree;
use crate::utils::error::{PredictorError, Result};
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Bagged ensemble of regression trees; each tree sees a bootstrap sample of the rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub random_state: u64,
    n_features: usize,
    trees: Vec<RegressionTree>,
}

impl RandomForestRegressor {
    pub fn new(
        n_estimators: usize,
        max_depth: Option<usize>,
        min_samples_split: usize,
        random_state: u64,
    ) -> Self {
        Self {
            n_estimators,
            max_depth,
            min_samples_split,
            random_state,
            n_features: 0,
            trees: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    /// Checks every tree of a loaded forest against its fitted width.
    pub fn check(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(PredictorError::prediction("random forest has not been fitted"));
        }
        self.trees
            .iter()
            .try_for_each(|tree| tree.check(self.n_features))
    }
}

impl Default for RandomForestRegressor {
    fn default() -> Self {
        Self::new(100, None, 2, 42)
    }
}

impl Regressor for RandomForestRegressor {
    fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(PredictorError::training(format!(
                "feature rows ({}) and targets ({}) differ",
                x.nrows(),
                y.len()
            )));
        }
        if x.nrows() == 0 {
            return Err(PredictorError::training("cannot fit random forest on zero rows"));
        }
        if self.n_estimators == 0 {
            return Err(PredictorError::training("n_estimators must be at least 1"));
        }

        let n = x.nrows();
        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state);

        self.trees = (0..self.n_estimators)
            .map(|index| {
                let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                let tree = RegressionTree::grow(
                    x,
                    y,
                    bootstrap,
                    self.max_depth,
                    self.min_samples_split.max(2),
                );
                tracing::trace!(tree = index, nodes = tree.node_count(), "grew tree");
                tree
            })
            .collect();
        self.n_features = x.ncols();

        tracing::debug!(
            "Random forest fitted: {} trees on {} rows",
            self.trees.len(),
            n
        );
        Ok(())
    }

    fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(PredictorError::prediction("random forest has not been fitted"));
        }
        if x.ncols() != self.n_features {
            return Err(PredictorError::ShapeMismatch {
                stage: "random forest".to_string(),
                expected: self.n_features,
                found: x.ncols(),
            });
        }

        let count = self.trees.len() as f64;
        x.axis_iter(Axis(0))
            .map(|row| -> Result<f64> {
                let mut total = 0.0;
                for tree in &self.trees {
                    total += tree.predict_row(row).ok_or_else(|| {
                        PredictorError::prediction("tree references a feature outside the input row")
                    })?;
                }
                Ok(total / count)
            })
            .collect()
    }

    fn n_features(&self) -> usize {
        self.n_features
    }
}
