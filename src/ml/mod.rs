//! Preprocessing steps and regressors for the impute → scale → predict pipeline.

pub mod forest;
pub mod imputer;
pub mod linear;
pub mod metrics;
pub mod scaler;
pub mod split;
pub mod svr;
pub mod tree;

pub use forest::RandomForestRegressor;
pub use imputer::{ImputeStrategy, SimpleImputer};
pub use linear::LinearRegression;
pub use scaler::StandardScaler;
pub use svr::SupportVectorRegressor;

use crate::config::TrainingConfig;
use crate::domain::ports::Regressor;
use crate::utils::error::{PredictorError, Result};
use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    #[default]
    RandomForest,
    LinearRegression,
    Svr,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::RandomForest => "random_forest",
            ModelKind::LinearRegression => "linear_regression",
            ModelKind::Svr => "svr",
        }
    }
}

/// The persisted "model" artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegressionModel {
    RandomForest(RandomForestRegressor),
    LinearRegression(LinearRegression),
    Svr(SupportVectorRegressor),
}

impl RegressionModel {
    pub fn from_config(config: &TrainingConfig) -> Self {
        match config.model {
            ModelKind::RandomForest => RegressionModel::RandomForest(RandomForestRegressor::new(
                config.n_estimators,
                config.max_depth,
                config.min_samples_split,
                config.random_state,
            )),
            ModelKind::LinearRegression => {
                RegressionModel::LinearRegression(LinearRegression::default())
            }
            ModelKind::Svr => {
                RegressionModel::Svr(SupportVectorRegressor::new(config.svr_c, config.svr_epsilon))
            }
        }
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            RegressionModel::RandomForest(_) => ModelKind::RandomForest,
            RegressionModel::LinearRegression(_) => ModelKind::LinearRegression,
            RegressionModel::Svr(_) => ModelKind::Svr,
        }
    }

    /// Structural check of a loaded model, on top of its width.
    pub fn check(&self, n_features: usize) -> Result<()> {
        let found = self.n_features();
        if found != n_features {
            return Err(PredictorError::ShapeMismatch {
                stage: "model".to_string(),
                expected: n_features,
                found,
            });
        }
        match self {
            RegressionModel::RandomForest(model) => model.check(),
            RegressionModel::LinearRegression(_) => Ok(()),
            RegressionModel::Svr(model) => model.check(),
        }
    }
}

impl Regressor for RegressionModel {
    fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<()> {
        match self {
            RegressionModel::RandomForest(model) => model.fit(x, y),
            RegressionModel::LinearRegression(model) => model.fit(x, y),
            RegressionModel::Svr(model) => model.fit(x, y),
        }
    }

    fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        match self {
            RegressionModel::RandomForest(model) => model.predict(x),
            RegressionModel::LinearRegression(model) => model.predict(x),
            RegressionModel::Svr(model) => model.predict(x),
        }
    }

    fn n_features(&self) -> usize {
        match self {
            RegressionModel::RandomForest(model) => model.n_features(),
            RegressionModel::LinearRegression(model) => model.n_features(),
            RegressionModel::Svr(model) => model.n_features(),
        }
    }
}
