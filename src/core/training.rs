use crate::core::artifacts::{ArtifactStore, TrainedArtifacts};
use crate::core::dataset::load_dataset;
use crate::domain::model::{Dataset, TrainingReport};
use crate::domain::ports::{ConfigProvider, Pipeline, Regressor, Storage, Transformer};
use crate::ml::metrics::evaluate;
use crate::ml::split::train_test_split;
use crate::ml::{RegressionModel, SimpleImputer, StandardScaler};
use crate::utils::error::Result;
use ndarray::Axis;

/// CSV → impute → split → scale → fit → evaluate → persist.
pub struct TrainingPipeline<S: Storage, C: ConfigProvider> {
    store: ArtifactStore<S>,
    config: C,
}

impl<S: Storage, C: ConfigProvider> TrainingPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            store: ArtifactStore::new(storage),
            config,
        }
    }

    pub fn fit(&self, data: Dataset) -> Result<TrainedArtifacts> {
        let settings = self.config.training();

        // 先對全部特徵補值，再切分訓練/測試集
        let imputer = SimpleImputer::fit_with(settings.imputer_strategy, data.features.view())?;
        let imputed = imputer.transform(data.features.view())?;

        let (train_idx, test_idx) =
            train_test_split(data.len(), settings.test_size, settings.random_state)?;
        let x_train = imputed.select(Axis(0), &train_idx);
        let x_test = imputed.select(Axis(0), &test_idx);
        let y_train = data.targets.select(Axis(0), &train_idx);
        let y_test = data.targets.select(Axis(0), &test_idx);
        tracing::debug!(
            "Split {} rows into {} train / {} test",
            data.len(),
            train_idx.len(),
            test_idx.len()
        );

        // scaler 只看訓練集
        let scaler = StandardScaler::fit(x_train.view())?;
        let x_train_scaled = scaler.transform(x_train.view())?;
        let x_test_scaled = scaler.transform(x_test.view())?;

        let mut model = RegressionModel::from_config(settings);
        tracing::info!(
            "🌲 Fitting {} on {} rows",
            model.kind().as_str(),
            train_idx.len()
        );
        model.fit(x_train_scaled.view(), y_train.view())?;

        let y_pred = model.predict(x_test_scaled.view())?;
        let metrics = evaluate(y_test.view(), y_pred.view())?;
        tracing::info!("Mean Absolute Error: {}", metrics.mae);
        tracing::info!("Mean Squared Error: {}", metrics.mse);
        tracing::info!("R-squared: {}", metrics.r2);

        let report = TrainingReport {
            model: model.kind().as_str().to_string(),
            imputer_strategy: imputer.strategy().as_str().to_string(),
            feature_columns: data.feature_columns.clone(),
            target_column: data.target_column.clone(),
            total_rows: data.len(),
            train_rows: train_idx.len(),
            test_rows: test_idx.len(),
            skipped_rows: data.skipped_rows,
            missing_values: data.missing_counts(),
            metrics,
            trained_at: chrono::Utc::now(),
        };

        Ok(TrainedArtifacts {
            imputer,
            scaler,
            model,
            report,
        })
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for TrainingPipeline<S, C> {
    async fn extract(&self) -> Result<Dataset> {
        tracing::debug!("Reading dataset from: {}", self.config.dataset_path());
        let dataset = load_dataset(
            self.config.dataset_path(),
            self.config.feature_columns(),
            self.config.target_column(),
        )?;

        for (column, missing) in dataset.missing_counts() {
            if missing > 0 {
                tracing::info!("🔎 {} missing value(s) in '{}'", missing, column);
            }
        }
        Ok(dataset)
    }

    async fn transform(&self, data: Dataset) -> Result<TrainedArtifacts> {
        self.fit(data)
    }

    async fn load(&self, result: TrainedArtifacts) -> Result<String> {
        self.store.save(&result).await?;
        tracing::debug!("Artifacts saved");
        Ok(self.config.artifacts_dir().to_string())
    }
}
