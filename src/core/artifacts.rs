use crate::domain::model::{TrainingReport, FEATURE_COUNT};
use crate::domain::ports::{Storage, Transformer};
use crate::ml::{RegressionModel, SimpleImputer, StandardScaler};
use crate::utils::error::{PredictorError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub const MODEL_FILE: &str = "house_price_model.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const IMPUTER_FILE: &str = "imputer.json";
pub const REPORT_FILE: &str = "training_report.json";

/// Files inference cannot run without.
pub const REQUIRED_ARTIFACTS: [&str; 3] = [MODEL_FILE, SCALER_FILE, IMPUTER_FILE];

#[derive(Debug, Clone)]
pub struct TrainedArtifacts {
    pub imputer: SimpleImputer,
    pub scaler: StandardScaler,
    pub model: RegressionModel,
    pub report: TrainingReport,
}

pub struct ArtifactStore<S: Storage> {
    storage: S,
}

impl<S: Storage> ArtifactStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    #[cfg(test)]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub async fn save(&self, artifacts: &TrainedArtifacts) -> Result<()> {
        self.write_json(MODEL_FILE, &artifacts.model).await?;
        self.write_json(SCALER_FILE, &artifacts.scaler).await?;
        self.write_json(IMPUTER_FILE, &artifacts.imputer).await?;
        self.write_json(REPORT_FILE, &artifacts.report).await?;
        Ok(())
    }

    /// Required artifact files that are absent, in a fixed order.
    pub async fn missing(&self) -> Vec<String> {
        let mut missing = Vec::new();
        for name in REQUIRED_ARTIFACTS {
            if !self.storage.exists(name).await {
                missing.push(name.to_string());
            }
        }
        missing
    }

    /// 三個檔案都存在才開始讀取
    pub async fn load(&self) -> Result<(SimpleImputer, StandardScaler, RegressionModel)> {
        let missing = self.missing().await;
        if !missing.is_empty() {
            return Err(PredictorError::MissingArtifact { missing });
        }

        let model: RegressionModel = self.read_json(MODEL_FILE).await?;
        let scaler: StandardScaler = self.read_json(SCALER_FILE).await?;
        let imputer: SimpleImputer = self.read_json(IMPUTER_FILE).await?;

        for (stage, found) in [
            ("imputer", imputer.n_features()),
            ("scaler", scaler.n_features()),
        ] {
            if found != FEATURE_COUNT {
                return Err(PredictorError::ShapeMismatch {
                    stage: stage.to_string(),
                    expected: FEATURE_COUNT,
                    found,
                });
            }
        }
        model.check(FEATURE_COUNT)?;

        Ok((imputer, scaler, model))
    }

    pub async fn load_report(&self) -> Result<TrainingReport> {
        self.read_json(REPORT_FILE).await
    }

    async fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let data = serde_json::to_vec_pretty(value)?;
        tracing::debug!("Writing {} ({} bytes)", name, data.len());
        self.storage.write_file(name, &data).await
    }

    async fn read_json<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let data = self.storage.read_file(name).await?;
        Ok(serde_json::from_slice(&data)?)
    }
}
