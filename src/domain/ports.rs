use crate::config::TrainingConfig;
use crate::core::artifacts::TrainedArtifacts;
use crate::domain::model::Dataset;
use crate::utils::error::Result;
use async_trait::async_trait;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self, path: &str) -> impl std::future::Future<Output = bool> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn dataset_path(&self) -> &str;
    fn feature_columns(&self) -> &[String];
    fn target_column(&self) -> &str;
    fn artifacts_dir(&self) -> &str;
    fn training(&self) -> &TrainingConfig;
}

/// Fitted column-wise preprocessing step.
pub trait Transformer {
    fn fit(x: ArrayView2<f64>) -> Result<Self>
    where
        Self: Sized;
    fn transform(&self, x: ArrayView2<f64>) -> Result<Array2<f64>>;
    fn n_features(&self) -> usize;
}

pub trait Regressor {
    fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<()>;
    fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<f64>>;
    /// Input width the regressor was fitted on; 0 before fitting.
    fn n_features(&self) -> usize;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Dataset>;
    async fn transform(&self, data: Dataset) -> Result<TrainedArtifacts>;
    async fn load(&self, result: TrainedArtifacts) -> Result<String>;
}
