use crate::domain::model::TrainingReport;
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub output_path: String,
    pub report: TrainingReport,
}

pub struct TrainingEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> TrainingEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<TrainingOutcome> {
        tracing::info!("Starting training process...");
        let started = Instant::now();

        // Extract
        let phase = Instant::now();
        let dataset = self.pipeline.extract().await?;
        tracing::info!(
            "📥 Loaded {} rows ({} skipped) in {:?}",
            dataset.len(),
            dataset.skipped_rows,
            phase.elapsed()
        );

        // Transform
        let phase = Instant::now();
        let artifacts = self.pipeline.transform(dataset).await?;
        tracing::info!(
            "🧮 Fitted imputer, scaler and {} in {:?}",
            artifacts.report.model,
            phase.elapsed()
        );
        let report = artifacts.report.clone();

        // Load
        let phase = Instant::now();
        let output_path = self.pipeline.load(artifacts).await?;
        tracing::info!("💾 Artifacts saved to {} in {:?}", output_path, phase.elapsed());

        tracing::info!("Training finished in {:?}", started.elapsed());
        Ok(TrainingOutcome {
            output_path,
            report,
        })
    }
}
