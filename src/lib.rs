pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod ml;
pub mod utils;

pub use self::adapters::LocalStorage;
pub use self::config::TomlConfig;
pub use self::core::{
    artifacts::ArtifactStore, engine::TrainingEngine, inference::Predictor,
    training::TrainingPipeline,
};
pub use self::domain::model::FeatureVector;
pub use self::utils::error::{PredictorError, Result};
