pub mod artifacts;
pub mod dataset;
pub mod engine;
pub mod inference;
pub mod training;

pub use crate::domain::model::{Dataset, FeatureVector, TrainingReport};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
