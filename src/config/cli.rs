use crate::config::TomlConfig;
use crate::domain::model::FeatureVector;
use crate::ml::{ImputeStrategy, ModelKind};
use crate::utils::error::Result;
use crate::utils::logger::LogFormat;
use crate::utils::validation::{validate_non_negative, validate_path, Validate};
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "harga-rumah")]
#[command(about = "Jabodetabek house price prediction: train the model, then predict")]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log output format
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit imputer, scaler and regressor on a CSV dataset and save them
    Train(TrainArgs),
    /// Predict the price of one house from saved artifacts
    Predict(PredictArgs),
}

#[derive(Debug, Clone, Args)]
pub struct TrainArgs {
    /// Path to TOML configuration file (optional)
    #[arg(short, long, default_value = "train-config.toml")]
    pub config: String,

    /// CSV dataset path
    #[arg(long)]
    pub dataset: Option<String>,

    /// Directory the artifacts are written to
    #[arg(long)]
    pub artifacts_dir: Option<String>,

    #[arg(long, value_enum)]
    pub model: Option<ModelKind>,

    /// How missing feature values are filled
    #[arg(long, value_enum)]
    pub imputer_strategy: Option<ImputeStrategy>,

    #[arg(long)]
    pub n_estimators: Option<usize>,

    #[arg(long)]
    pub max_depth: Option<usize>,

    #[arg(long)]
    pub test_size: Option<f64>,

    /// Seed for the train/test split and bootstrap sampling
    #[arg(long)]
    pub seed: Option<u64>,
}

impl TrainArgs {
    /// 命令列參數覆蓋檔案設定
    pub fn apply_overrides(&self, config: &mut TomlConfig) {
        if let Some(dataset) = &self.dataset {
            config.dataset.path = dataset.clone();
        }
        if let Some(dir) = &self.artifacts_dir {
            config.artifacts.dir = dir.clone();
        }
        if let Some(model) = self.model {
            config.training.model = model;
        }
        if let Some(strategy) = self.imputer_strategy {
            config.training.imputer_strategy = strategy;
        }
        if let Some(n) = self.n_estimators {
            config.training.n_estimators = n;
        }
        if let Some(depth) = self.max_depth {
            config.training.max_depth = Some(depth);
        }
        if let Some(test_size) = self.test_size {
            config.training.test_size = test_size;
        }
        if let Some(seed) = self.seed {
            config.training.random_state = seed;
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct PredictArgs {
    /// Directory holding the model, scaler and imputer
    #[arg(long, default_value = "models")]
    pub artifacts_dir: String,

    /// Land area in m² (omit to impute)
    #[arg(long)]
    pub land_size: Option<f64>,

    /// Building area in m² (omit to impute)
    #[arg(long)]
    pub building_size: Option<f64>,

    /// Number of bedrooms (omit to impute)
    #[arg(long)]
    pub bedrooms: Option<f64>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

impl PredictArgs {
    pub fn feature_vector(&self) -> FeatureVector {
        FeatureVector {
            land_size_m2: self.land_size,
            building_size_m2: self.building_size,
            bedrooms: self.bedrooms,
        }
    }
}

impl Validate for PredictArgs {
    fn validate(&self) -> Result<()> {
        validate_path("artifacts_dir", &self.artifacts_dir)?;
        for (field, value) in [
            ("land_size", self.land_size),
            ("building_size", self.building_size),
            ("bedrooms", self.bedrooms),
        ] {
            if let Some(value) = value {
                validate_non_negative(field, value)?;
            }
        }
        Ok(())
    }
}
