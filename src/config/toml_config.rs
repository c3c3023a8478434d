use crate::domain::model::{DEFAULT_FEATURE_COLUMNS, DEFAULT_TARGET_COLUMN, FEATURE_COUNT};
use crate::domain::ports::ConfigProvider;
use crate::ml::{ImputeStrategy, ModelKind};
use crate::utils::error::{PredictorError, Result};
use crate::utils::logger::LogFormat;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub dataset: DatasetConfig,
    pub artifacts: ArtifactsConfig,
    pub training: TrainingConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub path: String,
    pub features: Vec<String>,
    pub target: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: "data/jabodetabek_house_price.csv".to_string(),
            features: DEFAULT_FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            target: DEFAULT_TARGET_COLUMN.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    pub dir: String,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: "models".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub model: ModelKind,
    pub imputer_strategy: ImputeStrategy,
    pub test_size: f64,
    pub random_state: u64,
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub svr_c: f64,
    pub svr_epsilon: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            model: ModelKind::RandomForest,
            imputer_strategy: ImputeStrategy::Median,
            test_size: 0.2,
            random_state: 42,
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            svr_c: 1.0,
            svr_epsilon: 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub verbose: bool,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            format: "compact".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn log_format(&self) -> LogFormat {
        match self.format.as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PredictorError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 檔案不存在時使用預設值
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(
                "Config file {} not found, using defaults",
                path.as_ref().display()
            );
            Ok(Self::default())
        }
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PredictorError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATASET_PATH})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PredictorError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("dataset.path", &self.dataset.path)?;
        validation::validate_file_extension("dataset.path", &self.dataset.path, &["csv"])?;
        validation::validate_path("artifacts.dir", &self.artifacts.dir)?;
        validation::validate_non_empty_string("dataset.target", &self.dataset.target)?;

        if self.dataset.features.len() != FEATURE_COUNT {
            return Err(PredictorError::InvalidConfigValueError {
                field: "dataset.features".to_string(),
                value: self.dataset.features.join(","),
                reason: format!("Exactly {} feature columns are required", FEATURE_COUNT),
            });
        }
        for feature in &self.dataset.features {
            validation::validate_non_empty_string("dataset.features", feature)?;
        }
        validation::validate_distinct("dataset.features", &self.dataset.features)?;
        if self.dataset.features.contains(&self.dataset.target) {
            return Err(PredictorError::InvalidConfigValueError {
                field: "dataset.target".to_string(),
                value: self.dataset.target.clone(),
                reason: "Target column cannot also be a feature".to_string(),
            });
        }

        validation::validate_open_range("training.test_size", self.training.test_size, 0.0, 1.0)?;
        validation::validate_positive_number("training.n_estimators", self.training.n_estimators, 1)?;
        validation::validate_positive_number(
            "training.min_samples_split",
            self.training.min_samples_split,
            2,
        )?;
        if let Some(depth) = self.training.max_depth {
            validation::validate_positive_number("training.max_depth", depth, 1)?;
        }
        validation::validate_open_range(
            "training.svr_c",
            self.training.svr_c,
            0.0,
            f64::INFINITY,
        )?;
        validation::validate_non_negative("training.svr_epsilon", self.training.svr_epsilon)?;

        let valid_formats = ["compact", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(PredictorError::InvalidConfigValueError {
                field: "logging.format".to_string(),
                value: self.logging.format.clone(),
                reason: format!("Valid formats: {}", valid_formats.join(", ")),
            });
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn dataset_path(&self) -> &str {
        &self.dataset.path
    }

    fn feature_columns(&self) -> &[String] {
        &self.dataset.features
    }

    fn target_column(&self) -> &str {
        &self.dataset.target
    }

    fn artifacts_dir(&self) -> &str {
        &self.artifacts.dir
    }

    fn training(&self) -> &TrainingConfig {
        &self.training
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
