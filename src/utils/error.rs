use thiserror::Error;

#[derive(Error, Debug)]
pub enum PredictorError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Column '{column}' not found in dataset")]
    MissingColumn { column: String },

    #[error("Invalid data at row {row}, column '{column}': {reason}")]
    DataError {
        row: usize,
        column: String,
        reason: String,
    },

    #[error("Dataset has no rows with a '{target}' value")]
    EmptyDataset { target: String },

    #[error("Training error: {message}")]
    TrainingError { message: String },

    #[error("Missing artifact(s): {}", .missing.join(", "))]
    MissingArtifact { missing: Vec<String> },

    #[error("Shape mismatch in {stage}: expected {expected} columns, found {found}")]
    ShapeMismatch {
        stage: String,
        expected: usize,
        found: usize,
    },

    #[error("Prediction failed: {message}")]
    PredictionError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Data,
    Training,
    Inference,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl PredictorError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::CsvError(_)
            | Self::MissingColumn { .. }
            | Self::DataError { .. }
            | Self::EmptyDataset { .. } => ErrorCategory::Data,
            Self::TrainingError { .. } => ErrorCategory::Training,
            Self::MissingArtifact { .. }
            | Self::ShapeMismatch { .. }
            | Self::PredictionError { .. }
            | Self::SerializationError(_) => ErrorCategory::Inference,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Training | ErrorCategory::Inference => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::MissingArtifact { .. } => {
                "Run `harga-rumah train` first so the model, scaler and imputer are saved"
                    .to_string()
            }
            Self::MissingColumn { column } => format!(
                "Check the CSV header or set the column name in the [dataset] section (missing '{}')",
                column
            ),
            Self::DataError { row, .. } => {
                format!("Fix or remove row {} of the dataset and train again", row)
            }
            Self::EmptyDataset { target } => format!(
                "Point [dataset] path at a CSV that has values in the '{}' column",
                target
            ),
            Self::ShapeMismatch { .. } | Self::SerializationError(_) => {
                "The saved artifacts do not match each other; retrain to regenerate them"
                    .to_string()
            }
            Self::PredictionError { .. } => {
                "Check the input values and make sure the artifacts come from one training run"
                    .to_string()
            }
            Self::TrainingError { .. } => {
                "Check that the dataset has enough rows with observed values".to_string()
            }
            Self::CsvError(_) => "Make sure the dataset is a valid comma-separated file".to_string(),
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => {
                "Review the configuration file and command line flags".to_string()
            }
            Self::IoError(_) => "Check file paths and permissions".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::MissingArtifact { .. } => format!(
                "Model, scaler or imputer file not found. Make sure the model has been trained and saved. ({})",
                self
            ),
            Self::PredictionError { .. } | Self::ShapeMismatch { .. } => {
                format!("Failed to load the model or make a prediction: {}", self)
            }
            _ => self.to_string(),
        }
    }

    pub fn training(message: impl Into<String>) -> Self {
        Self::TrainingError {
            message: message.into(),
        }
    }

    pub fn prediction(message: impl Into<String>) -> Self {
        Self::PredictionError {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PredictorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_artifact_lists_files() {
        let err = PredictorError::MissingArtifact {
            missing: vec!["scaler.json".to_string(), "imputer.json".to_string()],
        };
        assert_eq!(err.to_string(), "Missing artifact(s): scaler.json, imputer.json");
        assert_eq!(err.category(), ErrorCategory::Inference);
        assert!(err.user_friendly_message().contains("not found"));
    }

    #[test]
    fn test_severity_by_category() {
        let io = PredictorError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "gone",
        ));
        assert_eq!(io.severity(), ErrorSeverity::Critical);

        let column = PredictorError::MissingColumn {
            column: "bedrooms".to_string(),
        };
        assert_eq!(column.severity(), ErrorSeverity::High);
        assert!(column.recovery_suggestion().contains("bedrooms"));
    }

    #[test]
    fn test_empty_dataset_is_data_error() {
        let err = PredictorError::EmptyDataset {
            target: "price_in_rp".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Data);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.to_string().contains("price_in_rp"));
    }

    #[test]
    fn test_failures_never_map_below_medium() {
        let errors = [
            PredictorError::training("x"),
            PredictorError::prediction("x"),
            PredictorError::ConfigError {
                message: "x".to_string(),
            },
        ];
        for err in errors {
            assert!(err.severity() >= ErrorSeverity::Medium);
        }
    }
}
