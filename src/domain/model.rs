use chrono::{DateTime, Utc};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// 每筆輸入固定三個特徵: 土地面積、建築面積、房間數
pub const FEATURE_COUNT: usize = 3;

pub const DEFAULT_FEATURE_COLUMNS: [&str; FEATURE_COUNT] =
    ["land_size_m2", "building_size_m2", "bedrooms"];
pub const DEFAULT_TARGET_COLUMN: &str = "price_in_rp";

/// One house to price. `None` marks a value the imputer fills in.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureVector {
    pub land_size_m2: Option<f64>,
    pub building_size_m2: Option<f64>,
    pub bedrooms: Option<f64>,
}

impl FeatureVector {
    pub fn new(land_size_m2: f64, building_size_m2: f64, bedrooms: f64) -> Self {
        Self {
            land_size_m2: Some(land_size_m2),
            building_size_m2: Some(building_size_m2),
            bedrooms: Some(bedrooms),
        }
    }

    pub fn values(&self) -> [Option<f64>; FEATURE_COUNT] {
        [self.land_size_m2, self.building_size_m2, self.bedrooms]
    }

    /// 1×3 矩陣，缺值以 NaN 表示
    pub fn to_row(&self) -> Array2<f64> {
        Array2::from_shape_fn((1, FEATURE_COUNT), |(_, j)| {
            self.values()[j].unwrap_or(f64::NAN)
        })
    }
}

#[derive(Debug, Clone)]
pub struct Dataset {
    pub feature_columns: Vec<String>,
    pub target_column: String,
    /// n×3，NaN 表示缺值
    pub features: Array2<f64>,
    pub targets: Array1<f64>,
    pub skipped_rows: usize,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn missing_counts(&self) -> Vec<(String, usize)> {
        self.feature_columns
            .iter()
            .zip(self.features.columns())
            .map(|(name, column)| {
                (
                    name.clone(),
                    column.iter().filter(|value| value.is_nan()).count(),
                )
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub mae: f64,
    pub mse: f64,
    pub r2: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub model: String,
    pub imputer_strategy: String,
    pub feature_columns: Vec<String>,
    pub target_column: String,
    pub total_rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub skipped_rows: usize,
    pub missing_values: Vec<(String, usize)>,
    pub metrics: Metrics,
    pub trained_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_feature_vector_row_marks_missing_as_nan() {
        let input = FeatureVector {
            land_size_m2: Some(100.0),
            building_size_m2: None,
            bedrooms: Some(3.0),
        };
        let row = input.to_row();

        assert_eq!(row.dim(), (1, FEATURE_COUNT));
        assert_eq!(row[[0, 0]], 100.0);
        assert!(row[[0, 1]].is_nan());
        assert_eq!(row[[0, 2]], 3.0);
    }

    #[test]
    fn test_dataset_missing_counts() {
        let dataset = Dataset {
            feature_columns: DEFAULT_FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            target_column: DEFAULT_TARGET_COLUMN.to_string(),
            features: array![[1.0, f64::NAN, 2.0], [f64::NAN, f64::NAN, 3.0]],
            targets: array![10.0, 20.0],
            skipped_rows: 0,
        };

        let counts = dataset.missing_counts();
        assert_eq!(counts[0], ("land_size_m2".to_string(), 1));
        assert_eq!(counts[1], ("building_size_m2".to_string(), 2));
        assert_eq!(counts[2], ("bedrooms".to_string(), 0));
    }
}
