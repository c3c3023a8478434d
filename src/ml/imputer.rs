use crate::domain::ports::Transformer;
use crate::utils::error::{PredictorError, Result};
use ndarray::{Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// Statistic used to fill a missing cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum ImputeStrategy {
    Mean,
    #[default]
    Median,
    /// Most frequent observed value; the smallest one on ties.
    Mode,
}

impl ImputeStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImputeStrategy::Mean => "mean",
            ImputeStrategy::Median => "median",
            ImputeStrategy::Mode => "mode",
        }
    }

    fn statistic(&self, mut observed: Vec<f64>) -> Option<f64> {
        if observed.is_empty() {
            return None;
        }
        if *self == ImputeStrategy::Mean {
            return Some(observed.iter().sum::<f64>() / observed.len() as f64);
        }

        observed.sort_by(|a, b| a.total_cmp(b));
        match self {
            ImputeStrategy::Median => {
                let mid = observed.len() / 2;
                if observed.len() % 2 == 0 {
                    Some((observed[mid - 1] + observed[mid]) / 2.0)
                } else {
                    Some(observed[mid])
                }
            }
            _ => {
                // 已排序，相同值連續出現；嚴格大於才替換，平手保留較小值
                let mut best = (observed[0], 0usize);
                let mut run = (observed[0], 0usize);
                for &value in &observed {
                    if value == run.0 {
                        run.1 += 1;
                    } else {
                        run = (value, 1);
                    }
                    if run.1 > best.1 {
                        best = run;
                    }
                }
                Some(best.0)
            }
        }
    }
}

/// Fills NaN cells with a per-column statistic of the observed values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleImputer {
    #[serde(default)]
    strategy: ImputeStrategy,
    statistics: Vec<f64>,
}

impl SimpleImputer {
    pub fn fit_with(strategy: ImputeStrategy, x: ArrayView2<f64>) -> Result<Self> {
        let statistics = x
            .axis_iter(Axis(1))
            .enumerate()
            .map(|(index, column)| {
                let observed: Vec<f64> = column.iter().copied().filter(|v| !v.is_nan()).collect();
                strategy.statistic(observed).ok_or_else(|| {
                    PredictorError::training(format!(
                        "feature column {} has no observed values to impute from",
                        index
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!("Imputer ({}) statistics: {:?}", strategy.as_str(), statistics);
        Ok(Self {
            strategy,
            statistics,
        })
    }

    pub fn strategy(&self) -> ImputeStrategy {
        self.strategy
    }

    #[cfg(test)]
    pub fn statistics(&self) -> &[f64] {
        &self.statistics
    }
}

impl Transformer for SimpleImputer {
    fn fit(x: ArrayView2<f64>) -> Result<Self> {
        Self::fit_with(ImputeStrategy::default(), x)
    }

    fn transform(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.statistics.len() {
            return Err(PredictorError::ShapeMismatch {
                stage: "imputer".to_string(),
                expected: self.statistics.len(),
                found: x.ncols(),
            });
        }

        let mut out = x.to_owned();
        for (mut column, &fill) in out.axis_iter_mut(Axis(1)).zip(&self.statistics) {
            column.mapv_inplace(|v| if v.is_nan() { fill } else { v });
        }
        Ok(out)
    }

    fn n_features(&self) -> usize {
        self.statistics.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn with_gaps() -> Array2<f64> {
        array![
            [100.0, 50.0, 2.0],
            [f64::NAN, 70.0, 3.0],
            [300.0, f64::NAN, 3.0],
            [200.0, 90.0, 5.0],
            [100.0, 90.0, f64::NAN],
        ]
    }

    #[test]
    fn test_fit_uses_median_of_observed_values() {
        let imputer = SimpleImputer::fit(with_gaps().view()).unwrap();

        assert_eq!(imputer.strategy(), ImputeStrategy::Median);
        // 偶數個觀測值取中間兩個的平均
        assert_eq!(imputer.statistics(), &[150.0, 80.0, 3.0]);
    }

    #[test]
    fn test_mean_strategy() {
        let imputer = SimpleImputer::fit_with(ImputeStrategy::Mean, with_gaps().view()).unwrap();
        assert_eq!(imputer.statistics(), &[175.0, 75.0, 3.25]);
    }

    #[test]
    fn test_mode_strategy_prefers_smallest_on_tie() {
        let imputer = SimpleImputer::fit_with(ImputeStrategy::Mode, with_gaps().view()).unwrap();
        // 欄 0: 100 出現兩次；欄 1: 90 出現兩次；欄 2: 3 出現兩次
        assert_eq!(imputer.statistics(), &[100.0, 90.0, 3.0]);

        let tie = array![[4.0], [2.0], [4.0], [2.0], [9.0]];
        let imputer = SimpleImputer::fit_with(ImputeStrategy::Mode, tie.view()).unwrap();
        assert_eq!(imputer.statistics(), &[2.0]);
    }

    #[test]
    fn test_strategy_is_persisted() {
        let imputer = SimpleImputer::fit_with(ImputeStrategy::Mode, with_gaps().view()).unwrap();
        let json = serde_json::to_string(&imputer).unwrap();
        assert!(json.contains(r#""strategy":"mode""#));

        let restored: SimpleImputer = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, imputer);

        // 舊格式沒有 strategy 欄位時視為中位數
        let legacy: SimpleImputer = serde_json::from_str(r#"{"statistics":[1.0,2.0,3.0]}"#).unwrap();
        assert_eq!(legacy.strategy(), ImputeStrategy::Median);
    }

    #[test]
    fn test_transform_fills_only_missing_cells() {
        let train = array![[1.0, 10.0, 1.0], [3.0, 30.0, 3.0], [5.0, 50.0, 5.0]];
        let imputer = SimpleImputer::fit(train.view()).unwrap();

        let input = array![[f64::NAN, 12.0, f64::NAN]];
        let out = imputer.transform(input.view()).unwrap();

        assert_eq!(out.dim(), (1, 3));
        assert_eq!(out, array![[3.0, 12.0, 3.0]]);
    }

    #[test]
    fn test_fit_rejects_fully_missing_column() {
        let x = array![[1.0, f64::NAN], [2.0, f64::NAN]];
        for strategy in [ImputeStrategy::Mean, ImputeStrategy::Median, ImputeStrategy::Mode] {
            let err = SimpleImputer::fit_with(strategy, x.view()).unwrap_err();
            assert!(matches!(err, PredictorError::TrainingError { .. }));
        }
    }

    #[test]
    fn test_transform_rejects_wrong_width() {
        let imputer = SimpleImputer::fit(array![[1.0, 2.0, 3.0]].view()).unwrap();
        let err = imputer.transform(array![[1.0, 2.0]].view()).unwrap_err();
        assert!(matches!(
            err,
            PredictorError::ShapeMismatch { expected: 3, found: 2, .. }
        ));
    }
}
