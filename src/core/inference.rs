use crate::core::artifacts::ArtifactStore;
use crate::domain::model::{FeatureVector, FEATURE_COUNT};
use crate::domain::ports::{Regressor, Storage, Transformer};
use crate::ml::{RegressionModel, SimpleImputer, StandardScaler};
use crate::utils::error::{PredictorError, Result};
use ndarray::Array2;

/// Loaded artifacts ready to price houses. Read-only; every call is independent.
#[derive(Debug, Clone)]
pub struct Predictor {
    imputer: SimpleImputer,
    scaler: StandardScaler,
    model: RegressionModel,
}

impl Predictor {
    pub fn new(imputer: SimpleImputer, scaler: StandardScaler, model: RegressionModel) -> Self {
        Self {
            imputer,
            scaler,
            model,
        }
    }

    pub async fn load<S: Storage>(store: &ArtifactStore<S>) -> Result<Self> {
        let (imputer, scaler, model) = store.load().await?;
        tracing::debug!("Loaded {} model with its scaler and imputer", model.kind().as_str());
        Ok(Self::new(imputer, scaler, model))
    }

    pub fn model(&self) -> &RegressionModel {
        &self.model
    }

    pub fn predict(&self, input: &FeatureVector) -> Result<f64> {
        let row = input.to_row();

        let imputed = self.imputer.transform(row.view())?;
        check_row(&imputed, "imputer")?;

        let scaled = self.scaler.transform(imputed.view())?;
        check_row(&scaled, "scaler")?;

        let predicted = self.model.predict(scaled.view())?;
        let price = predicted
            .get(0)
            .copied()
            .ok_or_else(|| PredictorError::prediction("model returned no prediction"))?;

        if !price.is_finite() {
            return Err(PredictorError::prediction(format!(
                "model returned a non-finite price ({})",
                price
            )));
        }
        tracing::debug!(?input, price, "Prediction complete");
        Ok(price)
    }
}

fn check_row(x: &Array2<f64>, stage: &str) -> Result<()> {
    if x.dim() != (1, FEATURE_COUNT) {
        return Err(PredictorError::ShapeMismatch {
            stage: stage.to_string(),
            expected: FEATURE_COUNT,
            found: x.ncols(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::artifacts::{IMPUTER_FILE, MODEL_FILE, SCALER_FILE};
    use crate::ml::{LinearRegression, RandomForestRegressor};
    use ndarray::{array, Array1, Axis};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
        reads: Arc<AtomicUsize>,
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                PredictorError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }

        async fn exists(&self, path: &str) -> bool {
            self.files.lock().await.contains_key(path)
        }
    }

    fn fitted_predictor() -> Predictor {
        let x = array![
            [100.0, 50.0, 2.0],
            [150.0, 90.0, 3.0],
            [200.0, 120.0, 3.0],
            [300.0, 200.0, 4.0],
            [90.0, 45.0, 2.0],
        ];
        let y = x.map_axis(Axis(1), |r| 5_000_000.0 * r[0] + 3_000_000.0 * r[1] + 1e8 * r[2]);

        let imputer = SimpleImputer::fit(x.view()).unwrap();
        let scaler = StandardScaler::fit(x.view()).unwrap();
        let scaled = scaler.transform(x.view()).unwrap();
        let mut model = RegressionModel::LinearRegression(LinearRegression::default());
        model.fit(scaled.view(), y.view()).unwrap();

        Predictor::new(imputer, scaler, model)
    }

    async fn store_with(predictor: &Predictor, skip: Option<&str>) -> ArtifactStore<MockStorage> {
        let storage = MockStorage::default();
        let entries = [
            (MODEL_FILE, serde_json::to_vec(&predictor.model).unwrap()),
            (SCALER_FILE, serde_json::to_vec(&predictor.scaler).unwrap()),
            (IMPUTER_FILE, serde_json::to_vec(&predictor.imputer).unwrap()),
        ];
        for (name, data) in entries {
            if Some(name) != skip {
                storage.write_file(name, &data).await.unwrap();
            }
        }
        ArtifactStore::new(storage)
    }

    #[test]
    fn test_prediction_is_deterministic() {
        let predictor = fitted_predictor();
        let input = FeatureVector::new(100.0, 50.0, 3.0);

        let first = predictor.predict(&input).unwrap();
        for _ in 0..5 {
            assert_eq!(predictor.predict(&input).unwrap(), first);
        }
        let expected = 5_000_000.0 * 100.0 + 3_000_000.0 * 50.0 + 1e8 * 3.0;
        assert!((first - expected).abs() / expected < 1e-9);
    }

    #[test]
    fn test_missing_inputs_are_imputed() {
        let predictor = fitted_predictor();
        let partial = FeatureVector {
            land_size_m2: Some(150.0),
            building_size_m2: None,
            bedrooms: None,
        };
        // 中位數: 建築面積 90、房間數 3
        let full = FeatureVector::new(150.0, 90.0, 3.0);
        assert_eq!(
            predictor.predict(&partial).unwrap(),
            predictor.predict(&full).unwrap()
        );
    }

    #[tokio::test]
    async fn test_load_round_trip() {
        let predictor = fitted_predictor();
        let store = store_with(&predictor, None).await;

        let loaded = Predictor::load(&store).await.unwrap();
        let input = FeatureVector::new(120.0, 60.0, 2.0);
        assert_eq!(
            loaded.predict(&input).unwrap(),
            predictor.predict(&input).unwrap()
        );
    }

    #[tokio::test]
    async fn test_any_missing_artifact_stops_before_reading() {
        let predictor = fitted_predictor();

        for absent in [MODEL_FILE, SCALER_FILE, IMPUTER_FILE] {
            let store = store_with(&predictor, Some(absent)).await;
            let err = Predictor::load(&store).await.unwrap_err();

            match err {
                PredictorError::MissingArtifact { missing } => {
                    assert_eq!(missing, vec![absent.to_string()]);
                }
                other => panic!("unexpected error: {:?}", other),
            }
            assert_eq!(store.storage().reads.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn test_corrupt_artifact_is_reported() {
        let predictor = fitted_predictor();
        let store = store_with(&predictor, None).await;
        store.storage().write_file(SCALER_FILE, b"not json").await.unwrap();

        let err = Predictor::load(&store).await.unwrap_err();
        assert!(matches!(err, PredictorError::SerializationError(_)));
    }

    fn forest_on_five_columns() -> RegressionModel {
        let x = Array2::from_shape_fn((20, 5), |(i, j)| ((i * (j + 2)) % 13) as f64);
        let y: Array1<f64> = x.axis_iter(Axis(0)).map(|r| r.sum()).collect();
        let mut model = RegressionModel::RandomForest(RandomForestRegressor::new(5, None, 2, 42));
        model.fit(x.view(), y.view()).unwrap();
        model
    }

    #[test]
    fn test_model_of_other_width_is_shape_mismatch() {
        let base = fitted_predictor();
        let predictor = Predictor::new(base.imputer, base.scaler, forest_on_five_columns());

        let err = predictor
            .predict(&FeatureVector::new(1.0, 2.0, 3.0))
            .unwrap_err();
        assert!(matches!(
            err,
            PredictorError::ShapeMismatch { expected: 5, found: 3, .. }
        ));
    }

    #[tokio::test]
    async fn test_load_rejects_model_of_other_width() {
        let base = fitted_predictor();
        let mismatched = Predictor::new(base.imputer, base.scaler, forest_on_five_columns());
        let store = store_with(&mismatched, None).await;

        match Predictor::load(&store).await.unwrap_err() {
            PredictorError::ShapeMismatch {
                stage,
                expected,
                found,
            } => {
                assert_eq!(stage, "model");
                assert_eq!((expected, found), (3, 5));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
