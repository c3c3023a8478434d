use crate::domain::model::Metrics;
use crate::utils::error::{PredictorError, Result};
use ndarray::ArrayView1;

fn check_lengths(y_true: ArrayView1<f64>, y_pred: ArrayView1<f64>) -> Result<()> {
    if y_true.len() != y_pred.len() {
        return Err(PredictorError::training(format!(
            "metric inputs differ in length: {} vs {}",
            y_true.len(),
            y_pred.len()
        )));
    }
    if y_true.is_empty() {
        return Err(PredictorError::training("cannot evaluate on an empty test set"));
    }
    Ok(())
}

pub fn mean_absolute_error(y_true: ArrayView1<f64>, y_pred: ArrayView1<f64>) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    Ok((&y_true - &y_pred).mapv(f64::abs).mean().unwrap_or(0.0))
}

pub fn mean_squared_error(y_true: ArrayView1<f64>, y_pred: ArrayView1<f64>) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    Ok((&y_true - &y_pred).mapv(|e| e * e).mean().unwrap_or(0.0))
}

pub fn r2_score(y_true: ArrayView1<f64>, y_pred: ArrayView1<f64>) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    let mean = y_true.mean().unwrap_or(0.0);
    let ss_res: f64 = (&y_true - &y_pred).mapv(|e| e * e).sum();
    let ss_tot: f64 = y_true.mapv(|v| (v - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}

pub fn evaluate(y_true: ArrayView1<f64>, y_pred: ArrayView1<f64>) -> Result<Metrics> {
    Ok(Metrics {
        mae: mean_absolute_error(y_true, y_pred)?,
        mse: mean_squared_error(y_true, y_pred)?,
        r2: r2_score(y_true, y_pred)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1};

    #[test]
    fn test_metrics_on_known_values() {
        let y_true = array![3.0, -0.5, 2.0, 7.0];
        let y_pred = array![2.5, 0.0, 2.0, 8.0];
        let metrics = evaluate(y_true.view(), y_pred.view()).unwrap();

        assert!((metrics.mae - 0.5).abs() < 1e-12);
        assert!((metrics.mse - 0.375).abs() < 1e-12);
        assert!((metrics.r2 - 0.948_608_137_044_967_9).abs() < 1e-12);
    }

    #[test]
    fn test_r2_with_constant_targets() {
        let y_true = array![4.0, 4.0];
        assert_eq!(r2_score(y_true.view(), array![4.0, 4.0].view()).unwrap(), 1.0);
        assert_eq!(r2_score(y_true.view(), array![3.0, 5.0].view()).unwrap(), 0.0);
    }

    #[test]
    fn test_length_mismatch_is_an_error() {
        assert!(evaluate(array![1.0, 2.0].view(), array![1.0].view()).is_err());
        let empty = Array1::<f64>::zeros(0);
        assert!(evaluate(empty.view(), empty.view()).is_err());
    }
}
