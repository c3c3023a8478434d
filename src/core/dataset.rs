use crate::domain::model::{Dataset, FEATURE_COUNT};
use crate::utils::error::{PredictorError, Result};
use ndarray::{Array1, Array2};
use std::path::Path;

const MISSING_MARKERS: [&str; 5] = ["na", "nan", "null", "none", "n/a"];

pub fn load_dataset<P: AsRef<Path>>(
    path: P,
    feature_columns: &[String],
    target_column: &str,
) -> Result<Dataset> {
    let file = std::fs::File::open(path.as_ref())?;
    read_dataset(file, feature_columns, target_column)
}

/// Reads the feature and target columns out of a headed CSV.
///
/// Empty cells and the usual NA markers become NaN features; rows without a
/// target are skipped and counted.
pub fn read_dataset<R: std::io::Read>(
    reader: R,
    feature_columns: &[String],
    target_column: &str,
) -> Result<Dataset> {
    if feature_columns.len() != FEATURE_COUNT {
        return Err(PredictorError::InvalidConfigValueError {
            field: "dataset.features".to_string(),
            value: feature_columns.join(","),
            reason: format!("Exactly {} feature columns are required", FEATURE_COUNT),
        });
    }

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();

    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| PredictorError::MissingColumn {
                column: name.to_string(),
            })
    };
    let feature_idx = feature_columns
        .iter()
        .map(|name| position(name.as_str()))
        .collect::<Result<Vec<_>>>()?;
    let target_idx = position(target_column)?;

    let mut values = Vec::new();
    let mut targets = Vec::new();
    let mut skipped_rows = 0;

    for (index, record) in rdr.records().enumerate() {
        let record = record?;
        // 行號含標題列，從 1 起算
        let row = index + 2;

        let Some(target) = parse_cell(record.get(target_idx), target_column, row)? else {
            skipped_rows += 1;
            tracing::debug!("Skipping row {}: missing '{}'", row, target_column);
            continue;
        };

        for (&idx, name) in feature_idx.iter().zip(feature_columns) {
            values.push(parse_cell(record.get(idx), name, row)?.unwrap_or(f64::NAN));
        }
        targets.push(target);
    }

    if targets.is_empty() {
        return Err(PredictorError::EmptyDataset {
            target: target_column.to_string(),
        });
    }
    if skipped_rows > 0 {
        tracing::warn!(
            "⚠️ Skipped {} row(s) without a '{}' value",
            skipped_rows,
            target_column
        );
    }

    let features = Array2::from_shape_vec((targets.len(), FEATURE_COUNT), values)
        .map_err(|e| PredictorError::training(format!("could not shape feature matrix: {}", e)))?;

    Ok(Dataset {
        feature_columns: feature_columns.to_vec(),
        target_column: target_column.to_string(),
        features,
        targets: Array1::from(targets),
        skipped_rows,
    })
}

fn parse_cell(raw: Option<&str>, column: &str, row: usize) -> Result<Option<f64>> {
    let raw = raw.unwrap_or("").trim();
    if raw.is_empty() || MISSING_MARKERS.iter().any(|m| raw.eq_ignore_ascii_case(m)) {
        return Ok(None);
    }

    let value: f64 = raw.parse().map_err(|_| PredictorError::DataError {
        row,
        column: column.to_string(),
        reason: format!("'{}' is not a number", raw),
    })?;
    if !value.is_finite() {
        return Err(PredictorError::DataError {
            row,
            column: column.to_string(),
            reason: format!("'{}' is not a finite number", raw),
        });
    }
    Ok(Some(value))
}
