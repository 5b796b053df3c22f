//! Batch Scoring - Every row through the same adapter as single requests

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::InsightResult;
use crate::logic::features::layout::NUMERIC_FIELDS;
use crate::logic::features::IqrBounds;
use crate::logic::model::LoadedModel;
use super::reader::LeadTable;
use super::record::{RowFailure, ScoredRecord};

/// Progress is logged once per this many rows
pub const PROGRESS_EVERY: usize = 1000;

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub headers: Vec<String>,
    pub scored: Vec<ScoredRecord>,
    pub failures: Vec<RowFailure>,
}

/// Counts shown after a batch run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total_rows: usize,
    pub scored_rows: usize,
    pub failed_rows: usize,
}

impl BatchReport {
    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            total_rows: self.scored.len() + self.failures.len(),
            scored_rows: self.scored.len(),
            failed_rows: self.failures.len(),
        }
    }

    /// Scored rows as JSON objects
    pub fn rows_json(&self) -> Vec<Value> {
        self.scored.iter().map(|s| s.to_json(&self.headers)).collect()
    }

    /// Mean score over the scored rows
    pub fn mean_score(&self) -> Option<f64> {
        if self.scored.is_empty() {
            return None;
        }
        Some(self.scored.iter().map(|s| s.ml_score).sum::<f64>() / self.scored.len() as f64)
    }
}

/// Score every row of a table.
///
/// A row with an unusable value is reported in `failures` and the batch
/// carries on; configuration errors abort the whole run.
pub fn score_table(model: &LoadedModel, table: &LeadTable) -> InsightResult<BatchReport> {
    let total = table.len();
    let mut scored = Vec::with_capacity(total);
    let mut failures = Vec::new();

    log::info!("Scoring {} leads with model '{}'", total, model.metadata().name);

    for (i, record) in table.records.iter().enumerate() {
        let outcome = record
            .to_instance(&table.headers)
            .and_then(|raw| model.adapter().transform(&raw))
            .and_then(|vector| model.predict(&vector));

        match outcome {
            Ok(ml_score) => scored.push(ScoredRecord { record: record.clone(), ml_score }),
            Err(e) if e.is_configuration() => return Err(e),
            Err(e) => {
                log::warn!("Row at line {} skipped: {}", record.line, e);
                failures.push(RowFailure { line: record.line, error: e.to_string() });
            }
        }

        if (i + 1) % PROGRESS_EVERY == 0 {
            log::info!("Processed {}/{} rows", i + 1, total);
        }
    }

    log::info!("Scored {} rows, {} failed", scored.len(), failures.len());

    Ok(BatchReport {
        headers: table.headers.clone(),
        scored,
        failures,
    })
}

/// Fit IQR clipping bounds for every numeric lead field in the table.
///
/// Cells that are empty or not numeric are ignored, as are ragged rows. A
/// column with no usable value gets no bounds.
pub fn fit_iqr_bounds(table: &LeadTable) -> BTreeMap<String, IqrBounds> {
    let mut bounds = BTreeMap::new();
    for field in NUMERIC_FIELDS {
        let Some(index) = table.column(field) else {
            continue;
        };
        let values: Vec<f64> = table
            .records
            .iter()
            .filter(|r| r.is_complete(&table.headers))
            .filter_map(|r| r.cells.get(index))
            .filter_map(|cell| cell.trim().parse::<f64>().ok())
            .collect();
        match IqrBounds::fit(&values) {
            Some(fitted) => {
                bounds.insert((*field).to_string(), fitted);
            }
            None => log::warn!("No numeric values for '{}', bounds not fitted", field),
        }
    }
    bounds
}
