//! Dataset Module - CSV batch scoring
//!
//! Reads lead exports, scores each row through the loaded model's
//! preprocessing adapter and writes the rows back with an `ml_score`
//! column. Also fits IQR clipping bounds from an export.

pub mod record;
pub mod reader;
pub mod batch;
pub mod writer;


use std::path::Path;

use crate::error::InsightResult;
use crate::logic::model::LoadedModel;

pub use batch::{fit_iqr_bounds, score_table, BatchReport, BatchSummary, PROGRESS_EVERY};
pub use reader::{detect_delimiter, LeadTable};
pub use record::{LeadRecord, RowFailure, ScoredRecord, SCORE_COLUMN};
pub use writer::{write_csv, write_jsonl, write_report};

/// Read a lead file and score it
pub fn score_file(
    model: &LoadedModel,
    path: &Path,
    limit: Option<usize>,
) -> InsightResult<BatchReport> {
    let table = LeadTable::read(path, limit)?;
    score_table(model, &table)
}
