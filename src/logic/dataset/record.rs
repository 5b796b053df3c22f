use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{InsightError, InsightResult};
use crate::logic::features::layout::{CATEGORICAL_FIELDS, NUMERIC_FIELDS};
use crate::logic::features::{RawInstance, RawValue};

/// Column name appended to scored rows
pub const SCORE_COLUMN: &str = "ml_score";

/// One data row as read from the file
#[derive(Debug, Clone, PartialEq)]
pub struct LeadRecord {
    /// 1-based line number in the source file (header is line 1)
    pub line: usize,
    pub cells: Vec<String>,
}

impl LeadRecord {
    /// Whether the row has exactly one cell per header
    pub fn is_complete(&self, headers: &[String]) -> bool {
        self.cells.len() == headers.len()
    }

    /// Lead fields of this row.
    ///
    /// Empty cells count as absent so defaults apply; numeric cells are
    /// parsed here so a bad value names its line.
    pub fn to_instance(&self, headers: &[String]) -> InsightResult<RawInstance> {
        if !self.is_complete(headers) {
            return Err(InsightError::MalformedInput(format!(
                "line {}: expected {} cells, got {}",
                self.line,
                headers.len(),
                self.cells.len()
            )));
        }
        let mut raw = RawInstance::new();
        for (header, cell) in headers.iter().zip(&self.cells) {
            let cell = cell.trim();
            if cell.is_empty() {
                continue;
            }
            if NUMERIC_FIELDS.contains(&header.as_str()) {
                let value = RawValue::from(cell);
                if !value.is_unknown() && value.as_number().is_none() {
                    return Err(InsightError::invalid_field(
                        header,
                        format!("line {}: expected a number, got '{}'", self.line, cell),
                    ));
                }
                raw.insert(header, value);
            } else if CATEGORICAL_FIELDS.contains(&header.as_str()) {
                raw.insert(header, cell);
            }
        }
        raw.apply_defaults();
        Ok(raw)
    }
}

/// A row together with its model score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    pub record: LeadRecord,
    pub ml_score: f64,
}

impl ScoredRecord {
    /// Original cells keyed by header plus `ml_score`; empty cells become null
    pub fn to_json(&self, headers: &[String]) -> Value {
        let mut object = Map::new();
        for (header, cell) in headers.iter().zip(&self.record.cells) {
            let value = if cell.trim().is_empty() {
                Value::Null
            } else {
                Value::String(cell.clone())
            };
            object.insert(header.clone(), value);
        }
        object.insert(SCORE_COLUMN.to_string(), Value::from(self.ml_score));
        Value::Object(object)
    }
}

/// A row that could not be scored
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowFailure {
    pub line: usize,
    pub error: String,
}
