//! CSV Lead Reader
//!
//! Header names are matched case-insensitively after trimming. The
//! delimiter is sniffed from the header line.

use std::fs;
use std::path::Path;

use crate::error::{InsightError, InsightResult};
use crate::logic::features::raw::LEAD_DEFAULTS;
use super::record::LeadRecord;

/// Delimiters recognised by the sniffer, in tie-break order
pub const CANDIDATE_DELIMITERS: &[u8] = &[b',', b';', b'\t'];

/// Pick the candidate delimiter occurring most often in the header line.
///
/// Falls back to `,` when none occurs.
pub fn detect_delimiter(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or_default();
    let mut best = (b',', 0usize);
    for &candidate in CANDIDATE_DELIMITERS {
        let count = header.bytes().filter(|b| *b == candidate).count();
        if count > best.1 {
            best = (candidate, count);
        }
    }
    best.0
}

/// Parsed lead file
#[derive(Debug, Clone, PartialEq)]
pub struct LeadTable {
    /// Normalised header names, in file order
    pub headers: Vec<String>,
    pub records: Vec<LeadRecord>,
    pub delimiter: u8,
}

impl LeadTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Index of a normalised header
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Parse CSV text. `limit` caps the number of data rows read.
    pub fn parse(text: &str, limit: Option<usize>) -> InsightResult<Self> {
        let text = text.trim_start_matches('\u{feff}');
        let delimiter = detect_delimiter(text);
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();

        let missing: Vec<&str> = LEAD_DEFAULTS
            .iter()
            .map(|(field, _)| *field)
            .filter(|field| !headers.iter().any(|h| h == field))
            .collect();
        if !missing.is_empty() {
            return Err(InsightError::MalformedInput(format!(
                "missing required columns: {}",
                missing.join(", ")
            )));
        }

        let mut records = Vec::new();
        for (index, row) in reader.records().enumerate() {
            if limit.map_or(false, |limit| records.len() >= limit) {
                break;
            }
            let row = row?;
            let line = row
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(index + 2);
            records.push(LeadRecord {
                line,
                cells: row.iter().map(str::to_string).collect(),
            });
        }

        log::debug!(
            "Parsed {} lead rows ({} columns, delimiter {:?})",
            records.len(),
            headers.len(),
            delimiter as char
        );

        Ok(Self { headers, records, delimiter })
    }

    /// Read and parse a lead file
    pub fn read(path: &Path, limit: Option<usize>) -> InsightResult<Self> {
        if !path.exists() {
            return Err(InsightError::MalformedInput(format!(
                "CSV file not found: {}",
                path.display()
            )));
        }
        let text = fs::read_to_string(path)?;
        Self::parse(&text, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("age;job;balance\n1;2;3"), b';');
        assert_eq!(detect_delimiter("age\tjob\tbalance"), b'\t');
        assert_eq!(detect_delimiter("age,job,balance"), b',');
        assert_eq!(detect_delimiter("age"), b',');
        assert_eq!(detect_delimiter(""), b',');
    }

    #[test]
    fn test_missing_columns_listed() {
        let err = LeadTable::parse("Age,Job\n30,admin.\n", None).unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, InsightError::MalformedInput(_)));
        assert!(message.contains("balance"));
        assert!(message.contains("poutcome"));
        assert!(!message.contains("age,"));
    }
}
