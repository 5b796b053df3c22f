use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::error::InsightResult;
use super::batch::BatchReport;
use super::record::SCORE_COLUMN;

/// Write scored rows as CSV: original columns plus `ml_score`
pub fn write_csv<W: Write>(report: &BatchReport, delimiter: u8, out: W) -> InsightResult<()> {
    let mut writer = csv::WriterBuilder::new().delimiter(delimiter).from_writer(out);

    let mut header: Vec<&str> = report.headers.iter().map(String::as_str).collect();
    header.push(SCORE_COLUMN);
    writer.write_record(&header)?;

    for scored in &report.scored {
        let mut row = scored.record.cells.clone();
        row.push(format!("{:.6}", scored.ml_score));
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write scored rows as JSON lines, one object per row
pub fn write_jsonl<W: Write>(report: &BatchReport, mut out: W) -> io::Result<usize> {
    let mut count = 0;
    for row in report.rows_json() {
        serde_json::to_writer(&mut out, &row)?;
        out.write_all(b"\n")?;
        count += 1;
    }
    out.flush()?;
    Ok(count)
}

/// Write to a file, picking the format from the extension (`.jsonl` or CSV)
pub fn write_report(report: &BatchReport, delimiter: u8, path: &Path) -> InsightResult<()> {
    let file = File::create(path)?;
    let is_jsonl = path.extension().map_or(false, |e| e == "jsonl");
    if is_jsonl {
        write_jsonl(report, io::BufWriter::new(file))?;
    } else {
        write_csv(report, delimiter, io::BufWriter::new(file))?;
    }
    log::info!("Wrote {} scored rows to {}", report.scored.len(), path.display());
    Ok(())
}
