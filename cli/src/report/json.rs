//! JSON report output.

use super::Report;
use crate::error::{AppError, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write the report as pretty-printed JSON.
pub fn write_json(report: &Report<'_>, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| AppError::write(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer
        .write_all(b"\n")
        .and_then(|_| writer.flush())
        .map_err(|e| AppError::write(path, e))
}
