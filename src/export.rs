//! XLSX export of any CSV table.
//!
//! Rows are copied verbatim — header included, no type coercion — into a
//! single worksheet, preserving column order. The workbook lands next to
//! the source with the extension swapped to `.xlsx`.

use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use log::debug;
use rust_xlsxwriter::Workbook;

use crate::error::StoreError;

pub fn export_to_xlsx(source: &Path) -> Result<PathBuf, StoreError> {
    if !source.exists() {
        return Err(StoreError::NotFound(source.display().to_string()));
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(source)?;

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (row, result) in reader.records().enumerate() {
        let record = result?;
        for (col, field) in record.iter().enumerate() {
            worksheet.write_string(row as u32, col as u16, field)?;
        }
    }

    let dest = source.with_extension("xlsx");
    workbook.save(&dest)?;
    debug!("exported {} -> {}", source.display(), dest.display());
    Ok(dest)
}
