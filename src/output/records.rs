use crate::CrawlError;
use serde::Serialize;
use std::path::Path;

/// Writes collected records to a CSV file, one row per record
///
/// The header row comes from the record's field names. Absent optional
/// fields are written as empty cells. An existing file is overwritten.
///
/// # Returns
///
/// * `Ok(usize)` - Number of rows written
/// * `Err(CrawlError)` - Failed to create or write the file
pub fn write_records<R: Serialize>(path: &Path, records: &[R]) -> Result<usize, CrawlError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    tracing::debug!("Wrote {} records to {}", records.len(), path.display());
    Ok(records.len())
}
