use crate::domain::model::DeviceRow;
use crate::utils::error::{Result, SyncError};
use std::path::Path;

pub const COL_NAME: &str = "Name";
pub const COL_FQDN: &str = "Fully qualified domain name";
pub const COL_SYSCODE: &str = "SysCode";

/// Reads the device CSV into raw rows.
///
/// A missing file, unreadable CSV, or absent required column is a fatal
/// precondition failure; a well-formed file with zero records is fine and
/// yields an empty vec. Field values are returned untrimmed, the normalizer
/// owns per-row validation.
pub fn read_device_rows(path: &Path) -> Result<Vec<DeviceRow>> {
    if !path.exists() {
        return Err(SyncError::InputFileNotFound {
            path: path.display().to_string(),
        });
    }

    let mut reader = csv::Reader::from_path(path)?;

    let headers = reader.headers()?.clone();
    let name_idx = column_index(&headers, COL_NAME, path)?;
    let fqdn_idx = column_index(&headers, COL_FQDN, path)?;
    let syscode_idx = column_index(&headers, COL_SYSCODE, path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(DeviceRow {
            name: record.get(name_idx).unwrap_or_default().to_string(),
            fqdn: record.get(fqdn_idx).unwrap_or_default().to_string(),
            raw_syscode: record.get(syscode_idx).unwrap_or_default().to_string(),
        });
    }

    tracing::debug!(path = %path.display(), rows = rows.len(), "CSV read");
    Ok(rows)
}

fn column_index(headers: &csv::StringRecord, column: &str, path: &Path) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| SyncError::MissingColumn {
            path: path.display().to_string(),
            column: column.to_string(),
        })
}
