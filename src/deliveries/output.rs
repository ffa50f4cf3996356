use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

use super::types::DeliveryRecord;

/// Write the deliveries artifact as a JSON array.
///
/// The file is written to a temporary sibling and renamed into place, so a
/// reader never sees a half-written list.
pub fn write_deliveries(path: &Path, records: &[DeliveryRecord]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temporary file in {}", dir.display()))?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        serde_json::to_writer(&mut writer, records)?;
        writer.flush()?;
    }
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("writing {}", path.display()))?;

    Ok(())
}

/// Read a deliveries artifact written by `write_deliveries`
pub fn read_deliveries(path: &Path) -> Result<Vec<DeliveryRecord>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let records = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(records)
}
