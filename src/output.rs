//! Persistence for generated artifacts and intermediate data.
//!
//! Supports CSV export of shaped records, JSON dumps, and HTML documents.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::dataset::Dataset;
use csv::WriterBuilder;
use std::fs::{self, File};
use std::path::Path;

/// Creates the parent directory of `path` if it is missing.
fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    Ok(())
}

/// Logs a value as pretty-printed JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes a value as pretty-printed JSON, replacing any existing file.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    ensure_parent(path)?;
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(file, value)?;
    debug!(path = %path.display(), "JSON written");
    Ok(())
}

/// Writes records as CSV with a header row. Missing values are empty cells.
pub fn write_dataset(path: &Path, data: &Dataset) -> Result<()> {
    ensure_parent(path)?;
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;

    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
    writer.write_record(data.columns())?;
    for row in data.rows() {
        writer.write_record(row.values().iter().map(|v| v.to_string()))?;
    }
    writer.flush()?;

    debug!(path = %path.display(), rows = data.len(), "CSV written");
    Ok(())
}

/// Writes a rendered HTML document.
pub fn write_html(path: &Path, html: &str) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, html).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), bytes = html.len(), "HTML written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Value;
    use std::env;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(name)
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&serde_json::json!({"1": [50000.0, null]})).unwrap();
    }

    #[test]
    fn test_write_dataset_round_trips() {
        let path = temp_path("ipeds_viz_test_dataset.csv");
        let _ = fs::remove_file(&path); // clean up any prior run

        let data = sample();
        write_dataset(&path, &data).unwrap();
        let back = Dataset::read_csv(&path).unwrap();

        assert_eq!(back, data);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_dataset_replaces_file() {
        let path = temp_path("ipeds_viz_test_replace.csv");
        let _ = fs::remove_file(&path);

        write_dataset(&path, &sample()).unwrap();
        write_dataset(&path, &sample()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        // 1 header + 2 data rows
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "year,id,name,totmen");
        assert_eq!(lines[2], "2023,2,Beta,");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_html_creates_parent_dirs() {
        let dir = temp_path("ipeds_viz_test_html");
        let _ = fs::remove_dir_all(&dir);
        let path = dir.join("nested").join("map.html");

        write_html(&path, "<html></html>").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "<html></html>");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_write_json() {
        let path = temp_path("ipeds_viz_test_earnings.json");
        let _ = fs::remove_file(&path);

        write_json(&path, &serde_json::json!({"1": [50000.0, null]})).unwrap();
        let back: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back["1"][0], 50000.0);

        fs::remove_file(&path).unwrap();
    }

    // Helpers

    fn sample() -> Dataset {
        Dataset::from_rows(
            &["year", "id", "name", "totmen"],
            vec![
                vec![2023.0.into(), "1".into(), "Alpha".into(), 120.0.into()],
                vec![2023.0.into(), "2".into(), "Beta".into(), Value::Null],
            ],
        )
        .unwrap()
    }
}
