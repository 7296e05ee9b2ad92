//! JSON report output.

use crate::store::save_json;
use crate::utils::ensure_writable_dir;
use serde::Serialize;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Serialize `report` to `<reports_dir>/<date>/<name>.json`.
///
/// Returns the path written.
#[instrument(level = "info", skip_all, fields(reports_dir = %reports_dir.display(), %name))]
pub async fn write_report<T: Serialize>(
    report: &T,
    reports_dir: &Path,
    name: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let dir = super::dated_dir(reports_dir);
    ensure_writable_dir(&dir).await?;

    let path = dir.join(format!("{name}.json"));
    save_json(&path, report).await?;
    info!(path = %path.display(), "Wrote JSON report");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_write_report_uses_dated_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_report(&json!({"clean": true}), dir.path(), "audit")
            .await
            .unwrap();

        assert_eq!(path.file_name().unwrap(), "audit.json");
        let date_dir = path.parent().unwrap().file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(date_dir.len(), 10);
        assert_eq!(date_dir.matches('-').count(), 2);

        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value, json!({"clean": true}));
    }
}
