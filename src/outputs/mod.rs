//! Report files written under `data_dir/reports/`.
//!
//! # Submodules
//!
//! - [`json`]: machine-readable reports (audit, dedupe)
//! - [`markdown`]: the human-readable audit report
//!
//! # Output Structure
//!
//! ```text
//! reports/
//! └── 2025-05-06/
//!     ├── audit.json
//!     ├── audit.md
//!     └── dedupe.json
//! ```
//!
//! Running a command twice on the same day replaces that day's file.

pub mod json;
pub mod markdown;

use chrono::Local;
use std::path::{Path, PathBuf};

/// `<reports_dir>/<YYYY-MM-DD>` for today's local date.
pub fn dated_dir(reports_dir: &Path) -> PathBuf {
    reports_dir.join(Local::now().date_naive().to_string())
}
