//! CSV loading of viewing-session records.
//!
//! The core never touches a path; this module is the loader collaborator
//! that turns the source file into an in-memory table.

use std::fs::File;
use std::path::{Path, PathBuf};

use thiserror::Error;

use adgap_core::SessionRecord;

/// Source columns required beyond the (configurable) application column.
const REQUIRED_COLUMNS: &[&str] = &[
    "tv_id",
    "content_id",
    "start_time",
    "end_time",
    "duration",
    "title",
    "season_id",
];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("input file not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("unsupported input format: {} (expected a .csv file)", path.display())]
    UnsupportedFormat { path: PathBuf },
    #[error("missing required column: {0}")]
    MissingColumn(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Open a delimited table, enforcing the loader contract: the file must
/// exist and carry a `.csv` extension. Data availability is a precondition,
/// so both failures are fatal and never retried.
pub fn open_table(path: &Path) -> Result<csv::Reader<File>, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return Err(LoadError::UnsupportedFormat {
            path: path.to_path_buf(),
        });
    }

    Ok(csv::Reader::from_path(path)?)
}

/// Load the session table, resolving columns by header name.
///
/// `application_column` names the provider column (default "application");
/// every other column name is fixed. A missing column is reported by name.
pub fn load_sessions(
    path: &Path,
    application_column: &str,
) -> Result<Vec<SessionRecord>, LoadError> {
    let mut reader = open_table(path)?;
    let headers = reader.headers()?.clone();

    let column = |name: &str| -> Result<usize, LoadError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
    };

    let application = column(application_column)?;
    let tv_id = column(REQUIRED_COLUMNS[0])?;
    let content_id = column(REQUIRED_COLUMNS[1])?;
    let start_time = column(REQUIRED_COLUMNS[2])?;
    let end_time = column(REQUIRED_COLUMNS[3])?;
    let duration = column(REQUIRED_COLUMNS[4])?;
    let title = column(REQUIRED_COLUMNS[5])?;
    let season_id = column(REQUIRED_COLUMNS[6])?;

    let mut sessions = Vec::new();
    for result in reader.records() {
        let record = result?;
        let field = |index: usize| record.get(index).unwrap_or("").to_string();

        sessions.push(SessionRecord {
            device_id: field(tv_id),
            content_id: field(content_id),
            title: field(title),
            season_id: field(season_id),
            start_time: field(start_time),
            end_time: field(end_time),
            duration: field(duration),
            application: field(application),
        });
    }

    tracing::info!(rows = sessions.len(), path = %path.display(), "session table loaded");
    Ok(sessions)
}
