//! Output file naming.
//!
//! - `codes.csv`  → `[<date>] codes.json`
//! - `codes.json` → `codes.csv`
//! - fetched sheet → `[<date>] <output_name>.json`

use std::path::{Path, PathBuf};

use crate::application::{ApplicationError, ApplicationResult};

/// Input kind, detected from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Csv,
    Json,
}

impl InputKind {
    pub fn detect(path: &Path) -> ApplicationResult<Self> {
        let has_stem = path
            .file_stem()
            .is_some_and(|s| !s.to_string_lossy().is_empty());
        match path.extension().and_then(|e| e.to_str()) {
            Some("csv") if has_stem => Ok(InputKind::Csv),
            Some("json") if has_stem => Ok(InputKind::Json),
            _ => Err(ApplicationError::UnsupportedInput(path.to_path_buf())),
        }
    }
}

/// Output path for a converted input.
///
/// Written into `out_dir` when given, otherwise next to the input.
pub fn output_path(input: &Path, date: &str, out_dir: Option<&Path>) -> ApplicationResult<PathBuf> {
    let kind = InputKind::detect(input)?;
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .ok_or_else(|| ApplicationError::UnsupportedInput(input.to_path_buf()))?;

    let name = match kind {
        InputKind::Csv => dated_name(date, &stem, "json"),
        InputKind::Json => format!("{}.csv", stem),
    };

    let dir = match out_dir {
        Some(dir) => dir.to_path_buf(),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    Ok(dir.join(name))
}

/// `[<date>] <stem>.<ext>`
pub fn dated_name(date: &str, stem: &str, ext: &str) -> String {
    format!("[{}] {}.{}", date, stem, ext)
}
