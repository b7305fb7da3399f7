//! Loading raw acquisition output into an [`OverviewTable`].
//!
//! The acquisition software writes one whitespace-separated text file per
//! well folder, one row per detected contraction, ten numeric columns in the
//! order of [`Field::ALL`](crate::data::Field::ALL). The last column (peak to
//! peak time) is absent on the first row of a recording.

use crate::data::contraction::Contraction;
use crate::data::overview::Overview;
use crate::data::table::OverviewTable;
use crate::error::{QcError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// File name the loader looks for inside each well folder.
pub const DEFAULT_OVERVIEW_FILE_NAME: &str = "overview.txt";

fn parse_value(token: &str, line: usize, col: usize) -> Result<f64> {
    token.parse::<f64>().map_err(|_| QcError::InvalidMeasurement {
        value: token.to_string(),
        line,
        col,
    })
}

/// Parse one well file into an [`Overview`].
///
/// The parent folder name supplies the well and group identifiers.
pub fn load_overview(file_path: &Path) -> Result<Overview> {
    let folder_name = file_path
        .parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let content = fs::read_to_string(file_path)?;
    let mut contractions = Vec::new();
    for (i, line) in content.lines().enumerate() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() < 9 {
            return Err(QcError::ShortRow {
                line: i + 1,
                expected: 9,
                found: fields.len(),
            });
        }
        let mut values = [0.0; 9];
        for (col, value) in values.iter_mut().enumerate() {
            *value = parse_value(fields[col], i + 1, col + 1)?;
        }
        let peak_to_peak = fields
            .get(9)
            .copied()
            .map(|t| parse_value(t, i + 1, 10))
            .transpose()?;
        contractions.push(Contraction::new(
            values[0],
            values[1],
            values[2],
            values[3],
            values[4],
            values[5],
            values[6],
            values[7],
            values[8],
            peak_to_peak,
        ));
    }
    Ok(Overview::from_folder_name(&folder_name, contractions))
}

fn find_overview_files(dir: &Path, file_name: &str, found: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            find_overview_files(&path, file_name, found)?;
        } else if path.file_name().is_some_and(|n| n == file_name) {
            found.push(path);
        }
    }
    Ok(())
}

/// Load every well file named `file_name` under `root`, recursively.
///
/// The table is named after the root folder.
pub fn load_overview_table(root: &Path, file_name: &str) -> Result<OverviewTable> {
    let mut paths = Vec::new();
    find_overview_files(root, file_name, &mut paths)?;
    paths.sort();

    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let overviews = paths
        .iter()
        .map(|p| load_overview(p))
        .collect::<Result<Vec<_>>>()?;
    Ok(OverviewTable::new(name, overviews))
}
