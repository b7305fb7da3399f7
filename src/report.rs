//! CSV rendering of processed tables.
//!
//! The core only ever emits the three-state flag; everything visual
//! (colors, spreadsheet styling) is out of scope. Two views are written per
//! table: a highlighted view keeping every row with its disposition in a
//! `Status` column, and a clean view containing only the committed data.

use crate::data::{Field, FieldValue, Flag, Overview, OverviewTable};
use crate::error::Result;
use crate::pipeline::SnapshotSink;
use crate::stats;
use std::fs;
use std::path::{Path, PathBuf};

fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}

fn render(value: Option<FieldValue>) -> String {
    match value {
        None => String::new(),
        Some(FieldValue::Excluded) => "Outlier".to_string(),
        Some(FieldValue::Numeric(v)) => format_number(v),
    }
}

fn status(flag: Option<Flag>) -> &'static str {
    match flag {
        None => "",
        Some(Flag::Delete) => "delete",
        Some(Flag::Update) => "update",
    }
}

/// Writes tables as CSV files into an output directory.
pub struct CsvReporter {
    out_dir: PathBuf,
}

impl CsvReporter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    fn write(&self, table: &OverviewTable, file_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join(file_name);
        let mut writer = csv::Writer::from_path(&path)?;

        let mut header = vec!["Group".to_string(), "Well".to_string(), "Status".to_string()];
        header.extend(Field::ALL.iter().map(|f| f.label().to_string()));
        writer.write_record(&header)?;

        let mut sorted = table.clone();
        sorted.sort_by_well();
        for overview in &sorted.overviews {
            for contraction in &overview.contractions {
                let mut record = vec![
                    overview.group.clone(),
                    overview.well.clone(),
                    status(contraction.flag.or(overview.flag)).to_string(),
                ];
                // Staged override if present, else the stored value; an
                // absent value stays an empty cell.
                record.extend(Field::ALL.iter().map(|f| {
                    render(contraction.pending.get(f).copied().or_else(|| contraction.stored(*f)))
                }));
                writer.write_record(&record)?;
            }
        }
        writer.flush()?;
        Ok(path)
    }

    /// Write every row, flagged or not, with its disposition in the `Status`
    /// column. Staged overrides are shown as the suggested corrections.
    pub fn write_highlighted(&self, table: &OverviewTable, file_name: &str) -> Result<PathBuf> {
        self.write(table, file_name)
    }

    /// Write the committed data only: flagged rows and wells dropped,
    /// overrides merged.
    pub fn write_clean(&self, table: &OverviewTable, file_name: &str) -> Result<PathBuf> {
        let mut committed = table.clone();
        committed.commit();
        self.write(&committed, file_name)
    }

    /// Write a per-well summary of the surviving data: contraction count and
    /// mean/std of each critical field.
    pub fn write_summary(&self, table: &OverviewTable, file_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join(file_name);
        let mut writer = csv::Writer::from_path(&path)?;

        let mut header = vec![
            "Group".to_string(),
            "Well".to_string(),
            "Contractions".to_string(),
        ];
        for field in Field::CRITICAL {
            header.push(format!("{} avg", field.label()));
            header.push(format!("{} std", field.label()));
        }
        writer.write_record(&header)?;

        let mut sorted = table.clone();
        sorted.sort_by_well();
        for overview in sorted.overviews.iter().filter(|o| !o.is_deleted()) {
            let mut record = vec![
                overview.group.clone(),
                overview.well.clone(),
                surviving(overview).count().to_string(),
            ];
            for field in Field::CRITICAL {
                let values: Vec<f64> = surviving(overview)
                    .filter_map(|c| c.effective_numeric(field, 0.0))
                    .collect();
                record.push(stats::mean(&values).map(format_number).unwrap_or_default());
                record.push(stats::std_dev(&values).map(format_number).unwrap_or_default());
            }
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(path)
    }
}

fn surviving(overview: &Overview) -> impl Iterator<Item = &crate::data::Contraction> {
    overview.contractions.iter().filter(|c| !c.is_deleted())
}

impl SnapshotSink for CsvReporter {
    /// Materialize a checkpoint as the highlighted and clean views, named
    /// `<name>.csv` and `<name>_filtered.csv`.
    fn snapshot(&mut self, name: &str, table: &OverviewTable) -> Result<()> {
        self.write_highlighted(table, &format!("{}.csv", name))?;
        self.write_clean(table, &format!("{}_filtered.csv", name))?;
        Ok(())
    }
}

/// Write the final outputs for a processed table into `out_dir`:
/// `<table>.csv`, `<table>_filtered.csv` and `<table>_summary.csv`.
pub fn write_final_reports(table: &OverviewTable, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let reporter = CsvReporter::new(out_dir);
    Ok(vec![
        reporter.write_highlighted(table, &format!("{}.csv", table.name))?,
        reporter.write_clean(table, &format!("{}_filtered.csv", table.name))?,
        reporter.write_summary(table, &format!("{}_summary.csv", table.name))?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Contraction;

    fn contraction(amplitude: f64) -> Contraction {
        Contraction::new(
            300.0, 120.0, 180.0, 400.0, 250.0, 150.0, 0.5, 1.5, amplitude, None,
        )
    }

    fn flagged_table() -> OverviewTable {
        let mut keep = contraction(1.0);
        keep.flag = Some(Flag::Update);
        keep.stage(Field::PeakToPeakTime, FieldValue::Numeric(1000.0));
        let mut drop = contraction(0.05);
        drop.flag = Some(Flag::Delete);
        OverviewTable::new(
            "experiment",
            vec![Overview::new("MM", "B1", vec![keep, drop])],
        )
    }

    fn read_rows(path: &Path) -> Vec<csv::StringRecord> {
        let mut reader = csv::Reader::from_path(path).unwrap();
        reader.records().map(|r| r.unwrap()).collect()
    }

    #[test]
    fn test_highlighted_view_keeps_flagged_rows() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = CsvReporter::new(dir.path());
        let path = reporter
            .write_highlighted(&flagged_table(), "out.csv")
            .unwrap();

        let rows = read_rows(&path);
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][2], "update");
        assert_eq!(&rows[1][2], "delete");
        // The staged correction is shown, not the stored value.
        let p2p_col = 3 + Field::ALL.len() - 1;
        assert_eq!(&rows[0][p2p_col], "1000");
    }

    #[test]
    fn test_clean_view_drops_flagged_rows_and_commits() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = CsvReporter::new(dir.path());
        let path = reporter.write_clean(&flagged_table(), "out.csv").unwrap();

        let rows = read_rows(&path);
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][2], "");
    }

    #[test]
    fn test_excluded_fields_are_labelled() {
        let dir = tempfile::tempdir().unwrap();
        let mut table = flagged_table();
        table.overviews[0].contractions[0].stage(Field::TenToTenTransient, FieldValue::Excluded);
        let reporter = CsvReporter::new(dir.path());
        let path = reporter.write_highlighted(&table, "out.csv").unwrap();

        let rows = read_rows(&path);
        // TenToTenTransient is the sixth field column.
        assert_eq!(&rows[0][3 + 5], "Outlier");
    }

    #[test]
    fn test_summary_reports_surviving_means() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = CsvReporter::new(dir.path());
        let path = reporter
            .write_summary(&flagged_table(), "summary.csv")
            .unwrap();

        let rows = read_rows(&path);
        assert_eq!(rows.len(), 1);
        // One surviving contraction, duration mean 300, std 0.
        assert_eq!(&rows[0][2], "1");
        assert_eq!(&rows[0][3], "300");
        assert_eq!(&rows[0][4], "0");
    }

    #[test]
    fn test_snapshot_writes_both_views() {
        let dir = tempfile::tempdir().unwrap();
        let mut reporter = CsvReporter::new(dir.path());
        reporter.snapshot("noise_filter", &flagged_table()).unwrap();
        assert!(dir.path().join("noise_filter.csv").exists());
        assert!(dir.path().join("noise_filter_filtered.csv").exists());
    }
}
