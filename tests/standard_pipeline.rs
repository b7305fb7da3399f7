//! Integration tests for the standard filtering pipeline.

use contraction_qc::prelude::*;

/// A well-formed beat; relaxation time 300 ms sits inside the 1 Hz window.
fn beat(amplitude: f64, peak_to_peak: Option<f64>) -> Contraction {
    Contraction::new(
        300.0,
        120.0,
        300.0,
        400.0,
        250.0,
        150.0,
        0.5,
        1.5,
        amplitude,
        peak_to_peak,
    )
}

/// Five genuine beats, evenly spaced at 1000 ms.
fn steady_well(well: &str) -> Overview {
    Overview::new(
        "MM",
        well,
        vec![
            beat(1.0, None),
            beat(1.0, Some(1000.0)),
            beat(1.0, Some(1000.0)),
            beat(1.0, Some(1000.0)),
            beat(1.0, Some(1000.0)),
        ],
    )
}

/// Four genuine beats with a tiny noise spike squeezed between the second
/// and third, splitting one 1000 ms gap into 500 + 500.
fn noisy_well(well: &str) -> Overview {
    Overview::new(
        "MM",
        well,
        vec![
            beat(1.0, None),
            beat(1.0, Some(1000.0)),
            beat(0.05, Some(500.0)),
            beat(1.0, Some(500.0)),
            beat(1.0, Some(1000.0)),
        ],
    )
}

/// Table named so the pacing frequency resolves to 1 Hz (spontaneous).
fn table() -> OverviewTable {
    OverviewTable::new(
        "Plate A spont 04052024",
        vec![noisy_well("B1"), steady_well("B2"), steady_well("B3")],
    )
}

/// Sink capturing every snapshot the orchestrator delivers.
struct Capture {
    snapshots: Vec<(String, OverviewTable)>,
}

impl SnapshotSink for Capture {
    fn snapshot(&mut self, name: &str, table: &OverviewTable) -> Result<()> {
        self.snapshots.push((name.to_string(), table.clone()));
        Ok(())
    }
}

#[test]
fn test_noise_spike_is_flagged_then_committed_away() {
    let mut table = table();
    let mut capture = Capture { snapshots: vec![] };
    Pipeline::standard(None)
        .run_with(&mut table, &mut capture)
        .unwrap();

    // The standard pipeline declares one checkpoint, after the zero-value
    // filter. At that point the spike is flagged for deletion and the beat
    // after it carries the staged timing correction.
    assert_eq!(capture.snapshots.len(), 1);
    let (name, snapshot) = &capture.snapshots[0];
    assert_eq!(name, "noise_filter");

    let noisy = &snapshot.overviews[0];
    assert!(noisy.contractions[2].is_deleted());
    assert_eq!(noisy.contractions[3].flag, Some(Flag::Update));
    assert_eq!(
        noisy.contractions[3].effective(Field::PeakToPeakTime, 0.0),
        FieldValue::Numeric(1000.0)
    );
    // The other wells are untouched at the checkpoint.
    for overview in &snapshot.overviews[1..] {
        assert!(overview
            .contractions
            .iter()
            .all(|c| c.flag.is_none() && c.pending.is_empty()));
    }

    // The checkpoint commit materializes the suggestion: the spike is gone
    // and the repaired gap is stored.
    let noisy = &table.overviews[0];
    assert_eq!(noisy.contractions.len(), 4);
    assert_eq!(
        noisy.contractions[2].peak_to_peak_time,
        Some(FieldValue::Numeric(1000.0))
    );
    assert!(noisy.contractions.iter().all(|c| c.flag.is_none()));
}

#[test]
fn test_clean_wells_survive_the_whole_pipeline() {
    let mut table = OverviewTable::new(
        "Plate A spont 04052024",
        vec![steady_well("B1"), steady_well("B2"), steady_well("B3")],
    );
    Pipeline::standard(None).run(&mut table).unwrap();
    table.commit();

    assert_eq!(table.overviews.len(), 3);
    for overview in &table.overviews {
        assert_eq!(overview.contractions.len(), 5);
        assert!(overview.contractions.iter().all(|c| c.flag.is_none()));
        // Measured values are untouched.
        assert!(overview
            .contractions
            .iter()
            .all(|c| c.contraction_duration == FieldValue::Numeric(300.0)));
    }
}

#[test]
fn test_explicit_frequency_overrides_table_name() {
    // At 4 Hz the lower relaxation bound is 50 ms, so even a fast relaxation
    // survives; at 1 Hz (from the name) it would be deleted.
    let mut fast = steady_well("B1");
    for c in &mut fast.contractions {
        c.relaxation_time = FieldValue::Numeric(150.0);
    }
    let mut table = OverviewTable::new("Plate A spont 04052024", vec![fast]);
    Pipeline::standard(Some(4.0)).run(&mut table).unwrap();
    table.commit();
    assert_eq!(table.overviews[0].contractions.len(), 5);
}

#[test]
fn test_reports_are_written_at_checkpoints_and_end() {
    let dir = tempfile::tempdir().unwrap();
    let mut table = table();
    let mut sink = CsvReporter::new(dir.path());
    Pipeline::standard(None)
        .run_with(&mut table, &mut sink)
        .unwrap();
    write_final_reports(&table, dir.path()).unwrap();

    assert!(dir.path().join("noise_filter.csv").exists());
    assert!(dir.path().join("noise_filter_filtered.csv").exists());
    assert!(dir.path().join("Plate A spont 04052024.csv").exists());
    assert!(dir.path().join("Plate A spont 04052024_filtered.csv").exists());
    assert!(dir.path().join("Plate A spont 04052024_summary.csv").exists());
}
