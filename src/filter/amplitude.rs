//! Amplitude thresholding with noise reconciliation.

use crate::data::{Field, FieldValue, Flag, Overview};
use crate::error::{QcError, Result};
use crate::filter::DataFilter;
use crate::stats;

/// Deletes contractions whose amplitude is implausibly small, then repairs
/// the inter-peak timing around deletions that look like spurious noise
/// peaks rather than genuine anomalies.
///
/// This filter is the only one with internal error recovery: if either step
/// fails unexpectedly, the error is logged with the well id and the overview
/// is left exactly as it was, so one malformed well cannot abort the batch.
pub struct AmplitudeFilter;

/// Amplitudes below `mean - STD_FROM_AMPLITUDE * std` are deleted.
const STD_FROM_AMPLITUDE: f64 = 2.0;
/// Amplitudes below this fraction of the well maximum are deleted.
const PARTIAL_AMPLITUDE: f64 = 0.25;
/// Tolerance subtracted from the median inter-peak gap when classifying a
/// deletion as noise.
const STD_FROM_PEAK_TO_PEAK: f64 = 0.25;

impl AmplitudeFilter {
    /// Flag for deletion every contraction whose amplitude falls below
    /// `mean - 2*std` of the well or below a quarter of the well maximum.
    fn threshold_by_amplitude(&self, overview: &mut Overview) -> Result<()> {
        let amplitudes: Vec<f64> = overview
            .contractions
            .iter()
            .filter_map(|c| c.effective_numeric(Field::ContractionAmplitude, 0.0))
            .collect();
        if amplitudes.is_empty() {
            return Ok(());
        }

        let mean = stats::mean(&amplitudes)
            .ok_or_else(|| QcError::EmptyData("no amplitudes".to_string()))?;
        let std = stats::std_dev(&amplitudes)
            .ok_or_else(|| QcError::EmptyData("no amplitudes".to_string()))?;
        let max = amplitudes.iter().fold(f64::MIN, |a, &b| a.max(b));

        for contraction in &mut overview.contractions {
            let Some(amplitude) = contraction.effective_numeric(Field::ContractionAmplitude, 0.0)
            else {
                continue;
            };
            if amplitude < mean - STD_FROM_AMPLITUDE * std || amplitude < PARTIAL_AMPLITUDE * max {
                contraction.flag = Some(Flag::Delete);
            }
        }
        Ok(())
    }

    /// Absolute time of the nearest surviving peak, searching forward from
    /// `index` when `forward` is true, otherwise backward.
    fn nearest_real_peak(
        index: usize,
        absolute_times: &[f64],
        real_indices: &[usize],
        forward: bool,
    ) -> Option<f64> {
        if forward {
            real_indices.iter().find(|&&j| j > index).map(|&j| absolute_times[j])
        } else {
            real_indices
                .iter()
                .rev()
                .find(|&&j| j < index)
                .map(|&j| absolute_times[j])
        }
    }

    /// Reconstruct inter-peak timing around deletions caused by noise.
    ///
    /// Builds the cumulative absolute peak time of every contraction, takes
    /// the median and std of the gaps between surviving peaks, and for each
    /// deleted contraction checks whether a surviving peak sits closer than
    /// `median - 0.25*std`. If so the deleted peak was noise squeezed between
    /// genuine beats: its gap is folded into the next contraction's peak to
    /// peak time, and that contraction is marked updated unless it is itself
    /// deleted. A deletion at the end of the sequence has no next contraction
    /// and is skipped.
    fn reconcile_noise(&self, overview: &mut Overview) -> Result<()> {
        let n = overview.contractions.len();
        let mut absolute_times = Vec::with_capacity(n);
        let mut real_indices = Vec::new();
        let mut running = 0.0;
        for (i, contraction) in overview.contractions.iter().enumerate() {
            let gap = contraction
                .effective_numeric(Field::PeakToPeakTime, 0.0)
                .unwrap_or(0.0);
            running += gap;
            absolute_times.push(running);
            if !contraction.is_deleted() {
                real_indices.push(i);
            }
        }
        if real_indices.len() < 2 {
            return Ok(());
        }

        let gaps: Vec<f64> = real_indices
            .windows(2)
            .map(|w| absolute_times[w[1]] - absolute_times[w[0]])
            .collect();
        let median = stats::median(&gaps)
            .ok_or_else(|| QcError::EmptyData("no inter-peak gaps".to_string()))?;
        let std = stats::std_dev(&gaps)
            .ok_or_else(|| QcError::EmptyData("no inter-peak gaps".to_string()))?;
        let cutoff = median - STD_FROM_PEAK_TO_PEAK * std;

        for i in 0..n {
            if !overview.contractions[i].is_deleted() {
                continue;
            }
            let is_noise = [true, false].into_iter().any(|forward| {
                Self::nearest_real_peak(i, &absolute_times, &real_indices, forward)
                    .is_some_and(|peak| (peak - absolute_times[i]).abs() < cutoff)
            });
            if !is_noise || i + 1 >= n {
                continue;
            }
            let gap = overview.contractions[i]
                .effective_numeric(Field::PeakToPeakTime, 0.0)
                .unwrap_or(0.0);
            let next_gap = overview.contractions[i + 1]
                .effective_numeric(Field::PeakToPeakTime, 0.0)
                .unwrap_or(0.0);
            let next = &mut overview.contractions[i + 1];
            next.stage(Field::PeakToPeakTime, FieldValue::Numeric(gap + next_gap));
            if !next.is_deleted() {
                next.flag = Some(Flag::Update);
            }
        }
        Ok(())
    }

    fn run(&self, overview: &mut Overview) -> Result<()> {
        self.threshold_by_amplitude(overview)?;
        self.reconcile_noise(overview)
    }
}

impl DataFilter for AmplitudeFilter {
    fn name(&self) -> &'static str {
        "amplitude"
    }

    fn apply(&self, overview: &mut Overview) -> Result<()> {
        let original = overview.clone();
        if let Err(e) = self.run(overview) {
            log::warn!("amplitude filter failed in well {}: {}", overview.well, e);
            *overview = original;
        }
        Ok(())
    }
}
