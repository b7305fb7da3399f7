//! Structural zero-value rejection.

use crate::data::{Contraction, Field, Flag, Overview};
use crate::error::Result;
use crate::filter::DataFilter;

/// Deletes contractions with a zero in any measured field.
///
/// A zero almost always means the acquisition software failed to measure the
/// event rather than a real physiological value. `peak_to_peak_time` is
/// exempt: it is legitimately zero (absent) for the first event of a
/// recording.
pub struct SimpleFilter;

impl SimpleFilter {
    fn has_zero_field(contraction: &Contraction) -> bool {
        Field::ALL
            .iter()
            .filter(|f| **f != Field::PeakToPeakTime)
            .any(|f| contraction.effective_numeric(*f, 0.0) == Some(0.0))
    }
}

impl DataFilter for SimpleFilter {
    fn name(&self) -> &'static str {
        "simple"
    }

    fn apply(&self, overview: &mut Overview) -> Result<()> {
        for contraction in &mut overview.contractions {
            if !contraction.is_deleted() && Self::has_zero_field(contraction) {
                contraction.flag = Some(Flag::Delete);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_contraction() -> Contraction {
        Contraction::new(
            300.0,
            120.0,
            180.0,
            400.0,
            250.0,
            150.0,
            0.5,
            1.5,
            1.0,
            Some(1000.0),
        )
    }

    #[test]
    fn test_zero_duration_is_deleted() {
        let mut c = valid_contraction();
        c.contraction_duration = crate::data::FieldValue::Numeric(0.0);
        let mut overview = Overview::new("G", "A1", vec![c]);
        SimpleFilter.apply(&mut overview).unwrap();
        assert!(overview.contractions[0].is_deleted());
    }

    #[test]
    fn test_zero_peak_to_peak_is_exempt() {
        let mut c = valid_contraction();
        c.peak_to_peak_time = Some(crate::data::FieldValue::Numeric(0.0));
        let mut overview = Overview::new("G", "A1", vec![c, valid_contraction()]);
        SimpleFilter.apply(&mut overview).unwrap();
        assert!(overview.contractions.iter().all(|c| !c.is_deleted()));
    }

    #[test]
    fn test_reads_staged_values() {
        // A staged zero counts, even though the stored value is fine.
        let mut c = valid_contraction();
        c.stage(Field::BaselineValue, crate::data::FieldValue::Numeric(0.0));
        let mut overview = Overview::new("G", "A1", vec![c]);
        SimpleFilter.apply(&mut overview).unwrap();
        assert!(overview.contractions[0].is_deleted());
    }

    #[test]
    fn test_already_deleted_is_left_alone() {
        let mut c = valid_contraction();
        c.flag = Some(Flag::Delete);
        let mut overview = Overview::new("G", "A1", vec![c]);
        SimpleFilter.apply(&mut overview).unwrap();
        assert_eq!(overview.contractions[0].flag, Some(Flag::Delete));
    }
}
