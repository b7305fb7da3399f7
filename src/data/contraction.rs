//! A single detected contraction event and its staged-edit machinery.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Disposition of a record after filtering.
///
/// An unflagged record (`Option<Flag>::None`) is untouched. `Delete` excludes
/// the record from the clean output while keeping it in the highlighted one;
/// `Update` marks a retained record whose field was statistically corrected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flag {
    Delete,
    Update,
}

/// A measured value that may have been excluded by outlier detection.
///
/// Downstream aggregation must treat `Excluded` as absent, never as zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Numeric(f64),
    Excluded,
}

impl FieldValue {
    /// The numeric value, or `None` if the field was excluded.
    pub fn numeric(&self) -> Option<f64> {
        match self {
            FieldValue::Numeric(v) => Some(*v),
            FieldValue::Excluded => None,
        }
    }
}

/// The measured fields of a [`Contraction`], as a static descriptor table.
///
/// Filters that operate "per field" iterate [`Field::ALL`] instead of
/// hardcoding accessors. The critical fields are the ones whose outliers
/// invalidate the whole contraction rather than just the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    ContractionDuration,
    TimeToPeak,
    RelaxationTime,
    NinetyToNinetyTransient,
    FiftyToFiftyTransient,
    TenToTenTransient,
    BaselineValue,
    PeakAmplitude,
    ContractionAmplitude,
    PeakToPeakTime,
}

impl Field {
    /// Every measured field, in the column order of the raw input files.
    pub const ALL: [Field; 10] = [
        Field::ContractionDuration,
        Field::TimeToPeak,
        Field::RelaxationTime,
        Field::NinetyToNinetyTransient,
        Field::FiftyToFiftyTransient,
        Field::TenToTenTransient,
        Field::BaselineValue,
        Field::PeakAmplitude,
        Field::ContractionAmplitude,
        Field::PeakToPeakTime,
    ];

    /// Fields whose outliers condemn the whole contraction.
    pub const CRITICAL: [Field; 3] = [
        Field::ContractionDuration,
        Field::ContractionAmplitude,
        Field::TimeToPeak,
    ];

    /// Short identifier used in configs and debug output.
    pub fn name(&self) -> &'static str {
        match self {
            Field::ContractionDuration => "contraction_duration",
            Field::TimeToPeak => "time_to_peak",
            Field::RelaxationTime => "relaxation_time",
            Field::NinetyToNinetyTransient => "ninety_to_ninety_transient",
            Field::FiftyToFiftyTransient => "fifty_to_fifty_transient",
            Field::TenToTenTransient => "ten_to_ten_transient",
            Field::BaselineValue => "baseline_value",
            Field::PeakAmplitude => "peak_amplitude",
            Field::ContractionAmplitude => "contraction_amplitude",
            Field::PeakToPeakTime => "peak_to_peak_time",
        }
    }

    /// Column header used in report output, matching the acquisition software.
    pub fn label(&self) -> &'static str {
        match self {
            Field::ContractionDuration => "Contraction duration [10% above baseline] (ms)",
            Field::TimeToPeak => "Time to peak (ms)",
            Field::RelaxationTime => "Relaxation time (ms)",
            Field::NinetyToNinetyTransient => "90 to 90 transient (ms)",
            Field::FiftyToFiftyTransient => "50 to 50 transient",
            Field::TenToTenTransient => "10 to 10 transient",
            Field::BaselineValue => "Baseline value",
            Field::PeakAmplitude => "Peak amplitude",
            Field::ContractionAmplitude => "Contraction amplitude",
            Field::PeakToPeakTime => "Peak to peak time",
        }
    }

    /// True for fields whose outliers delete the contraction.
    pub fn is_critical(&self) -> bool {
        Field::CRITICAL.contains(self)
    }
}

/// One detected muscle-contraction event.
///
/// Stored fields are never mutated by filters directly. Filters stage
/// replacement values in `pending` (and a disposition in `pending_flag`) and
/// read back through [`Contraction::effective`], so several filters can
/// annotate the same record without clobbering each other. Staged edits are
/// merged into the stored fields only at commit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contraction {
    pub contraction_duration: FieldValue,
    pub time_to_peak: FieldValue,
    pub relaxation_time: FieldValue,
    pub ninety_to_ninety_transient: FieldValue,
    pub fifty_to_fifty_transient: FieldValue,
    pub ten_to_ten_transient: FieldValue,
    pub baseline_value: FieldValue,
    pub peak_amplitude: FieldValue,
    pub contraction_amplitude: FieldValue,
    /// Gap to the previous event; absent for the first event in a well.
    pub peak_to_peak_time: Option<FieldValue>,
    pub flag: Option<Flag>,
    /// Staged field overrides, merged at commit.
    #[serde(default)]
    pub pending: HashMap<Field, FieldValue>,
    /// Staged disposition, materialized by the filter that staged it.
    #[serde(default)]
    pub pending_flag: Option<Flag>,
}

impl Contraction {
    /// Build a contraction from raw measurements, in input column order.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        contraction_duration: f64,
        time_to_peak: f64,
        relaxation_time: f64,
        ninety_to_ninety_transient: f64,
        fifty_to_fifty_transient: f64,
        ten_to_ten_transient: f64,
        baseline_value: f64,
        peak_amplitude: f64,
        contraction_amplitude: f64,
        peak_to_peak_time: Option<f64>,
    ) -> Self {
        Self {
            contraction_duration: FieldValue::Numeric(contraction_duration),
            time_to_peak: FieldValue::Numeric(time_to_peak),
            relaxation_time: FieldValue::Numeric(relaxation_time),
            ninety_to_ninety_transient: FieldValue::Numeric(ninety_to_ninety_transient),
            fifty_to_fifty_transient: FieldValue::Numeric(fifty_to_fifty_transient),
            ten_to_ten_transient: FieldValue::Numeric(ten_to_ten_transient),
            baseline_value: FieldValue::Numeric(baseline_value),
            peak_amplitude: FieldValue::Numeric(peak_amplitude),
            contraction_amplitude: FieldValue::Numeric(contraction_amplitude),
            peak_to_peak_time: peak_to_peak_time.map(FieldValue::Numeric),
            flag: None,
            pending: HashMap::new(),
            pending_flag: None,
        }
    }

    /// The stored value of `field`, ignoring staged edits.
    ///
    /// `None` only for an absent `peak_to_peak_time`.
    pub fn stored(&self, field: Field) -> Option<FieldValue> {
        match field {
            Field::ContractionDuration => Some(self.contraction_duration),
            Field::TimeToPeak => Some(self.time_to_peak),
            Field::RelaxationTime => Some(self.relaxation_time),
            Field::NinetyToNinetyTransient => Some(self.ninety_to_ninety_transient),
            Field::FiftyToFiftyTransient => Some(self.fifty_to_fifty_transient),
            Field::TenToTenTransient => Some(self.ten_to_ten_transient),
            Field::BaselineValue => Some(self.baseline_value),
            Field::PeakAmplitude => Some(self.peak_amplitude),
            Field::ContractionAmplitude => Some(self.contraction_amplitude),
            Field::PeakToPeakTime => self.peak_to_peak_time,
        }
    }

    fn set_stored(&mut self, field: Field, value: FieldValue) {
        match field {
            Field::ContractionDuration => self.contraction_duration = value,
            Field::TimeToPeak => self.time_to_peak = value,
            Field::RelaxationTime => self.relaxation_time = value,
            Field::NinetyToNinetyTransient => self.ninety_to_ninety_transient = value,
            Field::FiftyToFiftyTransient => self.fifty_to_fifty_transient = value,
            Field::TenToTenTransient => self.ten_to_ten_transient = value,
            Field::BaselineValue => self.baseline_value = value,
            Field::PeakAmplitude => self.peak_amplitude = value,
            Field::ContractionAmplitude => self.contraction_amplitude = value,
            Field::PeakToPeakTime => self.peak_to_peak_time = Some(value),
        }
    }

    /// The effective value of `field`: the staged override if present, else
    /// the stored value, else `Numeric(default)`.
    pub fn effective(&self, field: Field, default: f64) -> FieldValue {
        if let Some(v) = self.pending.get(&field) {
            return *v;
        }
        self.stored(field).unwrap_or(FieldValue::Numeric(default))
    }

    /// The effective value as a number, or `None` if the field is excluded.
    pub fn effective_numeric(&self, field: Field, default: f64) -> Option<f64> {
        self.effective(field, default).numeric()
    }

    /// Stage a replacement value for `field`, visible to later effective
    /// reads but not merged until commit.
    pub fn stage(&mut self, field: Field, value: FieldValue) {
        self.pending.insert(field, value);
    }

    /// Stage a disposition without touching the live flag.
    pub fn stage_flag(&mut self, flag: Flag) {
        self.pending_flag = Some(flag);
    }

    /// Merge staged overrides into the stored fields and drop the staged
    /// disposition. Does not touch the live flag.
    pub fn apply_pending(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        for (field, value) in pending {
            self.set_stored(field, value);
        }
        self.pending_flag = None;
    }

    pub fn is_deleted(&self) -> bool {
        self.flag == Some(Flag::Delete)
    }
}
