//! Gauge ranges and auto-ranging.
//!
//! A [`GaugeRange`] is the displayed ceiling of a gauge plus its tick step.
//! The controller widens a range when a reading climbs past 90% of it; ranges
//! never shrink on their own, only through a manual edit.

use tracing::{debug, info, warn};

use crate::error::PanelError;
use crate::readout::Readings;

/// Fraction of the ceiling a reading must exceed to trigger expansion.
pub const EXPANSION_THRESHOLD: f64 = 0.9;

/// Headroom applied to the reading when computing the new ceiling.
pub const EXPANSION_HEADROOM: f64 = 1.1;

/// Smallest bound substituted for a non-positive user entry.
pub const RANGE_EPSILON: f64 = 1e-3;

/// Upper bound on tick intervals per gauge; `step` is floored accordingly.
pub const MAX_TICKS: usize = 1000;

/// Display range of one gauge.
///
/// Invariant: `0 < step <= max_value`, both finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeRange {
    max_value: f64,
    step: f64,
}

impl GaugeRange {
    /// Strict constructor: rejects non-positive or non-finite bounds.
    pub fn try_new(max_value: f64, step: f64) -> Result<Self, PanelError> {
        let valid = |x: f64| x.is_finite() && x > 0.0;
        if !valid(max_value) || !valid(step) {
            return Err(PanelError::InvalidRange { max_value, step });
        }
        Ok(Self::normalized(max_value, step))
    }

    /// Lenient constructor used for user edits. Invalid bounds are replaced
    /// with the smallest usable value and logged.
    pub fn new(max_value: f64, step: f64) -> Self {
        Self::try_new(max_value, step).unwrap_or_else(|err| {
            warn!(error = %err, "Recovering invalid gauge range");
            let max_value = if max_value.is_finite() && max_value > 0.0 {
                max_value
            } else {
                RANGE_EPSILON
            };
            let step = if step.is_finite() && step > 0.0 {
                step
            } else {
                RANGE_EPSILON
            };
            Self::normalized(max_value, step)
        })
    }

    fn normalized(max_value: f64, step: f64) -> Self {
        let floor = max_value / MAX_TICKS as f64;
        Self {
            max_value,
            step: step.max(floor).min(max_value),
        }
    }

    pub fn max_value(&self) -> f64 {
        self.max_value
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// `floor(max_value / step) + 1`, tolerant of representation error.
    pub fn tick_count(&self) -> usize {
        ((self.max_value / self.step) + 1e-9).floor() as usize + 1
    }

    /// Widens the ceiling when `observed` is past the expansion threshold.
    ///
    /// The new ceiling is `observed * 1.1` rounded up to a whole number of
    /// steps. Returns the (possibly unchanged) range and whether it grew.
    pub fn maybe_expand(&self, observed: f64) -> (GaugeRange, bool) {
        if !(observed.is_finite() && observed > EXPANSION_THRESHOLD * self.max_value) {
            return (*self, false);
        }
        let steps = ((observed * EXPANSION_HEADROOM) / self.step).ceil();
        let new_max = steps * self.step;
        if new_max.is_finite() && new_max > self.max_value {
            (Self::normalized(new_max, self.step), true)
        } else {
            (*self, false)
        }
    }
}

/// Identifies one of the two bounded gauges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GaugeId {
    Thermometer,
    Pressure,
}

impl GaugeId {
    pub fn name(self) -> &'static str {
        match self {
            GaugeId::Thermometer => "thermometer",
            GaugeId::Pressure => "pressure",
        }
    }
}

/// Result of one auto-ranging pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeUpdate {
    pub thermometer: GaugeRange,
    pub pressure: GaugeRange,
    pub thermometer_changed: bool,
    pub pressure_changed: bool,
}

impl RangeUpdate {
    pub fn changed(&self) -> bool {
        self.thermometer_changed || self.pressure_changed
    }

    pub fn changed_for(&self, gauge: GaugeId) -> bool {
        match gauge {
            GaugeId::Thermometer => self.thermometer_changed,
            GaugeId::Pressure => self.pressure_changed,
        }
    }
}

/// Owns the range of the thermometer and the pressure gauge.
#[derive(Debug, Clone)]
pub struct GaugeRangeController {
    thermometer: GaugeRange,
    pressure: GaugeRange,
}

impl GaugeRangeController {
    pub fn new(thermometer: GaugeRange, pressure: GaugeRange) -> Self {
        Self {
            thermometer,
            pressure,
        }
    }

    pub fn range(&self, gauge: GaugeId) -> GaugeRange {
        match gauge {
            GaugeId::Thermometer => self.thermometer,
            GaugeId::Pressure => self.pressure,
        }
    }

    fn slot(&mut self, gauge: GaugeId) -> &mut GaugeRange {
        match gauge {
            GaugeId::Thermometer => &mut self.thermometer,
            GaugeId::Pressure => &mut self.pressure,
        }
    }

    /// Auto-ranges each gauge independently from this tick's readings: the
    /// thermometer follows output temperature, the dial output pressure.
    pub fn update_ranges(&mut self, readings: &Readings) -> RangeUpdate {
        let thermometer_changed =
            self.expand(GaugeId::Thermometer, readings.out_temp.value);
        let pressure_changed = self.expand(GaugeId::Pressure, readings.out_pressure.value);
        RangeUpdate {
            thermometer: self.thermometer,
            pressure: self.pressure,
            thermometer_changed,
            pressure_changed,
        }
    }

    fn expand(&mut self, gauge: GaugeId, observed: f64) -> bool {
        let current = self.range(gauge);
        let (next, expanded) = current.maybe_expand(observed);
        if expanded {
            info!(
                gauge = gauge.name(),
                observed,
                old_max = current.max_value(),
                new_max = next.max_value(),
                "Gauge range expanded"
            );
            *self.slot(gauge) = next;
        }
        expanded
    }

    /// Manual override of a gauge's ceiling and step.
    pub fn edit(&mut self, gauge: GaugeId, max_value: f64, step: f64) -> GaugeRange {
        let range = GaugeRange::new(max_value, step);
        debug!(
            gauge = gauge.name(),
            max_value = range.max_value(),
            step = range.step(),
            "Gauge range edited"
        );
        *self.slot(gauge) = range;
        range
    }
}
