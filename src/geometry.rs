//! Value → drawing geometry for the two gauge kinds.
//!
//! Values are clamped into `[0, max_value]` first, so an out-of-range reading
//! pins the fill or needle at an end stop.

use std::f64::consts::PI;

use crate::range::GaugeRange;
use crate::ticks::Scale;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaugeKind {
    Linear,
    Angular,
}

fn clamped_fraction(value: f64, range: &GaugeRange) -> f64 {
    let max = range.max_value();
    let value = if value.is_nan() { 0.0 } else { value.clamp(0.0, max) };
    value / max
}

/// Fill fraction of a linear gauge, `0.0..=1.0`.
pub fn map_linear(value: f64, range: &GaugeRange) -> f64 {
    clamped_fraction(value, range)
}

/// Needle angle of a half dial: `π` at zero, `0` at full scale.
pub fn map_angular(value: f64, range: &GaugeRange) -> f64 {
    PI - clamped_fraction(value, range) * PI
}

/// Vertical bar gauge; the fill grows from `bottom` up toward `top`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearGauge {
    pub x: f64,
    pub top: f64,
    pub bottom: f64,
    pub width: f64,
}

impl LinearGauge {
    /// Drawable span in pixels.
    pub fn span(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn scale(&self, min_label_spacing: f64) -> Scale {
        Scale::Linear {
            span: self.span(),
            min_label_spacing,
        }
    }

    /// Screen y of a scale position measured up from the bottom.
    pub fn y_at(&self, position: f64) -> f64 {
        self.bottom - position
    }
}

impl Default for LinearGauge {
    fn default() -> Self {
        Self {
            x: 70.0,
            top: 80.0,
            bottom: 200.0,
            width: 18.0,
        }
    }
}

/// Upper half-circle dial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialGauge {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
}

impl RadialGauge {
    pub fn scale(&self, min_label_spacing: f64) -> Scale {
        Scale::Angular { min_label_spacing }
    }

    /// Screen point at `angle` and distance `r` from the centre (y grows down).
    pub fn point_at(&self, angle: f64, r: f64) -> (f64, f64) {
        (self.cx + r * angle.cos(), self.cy - r * angle.sin())
    }
}

impl Default for RadialGauge {
    fn default() -> Self {
        Self {
            cx: 330.0,
            cy: 200.0,
            radius: 110.0,
        }
    }
}

/// Fixed placement of both gauges on the panel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PanelGeometry {
    pub thermometer: LinearGauge,
    pub pressure: RadialGauge,
}

/// What the renderer needs to draw one gauge's moving part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GaugeDrawParams {
    Linear {
        fill_fraction: f64,
        /// Screen y of the top of the fill.
        fill_top: f64,
    },
    Angular {
        angle: f64,
        /// Needle tip on screen.
        tip: (f64, f64),
    },
}

impl LinearGauge {
    pub fn draw_params(&self, value: f64, range: &GaugeRange) -> GaugeDrawParams {
        let fill_fraction = map_linear(value, range);
        GaugeDrawParams::Linear {
            fill_fraction,
            fill_top: self.y_at(fill_fraction * self.span()),
        }
    }
}

impl RadialGauge {
    pub fn draw_params(&self, value: f64, range: &GaugeRange) -> GaugeDrawParams {
        let angle = map_angular(value, range);
        GaugeDrawParams::Angular {
            angle,
            tip: self.point_at(angle, self.radius),
        }
    }
}

/// Draw parameters for `value` on the gauge of the given kind.
pub fn geometry(
    value: f64,
    range: &GaugeRange,
    kind: GaugeKind,
    panel: &PanelGeometry,
) -> GaugeDrawParams {
    match kind {
        GaugeKind::Linear => panel.thermometer.draw_params(value, range),
        GaugeKind::Angular => panel.pressure.draw_params(value, range),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(max: f64) -> GaugeRange {
        GaugeRange::new(max, max / 10.0)
    }

    #[test]
    fn linear_mapping_is_pinned_at_both_ends() {
        let r = range(100.0);
        assert_eq!(map_linear(150.0, &r), map_linear(100.0, &r));
        assert_eq!(map_linear(-10.0, &r), map_linear(0.0, &r));
        assert_eq!(map_linear(100.0, &r), 1.0);
        assert_eq!(map_linear(0.0, &r), 0.0);
        assert_eq!(map_linear(25.0, &r), 0.25);
    }

    #[test]
    fn angular_mapping_runs_from_pi_to_zero() {
        let r = range(2000.0);
        assert_eq!(map_angular(0.0, &r), PI);
        assert_eq!(map_angular(2000.0, &r), 0.0);
        assert!((map_angular(1000.0, &r) - PI / 2.0).abs() < 1e-12);
        assert_eq!(map_angular(5000.0, &r), map_angular(2000.0, &r));
        assert_eq!(map_angular(-1.0, &r), PI);
    }

    #[test]
    fn nan_maps_to_zero() {
        let r = range(100.0);
        assert_eq!(map_linear(f64::NAN, &r), 0.0);
    }

    #[test]
    fn linear_fill_top_measured_from_bottom() {
        let gauge = LinearGauge::default();
        match gauge.draw_params(50.0, &range(100.0)) {
            GaugeDrawParams::Linear {
                fill_fraction,
                fill_top,
            } => {
                assert_eq!(fill_fraction, 0.5);
                assert_eq!(fill_top, gauge.bottom - 60.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn needle_tip_at_half_scale_points_up() {
        let panel = PanelGeometry::default();
        let params = geometry(1000.0, &range(2000.0), GaugeKind::Angular, &panel);
        let GaugeDrawParams::Angular { tip, .. } = params else {
            panic!("expected angular params");
        };
        assert!((tip.0 - panel.pressure.cx).abs() < 1e-9);
        assert!((tip.1 - (panel.pressure.cy - panel.pressure.radius)).abs() < 1e-9);
    }

    #[test]
    fn needle_tip_at_zero_points_left() {
        let panel = PanelGeometry::default();
        let GaugeDrawParams::Angular { tip, .. } =
            geometry(0.0, &range(2000.0), GaugeKind::Angular, &panel)
        else {
            panic!("expected angular params");
        };
        assert!((tip.0 - (panel.pressure.cx - panel.pressure.radius)).abs() < 1e-9);
        assert!((tip.1 - panel.pressure.cy).abs() < 1e-9);
    }
}
