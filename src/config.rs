use std::path::PathBuf;
use std::time::Duration;

use bon::Builder;

use crate::geometry::{LinearGauge, PanelGeometry, RadialGauge};
use crate::range::GaugeRange;
use crate::schedule::PeriodicTimer;
use crate::ticks::{Scale, ANGULAR_LABEL_SPACING, LINEAR_LABEL_SPACING};
use crate::twin::ProcessSetpoints;

/// Color representation for gauge elements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn as_tuple(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }
}

/// Configuration for application window
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub width: usize,
    pub height: usize,
    pub max_framerate: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "AVO Instrument Panel".to_string(),
            width: 500,
            height: 400,
            max_framerate: 60.0,
        }
    }
}

/// How often the panel core runs relative to rendering
#[derive(Debug, Clone)]
pub struct TimingConfig {
    pub frames_per_tick: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self { frames_per_tick: 30 }
    }
}

/// Configuration for the linear temperature gauge
#[derive(Debug, Clone)]
pub struct ThermometerConfig {
    pub x: f64,
    pub top: f64,
    pub bottom: f64,
    pub width: f64,
    pub bulb_radius: i32,
    pub max_value: f64,
    pub step: f64,
    pub min_label_spacing: f64,
    pub tick_length: i32,
    pub tick_thickness: f32,
    pub label_font_size: f32,
}

impl Default for ThermometerConfig {
    fn default() -> Self {
        let gauge = LinearGauge::default();
        Self {
            x: gauge.x,
            top: gauge.top,
            bottom: gauge.bottom,
            width: gauge.width,
            bulb_radius: 14,
            max_value: 100.0,
            step: 10.0,
            min_label_spacing: LINEAR_LABEL_SPACING,
            tick_length: 8,
            tick_thickness: 1.5,
            label_font_size: 14.0,
        }
    }
}

impl ThermometerConfig {
    pub fn gauge(&self) -> LinearGauge {
        LinearGauge {
            x: self.x,
            top: self.top,
            bottom: self.bottom,
            width: self.width,
        }
    }
}

/// Configuration for the half-dial pressure gauge
#[derive(Debug, Clone)]
pub struct PressureGaugeConfig {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    pub max_value: f64,
    pub step: f64,
    pub min_label_spacing: f64,
    pub dial_thickness: i32,
    pub tick_length: i32,
    pub tick_thickness: f32,
    pub label_font_size: f32,
    pub ticks_to_numbers_distance: f64,
    pub needle_width: f32,
    pub dot_radius: i32,
}

impl Default for PressureGaugeConfig {
    fn default() -> Self {
        let gauge = RadialGauge::default();
        Self {
            cx: gauge.cx,
            cy: gauge.cy,
            radius: gauge.radius,
            max_value: 2000.0,
            step: 200.0,
            min_label_spacing: ANGULAR_LABEL_SPACING,
            dial_thickness: 3,
            tick_length: 10,
            tick_thickness: 2.0,
            label_font_size: 13.0,
            ticks_to_numbers_distance: 14.0,
            needle_width: 3.0,
            dot_radius: 5,
        }
    }
}

impl PressureGaugeConfig {
    pub fn gauge(&self) -> RadialGauge {
        RadialGauge {
            cx: self.cx,
            cy: self.cy,
            radius: self.radius,
        }
    }
}

/// Configuration for the readings table and mixture line
#[derive(Debug, Clone)]
pub struct ReadoutConfig {
    pub x: i32,
    pub y: i32,
    pub row_height: i32,
    pub font_size: f32,
}

impl Default for ReadoutConfig {
    fn default() -> Self {
        Self {
            x: 250,
            y: 240,
            row_height: 22,
            font_size: 15.0,
        }
    }
}

/// Panel configuration
#[derive(Debug, Clone, Builder)]
pub struct PanelConfig {
    #[builder(default)]
    pub window: WindowConfig,
    #[builder(default)]
    pub timing: TimingConfig,
    #[builder(default)]
    pub thermometer: ThermometerConfig,
    #[builder(default)]
    pub pressure: PressureGaugeConfig,
    #[builder(default)]
    pub readout: ReadoutConfig,
    #[builder(default)]
    pub initial_setpoints: ProcessSetpoints,

    /// Noise seed; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Font for labels and readouts; `None` draws no text.
    pub font_path: Option<PathBuf>,

    // Colors
    #[builder(default = Color::new(0xff, 0xff, 0xff))]
    pub background_color: Color,
    #[builder(default = Color::new(0x00, 0x00, 0x00))]
    pub dial_color: Color,
    #[builder(default = Color::new(0xd0, 0x20, 0x20))]
    pub fill_color: Color,
    #[builder(default = Color::new(0x00, 0x00, 0x00))]
    pub needle_color: Color,
    #[builder(default = Color::new(0x20, 0x20, 0x20))]
    pub text_color: Color,
    #[builder(default = Color::new(0xd0, 0x20, 0x20))]
    pub warning_color: Color,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl PanelConfig {
    pub fn geometry(&self) -> PanelGeometry {
        PanelGeometry {
            thermometer: self.thermometer.gauge(),
            pressure: self.pressure.gauge(),
        }
    }

    pub fn thermometer_range(&self) -> GaugeRange {
        GaugeRange::new(self.thermometer.max_value, self.thermometer.step)
    }

    pub fn pressure_range(&self) -> GaugeRange {
        GaugeRange::new(self.pressure.max_value, self.pressure.step)
    }

    pub fn thermometer_scale(&self) -> Scale {
        self.thermometer
            .gauge()
            .scale(self.thermometer.min_label_spacing)
    }

    pub fn pressure_scale(&self) -> Scale {
        self.pressure.gauge().scale(self.pressure.min_label_spacing)
    }

    /// Wall-clock period of the core tick.
    pub fn tick_interval(&self) -> Duration {
        PeriodicTimer::interval_for_frames(self.timing.frames_per_tick, self.window.max_framerate)
    }

    pub fn frame_interval(&self) -> Duration {
        PeriodicTimer::interval_for_frames(1, self.window.max_framerate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thermometer_span_is_reference_geometry() {
        let config = PanelConfig::default();
        assert_eq!(config.geometry().thermometer.span(), 120.0);
        assert_eq!(
            config.thermometer_scale(),
            Scale::Linear {
                span: 120.0,
                min_label_spacing: 15.0
            }
        );
    }

    #[test]
    fn builder_overrides_leave_other_defaults() {
        let config = PanelConfig::builder()
            .seed(9)
            .timing(TimingConfig { frames_per_tick: 60 })
            .build();
        assert_eq!(config.seed, Some(9));
        assert!(config.font_path.is_none());
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
        assert_eq!(config.pressure_range().max_value(), 2000.0);
        assert_eq!(config.initial_setpoints, ProcessSetpoints::default());
    }
}
