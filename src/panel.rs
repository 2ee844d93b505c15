//! The panel aggregate and its per-tick pipeline.
//!
//! `Panel` owns every piece of mutable state (twin, gauge ranges, tick sets,
//! mixture, noise stream). It is driven synchronously: once per timer tick via
//! [`Panel::tick`] and in between by user edits through [`Panel::apply`].

use std::str::FromStr;

use tracing::{debug, trace};

use crate::config::PanelConfig;
use crate::error::PanelError;
use crate::geometry::{geometry, GaugeDrawParams, GaugeKind, PanelGeometry};
use crate::mixture::Mixture;
use crate::range::{GaugeId, GaugeRange, GaugeRangeController, RangeUpdate};
use crate::readout::{observe_all, NoiseSource, Readings, UniformNoise};
use crate::ticks::{layout_ticks, Scale, TickSet};
use crate::twin::{DigitalTwin, ProcessSetpoints, TwinState};

/// Input from the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelCommand {
    SetSetpoints(ProcessSetpoints),
    SetDesiredTemp(f64),
    SetInletPressure(f64),
    SetInletTemp(f64),
    SetProductFlow(f64),
    SetFanSpeed(f64),
    EditRange {
        gauge: GaugeId,
        max_value: f64,
        step: f64,
    },
    AddComponent(String),
    SetShare(String, f64),
    /// Run one tick now, outside the timer cadence.
    Refresh,
}

impl FromStr for PanelCommand {
    type Err = PanelError;

    /// Parses lines such as `fan_speed 1500`, `range pressure 3000 250`,
    /// `add H2O`, `share H2O 0.3` or `refresh`.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let invalid = || PanelError::InvalidCommand(line.trim().to_string());
        let number = |token: Option<&str>| -> Result<f64, PanelError> {
            token
                .and_then(|t| t.parse::<f64>().ok())
                .filter(|v| v.is_finite())
                .ok_or_else(invalid)
        };

        let mut tokens = line.split_whitespace();
        let keyword = tokens.next().ok_or_else(invalid)?;
        let command = match keyword {
            "desired_temp" => PanelCommand::SetDesiredTemp(number(tokens.next())?),
            "inlet_pressure" => PanelCommand::SetInletPressure(number(tokens.next())?),
            "inlet_temp" => PanelCommand::SetInletTemp(number(tokens.next())?),
            "product_flow" => PanelCommand::SetProductFlow(number(tokens.next())?),
            "fan_speed" => PanelCommand::SetFanSpeed(number(tokens.next())?),
            "range" => {
                let gauge = match tokens.next() {
                    Some("thermometer") | Some("temperature") => GaugeId::Thermometer,
                    Some("pressure") => GaugeId::Pressure,
                    _ => return Err(invalid()),
                };
                PanelCommand::EditRange {
                    gauge,
                    max_value: number(tokens.next())?,
                    step: number(tokens.next())?,
                }
            }
            "add" => PanelCommand::AddComponent(tokens.next().ok_or_else(invalid)?.to_string()),
            "share" => {
                let name = tokens.next().ok_or_else(invalid)?.to_string();
                PanelCommand::SetShare(name, number(tokens.next())?)
            }
            "refresh" => PanelCommand::Refresh,
            _ => return Err(invalid()),
        };

        if tokens.next().is_some() {
            return Err(invalid());
        }
        Ok(command)
    }
}

/// Everything the renderer needs from one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelFrame {
    pub twin: TwinState,
    pub readings: Readings,
    pub ranges: RangeUpdate,
    pub thermometer: GaugeDrawParams,
    pub pressure: GaugeDrawParams,
}

/// Owned state of one running instrument panel.
pub struct Panel<N: NoiseSource = UniformNoise> {
    setpoints: ProcessSetpoints,
    twin: DigitalTwin,
    ranges: GaugeRangeController,
    thermometer_scale: Scale,
    pressure_scale: Scale,
    thermometer_ticks: TickSet,
    pressure_ticks: TickSet,
    geometry: PanelGeometry,
    mixture: Mixture,
    noise: N,
    last_frame: Option<PanelFrame>,
}

impl Panel<UniformNoise> {
    /// Panel with uniform noise, seeded from the config or the OS.
    pub fn new(config: &PanelConfig) -> Self {
        let noise = match config.seed {
            Some(seed) => UniformNoise::seeded(seed),
            None => UniformNoise::from_os_rng(),
        };
        Self::with_noise(config, noise)
    }
}

impl<N: NoiseSource> Panel<N> {
    pub fn with_noise(config: &PanelConfig, noise: N) -> Self {
        let thermometer_scale = config.thermometer_scale();
        let pressure_scale = config.pressure_scale();
        let thermometer_range = config.thermometer_range();
        let pressure_range = config.pressure_range();
        Self {
            setpoints: config.initial_setpoints,
            twin: DigitalTwin::default(),
            ranges: GaugeRangeController::new(thermometer_range, pressure_range),
            thermometer_ticks: layout_ticks(&thermometer_range, &thermometer_scale),
            pressure_ticks: layout_ticks(&pressure_range, &pressure_scale),
            thermometer_scale,
            pressure_scale,
            geometry: config.geometry(),
            mixture: Mixture::new(),
            noise,
            last_frame: None,
        }
    }

    // ------------------------------------------------------------------
    // Pipeline stages
    // ------------------------------------------------------------------

    /// Advances the twin one lag step toward `setpoints`.
    pub fn advance_twin(&mut self, setpoints: &ProcessSetpoints) -> TwinState {
        self.twin.advance(setpoints)
    }

    /// Draws one reading per variable from the panel's noise stream.
    pub fn observe(&mut self, twin: &TwinState) -> Readings {
        observe_all(twin, &mut self.noise)
    }

    /// Auto-ranges both gauges and relays out the ticks of any that grew.
    pub fn update_ranges(&mut self, readings: &Readings) -> RangeUpdate {
        let update = self.ranges.update_ranges(readings);
        for gauge in [GaugeId::Thermometer, GaugeId::Pressure] {
            if update.changed_for(gauge) {
                self.relayout(gauge);
            }
        }
        update
    }

    /// Fresh tick set for the current range of `gauge`.
    pub fn layout_ticks(&self, gauge: GaugeId) -> TickSet {
        layout_ticks(&self.ranges.range(gauge), &self.scale(gauge))
    }

    /// Draw parameters for `value` on `gauge` at its current range.
    pub fn geometry(&self, value: f64, gauge: GaugeId) -> GaugeDrawParams {
        let kind = match gauge {
            GaugeId::Thermometer => GaugeKind::Linear,
            GaugeId::Pressure => GaugeKind::Angular,
        };
        geometry(value, &self.ranges.range(gauge), kind, &self.geometry)
    }

    /// Runs the whole pipeline once with the stored setpoints.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn tick(&mut self) -> &PanelFrame {
        let setpoints = self.setpoints;
        let twin = self.advance_twin(&setpoints);
        let readings = self.observe(&twin);
        let ranges = self.update_ranges(&readings);
        let frame = PanelFrame {
            twin,
            readings,
            ranges,
            thermometer: self.geometry(readings.out_temp.value, GaugeId::Thermometer),
            pressure: self.geometry(readings.out_pressure.value, GaugeId::Pressure),
        };
        trace!(step = self.twin.steps(), "Panel tick");
        self.last_frame.insert(frame)
    }

    // ------------------------------------------------------------------
    // User input
    // ------------------------------------------------------------------

    pub fn set_setpoints(&mut self, setpoints: ProcessSetpoints) {
        self.setpoints = setpoints;
    }

    /// Manual range edit; always overrides and relays out the ticks.
    pub fn edit_range(&mut self, gauge: GaugeId, max_value: f64, step: f64) -> GaugeRange {
        let range = self.ranges.edit(gauge, max_value, step);
        self.relayout(gauge);
        range
    }

    pub fn apply(&mut self, command: PanelCommand) -> Result<(), PanelError> {
        debug!(?command, "Applying panel command");
        match command {
            PanelCommand::SetSetpoints(setpoints) => self.setpoints = setpoints,
            PanelCommand::SetDesiredTemp(v) => self.setpoints.desired_temp = v,
            PanelCommand::SetInletPressure(v) => self.setpoints.inlet_pressure = v,
            PanelCommand::SetInletTemp(v) => self.setpoints.inlet_temp = v,
            PanelCommand::SetProductFlow(v) => self.setpoints.product_flow = v,
            PanelCommand::SetFanSpeed(v) => self.setpoints.fan_speed = v,
            PanelCommand::EditRange {
                gauge,
                max_value,
                step,
            } => {
                self.edit_range(gauge, max_value, step);
            }
            PanelCommand::AddComponent(name) => {
                self.mixture.add_component(name);
            }
            PanelCommand::SetShare(name, share) => self.mixture.set_share(&name, share)?,
            PanelCommand::Refresh => {
                self.tick();
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn setpoints(&self) -> &ProcessSetpoints {
        &self.setpoints
    }

    pub fn twin_state(&self) -> TwinState {
        self.twin.state()
    }

    pub fn range(&self, gauge: GaugeId) -> GaugeRange {
        self.ranges.range(gauge)
    }

    /// Cached tick set, rebuilt whenever the gauge's range changes.
    pub fn ticks(&self, gauge: GaugeId) -> &TickSet {
        match gauge {
            GaugeId::Thermometer => &self.thermometer_ticks,
            GaugeId::Pressure => &self.pressure_ticks,
        }
    }

    pub fn panel_geometry(&self) -> &PanelGeometry {
        &self.geometry
    }

    pub fn mixture(&self) -> &Mixture {
        &self.mixture
    }

    pub fn mixture_mut(&mut self) -> &mut Mixture {
        &mut self.mixture
    }

    pub fn last_frame(&self) -> Option<&PanelFrame> {
        self.last_frame.as_ref()
    }

    fn scale(&self, gauge: GaugeId) -> Scale {
        match gauge {
            GaugeId::Thermometer => self.thermometer_scale,
            GaugeId::Pressure => self.pressure_scale,
        }
    }

    fn relayout(&mut self, gauge: GaugeId) {
        let ticks = self.layout_ticks(gauge);
        match gauge {
            GaugeId::Thermometer => self.thermometer_ticks = ticks,
            GaugeId::Pressure => self.pressure_ticks = ticks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedNoise(f64);

    impl NoiseSource for FixedNoise {
        fn perturbation(&mut self, bound: f64) -> f64 {
            self.0.clamp(-bound, bound)
        }
    }

    fn quiet_panel() -> Panel<FixedNoise> {
        Panel::with_noise(&PanelConfig::default(), FixedNoise(0.0))
    }

    #[test]
    fn parses_setpoint_commands() {
        assert_eq!(
            "fan_speed 1500".parse::<PanelCommand>(),
            Ok(PanelCommand::SetFanSpeed(1500.0))
        );
        assert_eq!(
            "  desired_temp   35.5 ".parse::<PanelCommand>(),
            Ok(PanelCommand::SetDesiredTemp(35.5))
        );
    }

    #[test]
    fn parses_range_and_mixture_commands() {
        assert_eq!(
            "range pressure 3000 250".parse::<PanelCommand>(),
            Ok(PanelCommand::EditRange {
                gauge: GaugeId::Pressure,
                max_value: 3000.0,
                step: 250.0,
            })
        );
        assert_eq!(
            "share H2O 0.3".parse::<PanelCommand>(),
            Ok(PanelCommand::SetShare("H2O".to_string(), 0.3))
        );
        assert_eq!(
            "add CO2".parse::<PanelCommand>(),
            Ok(PanelCommand::AddComponent("CO2".to_string()))
        );
        assert_eq!("refresh".parse::<PanelCommand>(), Ok(PanelCommand::Refresh));
    }

    #[test]
    fn rejects_malformed_commands() {
        for line in [
            "",
            "warp 9",
            "fan_speed fast",
            "range oven 10 1",
            "refresh now",
            "desired_temp nan",
            "inlet_pressure -inf",
            "range pressure inf 10",
            "share H2O NaN",
        ] {
            assert!(
                matches!(line.parse::<PanelCommand>(), Err(PanelError::InvalidCommand(_))),
                "{line:?} parsed"
            );
        }
    }

    #[test]
    fn rejected_non_finite_setpoint_leaves_twin_finite() {
        let mut panel = quiet_panel();
        assert!("desired_temp nan".parse::<PanelCommand>().is_err());
        for _ in 0..20 {
            panel.tick();
        }
        assert!(panel.twin_state().out_temp.is_finite());
        assert_eq!(panel.setpoints(), &ProcessSetpoints::default());
    }

    #[test]
    fn tick_runs_full_pipeline() {
        let mut panel = quiet_panel();
        let frame = panel.tick().clone();
        assert_eq!(frame.twin, panel.twin_state());
        assert_eq!(frame.readings.out_temp.value, frame.twin.out_temp);
        assert!(!frame.ranges.changed());
        assert!(matches!(frame.thermometer, GaugeDrawParams::Linear { .. }));
        assert!(matches!(frame.pressure, GaugeDrawParams::Angular { .. }));
        assert_eq!(panel.last_frame(), Some(&frame));
    }

    #[test]
    fn hot_reading_expands_thermometer_and_relays_ticks() {
        let mut panel = quiet_panel();
        assert_eq!(panel.ticks(GaugeId::Thermometer).len(), 11);
        panel
            .apply(PanelCommand::SetSetpoints(ProcessSetpoints {
                desired_temp: 190.0,
                inlet_temp: 190.0,
                ..ProcessSetpoints::default()
            }))
            .unwrap();

        let mut expanded = false;
        for _ in 0..50 {
            expanded |= panel.tick().ranges.thermometer_changed;
        }
        assert!(expanded);
        let range = panel.range(GaugeId::Thermometer);
        assert!(range.max_value() > 100.0);
        assert_eq!(
            panel.ticks(GaugeId::Thermometer),
            &panel.layout_ticks(GaugeId::Thermometer)
        );
        assert_eq!(panel.ticks(GaugeId::Thermometer).len(), range.tick_count());
    }

    #[test]
    fn edit_range_overrides_and_relays_ticks() {
        let mut panel = quiet_panel();
        panel
            .apply("range pressure 3000 500".parse().unwrap())
            .unwrap();
        assert_eq!(panel.range(GaugeId::Pressure).max_value(), 3000.0);
        assert_eq!(panel.ticks(GaugeId::Pressure).len(), 7);
    }

    #[test]
    fn invalid_edit_is_recovered() {
        let mut panel = quiet_panel();
        let range = panel.edit_range(GaugeId::Thermometer, 100.0, 0.0);
        assert!(range.step() > 0.0);
        assert!(!panel.ticks(GaugeId::Thermometer).is_empty());
    }

    #[test]
    fn share_for_unknown_component_is_reported() {
        let mut panel = quiet_panel();
        let err = panel
            .apply(PanelCommand::SetShare("N2".to_string(), 0.1))
            .unwrap_err();
        assert!(matches!(err, PanelError::UnknownComponent { .. }));

        panel.apply(PanelCommand::AddComponent("N2".to_string())).unwrap();
        panel.apply(PanelCommand::SetShare("N2".to_string(), 0.1)).unwrap();
        assert_eq!(panel.mixture().share("N2"), Some(0.1));
    }

    #[test]
    fn refresh_runs_one_tick() {
        let mut panel = quiet_panel();
        assert!(panel.last_frame().is_none());
        panel.apply(PanelCommand::Refresh).unwrap();
        assert!(panel.last_frame().is_some());
    }

    #[test]
    fn out_of_range_reading_pins_geometry() {
        let panel = quiet_panel();
        assert_eq!(
            panel.geometry(500.0, GaugeId::Thermometer),
            panel.geometry(100.0, GaugeId::Thermometer)
        );
    }
}
