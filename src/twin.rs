//! Digital twin of the drying process.
//!
//! The twin is a first-order lag model: every tick each estimate moves a fixed
//! fraction of the way toward the value implied by the current setpoints, with
//! a small coupling from product flow into pressure and from fan speed into air
//! flow. It is the noise-free reference the sensor readout is compared against.

/// Fraction of the remaining distance covered per tick.
pub const LAG_GAIN: f64 = 0.1;

/// Gain of the cross-coupling terms (product flow → pressure, fan → air flow).
pub const COUPLING_GAIN: f64 = 0.01;

/// Operator-entered setpoints, read once per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessSetpoints {
    /// Desired output temperature (°C).
    pub desired_temp: f64,
    /// Inlet pressure (Pa).
    pub inlet_pressure: f64,
    /// Inlet temperature (°C).
    pub inlet_temp: f64,
    /// Product flow (m³/h).
    pub product_flow: f64,
    /// Fan speed setpoint (rpm).
    pub fan_speed: f64,
}

impl Default for ProcessSetpoints {
    fn default() -> Self {
        Self {
            desired_temp: 20.0,
            inlet_pressure: 1000.0,
            inlet_temp: 25.0,
            product_flow: 100.0,
            fan_speed: 1000.0,
        }
    }
}

impl ProcessSetpoints {
    /// Temperature the outlet settles at: the mean of desired and inlet.
    pub fn temperature_target(&self) -> f64 {
        (self.desired_temp + self.inlet_temp) / 2.0
    }
}

/// Current estimate of the four process variables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwinState {
    pub out_temp: f64,
    pub out_pressure: f64,
    pub air_flow: f64,
    pub fan_speed: f64,
}

impl Default for TwinState {
    fn default() -> Self {
        Self {
            out_temp: 20.0,
            out_pressure: 1000.0,
            air_flow: 100.0,
            fan_speed: 1000.0,
        }
    }
}

impl TwinState {
    /// One lag step toward `setpoints`. Pure; values are not clamped.
    pub fn advance(&self, setpoints: &ProcessSetpoints) -> TwinState {
        let out_temp =
            self.out_temp + LAG_GAIN * (setpoints.temperature_target() - self.out_temp);
        let out_pressure = self.out_pressure
            + LAG_GAIN * (setpoints.inlet_pressure - self.out_pressure)
            - COUPLING_GAIN * setpoints.product_flow;

        // Air flow couples to the fan speed of this tick, so fan goes first.
        let fan_speed = self.fan_speed + LAG_GAIN * (setpoints.fan_speed - self.fan_speed);
        let air_flow = self.air_flow
            + LAG_GAIN * (setpoints.product_flow - self.air_flow)
            + COUPLING_GAIN * (fan_speed - self.air_flow);

        TwinState {
            out_temp,
            out_pressure,
            air_flow,
            fan_speed,
        }
    }
}

/// Owner of the twin state for the lifetime of a panel.
#[derive(Debug, Clone, Default)]
pub struct DigitalTwin {
    state: TwinState,
    steps: u64,
}

impl DigitalTwin {
    pub fn new(state: TwinState) -> Self {
        Self { state, steps: 0 }
    }

    /// Advances the stored state one tick and returns the new estimate.
    pub fn advance(&mut self, setpoints: &ProcessSetpoints) -> TwinState {
        self.state = self.state.advance(setpoints);
        self.steps += 1;
        self.state
    }

    pub fn state(&self) -> TwinState {
        self.state
    }

    /// Number of ticks applied since construction.
    pub fn steps(&self) -> u64 {
        self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn defaults_match_panel_start_values() {
        let state = TwinState::default();
        assert_eq!(state.out_temp, 20.0);
        assert_eq!(state.out_pressure, 1000.0);
        assert_eq!(state.air_flow, 100.0);
        assert_eq!(state.fan_speed, 1000.0);
    }

    #[test]
    fn single_step_follows_lag_law() {
        let state = TwinState::default();
        let setpoints = ProcessSetpoints {
            desired_temp: 40.0,
            inlet_pressure: 1200.0,
            inlet_temp: 30.0,
            product_flow: 100.0,
            fan_speed: 1000.0,
        };
        let next = state.advance(&setpoints);
        // target 35 → 20 + 0.1 * 15
        assert!(approx(next.out_temp, 21.5));
        // 1000 + 0.1 * 200 - 0.01 * 100
        assert!(approx(next.out_pressure, 1019.0));
        assert!(approx(next.fan_speed, 1000.0));
    }

    #[test]
    fn temperature_converges_monotonically() {
        let setpoints = ProcessSetpoints {
            desired_temp: 60.0,
            inlet_temp: 40.0,
            ..ProcessSetpoints::default()
        };
        let target = setpoints.temperature_target();
        let mut state = TwinState::default();
        for _ in 0..200 {
            let next = state.advance(&setpoints);
            let before = (state.out_temp - target).abs();
            let after = (next.out_temp - target).abs();
            if before > 0.0 {
                assert!(after < before, "{after} !< {before}");
            }
            state = next;
        }
        assert!((state.out_temp - target).abs() < 1e-6);
    }

    #[test]
    fn pressure_settles_below_inlet_by_flow_coupling() {
        let setpoints = ProcessSetpoints::default();
        let mut state = TwinState::default();
        for _ in 0..500 {
            state = state.advance(&setpoints);
        }
        // 0.1 * (1000 - p) = 0.01 * 100  →  p = 990
        assert!((state.out_pressure - 990.0).abs() < 1e-6);
    }

    #[test]
    fn air_flow_uses_updated_fan_speed() {
        let state = TwinState::default();
        let setpoints = ProcessSetpoints {
            fan_speed: 2000.0,
            ..ProcessSetpoints::default()
        };
        let next = state.advance(&setpoints);
        assert!(approx(next.fan_speed, 1100.0));
        // 100 + 0.1 * (100 - 100) + 0.01 * (1100 - 100)
        assert!(approx(next.air_flow, 110.0));
        // the stale fan speed would have given 109
        assert!(!approx(next.air_flow, 109.0));
    }

    #[test]
    fn twin_counts_steps_and_keeps_state() {
        let mut twin = DigitalTwin::default();
        let setpoints = ProcessSetpoints::default();
        let first = twin.advance(&setpoints);
        let second = twin.advance(&setpoints);
        assert_eq!(twin.steps(), 2);
        assert_eq!(twin.state(), second);
        assert_ne!(first, second);
    }
}
