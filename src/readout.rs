//! Simulated sensor readout.
//!
//! Each sensor reports the twin's estimate plus one uniform perturbation drawn
//! from a shared, injectable noise source.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::twin::TwinState;

pub const TEMPERATURE_NOISE: f64 = 1.0;
pub const PRESSURE_NOISE: f64 = 5.0;
pub const AIR_FLOW_NOISE: f64 = 10.0;
pub const FAN_SPEED_NOISE: f64 = 20.0;

/// Source of bounded sensor perturbations.
pub trait NoiseSource {
    /// Returns a perturbation in `[-bound, +bound]`.
    fn perturbation(&mut self, bound: f64) -> f64;
}

impl<N: NoiseSource + ?Sized> NoiseSource for &mut N {
    fn perturbation(&mut self, bound: f64) -> f64 {
        (**self).perturbation(bound)
    }
}

impl<N: NoiseSource + ?Sized> NoiseSource for Box<N> {
    fn perturbation(&mut self, bound: f64) -> f64 {
        (**self).perturbation(bound)
    }
}

/// Uniform noise over any `rand` generator.
#[derive(Debug, Clone)]
pub struct UniformNoise<R = StdRng> {
    rng: R,
}

impl UniformNoise<StdRng> {
    /// Reproducible stream for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: Rng> UniformNoise<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> NoiseSource for UniformNoise<R> {
    fn perturbation(&mut self, bound: f64) -> f64 {
        if !bound.is_finite() || bound <= 0.0 {
            return 0.0;
        }
        self.rng.random_range(-bound..=bound)
    }
}

/// One sensor value next to the twin value it was derived from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservedReading {
    pub value: f64,
    pub twin_value: f64,
    /// Always `value - twin_value`.
    pub deviation: f64,
}

impl ObservedReading {
    pub fn new(value: f64, twin_value: f64) -> Self {
        Self {
            value,
            twin_value,
            deviation: value - twin_value,
        }
    }

    /// Observed value with one decimal and its unit, e.g. `"20.3 °C"`.
    pub fn formatted(&self, unit: &str) -> String {
        format!("{:.1} {}", self.value, unit)
    }
}

/// Draws one perturbation and applies it to `twin_value`.
pub fn observe<N: NoiseSource + ?Sized>(
    twin_value: f64,
    noise_bound: f64,
    noise: &mut N,
) -> ObservedReading {
    let value = twin_value + noise.perturbation(noise_bound);
    ObservedReading::new(value, twin_value)
}

/// The four monitored process variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variable {
    OutTemp,
    OutPressure,
    AirFlow,
    FanSpeed,
}

impl Variable {
    pub const ALL: [Variable; 4] = [
        Variable::OutTemp,
        Variable::OutPressure,
        Variable::AirFlow,
        Variable::FanSpeed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Variable::OutTemp => "Output Temperature",
            Variable::OutPressure => "Output Pressure",
            Variable::AirFlow => "Air Flow",
            Variable::FanSpeed => "Fan Speed",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Variable::OutTemp => "\u{b0}C",
            Variable::OutPressure => "Pa",
            Variable::AirFlow => "m\u{b3}/h",
            Variable::FanSpeed => "rpm",
        }
    }

    pub fn noise_bound(self) -> f64 {
        match self {
            Variable::OutTemp => TEMPERATURE_NOISE,
            Variable::OutPressure => PRESSURE_NOISE,
            Variable::AirFlow => AIR_FLOW_NOISE,
            Variable::FanSpeed => FAN_SPEED_NOISE,
        }
    }

    pub fn twin_value(self, twin: &TwinState) -> f64 {
        match self {
            Variable::OutTemp => twin.out_temp,
            Variable::OutPressure => twin.out_pressure,
            Variable::AirFlow => twin.air_flow,
            Variable::FanSpeed => twin.fan_speed,
        }
    }
}

/// One tick's worth of readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Readings {
    pub out_temp: ObservedReading,
    pub out_pressure: ObservedReading,
    pub air_flow: ObservedReading,
    pub fan_speed: ObservedReading,
}

impl Readings {
    pub fn get(&self, variable: Variable) -> ObservedReading {
        match variable {
            Variable::OutTemp => self.out_temp,
            Variable::OutPressure => self.out_pressure,
            Variable::AirFlow => self.air_flow,
            Variable::FanSpeed => self.fan_speed,
        }
    }

    /// Readings in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Variable, ObservedReading)> + '_ {
        Variable::ALL.into_iter().map(move |v| (v, self.get(v)))
    }
}

/// Observes every variable of `twin`, drawing from `noise` in display order.
pub fn observe_all<N: NoiseSource + ?Sized>(twin: &TwinState, noise: &mut N) -> Readings {
    let mut read = |variable: Variable| {
        observe(variable.twin_value(twin), variable.noise_bound(), &mut *noise)
    };
    Readings {
        out_temp: read(Variable::OutTemp),
        out_pressure: read(Variable::OutPressure),
        air_flow: read(Variable::AirFlow),
        fan_speed: read(Variable::FanSpeed),
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

    #[test]
    fn deviation_is_observed_minus_twin() {
        for offset in [-0.75, 0.0, 0.3, 1.0] {
            let reading = observe(20.0, TEMPERATURE_NOISE, &mut FixedNoise(offset));
            assert_eq!(reading.deviation, reading.value - reading.twin_value);
            assert_eq!(reading.twin_value, 20.0);
        }
    }

    #[test]
    fn uniform_noise_stays_within_bound() {
        let mut noise = UniformNoise::seeded(7);
        for _ in 0..1000 {
            let reading = observe(1000.0, PRESSURE_NOISE, &mut noise);
            assert!(reading.deviation.abs() <= PRESSURE_NOISE + 1e-9);
        }
    }

    #[test]
    fn non_positive_bound_adds_no_noise() {
        let mut noise = UniformNoise::seeded(1);
        assert_eq!(noise.perturbation(0.0), 0.0);
        assert_eq!(noise.perturbation(-3.0), 0.0);
        assert_eq!(noise.perturbation(f64::NAN), 0.0);
    }

    #[test]
    fn seeded_streams_are_reproducible() {
        let twin = TwinState::default();
        let a = observe_all(&twin, &mut UniformNoise::seeded(42));
        let b = observe_all(&twin, &mut UniformNoise::seeded(42));
        assert_eq!(a, b);
    }

    #[test]
    fn observe_all_uses_per_variable_bounds() {
        let twin = TwinState::default();
        // 15 is clamped by each bound in turn
        let readings = observe_all(&twin, &mut FixedNoise(15.0));
        assert_eq!(readings.out_temp.deviation, 1.0);
        assert_eq!(readings.out_pressure.deviation, 5.0);
        assert_eq!(readings.air_flow.deviation, 10.0);
        assert_eq!(readings.fan_speed.deviation, 15.0);
    }

    #[test]
    fn readings_iterate_in_display_order() {
        let readings = observe_all(&TwinState::default(), &mut FixedNoise(0.0));
        let labels: Vec<_> = readings.iter().map(|(v, _)| v.label()).collect();
        assert_eq!(
            labels,
            ["Output Temperature", "Output Pressure", "Air Flow", "Fan Speed"]
        );
    }

    #[test]
    fn formatted_uses_one_decimal() {
        let reading = ObservedReading::new(20.345, 20.0);
        assert_eq!(reading.formatted("Pa"), "20.3 Pa");
    }
}
