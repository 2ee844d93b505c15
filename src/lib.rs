// ============================================================================
// CRATE CONFIGURATION & IMPORTS
// ============================================================================

//! Simulated process instrument panel.
//!
//! Setpoints drive a first-order-lag digital twin; noisy sensor readings are
//! derived from it and shown on an auto-ranging thermometer and a half-dial
//! pressure gauge next to the twin's prediction.
//!
//! The simulation and instrumentation core (`twin`, `readout`, `range`,
//! `ticks`, `geometry`, `mixture`, `panel`) has no window, file or network
//! dependency and can be driven from tests. `render` and `app` are the
//! `pixels`/`winit` front end.

// Simulation core
pub mod error;
pub mod geometry;
pub mod mixture;
pub mod panel;
pub mod range;
pub mod readout;
pub mod schedule;
pub mod ticks;
pub mod twin;

// Configuration
pub mod config;

// Presentation
pub mod app;
pub mod render;

// ============================================================================
// PUBLIC API - RE-EXPORTS
// ============================================================================

pub use config::{Color, PanelConfig};
pub use error::PanelError;
pub use geometry::{geometry, map_angular, map_linear, GaugeDrawParams, GaugeKind, PanelGeometry};
pub use mixture::{Mixture, MixtureSummary};
pub use panel::{Panel, PanelCommand, PanelFrame};
pub use range::{GaugeId, GaugeRange, GaugeRangeController, RangeUpdate};
pub use readout::{observe, observe_all, NoiseSource, ObservedReading, Readings, UniformNoise, Variable};
pub use schedule::PeriodicTimer;
pub use ticks::{layout_ticks, Scale, Tick, TickSet};
pub use twin::{DigitalTwin, ProcessSetpoints, TwinState};
