// Twin Panel - Error Types

use thiserror::Error;

/// Errors produced by the panel core.
///
/// Nothing here is fatal to the process: an invalid range is repaired by
/// [`GaugeRange::new`](crate::range::GaugeRange::new), everything else is
/// handed back to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PanelError {
    /// A gauge range edit with a non-positive or non-finite bound.
    #[error("Invalid range: max_value={max_value}, step={step}")]
    InvalidRange { max_value: f64, step: f64 },

    /// Share set for a component that was never added to the mixture.
    #[error("Unknown component: {name}")]
    UnknownComponent { name: String },

    /// A text command line could not be parsed.
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// Font file could not be read or parsed.
    #[error("Font error: {0}")]
    Font(String),
}
