//! Component shares of a gas mixture.

use tracing::debug;

use crate::error::PanelError;

#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub name: String,
    pub share: f64,
}

/// Running sum of all shares and what is left to reach 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixtureSummary {
    pub total: f64,
    /// `max(0, 1 - total)`; an over-full mixture reports zero.
    pub shortfall: f64,
}

/// Named fractional shares, kept in selection order.
#[derive(Debug, Clone, Default)]
pub struct Mixture {
    components: Vec<Component>,
}

impl Mixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `name` with a zero share. Returns `false` if it was already there.
    pub fn add_component(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.position(&name).is_some() {
            return false;
        }
        self.components.push(Component { name, share: 0.0 });
        true
    }

    /// Overwrites the share of an existing component, clamped to `[0, 1]`.
    pub fn set_share(&mut self, name: &str, share: f64) -> Result<(), PanelError> {
        let index = self
            .position(name)
            .ok_or_else(|| PanelError::UnknownComponent {
                name: name.to_string(),
            })?;
        let clamped = if share.is_nan() { 0.0 } else { share.clamp(0.0, 1.0) };
        if clamped != share {
            debug!(
                component = name,
                requested = share,
                share = clamped,
                "Mixture share clamped"
            );
        }
        self.components[index].share = clamped;
        Ok(())
    }

    pub fn share(&self, name: &str) -> Option<f64> {
        self.position(name).map(|i| self.components[i].share)
    }

    pub fn summary(&self) -> MixtureSummary {
        let total: f64 = self.components.iter().map(|c| c.share).sum();
        MixtureSummary {
            total,
            shortfall: (1.0 - total).max(0.0),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.components.iter()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.components.iter().position(|c| c.name == name)
    }
}
