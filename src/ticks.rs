//! Tick layout for linear and half-dial scales.
//!
//! Layout is a pure function of a [`GaugeRange`] and a [`Scale`]. It always
//! produces the complete tick set; callers replace whatever they drew before.
//!
//! Labels are chosen by one greedy pass from low to high value: a tick gets a
//! label when it sits at least `min_label_spacing` away from the last labelled
//! tick. The first tick is always labelled. The last tick is always labelled
//! too, and if that crowds the label before it, the earlier label is dropped
//! (unless it is the first tick). With ceiling 110 and step 10 on a 110 px
//! scale, labels land on 0, 20, ..., 80 and 110; the label at 100 gives way.

use std::f64::consts::PI;

use crate::range::GaugeRange;

/// Default label spacing on the thermometer, in pixels.
pub const LINEAR_LABEL_SPACING: f64 = 15.0;

/// Default label spacing on the pressure dial, in radians.
pub const ANGULAR_LABEL_SPACING: f64 = 0.2;

/// Mapping from value to scale position used for spacing decisions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scale {
    /// Straight scale; position is the distance from the zero end, `0..=span`.
    Linear { span: f64, min_label_spacing: f64 },
    /// Half-turn dial; position is the angle, `π` at zero down to `0` at max.
    Angular { min_label_spacing: f64 },
}

impl Scale {
    pub fn linear(span: f64) -> Self {
        Scale::Linear {
            span,
            min_label_spacing: LINEAR_LABEL_SPACING,
        }
    }

    pub fn angular() -> Self {
        Scale::Angular {
            min_label_spacing: ANGULAR_LABEL_SPACING,
        }
    }

    pub fn min_label_spacing(&self) -> f64 {
        match *self {
            Scale::Linear {
                min_label_spacing, ..
            }
            | Scale::Angular { min_label_spacing } => min_label_spacing,
        }
    }

    /// Position of `value` on a scale whose ceiling is `max_value`.
    pub fn position(&self, value: f64, max_value: f64) -> f64 {
        let fraction = value / max_value;
        match *self {
            Scale::Linear { span, .. } => fraction * span,
            Scale::Angular { .. } => PI - fraction * PI,
        }
    }
}

/// A graduation mark.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub value: f64,
    /// Position on the scale (pixels along the span, or radians).
    pub position: f64,
    pub labeled: bool,
}

/// Every tick of a gauge, ordered from low to high value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickSet {
    ticks: Vec<Tick>,
}

impl TickSet {
    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tick> {
        self.ticks.iter()
    }

    pub fn as_slice(&self) -> &[Tick] {
        &self.ticks
    }

    pub fn labeled(&self) -> impl Iterator<Item = &Tick> {
        self.ticks.iter().filter(|t| t.labeled)
    }

    pub fn labeled_indices(&self) -> Vec<usize> {
        self.ticks
            .iter()
            .enumerate()
            .filter_map(|(i, t)| t.labeled.then_some(i))
            .collect()
    }
}

impl<'a> IntoIterator for &'a TickSet {
    type Item = &'a Tick;
    type IntoIter = std::slice::Iter<'a, Tick>;

    fn into_iter(self) -> Self::IntoIter {
        self.ticks.iter()
    }
}

/// Lays out all ticks of `range` on `scale`.
pub fn layout_ticks(range: &GaugeRange, scale: &Scale) -> TickSet {
    let count = range.tick_count();
    let spacing = scale.min_label_spacing();
    let mut ticks: Vec<Tick> = Vec::with_capacity(count);

    // Seeded out of range so the first tick always qualifies.
    let mut last_position = f64::INFINITY;
    let mut last_index: Option<usize> = None;

    for i in 0..count {
        let value = i as f64 * range.step();
        let position = scale.position(value, range.max_value());
        let clear = (position - last_position).abs() >= spacing;
        let is_last = i + 1 == count;

        if is_last && !clear {
            if let Some(prev) = last_index.filter(|&p| p != 0) {
                ticks[prev].labeled = false;
            }
        }

        let labeled = clear || is_last;
        if labeled {
            last_position = position;
            last_index = Some(i);
        }
        ticks.push(Tick {
            value,
            position,
            labeled,
        });
    }

    TickSet { ticks }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_label_spacing(set: &TickSet, spacing: f64) {
        let labeled: Vec<_> = set.labeled().collect();
        for pair in labeled.windows(2) {
            let gap = (pair[1].position - pair[0].position).abs();
            assert!(gap >= spacing - 1e-9, "labels {gap} apart");
        }
    }

    #[test]
    fn linear_layout_labels_every_other_tick() {
        let set = layout_ticks(&GaugeRange::new(100.0, 10.0), &Scale::linear(120.0));
        assert_eq!(set.len(), 11);
        assert_eq!(set.labeled_indices(), vec![0, 2, 4, 6, 8, 10]);
        assert_eq!(set.as_slice()[0].position, 0.0);
        assert!((set.as_slice()[10].position - 120.0).abs() < 1e-9);
        assert_label_spacing(&set, LINEAR_LABEL_SPACING);
    }

    #[test]
    fn linear_layout_values_follow_step() {
        let set = layout_ticks(&GaugeRange::new(50.0, 5.0), &Scale::linear(120.0));
        let values: Vec<_> = set.iter().map(|t| t.value).collect();
        assert_eq!(values.len(), 11);
        for (i, v) in values.iter().enumerate() {
            assert!((v - i as f64 * 5.0).abs() < 1e-9);
        }
    }

    #[test]
    fn crowded_last_label_displaces_previous() {
        // 12 ticks 10 px apart: greedy labels 0, 20, ..., 100, then the forced
        // label at 110 sits too close to 100.
        let range = GaugeRange::new(110.0, 10.0);
        let set = layout_ticks(&range, &Scale::linear(110.0));
        let labeled = set.labeled_indices();
        assert_eq!(labeled.first(), Some(&0));
        assert_eq!(labeled.last(), Some(&11));
        assert!(!labeled.contains(&10));
        assert_label_spacing(&set, LINEAR_LABEL_SPACING);
    }

    #[test]
    fn first_label_is_kept_when_last_crowds_it() {
        let range = GaugeRange::new(10.0, 10.0);
        let set = layout_ticks(&range, &Scale::linear(5.0));
        assert_eq!(set.labeled_indices(), vec![0, 1]);
    }

    #[test]
    fn angular_layout_spans_half_turn() {
        let set = layout_ticks(&GaugeRange::new(2000.0, 200.0), &Scale::angular());
        assert_eq!(set.len(), 11);
        let values: Vec<_> = set.iter().map(|t| t.value).collect();
        assert_eq!(values.first(), Some(&0.0));
        assert!((values[10] - 2000.0).abs() < 1e-9);

        let angles: Vec<_> = set.iter().map(|t| t.position).collect();
        assert!((angles[0] - PI).abs() < 1e-12);
        assert!(angles[10].abs() < 1e-12);
        for pair in angles.windows(2) {
            assert!(pair[1] < pair[0]);
        }
        // π/10 apart, so every tick is labelled
        assert_eq!(set.labeled().count(), 11);
    }

    #[test]
    fn dense_angular_layout_respects_spacing() {
        let set = layout_ticks(&GaugeRange::new(2000.0, 50.0), &Scale::angular());
        assert_eq!(set.len(), 41);
        let labeled = set.labeled_indices();
        assert_eq!(labeled.first(), Some(&0));
        assert_eq!(labeled.last(), Some(&40));
        assert!(labeled.len() < set.len());
        assert_label_spacing(&set, ANGULAR_LABEL_SPACING);
    }

    #[test]
    fn layout_is_a_full_replacement() {
        let scale = Scale::linear(120.0);
        let before = layout_ticks(&GaugeRange::new(100.0, 10.0), &scale);
        let after = layout_ticks(&GaugeRange::new(110.0, 10.0), &scale);
        assert_eq!(after.len(), 12);
        assert_ne!(before, after);
        assert_eq!(layout_ticks(&GaugeRange::new(100.0, 10.0), &scale), before);
    }
}
