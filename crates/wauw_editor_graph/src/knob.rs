// SPDX-License-Identifier: MIT OR Apache-2.0
//! Continuous-drag value control.
//!
//! While a knob is held, every pointer movement is subtracted from its
//! value on both axes (drag up or left to increase), then clamped to the
//! range. The rotation shown to the user is the value as a fraction of
//! `|min| + |max|`, times the configured number of turns.

use crate::geometry::clamp;
use serde::{Deserialize, Serialize};

/// Emitted whenever a drag changes the value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnobChange {
    /// The new, clamped value
    pub value: f32,
}

/// A knob bound to one numeric parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Knob {
    value: f32,
    min: f32,
    max: f32,
    max_rotation: f32,
    active: bool,
}

impl Knob {
    /// Create a knob over `[min, max]`.
    ///
    /// Bounds given in the wrong order are swapped.
    pub fn new(min: f32, max: f32) -> Self {
        let (min, max) = if min > max {
            tracing::warn!("Knob range [{}, {}] is inverted, swapping bounds", min, max);
            (max, min)
        } else {
            (min, max)
        };
        Self {
            value: clamp(0.0, min, max),
            min,
            max,
            max_rotation: 1.0,
            active: false,
        }
    }

    /// Set the number of full turns spanning the range
    pub fn with_max_rotation(mut self, turns: f32) -> Self {
        self.max_rotation = turns;
        self
    }

    /// Set the starting value (clamped)
    pub fn with_value(mut self, value: f32) -> Self {
        self.set_value(value);
        self
    }

    /// Current value
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Lower bound
    pub fn min(&self) -> f32 {
        self.min
    }

    /// Upper bound
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Turns spanning the whole range
    pub fn max_rotation(&self) -> f32 {
        self.max_rotation
    }

    /// Whether a drag is in progress
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Set the value directly (clamped; `NaN` ignored)
    pub fn set_value(&mut self, value: f32) {
        if !value.is_nan() {
            self.value = clamp(value, self.min, self.max);
        }
    }

    /// Start a drag
    pub fn press(&mut self) {
        self.active = true;
    }

    /// End a drag; the value stays where it is
    pub fn release(&mut self) {
        self.active = false;
    }

    /// Feed one pointer movement.
    ///
    /// Returns the change notification, or `None` when no drag is active or
    /// the movement is not a number.
    pub fn pointer_move(&mut self, movement_x: f32, movement_y: f32) -> Option<KnobChange> {
        if !self.active {
            return None;
        }
        let next = self.value - movement_x - movement_y;
        if next.is_nan() {
            return None;
        }
        self.value = clamp(next, self.min, self.max);
        Some(KnobChange { value: self.value })
    }

    /// Rotation in turns for the current value.
    ///
    /// `None` when the range has no finite span (an infinite bound, or
    /// `|min| + |max| == 0`); the value is still clamped in that case.
    pub fn rotation_turns(&self) -> Option<f32> {
        let span = self.min.abs() + self.max.abs();
        if !span.is_finite() || span == 0.0 {
            return None;
        }
        Some(self.value / span * self.max_rotation)
    }
}

impl Default for Knob {
    fn default() -> Self {
        Self::new(f32::NEG_INFINITY, f32::INFINITY)
    }
}
