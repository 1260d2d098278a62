// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port and capability definitions for node inputs/outputs.

use serde::{Deserialize, Serialize};
use std::ops::BitOr;

/// Port direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortDirection {
    /// Input port
    Input,
    /// Output port
    Output,
}

/// Output port index of a connection on its source node.
///
/// Assigned once when the connection is made and never renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OutputSlot(pub usize);

/// Kinds of signal a node can take on its inputs.
///
/// A node declares the set it accepts and the set it requires of its
/// targets; a connection is allowed when the target accepts everything the
/// source requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Capabilities(u8);

impl Capabilities {
    /// Nothing
    pub const NONE: Self = Self(0);
    /// Audio-rate signal input
    pub const AUDIO: Self = Self(1 << 0);
    /// Parameter-control input (drives a node parameter)
    pub const CONTROL: Self = Self(1 << 1);

    /// Whether every capability in `other` is present in `self`
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether the set is empty
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Union of both sets
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Get the color for this capability (for edges and port markers)
    pub fn color(self) -> [u8; 3] {
        if self.contains(Self::CONTROL) {
            [255, 170, 0]
        } else if self.contains(Self::AUDIO) {
            [0, 170, 255]
        } else {
            [150, 150, 150]
        }
    }
}

impl BitOr for Capabilities {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains() {
        let both = Capabilities::AUDIO | Capabilities::CONTROL;
        assert!(both.contains(Capabilities::AUDIO));
        assert!(both.contains(Capabilities::CONTROL));
        assert!(!Capabilities::AUDIO.contains(Capabilities::CONTROL));
        assert!(Capabilities::AUDIO.contains(Capabilities::NONE));
        assert!(Capabilities::NONE.is_empty());
    }

    #[test]
    fn test_slots_order_by_index() {
        assert!(OutputSlot(0) < OutputSlot(3));
    }
}
