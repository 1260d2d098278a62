// SPDX-License-Identifier: MIT OR Apache-2.0
//! Piano keyboard composite node.
//!
//! A keyboard node has two hit regions: a thin header strip used to drag
//! it around, and the key body that turns clicks into notes. Notes are
//! semitone offsets from the lowest key, which is an A.

use crate::geometry::{lerp, Rect};
use serde::{Deserialize, Serialize};

/// Reference pitch of A4 in Hz
pub const A4: f32 = 440.0;

/// Semitone positions (mod 12, counted from A) that are black keys
const BLACK_NOTES: [u32; 5] = [1, 4, 6, 9, 11];

/// Width of a white key relative to an even split of the range
const BLACK_TO_WHITE_RATIO: f32 = 12.0 / 7.0;

/// Frequency `half_steps` semitones away from `from_freq`
pub fn steps_to_freq(half_steps: f32, from_freq: f32) -> f32 {
    from_freq * 2f32.powf(half_steps / 12.0)
}

/// Frequency of a note given as semitones plus whole octaves from `from_freq`
pub fn note_to_freq(half_steps: f32, more_octaves: f32, from_freq: f32) -> f32 {
    steps_to_freq(half_steps + more_octaves * 12.0, from_freq)
}

/// Whether a semitone index lands on a black key
pub fn is_black(note: u32) -> bool {
    BLACK_NOTES.contains(&(note % 12))
}

/// One key in body-local coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyRect {
    /// Semitone index from the lowest key
    pub note: u32,
    /// Black or white key
    pub black: bool,
    /// Key outline relative to the body's top-left corner
    pub rect: Rect,
}

/// Geometry of a keyboard node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyboardLayout {
    /// Number of semitones on the keyboard
    pub range: u32,
    /// Black key height as a fraction of the body height
    pub black_note_height: f32,
    /// Height of the drag header above the keys, in world units
    pub header_height: f32,
    /// Body size in world units
    pub body_size: [f32; 2],
}

impl Default for KeyboardLayout {
    fn default() -> Self {
        Self {
            range: 24,
            black_note_height: 0.75,
            header_height: 0.25,
            body_size: [8.0, 1.0],
        }
    }
}

impl KeyboardLayout {
    /// Full node size: header stacked on top of the body
    pub fn node_size(&self) -> [f32; 2] {
        [self.body_size[0], self.body_size[1] + self.header_height]
    }

    /// Width of one white key
    pub fn white_key_width(&self) -> f32 {
        if self.range == 0 {
            return 0.0;
        }
        lerp(0.0, self.body_size[0], (1.0 / self.range as f32) * BLACK_TO_WHITE_RATIO)
    }

    /// All keys, white keys first so black keys paint on top
    pub fn keys(&self) -> Vec<KeyRect> {
        let note_width = self.white_key_width();
        let [_, h] = self.body_size;
        let mut whites = Vec::new();
        let mut blacks = Vec::new();

        let mut x = 0.0;
        for note in 0..self.range {
            if is_black(note) {
                // Centered on the boundary between the neighbouring white keys
                let w = note_width * 0.5;
                blacks.push(KeyRect {
                    note,
                    black: true,
                    rect: Rect::from_min_size([x - w / 2.0, 0.0], [w, h * self.black_note_height]),
                });
            } else {
                whites.push(KeyRect {
                    note,
                    black: false,
                    rect: Rect::from_min_size([x, 0.0], [note_width, h]),
                });
                x += note_width;
            }
        }

        whites.extend(blacks);
        whites
    }

    /// Note under a body-local point; black keys win where they overlap
    pub fn note_at(&self, local: [f32; 2]) -> Option<u32> {
        let keys = self.keys();
        keys.iter()
            .filter(|k| k.black)
            .chain(keys.iter().filter(|k| !k.black))
            .find(|k| k.rect.contains(local))
            .map(|k| k.note)
    }
}

/// What a composite node does with pointer events on its body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentEventKind {
    /// Primary button pressed over the body
    MouseDown,
    /// Primary button released over the body
    MouseUp,
}

/// Pointer event delivered to a composite node's body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentEvent {
    /// Press or release
    pub kind: ContentEventKind,
    /// Target node
    pub node: crate::node::NodeId,
    /// World position of the pointer
    pub world: [f32; 2],
    /// Key under the pointer, if any
    pub note: Option<u32>,
    /// Pitch of that key
    pub frequency: Option<f32>,
}
