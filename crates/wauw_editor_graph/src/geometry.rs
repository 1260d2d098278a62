// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scalar and rectangle helpers shared by the camera, hit-testing and rendering.

use serde::{Deserialize, Serialize};

/// Clamp `value` into `[min, max]`.
///
/// Unlike [`f32::clamp`] this never panics: infinite bounds are fine and a
/// `NaN` value is passed through untouched.
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Linear interpolation from `a` to `b`
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Round `value` to the nearest multiple of `quantum`.
///
/// A non-positive quantum disables rounding.
pub fn round_to(value: f32, quantum: f32) -> f32 {
    if quantum <= 0.0 || !quantum.is_finite() {
        return value;
    }
    (value / quantum).round() * quantum
}

/// Closed-open point test against the rectangle at `(x, y)` with size `(w, h)`.
pub fn point_in_rect(px: f32, py: f32, x: f32, y: f32, w: f32, h: f32) -> bool {
    px >= x && px < x + w && py >= y && py < y + h
}

/// Axis-aligned rectangle in world or screen units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner
    pub min: [f32; 2],
    /// Bottom-right corner (exclusive for hit tests)
    pub max: [f32; 2],
}

impl Rect {
    /// Create a rectangle from its top-left corner and size
    pub fn from_min_size(min: [f32; 2], size: [f32; 2]) -> Self {
        Self {
            min,
            max: [min[0] + size[0], min[1] + size[1]],
        }
    }

    /// Create a rectangle centered on `center`
    pub fn from_center_size(center: [f32; 2], size: [f32; 2]) -> Self {
        Self::from_min_size(
            [center[0] - size[0] / 2.0, center[1] - size[1] / 2.0],
            size,
        )
    }

    /// Width
    pub fn width(&self) -> f32 {
        self.max[0] - self.min[0]
    }

    /// Height
    pub fn height(&self) -> f32 {
        self.max[1] - self.min[1]
    }

    /// Size as `[w, h]`
    pub fn size(&self) -> [f32; 2] {
        [self.width(), self.height()]
    }

    /// Center point
    pub fn center(&self) -> [f32; 2] {
        [
            (self.min[0] + self.max[0]) / 2.0,
            (self.min[1] + self.max[1]) / 2.0,
        ]
    }

    /// Closed-open containment test
    pub fn contains(&self, point: [f32; 2]) -> bool {
        point_in_rect(
            point[0],
            point[1],
            self.min[0],
            self.min[1],
            self.width(),
            self.height(),
        )
    }

    /// Split off the top `height` units, returning `(top, rest)`
    pub fn split_top(&self, height: f32) -> (Rect, Rect) {
        let cut = clamp(self.min[1] + height, self.min[1], self.max[1]);
        (
            Rect { min: self.min, max: [self.max[0], cut] },
            Rect { min: [self.min[0], cut], max: self.max },
        )
    }
}

/// Build the outline of a rounded rectangle as a closed polyline (clockwise
/// in screen space, first point not repeated).
///
/// The radius is clamped to half the shorter side; a zero radius yields the
/// four corners.
pub fn rounded_rect_path(rect: Rect, radius: f32, segments_per_corner: usize) -> Vec<[f32; 2]> {
    let r = clamp(radius, 0.0, rect.width().min(rect.height()) / 2.0);
    if r <= 0.0 || segments_per_corner == 0 {
        return vec![
            rect.min,
            [rect.max[0], rect.min[1]],
            rect.max,
            [rect.min[0], rect.max[1]],
        ];
    }

    // Corner centers with the start angle of each quarter arc (y points down)
    let corners = [
        ([rect.max[0] - r, rect.min[1] + r], -std::f32::consts::FRAC_PI_2),
        ([rect.max[0] - r, rect.max[1] - r], 0.0),
        ([rect.min[0] + r, rect.max[1] - r], std::f32::consts::FRAC_PI_2),
        ([rect.min[0] + r, rect.min[1] + r], std::f32::consts::PI),
    ];

    let mut points = Vec::with_capacity(4 * (segments_per_corner + 1));
    for (center, start) in corners {
        for i in 0..=segments_per_corner {
            let t = i as f32 / segments_per_corner as f32;
            let angle = start + t * std::f32::consts::FRAC_PI_2;
            points.push([center[0] + r * angle.cos(), center[1] + r * angle.sin()]);
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_with_infinite_bounds() {
        assert_eq!(clamp(5.0, f32::NEG_INFINITY, f32::INFINITY), 5.0);
        assert_eq!(clamp(-3.0, 0.0, 1.0), 0.0);
        assert_eq!(clamp(3.0, 0.0, 1.0), 1.0);
    }

    #[test]
    fn test_round_to_grid() {
        assert_eq!(round_to(0.37, 0.25), 0.25);
        assert_eq!(round_to(1.14, 0.25), 1.25);
        assert_eq!(round_to(-0.13, 0.25), -0.25);
        assert_eq!(round_to(0.37, 0.0), 0.37);
    }

    #[test]
    fn test_point_in_rect_is_closed_open() {
        assert!(point_in_rect(0.0, 0.0, 0.0, 0.0, 1.0, 1.0));
        assert!(!point_in_rect(1.0, 0.5, 0.0, 0.0, 1.0, 1.0));
        assert!(!point_in_rect(0.5, 1.0, 0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn test_rect_from_center() {
        let rect = Rect::from_center_size([1.0, 1.0], [2.0, 4.0]);
        assert_eq!(rect.min, [0.0, -1.0]);
        assert_eq!(rect.max, [2.0, 3.0]);
        assert_eq!(rect.center(), [1.0, 1.0]);
    }

    #[test]
    fn test_split_top() {
        let rect = Rect::from_min_size([0.0, 0.0], [8.0, 1.25]);
        let (top, rest) = rect.split_top(0.25);
        assert_eq!(top.height(), 0.25);
        assert_eq!(rest.min[1], 0.25);
        assert_eq!(rest.height(), 1.0);
    }

    #[test]
    fn test_rounded_rect_path() {
        let rect = Rect::from_min_size([0.0, 0.0], [4.0, 2.0]);
        let square = rounded_rect_path(rect, 0.0, 4);
        assert_eq!(square.len(), 4);

        let rounded = rounded_rect_path(rect, 10.0, 4);
        assert_eq!(rounded.len(), 20);
        for p in &rounded {
            assert!(p[0] >= -1e-4 && p[0] <= 4.0 + 1e-4);
            assert!(p[1] >= -1e-4 && p[1] <= 2.0 + 1e-4);
        }
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(0.0, 8.0, 0.5), 4.0);
    }
}
