// SPDX-License-Identifier: MIT OR Apache-2.0
//! Viewport camera: the transform between screen pixels and world units.
//!
//! `center` is the world point shown in the middle of the screen and `zoom`
//! is the number of screen pixels per world unit.

use crate::config::EditorConfig;
use crate::geometry::{clamp, Rect};
use serde::{Deserialize, Serialize};

/// Pan/zoom state of the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    center: [f32; 2],
    zoom: f32,
    screen_size: [f32; 2],
    zoom_min: f32,
    zoom_max: f32,
    wheel_divisor: f32,
}

impl Camera {
    /// Camera at the origin with the configured default zoom
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            center: [0.0, 0.0],
            zoom: clamp(config.default_zoom, config.zoom_min, config.zoom_max),
            screen_size: [0.0, 0.0],
            zoom_min: config.zoom_min,
            zoom_max: config.zoom_max,
            wheel_divisor: config.wheel_divisor,
        }
    }

    /// World point at the middle of the screen
    pub fn center(&self) -> [f32; 2] {
        self.center
    }

    /// Pixels per world unit
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Cached screen size in pixels
    pub fn screen_size(&self) -> [f32; 2] {
        self.screen_size
    }

    /// Allowed zoom range
    pub fn zoom_range(&self) -> (f32, f32) {
        (self.zoom_min, self.zoom_max)
    }

    /// Convert a screen position to world units
    pub fn screen_to_world(&self, screen: [f32; 2]) -> [f32; 2] {
        [
            (screen[0] - self.screen_size[0] / 2.0) / self.zoom + self.center[0],
            (screen[1] - self.screen_size[1] / 2.0) / self.zoom + self.center[1],
        ]
    }

    /// Convert a world position to screen pixels
    pub fn world_to_screen(&self, world: [f32; 2]) -> [f32; 2] {
        [
            (world[0] - self.center[0]) * self.zoom + self.screen_size[0] / 2.0,
            (world[1] - self.center[1]) * self.zoom + self.screen_size[1] / 2.0,
        ]
    }

    /// World-space delta for a pointer movement while dragging.
    ///
    /// The movement is negated: applied to the camera center it makes the
    /// scene follow the pointer.
    pub fn drag_delta(&self, movement: [f32; 2]) -> [f32; 2] {
        [-movement[0] / self.zoom, -movement[1] / self.zoom]
    }

    /// Set the zoom, clamped to the allowed range; `NaN` is ignored
    pub fn set_zoom(&mut self, zoom: f32) {
        if zoom.is_nan() {
            return;
        }
        self.zoom = clamp(zoom, self.zoom_min, self.zoom_max);
    }

    /// Apply a wheel delta.
    ///
    /// The step is proportional to the current zoom, so one wheel notch
    /// feels the same at every magnification. Positive deltas zoom out.
    pub fn add_zoom(&mut self, delta: f32) {
        self.set_zoom(self.zoom - delta * self.zoom / self.wheel_divisor);
    }

    /// Move the center by a world-space delta
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.center[0] += dx;
        self.center[1] += dy;
    }

    /// Put the center on a world point
    pub fn set_center(&mut self, x: f32, y: f32) {
        self.center = [x, y];
    }

    /// Update the cached screen size; returns whether it changed.
    ///
    /// Center and zoom are left alone.
    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        if self.screen_size == [width, height] {
            return false;
        }
        self.screen_size = [width, height];
        true
    }

    /// World-space bounds of the visible screen
    pub fn visible_world_rect(&self) -> Rect {
        Rect {
            min: self.screen_to_world([0.0, 0.0]),
            max: self.screen_to_world(self.screen_size),
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        let mut camera = Camera::default();
        camera.resize(800.0, 600.0);
        camera
    }

    fn assert_close(a: [f32; 2], b: [f32; 2]) {
        assert!(
            (a[0] - b[0]).abs() < 1e-3 && (a[1] - b[1]).abs() < 1e-3,
            "{a:?} != {b:?}"
        );
    }

    #[test]
    fn test_screen_center_maps_to_camera_center() {
        let camera = camera();
        assert_eq!(camera.zoom(), 100.0);
        assert_eq!(camera.screen_to_world([400.0, 300.0]), [0.0, 0.0]);
    }

    #[test]
    fn test_round_trip() {
        let mut camera = camera();
        for (center, zoom) in [([0.0, 0.0], 100.0), ([3.5, -2.25], 8.0), ([-120.0, 40.0], 400.0), ([0.1, 0.7], 37.0)] {
            camera.set_center(center[0], center[1]);
            camera.set_zoom(zoom);
            for p in [[0.0, 0.0], [1.25, -7.5], [-33.0, 12.0], [1000.0, -1000.0]] {
                assert_close(camera.screen_to_world(camera.world_to_screen(p)), p);
            }
        }
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut camera = camera();
        for z in [-1e9, -5.0, 0.0, 3.0, 8.0, 200.0, 400.0, 401.0, 1e12, f32::INFINITY, f32::NEG_INFINITY] {
            camera.set_zoom(z);
            assert!((8.0..=400.0).contains(&camera.zoom()), "zoom {}", camera.zoom());
        }
        camera.set_zoom(f32::NAN);
        assert!((8.0..=400.0).contains(&camera.zoom()));
    }

    #[test]
    fn test_add_zoom_scales_with_current_zoom() {
        let mut camera = camera();
        camera.set_zoom(100.0);
        camera.add_zoom(5.0);
        assert!((camera.zoom() - 90.0).abs() < 1e-4);

        camera.set_zoom(200.0);
        camera.add_zoom(5.0);
        assert!((camera.zoom() - 180.0).abs() < 1e-4);

        camera.add_zoom(1e6);
        assert_eq!(camera.zoom(), 8.0);
        camera.add_zoom(-1e6);
        assert_eq!(camera.zoom(), 400.0);
    }

    #[test]
    fn test_drag_delta() {
        let mut camera = camera();
        camera.set_zoom(50.0);
        assert_close(camera.drag_delta([10.0, 5.0]), [-0.2, -0.1]);
    }

    #[test]
    fn test_resize_keeps_center_and_zoom() {
        let mut camera = camera();
        camera.set_center(2.0, 3.0);
        camera.set_zoom(64.0);
        assert!(camera.resize(1024.0, 768.0));
        assert!(!camera.resize(1024.0, 768.0));
        assert_eq!(camera.center(), [2.0, 3.0]);
        assert_eq!(camera.zoom(), 64.0);
        assert_eq!(camera.screen_to_world([512.0, 384.0]), [2.0, 3.0]);
    }

    #[test]
    fn test_visible_world_rect() {
        let camera = camera();
        let rect = camera.visible_world_rect();
        assert_close(rect.min, [-4.0, -3.0]);
        assert_close(rect.max, [4.0, 3.0]);
    }
}
