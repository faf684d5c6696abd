//! Quarter-turn rotations of tracker coordinates
//!
//! The tracker runs on the sensor-oriented preview (`width` x `height`);
//! these map rects and points into the upright output frame.

use crate::tracking::{Orientation, Rect};

/// Rotate a rect by 90 degrees within a `width` x `height` frame
pub fn rotate_rect_90(rect: Rect, _width: i32, height: i32) -> Rect {
    Rect {
        left: height - rect.bottom,
        top: rect.left,
        right: height - rect.top,
        bottom: rect.right,
    }
}

/// Rotate a rect by 270 degrees within a `width` x `height` frame
pub fn rotate_rect_270(rect: Rect, width: i32, _height: i32) -> Rect {
    Rect {
        left: rect.top,
        top: width - rect.right,
        right: rect.bottom,
        bottom: width - rect.left,
    }
}

/// Rotate a point by 90 degrees within a `width` x `height` frame
pub fn rotate_point_90(point: (f32, f32), _width: f32, height: f32) -> (f32, f32) {
    (height - point.1, point.0)
}

/// Rotate a point by 270 degrees within a `width` x `height` frame
pub fn rotate_point_270(point: (f32, f32), width: f32, _height: f32) -> (f32, f32) {
    (point.1, width - point.0)
}

/// Only 270 is handled as its own case; every other orientation uses the
/// 90 degree mapping.
pub fn upright_rect(rect: Rect, orientation: Orientation, width: i32, height: i32) -> Rect {
    match orientation {
        Orientation::Deg270 => rotate_rect_270(rect, width, height),
        _ => rotate_rect_90(rect, width, height),
    }
}

pub fn upright_point(point: (f32, f32), orientation: Orientation, width: f32, height: f32) -> (f32, f32) {
    match orientation {
        Orientation::Deg270 => rotate_point_270(point, width, height),
        _ => rotate_point_90(point, width, height),
    }
}
