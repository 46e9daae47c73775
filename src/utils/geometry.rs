/// Geometry helpers shared by the detectors
use crate::models::Point;

/// Round half away from zero to the nearest pixel coordinate
pub fn round(v: f32) -> i32 {
    if v < 0.0 {
        (v - 0.5) as i32
    } else {
        (v + 0.5) as i32
    }
}

/// Calculate distance between two points
pub fn distance(p1: &Point, p2: &Point) -> f32 {
    p1.distance(p2)
}
