/// 2D point with floating point coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point {
    /// Create a new point
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point
    pub fn distance(&self, other: &Point) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Calculate squared distance (faster, no sqrt)
    pub fn distance_squared(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Translate point by (dx, dy)
    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// The four extreme points of a located region
///
/// Points are stored as {topmost, leftmost, rightmost, bottommost}. The
/// first and last are opposite on one diagonal, the middle two on the other.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Quad {
    /// Corner points in {top, left, right, bottom} order
    pub points: [Point; 4],
}

impl Quad {
    /// Create a quad from its points in {top, left, right, bottom} order
    pub fn new(top: Point, left: Point, right: Point, bottom: Point) -> Self {
        Self {
            points: [top, left, right, bottom],
        }
    }

    /// Topmost point
    pub fn top(&self) -> Point {
        self.points[0]
    }

    /// Leftmost point
    pub fn left(&self) -> Point {
        self.points[1]
    }

    /// Rightmost point
    pub fn right(&self) -> Point {
        self.points[2]
    }

    /// Bottommost point
    pub fn bottom(&self) -> Point {
        self.points[3]
    }

    /// Mean of the four points
    pub fn center(&self) -> Point {
        let (sx, sy) = self
            .points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Point::new(sx / 4.0, sy / 4.0)
    }
}
