/// Rectangle locator: grows a seed box until every side rests on light pixels,
/// then reads the four extreme points of the dark region inside it.
///
/// Used to bound 2D symbols (Data Matrix, Aztec-like codes) before sampling.
use log::debug;

use super::config;
use crate::error::{LocateError, LocateResult};
use crate::models::{BitMatrix, Point, Quad};

/// Fixed pull applied to each extreme point
const CORR: f32 = 1.0;

/// Whether a side has touched a dark pixel yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SideState {
    /// Still travelling through light space towards the region
    NotYetFound,
    /// Touched the region, now looking for where it ends
    Found,
}

/// One edge of the search rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Side {
    pos: i32,
    state: SideState,
}

impl Side {
    fn new(pos: i32) -> Self {
        Self {
            pos,
            state: SideState::NotYetFound,
        }
    }

    /// Move the side by `step` while its border line has a dark pixel, or
    /// while it has never met one. Returns whether a dark border was crossed.
    fn expand(
        &mut self,
        step: i32,
        in_bounds: impl Fn(i32) -> bool,
        border_has_dark: impl Fn(i32) -> bool,
    ) -> bool {
        let mut crossed = false;
        let mut border_dark = true;
        while (border_dark || self.state == SideState::NotYetFound) && in_bounds(self.pos) {
            border_dark = border_has_dark(self.pos);
            if border_dark {
                self.pos += step;
                self.state = SideState::Found;
                crossed = true;
            } else if self.state == SideState::NotYetFound {
                self.pos += step;
            }
        }
        crossed
    }
}

/// Finds the smallest box around a dark region, starting from a seed point
pub struct RectangleLocator<'a> {
    image: &'a BitMatrix,
    width: i32,
    height: i32,
    left_init: i32,
    right_init: i32,
    up_init: i32,
    down_init: i32,
}

impl<'a> RectangleLocator<'a> {
    /// Locator seeded at the image centre with the configured seed size
    pub fn new(image: &'a BitMatrix) -> LocateResult<Self> {
        let x = image.width() / 2;
        let y = image.height() / 2;
        Self::with_seed(image, config::seed_size(), x, y)
    }

    /// Locator seeded with a `seed_size` box centred at (x, y)
    ///
    /// Fails with `NotFound` if the seed box does not fit inside the image.
    pub fn with_seed(
        image: &'a BitMatrix,
        seed_size: usize,
        x: usize,
        y: usize,
    ) -> LocateResult<Self> {
        let width = i32::try_from(image.width()).map_err(|_| LocateError::NotFound)?;
        let height = i32::try_from(image.height()).map_err(|_| LocateError::NotFound)?;
        let x = i32::try_from(x).map_err(|_| LocateError::NotFound)?;
        let y = i32::try_from(y).map_err(|_| LocateError::NotFound)?;
        let half = i32::try_from(seed_size / 2).map_err(|_| LocateError::NotFound)?;

        let left_init = x - half;
        let up_init = y - half;
        let (Some(right_init), Some(down_init)) = (x.checked_add(half), y.checked_add(half)) else {
            debug!("seed ({x},{y}) with half size {half} overflows");
            return Err(LocateError::NotFound);
        };
        if up_init < 0 || left_init < 0 || down_init >= height || right_init >= width {
            debug!(
                "seed box ({left_init},{up_init})-({right_init},{down_init}) outside {width}x{height} image"
            );
            return Err(LocateError::NotFound);
        }

        Ok(Self {
            image,
            width,
            height,
            left_init,
            right_init,
            up_init,
            down_init,
        })
    }

    /// Locate the region and return its extreme points
    ///
    /// Points come back as {topmost, leftmost, rightmost, bottommost}, each
    /// pulled one pixel towards the region centre.
    pub fn locate(&self) -> LocateResult<Quad> {
        let image = self.image;
        let (width, height) = (self.width, self.height);

        let mut left = Side::new(self.left_init);
        let mut right = Side::new(self.right_init);
        let mut up = Side::new(self.up_init);
        let mut down = Side::new(self.down_init);

        loop {
            let mut crossed = false;

            // .....
            // .   |
            // .....
            let (u, d) = (up.pos, down.pos);
            crossed |= right.expand(
                1,
                |x| x < width,
                |x| image.has_dark_pixel_along_column(x, u, d),
            );
            if right.pos >= width {
                debug!("right side left the image");
                return Err(LocateError::NotFound);
            }

            // .....
            // .   .
            // .___.
            let (l, r) = (left.pos, right.pos);
            crossed |= down.expand(
                1,
                |y| y < height,
                |y| image.has_dark_pixel_along_row(y, l, r),
            );
            if down.pos >= height {
                debug!("bottom side left the image");
                return Err(LocateError::NotFound);
            }

            // .....
            // |   .
            // .....
            let (u, d) = (up.pos, down.pos);
            crossed |= left.expand(
                -1,
                |x| x >= 0,
                |x| image.has_dark_pixel_along_column(x, u, d),
            );
            if left.pos < 0 {
                debug!("left side left the image");
                return Err(LocateError::NotFound);
            }

            // .___.
            // .   .
            // .....
            let (l, r) = (left.pos, right.pos);
            crossed |= up.expand(
                -1,
                |y| y >= 0,
                |y| image.has_dark_pixel_along_row(y, l, r),
            );
            if up.pos < 0 {
                debug!("top side left the image");
                return Err(LocateError::NotFound);
            }

            if !crossed {
                break;
            }
        }

        let max_size = right.pos - left.pos;
        let (left, right) = (left.pos as f32, right.pos as f32);
        let (up, down) = (up.pos as f32, down.pos as f32);

        // Walk each corner's diagonal inwards
        let z = self.scan_diagonal(max_size, |i| {
            (Point::new(left, down - i), Point::new(left + i, down))
        })?;
        let t = self.scan_diagonal(max_size, |i| {
            (Point::new(left, up + i), Point::new(left + i, up))
        })?;
        let x = self.scan_diagonal(max_size, |i| {
            (Point::new(right, up + i), Point::new(right - i, up))
        })?;
        let y = self.scan_diagonal(max_size, |i| {
            (Point::new(right, down - i), Point::new(right - i, down))
        })?;

        Ok(self.center_edges(y, z, x, t))
    }

    fn scan_diagonal(
        &self,
        max_size: i32,
        segment: impl Fn(f32) -> (Point, Point),
    ) -> LocateResult<Point> {
        (1..max_size)
            .find_map(|i| {
                let (a, b) = segment(i as f32);
                self.image.first_dark_pixel_on_segment(&a, &b)
            })
            .ok_or_else(|| {
                debug!("no dark pixel on corner diagonal within {max_size} steps");
                LocateError::NotFound
            })
    }

    /// Pull the extreme points towards the centre
    ///
    /// `y` bottommost, `z` leftmost, `x` rightmost, `t` topmost. The bottom
    /// point's side of the image picks between the two windings:
    ///
    /// ```text
    ///       t            t
    ///  z                      x
    ///        x    OR    z
    ///   y                    y
    /// ```
    fn center_edges(&self, y: Point, z: Point, x: Point, t: Point) -> Quad {
        if y.x < self.width as f32 / 2.0 {
            Quad::new(
                t.translate(-CORR, CORR),
                z.translate(CORR, CORR),
                x.translate(-CORR, -CORR),
                y.translate(CORR, -CORR),
            )
        } else {
            Quad::new(
                t.translate(CORR, CORR),
                z.translate(CORR, -CORR),
                x.translate(-CORR, CORR),
                y.translate(-CORR, -CORR),
            )
        }
    }
}

/// Locate the dark region around the image centre with the default seed
pub fn locate_rectangle(image: &BitMatrix) -> LocateResult<Quad> {
    RectangleLocator::new(image)?.locate()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_near(p: Point, x: f32, y: f32) {
        assert!(
            (p.x - x).abs() <= 2.0 && (p.y - y).abs() <= 2.0,
            "point {:?} not near ({}, {})",
            p,
            x,
            y
        );
    }

    #[test]
    fn test_side_expand_searches_then_tracks() {
        // Light until 5, dark 5..8, light from 8
        let mut side = Side::new(0);
        let crossed = side.expand(1, |p| p < 20, |p| (5..8).contains(&p));
        assert!(crossed);
        assert_eq!(side.pos, 8);
        assert_eq!(side.state, SideState::Found);

        // Already found: a light border stops it in place
        let crossed = side.expand(1, |p| p < 20, |p| (5..8).contains(&p));
        assert!(!crossed);
        assert_eq!(side.pos, 8);
    }

    #[test]
    fn test_side_expand_runs_out_of_bounds() {
        let mut side = Side::new(3);
        let crossed = side.expand(-1, |p| p >= 0, |_| false);
        assert!(!crossed);
        assert_eq!(side.pos, -1);
        assert_eq!(side.state, SideState::NotYetFound);
    }

    #[test]
    fn test_seed_outside_image() {
        let image = BitMatrix::new(50, 50);
        assert_eq!(
            RectangleLocator::with_seed(&image, 10, 3, 25).err(),
            Some(LocateError::NotFound)
        );
        assert_eq!(
            RectangleLocator::with_seed(&image, 10, 45, 25).err(),
            Some(LocateError::NotFound)
        );
        assert!(RectangleLocator::with_seed(&image, 10, 5, 5).is_ok());

        // Coordinates near the integer limits never wrap into range
        for (x, y) in [
            (i32::MAX as usize, 25),
            (25, i32::MAX as usize),
            (i32::MAX as usize - 2, 25),
            (usize::MAX, 25),
            (25, usize::MAX),
        ] {
            assert_eq!(
                RectangleLocator::with_seed(&image, 10, x, y).err(),
                Some(LocateError::NotFound),
                "seed at ({x}, {y})"
            );
        }
        assert_eq!(
            RectangleLocator::with_seed(&image, usize::MAX, 25, 25).err(),
            Some(LocateError::NotFound)
        );
    }

    #[test]
    fn test_filled_rectangle() {
        let mut image = BitMatrix::new(100, 100);
        image.set_region(30, 35, 40, 30);

        let quad = RectangleLocator::with_seed(&image, 10, 50, 50)
            .unwrap()
            .locate()
            .unwrap();

        assert_eq!(quad.top(), Point::new(31.0, 36.0));
        assert_eq!(quad.left(), Point::new(31.0, 63.0));
        assert_eq!(quad.right(), Point::new(68.0, 36.0));
        assert_eq!(quad.bottom(), Point::new(68.0, 63.0));
    }

    #[test]
    fn test_light_seed_inside_frame() {
        let mut image = BitMatrix::new(100, 100);
        image.set_region(20, 20, 60, 4);
        image.set_region(20, 76, 60, 4);
        image.set_region(20, 20, 4, 60);
        image.set_region(76, 20, 4, 60);

        let quad = locate_rectangle(&image).unwrap();
        assert_near(quad.top(), 20.0, 20.0);
        assert_near(quad.left(), 20.0, 79.0);
        assert_near(quad.right(), 79.0, 20.0);
        assert_near(quad.bottom(), 79.0, 79.0);
    }

    #[test]
    fn test_blank_image_not_found() {
        let image = BitMatrix::new(64, 64);
        assert_eq!(locate_rectangle(&image), Err(LocateError::NotFound));
    }

    #[test]
    fn test_region_touching_border_not_found() {
        let mut image = BitMatrix::new(60, 60);
        image.set_region(20, 20, 40, 20);
        assert_eq!(locate_rectangle(&image), Err(LocateError::NotFound));
    }
}
