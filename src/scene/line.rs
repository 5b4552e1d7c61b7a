//! Pixel-exact line drawable.

use crate::camera::Camera;
use crate::surface::{Color, Surface};

/// Integer Bresenham rasterizer over a closed segment.
///
/// Yields every pixel from `from` to `to`, both endpoints inclusive, stepping
/// with the classic `err = dx - dy` decision rule so that each step moves to one
/// of the eight neighbours of the previous pixel. The error terms are kept in
/// `i64` so any pair of `i32` endpoints is valid.
#[derive(Debug, Clone)]
pub struct Bresenham {
    x: i32,
    y: i32,
    end: (i32, i32),
    dx: i64,
    dy: i64,
    sx: i32,
    sy: i32,
    err: i64,
    done: bool,
}

impl Bresenham {
    /// Starts a rasterization between two device pixels.
    pub fn new(from: (i32, i32), to: (i32, i32)) -> Self {
        let dx = (i64::from(to.0) - i64::from(from.0)).abs();
        let dy = (i64::from(to.1) - i64::from(from.1)).abs();
        Self {
            x: from.0,
            y: from.1,
            end: to,
            dx,
            dy,
            sx: if from.0 < to.0 { 1 } else { -1 },
            sy: if from.1 < to.1 { 1 } else { -1 },
            err: dx - dy,
            done: false,
        }
    }
}

impl Iterator for Bresenham {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = (self.x, self.y);
        if current == self.end {
            self.done = true;
            return Some(current);
        }

        let e2 = 2 * self.err;
        if e2 > -self.dy {
            self.err -= self.dy;
            self.x += self.sx;
        }
        if e2 < self.dx {
            self.err += self.dx;
            self.y += self.sy;
        }
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        let remaining_x = (i64::from(self.end.0) - i64::from(self.x)).abs();
        let remaining_y = (i64::from(self.end.1) - i64::from(self.y)).abs();
        match usize::try_from(remaining_x.max(remaining_y) + 1) {
            Ok(remaining) => (remaining, Some(remaining)),
            Err(_) => (usize::MAX, None),
        }
    }
}

/// Rasterizes the segment `from`-`to` with Bresenham's algorithm.
pub fn bresenham(from: (i32, i32), to: (i32, i32)) -> Bresenham {
    Bresenham::new(from, to)
}

/// Clips a segment to the inclusive rectangle `min..=max` (Liang-Barsky).
///
/// Segments with both endpoints inside are returned unchanged, so their
/// rasterization is exact. Clipped endpoints are rounded to the nearest pixel.
///
/// # Returns
/// The visible part, or `None` if the segment misses the rectangle
pub fn clip_segment(
    from: (i32, i32),
    to: (i32, i32),
    min: (i64, i64),
    max: (i64, i64),
) -> Option<((i32, i32), (i32, i32))> {
    let inside = |(x, y): (i32, i32)| {
        (min.0..=max.0).contains(&i64::from(x)) && (min.1..=max.1).contains(&i64::from(y))
    };
    if inside(from) && inside(to) {
        return Some((from, to));
    }

    let (x0, y0) = (f64::from(from.0), f64::from(from.1));
    let (dx, dy) = (f64::from(to.0) - x0, f64::from(to.1) - y0);
    let (min_x, min_y) = (min.0 as f64, min.1 as f64);
    let (max_x, max_y) = (max.0 as f64, max.1 as f64);

    let (mut enter, mut exit) = (0.0_f64, 1.0_f64);
    for (p, q) in [
        (-dx, x0 - min_x),
        (dx, max_x - x0),
        (-dy, y0 - min_y),
        (dy, max_y - y0),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            enter = enter.max(t);
        } else {
            exit = exit.min(t);
        }
        if enter > exit {
            return None;
        }
    }

    // Float to int casts saturate.
    let point = |t: f64| {
        (
            (x0 + t * dx).round().clamp(min_x, max_x) as i32,
            (y0 + t * dy).round().clamp(min_y, max_y) as i32,
        )
    };
    Some((point(enter), point(exit)))
}

/// Straight segment between two points in the parent's world space.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// Start point, relative to the parent container.
    pub from: (f64, f64),
    /// End point, relative to the parent container.
    pub to: (f64, f64),
    /// Stroke colour.
    pub color: Color,
    /// Stroke width in device pixels. 1 rasterizes pixel by pixel, 0 draws nothing.
    pub width: u32,
}

impl Line {
    /// Creates a 1px line.
    pub fn new(from: (f64, f64), to: (f64, f64), color: Color) -> Self {
        Self {
            from,
            to,
            color,
            width: 1,
        }
    }

    /// Sets the stroke width.
    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    /// Draws the segment offset by the parent's world position.
    ///
    /// # Arguments
    /// * `surface` - Target surface
    /// * `camera` - Camera used for the world to screen transform
    /// * `parent_x` - Parent world X
    /// * `parent_y` - Parent world Y
    pub fn draw(&self, surface: &mut dyn Surface, camera: &Camera, parent_x: f64, parent_y: f64) {
        if self.width == 0 {
            return;
        }
        let from = camera.world_to_screen(parent_x + self.from.0, parent_y + self.from.1);
        let to = camera.world_to_screen(parent_x + self.to.0, parent_y + self.to.1);

        // One brush width of slack keeps thick strokes intact at the edges.
        let margin = i64::from(self.width);
        let Some((from, to)) = clip_segment(
            from,
            to,
            (-margin, -margin),
            (
                i64::from(camera.viewport_width) + margin,
                i64::from(camera.viewport_height) + margin,
            ),
        ) else {
            return;
        };

        if self.width == 1 {
            for (x, y) in bresenham(from, to) {
                surface.fill_rect(x, y, 1, 1, self.color);
            }
        } else {
            surface.stroke_line(from, to, self.width, self.color);
        }
    }
}
