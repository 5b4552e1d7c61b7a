//! Drawing surface capability consumed by the scene graph and transitions.
//!
//! The core never touches pixels directly; it issues the handful of calls on
//! [`Surface`]. [`Canvas`] is the CPU framebuffer implementation used by the host.

mod canvas;
#[cfg(test)]
pub(crate) mod recording;

pub use canvas::Canvas;

use std::rc::Rc;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::error::SurfaceError;

/// Straight (non-premultiplied) RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Alpha channel, 255 is opaque
    pub a: u8,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Creates an opaque colour.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Creates a colour with explicit alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Pixel representation for the `image` crate.
    pub fn to_rgba(self) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, self.a])
    }
}

/// Horizontally and vertically repeating tile, anchored at the surface origin
/// that was current when it is filled.
#[derive(Debug, Clone)]
pub struct Pattern {
    tile: Rc<RgbaImage>,
}

impl Pattern {
    /// Wraps a tile image. Fails on a zero-sized tile.
    pub fn new(tile: RgbaImage) -> Result<Self, SurfaceError> {
        if tile.width() == 0 || tile.height() == 0 {
            return Err(SurfaceError::Unavailable(format!(
                "pattern tile is {}x{}",
                tile.width(),
                tile.height()
            )));
        }
        Ok(Self {
            tile: Rc::new(tile),
        })
    }

    /// The repeating tile.
    pub fn tile(&self) -> &RgbaImage {
        &self.tile
    }

    /// Tile width in device pixels.
    pub fn width(&self) -> u32 {
        self.tile.width()
    }

    /// Tile height in device pixels.
    pub fn height(&self) -> u32 {
        self.tile.height()
    }
}

/// Drawing operations required by the scene graph and transitions.
///
/// Coordinates are integer device pixels relative to the current translation.
pub trait Surface {
    /// Fills a rectangle with a solid colour. Non-positive sizes draw nothing.
    fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Color);

    /// Strokes a straight segment `width` pixels thick.
    fn stroke_line(&mut self, from: (i32, i32), to: (i32, i32), width: u32, color: Color);

    /// Blits `image` scaled to `width` x `height` with its top-left at `(x, y)`.
    /// Scaling is nearest-neighbour.
    fn draw_image(&mut self, image: &RgbaImage, x: i32, y: i32, width: u32, height: u32);

    /// Turns an offscreen composite into a repeating pattern resource.
    fn create_pattern(&mut self, composite: &RgbaImage) -> Result<Pattern, SurfaceError>;

    /// Fills a rectangle with `pattern`, anchored at the current origin.
    fn fill_pattern(&mut self, pattern: &Pattern, x: i32, y: i32, width: i32, height: i32);

    /// Pushes the current translation.
    fn save(&mut self);

    /// Pops the translation pushed by the matching [`Surface::save`].
    fn restore(&mut self);

    /// Moves the origin by `(dx, dy)`.
    fn translate(&mut self, dx: i32, dy: i32);
}
