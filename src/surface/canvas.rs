//! CPU framebuffer implementation of [`Surface`].

use image::{Rgba, RgbaImage};
use tracing::warn;

use super::{Color, Pattern, Surface};
use crate::error::SurfaceError;
use crate::scene::{bresenham, clip_segment};

/// RGBA8 framebuffer with a translation stack.
///
/// Pixels are stored row-major with the origin in the top-left corner, which is the
/// layout the presenter uploads straight into a texture.
pub struct Canvas {
    pixels: RgbaImage,
    origin: (i32, i32),
    saved: Vec<(i32, i32)>,
}

impl Canvas {
    /// Creates a transparent canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
            origin: (0, 0),
            saved: Vec::new(),
        }
    }

    /// Width in device pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Height in device pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Reallocates the framebuffer if the size changed. Contents are discarded.
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) != self.pixels.dimensions() {
            self.pixels = RgbaImage::new(width, height);
        }
        self.origin = (0, 0);
        self.saved.clear();
    }

    /// Overwrites every pixel with `color` and resets the translation state.
    pub fn clear(&mut self, color: Color) {
        let rgba = color.to_rgba();
        for pixel in self.pixels.pixels_mut() {
            *pixel = rgba;
        }
        self.origin = (0, 0);
        self.saved.clear();
    }

    /// Colour at an absolute device pixel, `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.pixels
            .get_pixel_checked(x, y)
            .map(|&Rgba([r, g, b, a])| Color::rgba(r, g, b, a))
    }

    /// Underlying image.
    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Raw RGBA8 bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    /// Clips a rectangle given in translated coordinates against the framebuffer.
    ///
    /// # Returns
    /// Absolute `(x0, y0, x1, y1)` bounds with exclusive end, or `None` if nothing remains
    fn clip(&self, x: i32, y: i32, width: i32, height: i32) -> Option<(u32, u32, u32, u32)> {
        if width <= 0 || height <= 0 {
            return None;
        }
        let left = i64::from(x) + i64::from(self.origin.0);
        let top = i64::from(y) + i64::from(self.origin.1);
        let x0 = left.max(0);
        let y0 = top.max(0);
        let x1 = (left + i64::from(width)).min(i64::from(self.pixels.width()));
        let y1 = (top + i64::from(height)).min(i64::from(self.pixels.height()));
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }

    /// Source-over blend of `src` into the absolute pixel `(x, y)`.
    fn blend(&mut self, x: u32, y: u32, src: Rgba<u8>) {
        let alpha = u32::from(src[3]);
        if alpha == 0 {
            return;
        }
        let dst = self.pixels.get_pixel_mut(x, y);
        if alpha == 255 {
            *dst = src;
            return;
        }
        let inverse = 255 - alpha;
        for channel in 0..3 {
            let mixed = (u32::from(src[channel]) * alpha + u32::from(dst[channel]) * inverse) / 255;
            dst[channel] = mixed as u8;
        }
        dst[3] = (alpha + u32::from(dst[3]) * inverse / 255) as u8;
    }
}

impl Surface for Canvas {
    fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Color) {
        let Some((x0, y0, x1, y1)) = self.clip(x, y, width, height) else {
            return;
        };
        let rgba = color.to_rgba();
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend(px, py, rgba);
            }
        }
    }

    fn stroke_line(&mut self, from: (i32, i32), to: (i32, i32), width: u32, color: Color) {
        if width == 0 {
            return;
        }
        // Square brush centred on every rasterized point.
        let brush = width.min(i32::MAX as u32) as i32;
        let offset = brush / 2;
        let reach = i64::from(brush);
        let (origin_x, origin_y) = (i64::from(self.origin.0), i64::from(self.origin.1));
        let Some((from, to)) = clip_segment(
            from,
            to,
            (-origin_x - reach, -origin_y - reach),
            (
                i64::from(self.pixels.width()) - origin_x + reach,
                i64::from(self.pixels.height()) - origin_y + reach,
            ),
        ) else {
            return;
        };
        for (x, y) in bresenham(from, to) {
            self.fill_rect(x - offset, y - offset, brush, brush, color);
        }
    }

    fn draw_image(&mut self, image: &RgbaImage, x: i32, y: i32, width: u32, height: u32) {
        if image.width() == 0 || image.height() == 0 {
            return;
        }
        let (Ok(w), Ok(h)) = (i32::try_from(width), i32::try_from(height)) else {
            return;
        };
        let Some((x0, y0, x1, y1)) = self.clip(x, y, w, h) else {
            return;
        };
        let left = i64::from(x) + i64::from(self.origin.0);
        let top = i64::from(y) + i64::from(self.origin.1);
        for py in y0..y1 {
            let dy = (i64::from(py) - top) as u64;
            let sy = (dy * u64::from(image.height()) / u64::from(height)) as u32;
            for px in x0..x1 {
                let dx = (i64::from(px) - left) as u64;
                let sx = (dx * u64::from(image.width()) / u64::from(width)) as u32;
                self.blend(px, py, *image.get_pixel(sx, sy));
            }
        }
    }

    fn create_pattern(&mut self, composite: &RgbaImage) -> Result<Pattern, SurfaceError> {
        Pattern::new(composite.clone())
    }

    fn fill_pattern(&mut self, pattern: &Pattern, x: i32, y: i32, width: i32, height: i32) {
        let Some((x0, y0, x1, y1)) = self.clip(x, y, width, height) else {
            return;
        };
        let tile_width = i64::from(pattern.width());
        let tile_height = i64::from(pattern.height());
        let (origin_x, origin_y) = (i64::from(self.origin.0), i64::from(self.origin.1));
        for py in y0..y1 {
            let ty = (i64::from(py) - origin_y).rem_euclid(tile_height) as u32;
            for px in x0..x1 {
                let tx = (i64::from(px) - origin_x).rem_euclid(tile_width) as u32;
                let texel = *pattern.tile().get_pixel(tx, ty);
                self.blend(px, py, texel);
            }
        }
    }

    fn save(&mut self) {
        self.saved.push(self.origin);
    }

    fn restore(&mut self) {
        match self.saved.pop() {
            Some(origin) => self.origin = origin,
            None => warn!("canvas restore without matching save"),
        }
    }

    fn translate(&mut self, dx: i32, dy: i32) {
        self.origin = (self.origin.0.saturating_add(dx), self.origin.1.saturating_add(dy));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgb(255, 0, 0);

    fn count(canvas: &Canvas, color: Color) -> usize {
        canvas
            .image()
            .pixels()
            .filter(|&&Rgba([r, g, b, a])| Color::rgba(r, g, b, a) == color)
            .count()
    }

    /// Rectangles are clipped to the framebuffer and honour translation.
    #[test]
    fn test_fill_rect_clips_and_translates() {
        let mut canvas = Canvas::new(8, 8);
        canvas.fill_rect(-2, -2, 4, 4, RED);
        assert_eq!(count(&canvas, RED), 4);

        canvas.clear(Color::BLACK);
        canvas.save();
        canvas.translate(6, 6);
        canvas.fill_rect(0, 0, 10, 10, RED);
        canvas.restore();
        assert_eq!(count(&canvas, RED), 4);
        assert_eq!(canvas.pixel(7, 7), Some(RED));

        canvas.fill_rect(0, 0, 0, 5, Color::WHITE);
        canvas.fill_rect(0, 0, -3, 5, Color::WHITE);
        assert_eq!(count(&canvas, Color::WHITE), 0);
    }

    /// Images are scaled with nearest-neighbour sampling and transparent texels skipped.
    #[test]
    fn test_draw_image_nearest_scaling() {
        let mut source = RgbaImage::new(2, 1);
        source.put_pixel(0, 0, RED.to_rgba());
        source.put_pixel(1, 0, Rgba([0, 0, 0, 0]));

        let mut canvas = Canvas::new(6, 4);
        canvas.clear(Color::BLACK);
        canvas.draw_image(&source, 1, 1, 4, 2);

        assert_eq!(count(&canvas, RED), 4);
        assert_eq!(canvas.pixel(1, 1), Some(RED));
        assert_eq!(canvas.pixel(2, 2), Some(RED));
        assert_eq!(canvas.pixel(3, 1), Some(Color::BLACK));
    }

    /// Pattern texels are anchored at the translated origin.
    #[test]
    fn test_fill_pattern_anchored_at_origin() {
        let mut tile = RgbaImage::new(3, 1);
        tile.put_pixel(0, 0, RED.to_rgba());
        tile.put_pixel(1, 0, Color::WHITE.to_rgba());
        tile.put_pixel(2, 0, Color::WHITE.to_rgba());

        let mut canvas = Canvas::new(9, 2);
        let pattern = canvas.create_pattern(&tile).expect("non-empty tile");
        canvas.save();
        canvas.translate(-1, 0);
        canvas.fill_pattern(&pattern, 0, 0, 10, 2);
        canvas.restore();

        // With the origin at x = -1 the red column appears at x = 2, 5, 8.
        for x in 0..9 {
            let expected = if x % 3 == 2 { RED } else { Color::WHITE };
            assert_eq!(canvas.pixel(x, 0), Some(expected), "column {x}");
            assert_eq!(canvas.pixel(x, 1), Some(expected), "column {x}");
        }
    }

    /// Empty composites cannot become patterns.
    #[test]
    fn test_create_pattern_rejects_empty() {
        let mut canvas = Canvas::new(1, 1);
        assert!(canvas.create_pattern(&RgbaImage::new(0, 4)).is_err());
    }

    /// Thick strokes paint a square brush along the segment.
    #[test]
    fn test_stroke_line_thickness() {
        let mut canvas = Canvas::new(10, 10);
        canvas.stroke_line((2, 5), (7, 5), 3, RED);
        // Six points, each widened by one pixel on every side: columns 1..=8, rows 4..=6.
        assert_eq!(count(&canvas, RED), 8 * 3);
        assert_eq!(canvas.pixel(1, 4), Some(RED));
        assert_eq!(canvas.pixel(8, 6), Some(RED));
        assert_eq!(canvas.pixel(9, 5), Some(Color::rgba(0, 0, 0, 0)));
        assert_eq!(canvas.pixel(5, 3), Some(Color::rgba(0, 0, 0, 0)));
    }

    /// Strokes spanning the whole `i32` range are clipped before rasterizing.
    #[test]
    fn test_stroke_line_far_endpoints() {
        let mut canvas = Canvas::new(10, 10);
        canvas.save();
        canvas.translate(2, 0);
        canvas.stroke_line((i32::MIN, 5), (i32::MAX, 5), 3, RED);
        canvas.restore();
        assert_eq!(count(&canvas, RED), 10 * 3);
        assert_eq!(canvas.pixel(0, 4), Some(RED));
        assert_eq!(canvas.pixel(9, 6), Some(RED));

        canvas.stroke_line((-50, -50), (-20, -40), 3, Color::WHITE);
        assert_eq!(count(&canvas, Color::WHITE), 0);
    }

    /// Half-transparent colours blend source-over.
    #[test]
    fn test_alpha_blending() {
        let mut canvas = Canvas::new(1, 1);
        canvas.clear(Color::WHITE);
        canvas.fill_rect(0, 0, 1, 1, Color::rgba(0, 0, 0, 51));
        assert_eq!(canvas.pixel(0, 0), Some(Color::rgba(204, 204, 204, 255)));
    }
}
