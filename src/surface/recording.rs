//! Surface that records every call, for asserting draw order in tests.

use image::RgbaImage;

use super::{Color, Pattern, Surface};
use crate::error::SurfaceError;

/// One recorded drawing call, with the translation current at the time.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Op {
    FillRect { x: i32, y: i32, width: i32, height: i32, color: Color },
    StrokeLine { from: (i32, i32), to: (i32, i32), width: u32, color: Color },
    DrawImage { x: i32, y: i32, width: u32, height: u32, source: (u32, u32) },
    FillPattern { origin: (i32, i32), x: i32, y: i32, width: i32, height: i32, tile: (u32, u32) },
    Save,
    Restore,
    Translate { dx: i32, dy: i32 },
}

#[derive(Default)]
pub(crate) struct RecordingSurface {
    pub ops: Vec<Op>,
    pub patterns_created: usize,
    pub refuse_patterns: bool,
    origin: (i32, i32),
    saved: Vec<(i32, i32)>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pixels plotted through 1x1 `fill_rect` calls, in call order.
    pub fn plotted(&self) -> Vec<(i32, i32)> {
        self.ops
            .iter()
            .filter_map(|op| match *op {
                Op::FillRect { x, y, width: 1, height: 1, .. } => Some((x, y)),
                _ => None,
            })
            .collect()
    }

    /// Destination rectangles of every blit, in call order.
    pub fn blits(&self) -> Vec<(i32, i32, u32, u32)> {
        self.ops
            .iter()
            .filter_map(|op| match *op {
                Op::DrawImage { x, y, width, height, .. } => Some((x, y, width, height)),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Color) {
        self.ops.push(Op::FillRect { x, y, width, height, color });
    }

    fn stroke_line(&mut self, from: (i32, i32), to: (i32, i32), width: u32, color: Color) {
        self.ops.push(Op::StrokeLine { from, to, width, color });
    }

    fn draw_image(&mut self, image: &RgbaImage, x: i32, y: i32, width: u32, height: u32) {
        self.ops.push(Op::DrawImage {
            x,
            y,
            width,
            height,
            source: image.dimensions(),
        });
    }

    fn create_pattern(&mut self, composite: &RgbaImage) -> Result<Pattern, SurfaceError> {
        if self.refuse_patterns {
            return Err(SurfaceError::Unavailable("refused by test".into()));
        }
        self.patterns_created += 1;
        Pattern::new(composite.clone())
    }

    fn fill_pattern(&mut self, pattern: &Pattern, x: i32, y: i32, width: i32, height: i32) {
        self.ops.push(Op::FillPattern {
            origin: self.origin,
            x,
            y,
            width,
            height,
            tile: (pattern.width(), pattern.height()),
        });
    }

    fn save(&mut self) {
        self.saved.push(self.origin);
        self.ops.push(Op::Save);
    }

    fn restore(&mut self) {
        if let Some(origin) = self.saved.pop() {
            self.origin = origin;
        }
        self.ops.push(Op::Restore);
    }

    fn translate(&mut self, dx: i32, dy: i32) {
        self.origin = (self.origin.0 + dx, self.origin.1 + dy);
        self.ops.push(Op::Translate { dx, dy });
    }
}
