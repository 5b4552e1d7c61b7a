//! World-to-screen transform for pixel-art rendering.
//!
//! The camera is plain data. Every conversion takes `&self` and floors its result so
//! that everything downstream lands on whole device pixels.

use tracing::warn;

/// Camera describing how world space maps onto the device framebuffer.
///
/// # Coordinate System
/// - World origin maps to the viewport centre when `x == y == 0`
/// - X increases to the right, Y increases downwards (screen convention)
/// - One world unit spans `zoom * global_scale` device pixels
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// World-space X of the point shown at the viewport centre.
    pub x: f64,
    /// World-space Y of the point shown at the viewport centre.
    pub y: f64,
    /// Camera-local zoom factor.
    pub zoom: f64,
    /// Viewport width in device pixels.
    pub viewport_width: u32,
    /// Viewport height in device pixels.
    pub viewport_height: u32,
    global_scale: u32,
}

impl Camera {
    /// Creates a camera centred on the world origin with zoom and global scale of 1.
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
            viewport_width,
            viewport_height,
            global_scale: 1,
        }
    }

    /// Converts world coordinates into integer screen coordinates.
    ///
    /// # Arguments
    /// * `world_x` - World-space X coordinate
    /// * `world_y` - World-space Y coordinate
    ///
    /// # Returns
    /// The floored `(x, y)` device pixel the point lands on
    pub fn world_to_screen(&self, world_x: f64, world_y: f64) -> (i32, i32) {
        let scale = f64::from(self.global_scale);
        let screen_x = (world_x - self.x) * self.zoom * scale + f64::from(self.viewport_width) / 2.0;
        let screen_y =
            (world_y - self.y) * self.zoom * scale + f64::from(self.viewport_height) / 2.0;
        (screen_x.floor() as i32, screen_y.floor() as i32)
    }

    /// Converts a world-pixel magnitude into device pixels.
    pub fn scale(&self, value: f64) -> i32 {
        (value * f64::from(self.global_scale)).floor() as i32
    }

    /// Converts a device-pixel magnitude back into world pixels.
    pub fn normalize(&self, value: f64) -> i32 {
        (value / f64::from(self.global_scale)).floor() as i32
    }

    /// Current pixel-art magnification. Always at least 1.
    pub fn global_scale(&self) -> u32 {
        self.global_scale
    }

    /// Sets the pixel-art magnification, clamping to a minimum of 1.
    ///
    /// # Returns
    /// `true` if the stored value changed
    pub fn set_global_scale(&mut self, scale: u32) -> bool {
        let scale = if scale == 0 {
            warn!("global scale of 0 requested, clamping to 1");
            1
        } else {
            scale
        };
        let changed = scale != self.global_scale;
        self.global_scale = scale;
        changed
    }

    /// Updates the viewport size. Dependents are not recomputed.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport_width = width;
        self.viewport_height = height;
    }

    /// Pans the camera by a world-space delta.
    pub fn move_by(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }
}

/// Largest integer magnification at which `reference` still fits inside `available`.
///
/// # Arguments
/// * `available` - Space left for the scene in device pixels `(width, height)`
/// * `reference` - Natural size of the scene in world pixels `(width, height)`
///
/// # Returns
/// The fitted scale, never less than 1
pub fn fit_global_scale(available: (u32, u32), reference: (u32, u32)) -> u32 {
    let (reference_width, reference_height) = reference;
    if reference_width == 0 || reference_height == 0 {
        return 1;
    }

    let by_width = f64::from(available.0) / f64::from(reference_width);
    let by_height = f64::from(available.1) / f64::from(reference_height);
    let fitted = by_width.min(by_height).floor();

    if fitted < 1.0 { 1 } else { fitted as u32 }
}
