//! Sprite-carrying leaf of the scene graph.

use crate::camera::Camera;
use crate::sprite::Sprite;
use crate::surface::Surface;

/// Leaf drawable positioned relative to its parent and optionally showing a sprite.
///
/// The sprite is a shared handle; several objects may display the same one.
#[derive(Debug, Clone, Default)]
pub struct RoomObject {
    /// Local X offset from the parent.
    pub x: f64,
    /// Local Y offset from the parent.
    pub y: f64,
    sprite: Option<Sprite>,
}

impl RoomObject {
    /// Creates an object at a local position.
    pub fn new(x: f64, y: f64, sprite: Option<Sprite>) -> Self {
        Self { x, y, sprite }
    }

    /// Sprite shown by this object, if any.
    pub fn sprite(&self) -> Option<&Sprite> {
        self.sprite.as_ref()
    }

    /// Replaces the sprite.
    pub fn set_sprite(&mut self, sprite: Option<Sprite>) {
        self.sprite = sprite;
    }

    /// Blits the sprite centred on the object's screen position.
    ///
    /// Draws nothing while the sprite is absent, pending or failed. The blit size is
    /// `floor(natural * camera.global_scale() * sprite.scale())`.
    ///
    /// # Arguments
    /// * `surface` - Target surface
    /// * `camera` - Camera used for the world to screen transform
    /// * `parent_x` - Parent world X
    /// * `parent_y` - Parent world Y
    pub fn draw(&self, surface: &mut dyn Surface, camera: &Camera, parent_x: f64, parent_y: f64) {
        let Some(sprite) = &self.sprite else {
            return;
        };
        let Some(image) = sprite.image() else {
            return;
        };

        let (screen_x, screen_y) = camera.world_to_screen(parent_x + self.x, parent_y + self.y);
        let magnification = sprite.scale() * f64::from(camera.global_scale());
        let width = scaled(sprite.width(), magnification);
        let height = scaled(sprite.height(), magnification);
        if width == 0 || height == 0 {
            return;
        }

        let draw_x = screen_x - (width / 2) as i32;
        let draw_y = screen_y - (height / 2) as i32;
        surface.draw_image(&image, draw_x, draw_y, width, height);
    }
}

fn scaled(natural: u32, magnification: f64) -> u32 {
    let value = (f64::from(natural) * magnification).floor();
    if value <= 0.0 {
        0
    } else {
        value.min(f64::from(i32::MAX)) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::recording::RecordingSurface;
    use image::RgbaImage;

    /// Absent and unloaded sprites draw nothing.
    #[test]
    fn test_draw_skips_missing_or_unloaded_sprite() {
        let camera = Camera::new(64, 64);
        let mut surface = RecordingSurface::new();

        RoomObject::new(0.0, 0.0, None).draw(&mut surface, &camera, 0.0, 0.0);
        let pending = Sprite::detached("pending.png", 1.0);
        RoomObject::new(0.0, 0.0, Some(pending)).draw(&mut surface, &camera, 0.0, 0.0);

        assert!(surface.ops.is_empty());
    }

    /// Loaded sprites are scaled by global and local scale and centred on the screen point.
    #[test]
    fn test_draw_centres_scaled_sprite() {
        let mut camera = Camera::new(100, 100);
        camera.set_global_scale(3);
        let sprite = Sprite::from_image("marker", RgbaImage::new(9, 4), 1.0);
        let object = RoomObject::new(2.0, -1.0, Some(sprite.clone()));

        let mut surface = RecordingSurface::new();
        object.draw(&mut surface, &camera, 1.0, 1.0);
        // Screen point (59, 50), size 27x12, integer half sizes 13 and 6.
        assert_eq!(surface.blits(), vec![(46, 44, 27, 12)]);

        sprite.set_scale(0.5);
        let mut surface = RecordingSurface::new();
        object.draw(&mut surface, &camera, 1.0, 1.0);
        // 9 * 1.5 = 13.5 -> 13, 4 * 1.5 = 6.
        assert_eq!(surface.blits(), vec![(53, 47, 13, 6)]);
    }
}
