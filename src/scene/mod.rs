//! Scene graph: containers, sprite objects and lines.
//!
//! Every node is a [`Drawable`]. Traversal is top-down; each node receives its
//! parent's accumulated world position and adds its own local offset.

mod container;
mod line;
mod object;

pub use container::Container;
pub use line::{Bresenham, Line, bresenham, clip_segment};
pub use object::RoomObject;

use crate::camera::Camera;
use crate::sprite::Sprite;
use crate::surface::Surface;

/// Any node that can live in a [`Container`].
#[derive(Debug, Clone)]
pub enum Drawable {
    /// Nested container.
    Container(Container),
    /// Sprite-carrying leaf.
    Object(RoomObject),
    /// Line segment.
    Line(Line),
}

impl Drawable {
    /// Draws the node with the given parent world position.
    pub fn draw(&self, surface: &mut dyn Surface, camera: &Camera, parent_x: f64, parent_y: f64) {
        match self {
            Drawable::Container(container) => container.draw(surface, camera, parent_x, parent_y),
            Drawable::Object(object) => object.draw(surface, camera, parent_x, parent_y),
            Drawable::Line(line) => line.draw(surface, camera, parent_x, parent_y),
        }
    }

    /// Sprite directly associated with this node. Only objects carry one.
    pub fn sprite(&self) -> Option<&Sprite> {
        match self {
            Drawable::Object(object) => object.sprite(),
            Drawable::Container(_) | Drawable::Line(_) => None,
        }
    }
}

impl From<Container> for Drawable {
    fn from(container: Container) -> Self {
        Drawable::Container(container)
    }
}

impl From<RoomObject> for Drawable {
    fn from(object: RoomObject) -> Self {
        Drawable::Object(object)
    }
}

impl From<Line> for Drawable {
    fn from(line: Line) -> Self {
        Drawable::Line(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Color;
    use image::RgbaImage;

    /// Only objects expose a sprite, and it is the shared handle they were given.
    #[test]
    fn test_sprite_only_on_objects() {
        let sprite = Sprite::from_image("marker", RgbaImage::new(3, 3), 1.0);
        let object = Drawable::from(RoomObject::new(0.0, 0.0, Some(sprite.clone())));
        assert!(object.sprite().is_some_and(|found| found.ptr_eq(&sprite)));

        let empty = Drawable::from(RoomObject::new(0.0, 0.0, None));
        let line = Drawable::from(Line::new((0.0, 0.0), (1.0, 1.0), Color::WHITE));
        let container = Drawable::from(Container::new(0.0, 0.0));
        assert!(empty.sprite().is_none());
        assert!(line.sprite().is_none());
        assert!(container.sprite().is_none());
    }
}
