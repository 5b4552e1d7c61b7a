//! Composite node of the scene graph.

use tracing::trace;

use super::Drawable;
use crate::camera::Camera;
use crate::surface::Surface;

/// Ordered list of child drawables with a local offset.
///
/// Children are painted back to front in insertion order. The container owns its
/// children; sprites referenced by them are shared and outlive it.
#[derive(Debug, Clone, Default)]
pub struct Container {
    /// Local X offset from the parent.
    pub x: f64,
    /// Local Y offset from the parent.
    pub y: f64,
    children: Vec<Drawable>,
}

impl Container {
    /// Creates an empty container at a local offset.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            children: Vec::new(),
        }
    }

    /// Appends a child. No uniqueness checks are made.
    pub fn add(&mut self, child: impl Into<Drawable>) {
        self.children.push(child.into());
    }

    /// Drops every child.
    pub fn clear(&mut self) {
        self.children.clear();
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether the container has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Direct children in paint order.
    pub fn children(&self) -> &[Drawable] {
        &self.children
    }

    /// Draws every child with this container's world position as their parent.
    ///
    /// # Arguments
    /// * `surface` - Target surface
    /// * `camera` - Camera used for the world to screen transform
    /// * `parent_x` - Parent world X
    /// * `parent_y` - Parent world Y
    pub fn draw(&self, surface: &mut dyn Surface, camera: &Camera, parent_x: f64, parent_y: f64) {
        let world_x = parent_x + self.x;
        let world_y = parent_y + self.y;
        trace!(children = self.children.len(), world_x, world_y, "drawing container");
        for child in &self.children {
            child.draw(surface, camera, world_x, world_y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Line, RoomObject};
    use crate::sprite::Sprite;
    use crate::surface::Color;
    use crate::surface::recording::{Op, RecordingSurface};
    use image::RgbaImage;

    fn sprite(width: u32) -> Sprite {
        Sprite::from_image(format!("sprite-{width}"), RgbaImage::new(width, 2), 1.0)
    }

    /// Children paint in insertion order regardless of position.
    #[test]
    fn test_draw_order_is_insertion_order() {
        let camera = Camera::new(100, 100);
        let mut container = Container::new(0.0, 0.0);
        container.add(RoomObject::new(30.0, 0.0, Some(sprite(2))));
        container.add(RoomObject::new(-30.0, 0.0, Some(sprite(4))));
        container.add(RoomObject::new(0.0, 0.0, Some(sprite(6))));

        let mut surface = RecordingSurface::new();
        container.draw(&mut surface, &camera, 0.0, 0.0);

        let widths: Vec<u32> = surface.blits().iter().map(|blit| blit.2).collect();
        assert_eq!(widths, vec![2, 4, 6]);
    }

    /// Offsets accumulate through nested containers.
    #[test]
    fn test_nested_offsets_accumulate() {
        let camera = Camera::new(0, 0);
        let mut inner = Container::new(3.0, 4.0);
        inner.add(Line::new((1.0, 1.0), (1.0, 1.0), Color::WHITE));
        let mut outer = Container::new(10.0, 20.0);
        outer.add(inner);

        let mut surface = RecordingSurface::new();
        outer.draw(&mut surface, &camera, 100.0, 200.0);

        assert_eq!(surface.plotted(), vec![(114, 225)]);
    }

    /// Clearing drops children and mixed variants draw through one dispatch.
    #[test]
    fn test_clear_and_mixed_children() {
        let camera = Camera::new(10, 10);
        let mut container = Container::default();
        container.add(Line::new((0.0, 0.0), (0.0, 0.0), Color::WHITE));
        container.add(RoomObject::new(0.0, 0.0, None));
        container.add(Container::new(1.0, 1.0));
        assert_eq!(container.len(), 3);

        let mut surface = RecordingSurface::new();
        container.draw(&mut surface, &camera, 0.0, 0.0);
        assert_eq!(
            surface.ops,
            vec![Op::FillRect {
                x: 5,
                y: 5,
                width: 1,
                height: 1,
                color: Color::WHITE,
            }]
        );

        container.clear();
        assert!(container.is_empty());
    }
}
