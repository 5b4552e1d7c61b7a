//! A room composes the world container with a single transition slot.

use tracing::{debug, warn};

use crate::camera::Camera;
use crate::error::TransitionError;
use crate::scene::{Container, Drawable};
use crate::surface::Surface;
use crate::transition::{Direction, OnComplete, Transition};

/// The world plus at most one transition painted on top of it.
///
/// Only one wipe can run at a time: while the installed transition is active,
/// attempts to replace, reconfigure or restart it are rejected with
/// [`TransitionError::AlreadyActive`] and the running wipe continues untouched.
#[derive(Debug)]
pub struct Room {
    /// Authoring width in world pixels.
    pub width: u32,
    /// Authoring height in world pixels.
    pub height: u32,
    root: Container,
    transition: Option<Transition>,
}

impl Room {
    /// Creates an empty room whose root container sits at the world origin.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            root: Container::new(0.0, 0.0),
            transition: None,
        }
    }

    /// The world container.
    pub fn root_container(&self) -> &Container {
        &self.root
    }

    /// Mutable access to the world container.
    pub fn root_container_mut(&mut self) -> &mut Container {
        &mut self.root
    }

    /// Adds a drawable to the world container.
    pub fn add(&mut self, drawable: impl Into<Drawable>) {
        self.root.add(drawable);
    }

    /// Removes every drawable from the world.
    pub fn clear_objects(&mut self) {
        self.root.clear();
    }

    /// Places a transition in the slot, replacing an idle one.
    ///
    /// # Errors
    /// [`TransitionError::AlreadyActive`] if the current transition is running
    pub fn install_transition(&mut self, transition: Transition) -> Result<(), TransitionError> {
        self.ensure_idle("install")?;
        self.transition = Some(transition);
        Ok(())
    }

    /// The installed transition.
    pub fn transition(&self) -> Option<&Transition> {
        self.transition.as_ref()
    }

    /// Configures the installed transition.
    ///
    /// # Errors
    /// - [`TransitionError::NoTransition`] if the slot is empty
    /// - [`TransitionError::AlreadyActive`] if a wipe is running
    pub fn configure_transition(
        &mut self,
        direction: Direction,
        on_complete: Option<OnComplete>,
        scroll_speed: f64,
    ) -> Result<(), TransitionError> {
        self.ensure_idle("configure")?;
        let transition = self
            .transition
            .as_mut()
            .ok_or(TransitionError::NoTransition)?;
        transition.configure(direction, on_complete, scroll_speed);
        Ok(())
    }

    /// Begins the installed transition.
    ///
    /// # Errors
    /// - [`TransitionError::NoTransition`] if the slot is empty
    /// - [`TransitionError::AlreadyActive`] if a wipe is running
    /// - [`TransitionError::NotConfigured`] if it was never configured
    pub fn begin_transition(&mut self) -> Result<(), TransitionError> {
        self.ensure_idle("begin")?;
        self.transition
            .as_mut()
            .ok_or(TransitionError::NoTransition)?
            .begin()
    }

    /// Clears the installed transition, dropping its pending callback.
    pub fn clear_transition(&mut self) {
        if let Some(transition) = &mut self.transition {
            transition.clear();
            debug!("room transition cleared");
        }
    }

    /// Advances the transition. The world itself has no per-frame state.
    pub fn update(&mut self, dt: f64, camera: &Camera) {
        if let Some(transition) = &mut self.transition {
            transition.update(dt, camera);
        }
    }

    /// Draws the world, then the transition over it.
    pub fn draw(&mut self, surface: &mut dyn Surface, camera: &Camera) {
        self.root.draw(surface, camera, 0.0, 0.0);
        if let Some(transition) = &mut self.transition {
            transition.draw(surface, camera);
        }
    }

    fn ensure_idle(&self, action: &str) -> Result<(), TransitionError> {
        match &self.transition {
            Some(transition) if transition.is_active() => {
                warn!(action, "rejected: a transition is already active");
                Err(TransitionError::AlreadyActive)
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Line;
    use crate::sprite::Sprite;
    use crate::surface::Color;
    use crate::surface::recording::{Op, RecordingSurface};
    use crate::transition::TransitionPhase;
    use image::RgbaImage;
    use std::cell::Cell;
    use std::rc::Rc;

    fn transition() -> Transition {
        Transition::new(
            Sprite::from_image("heavy", RgbaImage::new(4, 4), 1.0),
            Sprite::from_image("light", RgbaImage::new(4, 4), 1.0),
        )
    }

    /// Without a transition the slot-dependent calls report it.
    #[test]
    fn test_empty_slot() {
        let mut room = Room::new(320, 180);
        assert_eq!(
            room.configure_transition(Direction::IntoLeft, None, 10.0),
            Err(TransitionError::NoTransition)
        );
        assert_eq!(room.begin_transition(), Err(TransitionError::NoTransition));
        room.clear_transition();
        room.update(0.016, &Camera::new(10, 10));
    }

    /// A running wipe rejects a second configure or begin and keeps going.
    #[test]
    fn test_single_active_transition() {
        let mut room = Room::new(320, 180);
        room.install_transition(transition()).expect("empty slot");
        let calls = Rc::new(Cell::new(0));
        let sink = Rc::clone(&calls);
        room.configure_transition(
            Direction::IntoRight,
            Some(Box::new(move || sink.set(sink.get() + 1))),
            10.0,
        )
        .expect("idle");
        room.begin_transition().expect("configured");

        let camera = Camera::new(40, 10);
        room.update(0.016, &camera);
        let offset = room.transition().map(Transition::scroll_offset);

        assert_eq!(
            room.configure_transition(Direction::FromLeft, None, 10.0),
            Err(TransitionError::AlreadyActive)
        );
        assert_eq!(room.begin_transition(), Err(TransitionError::AlreadyActive));
        assert_eq!(room.install_transition(transition()), Err(TransitionError::AlreadyActive));
        assert_eq!(room.transition().map(Transition::scroll_offset), offset);
        assert_eq!(room.transition().and_then(Transition::direction), Some(Direction::IntoRight));

        for _ in 0..10 {
            room.update(0.016, &camera);
        }
        assert_eq!(calls.get(), 1);

        // Completed wipes no longer block a new one.
        room.configure_transition(Direction::FromLeft, None, 10.0)
            .expect("completed wipe is idle");
        assert_eq!(
            room.transition().map(Transition::phase),
            Some(TransitionPhase::Ready)
        );
    }

    /// Begin without configure surfaces the configuration error.
    #[test]
    fn test_begin_unconfigured() {
        let mut room = Room::new(1, 1);
        room.install_transition(transition()).expect("empty slot");
        assert_eq!(room.begin_transition(), Err(TransitionError::NotConfigured));
    }

    /// The world is painted first and the transition over it.
    #[test]
    fn test_draw_world_then_transition() {
        let mut room = Room::new(320, 180);
        room.add(Line::new((0.0, 0.0), (0.0, 0.0), Color::WHITE));
        room.install_transition(transition()).expect("empty slot");
        room.configure_transition(Direction::IntoLeft, None, 10.0)
            .expect("idle");
        room.begin_transition().expect("configured");

        let camera = Camera::new(20, 20);
        let mut surface = RecordingSurface::new();
        room.draw(&mut surface, &camera);

        assert!(matches!(surface.ops.first(), Some(Op::FillRect { x: 10, y: 10, width: 1, .. })));
        assert!(matches!(surface.ops.last(), Some(Op::Restore)));

        room.root_container_mut().add(Container::new(5.0, 5.0));
        assert_eq!(room.root_container().len(), 2);
        room.clear_objects();
        assert!(room.root_container().is_empty());
    }
}
