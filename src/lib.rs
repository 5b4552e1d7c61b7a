//! # pixelroom
//!
//! A small 2D pixel-art presentation layer.
//!
//! - [`camera`]: world to screen transform with an integer global scale
//! - [`scene`]: containers, sprite objects and Bresenham lines drawn in insertion order
//! - [`sprite`]: shared image handles loaded on background threads
//! - [`transition`]: directional dither wipes
//! - [`room`]: the world container plus a single transition slot
//! - [`surface`]: the drawing capability and its CPU [`surface::Canvas`]
//!
//! The [`app`] and [`renderer`] modules host a room in a `winit` window and present
//! the canvas through `wgpu`.
//!
//! ```rust,ignore
//! let mut loader = AssetLoader::new();
//! let mut room = Room::new(320, 180);
//! room.add(Line::new((-160.0, 0.0), (159.0, 0.0), Color::WHITE));
//! room.install_transition(Transition::new(
//!     Sprite::load("dither_heavy.png", 1.0, &mut loader),
//!     Sprite::load("dither_light.png", 1.0, &mut loader),
//! ))?;
//! room.configure_transition(Direction::IntoLeft, None, DEFAULT_SCROLL_SPEED)?;
//! room.begin_transition()?;
//!
//! loop {
//!     loader.pump();
//!     room.update(dt, &camera);
//!     canvas.clear(Color::BLACK);
//!     room.draw(&mut canvas, &camera);
//! }
//! ```

#![warn(missing_docs)]

pub mod app;
pub mod camera;
pub mod config;
pub mod error;
pub mod renderer;
pub mod room;
pub mod scene;
pub mod sprite;
pub mod surface;
pub mod transition;

pub use camera::Camera;
pub use room::Room;
