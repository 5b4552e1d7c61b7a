//! Application module for pixelroom.
//!
//! This module contains the host shell that shows a [`crate::room::Room`] in a window.
//!
//! # Module Structure
//!
//! - [`app_state`]: Contains the [`AppState`] struct, live while the window is open
//! - [`event_handler`]: Contains the [`App`] struct and event handling logic
//! - [`scene`]: Contains [`SceneState`], the demo room and its wipe sequence
//!
//! # Event Flow
//!
//! 1. `about_to_wait` requests a redraw every loop iteration
//! 2. `RedrawRequested` pumps sprite loads, updates and draws the room onto the canvas
//! 3. The canvas is uploaded and presented through wgpu
//!
//! # Threading Model
//!
//! Everything runs on the event loop thread. Image decoding happens on loader worker
//! threads and results are applied on the event loop thread when pumped.

pub mod app_state;
pub mod event_handler;
pub mod scene;

pub use app_state::AppState;
pub use event_handler::App;
pub use scene::SceneState;
