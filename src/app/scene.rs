//! Scene state owned by the host: camera, canvas, loader and the demo room.
//!
//! The host drives it explicitly: [`SceneState::init`] builds everything,
//! [`SceneState::frame`] runs one tick and [`SceneState::teardown`] releases it.

use std::cell::Cell;
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::camera::{Camera, fit_global_scale};
use crate::config::SceneConfig;
use crate::error::TransitionError;
use crate::room::Room;
use crate::scene::{Container, Line, RoomObject};
use crate::sprite::{AssetLoader, Sprite};
use crate::surface::{Canvas, Color};
use crate::transition::{Direction, OnComplete, Transition};

/// Canvas colour behind the world.
pub const BACKGROUND: Color = Color::rgb(24, 20, 37);
/// Colour of the frame and diagonal lines.
pub const LINE_COLOR: Color = Color::rgb(232, 228, 214);

/// Everything a running scene needs between frames.
pub struct SceneState {
    config: SceneConfig,
    camera: Camera,
    canvas: Canvas,
    loader: AssetLoader,
    room: Room,
    sequence_index: usize,
    completed: Rc<Cell<bool>>,
    hold_remaining: Option<f64>,
}

impl SceneState {
    /// Builds the demo room and begins the first wipe of the configured sequence.
    ///
    /// # Arguments
    /// * `config` - Validated host configuration
    /// * `viewport` - Initial window size in physical pixels
    ///
    /// # Errors
    /// [`TransitionError`] if the first wipe cannot be started
    pub fn init(config: SceneConfig, viewport: (u32, u32)) -> Result<Self, TransitionError> {
        let mut loader = AssetLoader::new();
        let heavy = Sprite::load(config.assets.heavy_dither.clone(), 1.0, &mut loader);
        let light = Sprite::load(config.assets.light_dither.clone(), 1.0, &mut loader);
        let marker = Sprite::load(config.assets.marker.clone(), 1.0, &mut loader);

        let mut room = Room::new(config.scale.reference_width, config.scale.reference_height);
        populate(&mut room, &marker);
        room.install_transition(Transition::new(heavy, light))?;

        let mut state = Self {
            camera: Camera::new(viewport.0, viewport.1),
            canvas: Canvas::new(viewport.0, viewport.1),
            loader,
            room,
            sequence_index: 0,
            completed: Rc::new(Cell::new(false)),
            hold_remaining: None,
            config,
        };
        state.resize(viewport.0, viewport.1);
        state.start_wipe()?;

        info!(
            width = viewport.0,
            height = viewport.1,
            pending = state.loader.pending(),
            "scene initialized"
        );
        Ok(state)
    }

    /// Fits the camera and canvas to a new window size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_viewport(width, height);
        self.canvas.resize(width, height);

        let available = self.config.available_area(width, height);
        let reference = (
            self.config.scale.reference_width,
            self.config.scale.reference_height,
        );
        if self.camera.set_global_scale(fit_global_scale(available, reference)) {
            debug!(scale = self.camera.global_scale(), "global scale changed");
        }
    }

    /// Runs one tick and redraws the canvas.
    ///
    /// # Arguments
    /// * `dt` - Seconds since the previous frame
    pub fn frame(&mut self, dt: f64) {
        self.loader.pump();
        self.room.update(dt, &self.camera);

        if self.completed.replace(false) {
            self.hold_remaining = Some(self.config.transition.hold_seconds);
        }
        if let Some(remaining) = self.hold_remaining.as_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.hold_remaining = None;
                self.advance();
            }
        }

        self.canvas.clear(BACKGROUND);
        self.room.draw(&mut self.canvas, &self.camera);
    }

    /// Blocks until every outstanding sprite load has settled.
    pub fn finish_loading(&mut self) -> usize {
        self.loader.finish()
    }

    /// The canvas drawn by the last frame.
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// The scene camera.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// The demo room.
    pub fn room(&self) -> &Room {
        &self.room
    }

    /// Mutable access to the demo room.
    pub fn room_mut(&mut self) -> &mut Room {
        &mut self.room
    }

    /// Direction of the wipe currently installed.
    pub fn current_direction(&self) -> Option<Direction> {
        self.room.transition().and_then(Transition::direction)
    }

    /// Releases the room and the loader.
    pub fn teardown(mut self) {
        self.room.clear_transition();
        self.room.clear_objects();
        info!(pending = self.loader.pending(), "scene torn down");
    }

    fn advance(&mut self) {
        let len = self.config.transition.sequence.len();
        if len == 0 {
            return;
        }
        self.sequence_index = (self.sequence_index + 1) % len;
        if let Err(err) = self.start_wipe() {
            warn!(%err, "could not start next wipe");
        }
    }

    fn start_wipe(&mut self) -> Result<(), TransitionError> {
        let Some(&direction) = self.config.transition.sequence.get(self.sequence_index) else {
            return Ok(());
        };
        let flag = Rc::clone(&self.completed);
        let on_complete: OnComplete = Box::new(move || flag.set(true));

        self.room.configure_transition(
            direction,
            Some(on_complete),
            self.config.transition.scroll_speed,
        )?;
        self.room.begin_transition()?;
        debug!(?direction, index = self.sequence_index, "wipe started");
        Ok(())
    }
}

/// Demo content: a border around the reference area, a thick diagonal and
/// nested groups of markers, all centred on the world origin.
fn populate(room: &mut Room, marker: &Sprite) {
    let half_w = f64::from(room.width) / 2.0;
    let half_h = f64::from(room.height) / 2.0;
    let (left, top) = (-half_w, -half_h);
    let (right, bottom) = (half_w - 1.0, half_h - 1.0);

    let mut frame = Container::new(0.0, 0.0);
    frame.add(Line::new((left, top), (right, top), LINE_COLOR));
    frame.add(Line::new((right, top), (right, bottom), LINE_COLOR));
    frame.add(Line::new((right, bottom), (left, bottom), LINE_COLOR));
    frame.add(Line::new((left, bottom), (left, top), LINE_COLOR));
    room.root_container_mut().add(frame);

    let diagonal = Line::new(
        (left + 16.0, bottom - 16.0),
        (right - 16.0, top + 16.0),
        LINE_COLOR,
    );
    room.add(diagonal.with_width(3));

    let mut row = Container::new(-96.0, -40.0);
    for column in 0..4 {
        row.add(RoomObject::new(f64::from(column) * 24.0, 0.0, Some(marker.clone())));
    }
    let mut nested = Container::new(12.0, 32.0);
    for column in 0..3 {
        nested.add(RoomObject::new(f64::from(column) * 24.0, 0.0, Some(marker.clone())));
    }
    row.add(nested);
    room.add(row);
}
