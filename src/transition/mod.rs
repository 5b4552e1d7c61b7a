//! Directional screen wipe built from two tiled dither sprites.
//!
//! # Lifecycle
//! 1. [`Transition::new`] attaches load listeners to both dither sprites
//! 2. [`Transition::configure`] stores direction, speed and completion callback
//! 3. Once both sprites have loaded, the first `update`/`draw` derives the
//!    pattern width, the starting offset and the tiled composite
//! 4. [`Transition::begin`] unpauses; `update` scrolls until the direction's
//!    completion predicate holds, then fires the callback once. Leftward wipes
//!    pause on completion; rightward ones stay unpaused so their final frame
//!    keeps drawing
//! 5. [`Transition::clear`] returns to the unconfigured state from anywhere
//!
//! # Coverage
//! "Into" directions end with the viewport fully black. "From" directions start
//! fully black and end with the scene revealed. The boundary between black and
//! scene is the dither pattern, `combined_pattern_width` device pixels wide.

mod pattern;

pub use pattern::{TileComposite, TileOrder, assemble};

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::camera::Camera;
use crate::error::TransitionError;
use crate::sprite::Sprite;
use crate::surface::{Color, Pattern, Surface};

/// Scroll speed used by [`Transition::configure_default`], in world pixels per tick.
pub const DEFAULT_SCROLL_SPEED: f64 = 10.0;

/// Completion callback. Runs at most once.
pub type OnComplete = Box<dyn FnOnce()>;

/// Direction of a wipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    /// Covers the viewport, travelling right to left.
    IntoLeft,
    /// Reveals the scene, travelling left to right.
    FromLeft,
    /// Covers the viewport, travelling left to right.
    IntoRight,
    /// Reveals the scene, travelling right to left.
    FromRight,
}

impl Direction {
    /// Whether the scroll offset grows over time.
    pub fn scrolls_right(self) -> bool {
        matches!(self, Direction::IntoRight | Direction::FromLeft)
    }

    /// Whether the black fill sits left of the pattern.
    fn black_on_left(self) -> bool {
        matches!(self, Direction::IntoRight | Direction::FromRight)
    }

    /// Tile order of the composite; the heavy tile always borders the black fill.
    pub fn tile_order(self) -> TileOrder {
        if self.black_on_left() {
            TileOrder::HeavyFirst
        } else {
            TileOrder::LightFirst
        }
    }
}

/// Observable lifecycle stage of a [`Transition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPhase {
    /// No direction set.
    Unconfigured,
    /// Configured, dither sprites still loading.
    Configuring,
    /// Configured and loaded, waiting for `begin`.
    Ready,
    /// Scrolling, or begun and waiting for the sprites.
    Active,
    /// Completion predicate held; the terminal frame keeps painting.
    Completed,
}

/// Screen wipe state machine.
pub struct Transition {
    heavy: Sprite,
    light: Sprite,
    direction: Option<Direction>,
    scroll_speed: f64,
    scroll_offset: i32,
    combined_pattern_width: i32,
    paused: bool,
    completed: bool,
    on_complete: Option<OnComplete>,
    loaded: Rc<Cell<u8>>,
    offset_ready: bool,
    composite: Option<TileComposite>,
    pattern: Option<Pattern>,
    builds: usize,
}

impl Transition {
    /// Creates an unconfigured transition and listens for both dither sprites.
    ///
    /// # Arguments
    /// * `heavy` - Dense dither tile, painted next to the black fill
    /// * `light` - Sparse dither tile, painted next to the scene
    pub fn new(heavy: Sprite, light: Sprite) -> Self {
        let loaded = Rc::new(Cell::new(0u8));
        for sprite in [&heavy, &light] {
            let counter = Rc::clone(&loaded);
            let locator = sprite.locator();
            sprite.when_loaded(move |outcome| match outcome {
                Ok(_) => counter.set(counter.get().saturating_add(1)),
                Err(err) => warn!(%locator, %err, "dither sprite unavailable, transition stays paused"),
            });
        }

        Self {
            heavy,
            light,
            direction: None,
            scroll_speed: DEFAULT_SCROLL_SPEED,
            scroll_offset: 0,
            combined_pattern_width: 0,
            paused: true,
            completed: false,
            on_complete: None,
            loaded,
            offset_ready: false,
            composite: None,
            pattern: None,
            builds: 0,
        }
    }

    /// Resets the transition and sets up a new wipe.
    ///
    /// Any pending callback from a previous configuration is dropped unfired.
    /// Sprite loads and a matching cached composite are kept.
    ///
    /// # Arguments
    /// * `direction` - Wipe direction
    /// * `on_complete` - Invoked once when the wipe finishes
    /// * `scroll_speed` - World pixels per tick, scaled by the camera's global scale
    pub fn configure(
        &mut self,
        direction: Direction,
        on_complete: Option<OnComplete>,
        scroll_speed: f64,
    ) {
        self.clear();
        self.direction = Some(direction);
        self.on_complete = on_complete;
        self.scroll_speed = scroll_speed;
        debug!(?direction, scroll_speed, "transition configured");
    }

    /// [`Transition::configure`] with no callback and the default speed.
    pub fn configure_default(&mut self, direction: Direction) {
        self.configure(direction, None, DEFAULT_SCROLL_SPEED);
    }

    /// Starts scrolling.
    ///
    /// # Errors
    /// [`TransitionError::NotConfigured`] if no direction has been set
    pub fn begin(&mut self) -> Result<(), TransitionError> {
        if self.direction.is_none() {
            return Err(TransitionError::NotConfigured);
        }
        self.paused = false;
        debug!(direction = ?self.direction, "transition begun");
        Ok(())
    }

    /// Returns to the unconfigured state, discarding any pending callback.
    pub fn clear(&mut self) {
        self.paused = true;
        self.completed = false;
        self.direction = None;
        self.scroll_offset = 0;
        self.offset_ready = false;
        self.on_complete = None;
    }

    /// Advances the wipe by one tick.
    ///
    /// Does nothing while paused, after completion or before both sprites have
    /// loaded. The step is `camera.scale(scroll_speed)` regardless of `_dt`.
    pub fn update(&mut self, _dt: f64, camera: &Camera) {
        let ready = self.resolve(camera);
        if self.paused || self.completed || !ready {
            return;
        }
        let Some(direction) = self.direction else {
            return;
        };

        let step = camera.scale(self.scroll_speed);
        let viewport_width = to_i32(camera.viewport_width);
        let done = if direction.scrolls_right() {
            self.scroll_offset = self.scroll_offset.saturating_add(step);
            self.scroll_offset >= viewport_width
        } else {
            self.scroll_offset = self.scroll_offset.saturating_sub(step);
            self.scroll_offset.saturating_add(self.combined_pattern_width) <= 0
        };

        if done {
            self.completed = true;
            // Rightward wipes keep drawing their final frame; leftward ones stop.
            self.paused = !direction.scrolls_right();
            debug!(?direction, offset = self.scroll_offset, "transition completed");
            if let Some(on_complete) = self.on_complete.take() {
                on_complete();
            }
        }

        // An odd offset keeps the tiled pattern free of a one pixel seam.
        if self.scroll_offset % 2 == 0 {
            self.scroll_offset = if direction.scrolls_right() {
                self.scroll_offset.saturating_add(1)
            } else {
                self.scroll_offset.saturating_sub(1)
            };
        }
    }

    /// Paints the black fill and the dither pattern over the viewport.
    ///
    /// Does nothing while paused or while the pattern is unavailable. A completed
    /// rightward wipe stays unpaused and keeps painting its final frame until
    /// cleared. If the surface refuses the pattern the frame is skipped and
    /// retried next time.
    pub fn draw(&mut self, surface: &mut dyn Surface, camera: &Camera) {
        let ready = self.resolve(camera);
        if !ready || self.paused {
            return;
        }
        let Some(direction) = self.direction else {
            return;
        };

        if self.pattern.is_none() {
            let Some(composite) = &self.composite else {
                return;
            };
            match surface.create_pattern(&composite.image) {
                Ok(pattern) => self.pattern = Some(pattern),
                Err(err) => {
                    warn!(%err, "skipping transition frame");
                    return;
                }
            }
        }
        let Some(pattern) = &self.pattern else {
            return;
        };

        let viewport_width = to_i32(camera.viewport_width);
        let viewport_height = to_i32(camera.viewport_height);
        let scroll = self.scroll_offset;
        let combined = self.combined_pattern_width;

        let (start, width) = if direction.black_on_left() {
            (0, scroll.clamp(0, viewport_width))
        } else {
            let start = scroll.saturating_add(combined).max(0);
            (start, viewport_width.saturating_sub(start))
        };
        if width > 0 {
            surface.fill_rect(start, 0, width, viewport_height, Color::BLACK);
        }

        surface.save();
        surface.translate(scroll, 0);
        surface.fill_pattern(pattern, 0, 0, combined, viewport_height);
        surface.restore();
    }

    /// Whether the wipe has begun and not yet completed.
    pub fn is_active(&self) -> bool {
        !self.paused && !self.completed
    }

    /// Current lifecycle stage.
    pub fn phase(&self) -> TransitionPhase {
        if self.direction.is_none() {
            TransitionPhase::Unconfigured
        } else if self.completed {
            TransitionPhase::Completed
        } else if !self.paused {
            TransitionPhase::Active
        } else if self.loaded.get() < 2 {
            TransitionPhase::Configuring
        } else {
            TransitionPhase::Ready
        }
    }

    /// Configured direction.
    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    /// Horizontal translation of the pattern in device pixels.
    pub fn scroll_offset(&self) -> i32 {
        self.scroll_offset
    }

    /// Width of one `heavy + light` period in device pixels, 0 until derived.
    pub fn combined_pattern_width(&self) -> i32 {
        self.combined_pattern_width
    }

    /// Derives geometry and the composite once both sprites are loaded.
    ///
    /// # Returns
    /// `true` if a composite for the current scale and direction is available
    fn resolve(&mut self, camera: &Camera) -> bool {
        if self.loaded.get() != 2 {
            return false;
        }
        let Some(direction) = self.direction else {
            return false;
        };

        let natural = f64::from(self.heavy.width()) + f64::from(self.light.width());
        self.combined_pattern_width = camera.scale(natural);

        if !self.offset_ready {
            self.scroll_offset = if direction.scrolls_right() {
                -self.combined_pattern_width
            } else {
                camera.scale(f64::from(camera.viewport_width))
            };
            self.offset_ready = true;
        }

        let scale = camera.global_scale();
        let order = direction.tile_order();
        let stale = self
            .composite
            .as_ref()
            .is_none_or(|composite| !composite.matches(scale, order));
        if stale {
            let (Some(heavy), Some(light)) = (self.heavy.image(), self.light.image()) else {
                return false;
            };
            self.pattern = None;
            self.composite = match assemble(&heavy, &light, scale, order) {
                Ok(composite) => {
                    self.builds += 1;
                    debug!(scale, ?order, width = composite.image.width(), "dither composite built");
                    Some(composite)
                }
                Err(err) => {
                    warn!(%err, "dither composite unavailable");
                    None
                }
            };
        }
        self.composite.is_some()
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("direction", &self.direction)
            .field("phase", &self.phase())
            .field("scroll_offset", &self.scroll_offset)
            .field("combined_pattern_width", &self.combined_pattern_width)
            .field("scroll_speed", &self.scroll_speed)
            .field("has_callback", &self.on_complete.is_some())
            .finish()
    }
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
