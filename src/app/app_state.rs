//! AppState module for pixelroom.
//!
//! This module defines the [`AppState`] struct, which holds everything needed while a
//! window is open: the GPU presenter and the scene it shows.

use std::time::Instant;

use tracing::error;
use winit::window::Window;

use crate::app::scene::SceneState;
use crate::config::SceneConfig;
use crate::error::{RenderError, StartupError};
use crate::renderer::Presenter;

/// Holds all state required while the window is open.
pub struct AppState {
    /// Uploads the canvas to the window each frame.
    pub presenter: Presenter,
    /// The running scene.
    pub scene: SceneState,
    /// When the previous frame started.
    pub last_frame: Instant,
}

impl AppState {
    /// Asynchronously creates a new [`AppState`] with an initialized presenter and scene.
    ///
    /// # Arguments
    /// - `instance`: The WGPU instance.
    /// - `surface`: The WGPU surface for rendering.
    /// - `window`: The application window.
    /// - `config`: Host configuration.
    pub async fn new(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'static>,
        window: &Window,
        config: SceneConfig,
    ) -> Result<Self, StartupError> {
        let size = window.inner_size();
        let presenter = Presenter::new(instance, surface, size.width, size.height).await?;
        let scene = SceneState::init(config, (size.width, size.height))?;

        Ok(Self {
            presenter,
            scene,
            last_frame: Instant::now(),
        })
    }

    /// Resizes the surface, canvas and camera. Zero sizes are ignored.
    ///
    /// # Arguments
    /// - `width`: New width of the surface.
    /// - `height`: New height of the surface.
    pub fn resize_surface(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.presenter.resize(width, height);
        self.scene.resize(width, height);
    }

    /// Advances the scene by the time since the last frame and presents it.
    ///
    /// # Errors
    /// [`RenderError`] if the surface can no longer be presented to
    pub fn render(&mut self) -> Result<(), RenderError> {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame);
        self.last_frame = now;

        self.scene.frame(dt.as_secs_f64());
        let canvas = self.scene.canvas();
        let result = self
            .presenter
            .present(canvas.as_bytes(), canvas.width(), canvas.height());
        if let Err(err) = &result {
            error!(%err, "frame presentation failed");
        }
        result
    }

    /// Tears the scene down and waits for the GPU to go idle.
    pub fn shutdown(self) {
        self.scene.teardown();
        let _ = self.presenter.device.poll(wgpu::Maintain::Wait);
    }
}
