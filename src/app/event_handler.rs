//! Event handler module for pixelroom.
//!
//! Contains the App struct and its event handling logic.

use std::sync::Arc;

use tracing::{error, info};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::ActiveEventLoop,
    window::{Window, WindowId},
};

use crate::app::app_state::AppState;
use crate::config::SceneConfig;
use crate::error::{RenderError, StartupError};

/// Main application struct that manages the window lifecycle and event handling.
///
/// # Lifecycle
/// 1. Created with `App::new()`, which initializes the WGPU instance
/// 2. `resumed` creates the window, the surface and the application state
/// 3. Events are handled via the [`ApplicationHandler`] trait methods
/// 4. Closing the window tears the scene down and exits the loop
pub struct App {
    /// The WGPU instance for graphics operations.
    pub instance: wgpu::Instance,
    /// The current application state, None until initialized.
    pub state: Option<AppState>,
    /// The application window, None until created.
    pub window: Option<Arc<Window>>,
    config: SceneConfig,
}

impl App {
    /// Creates a new [`App`] with the default WGPU configuration.
    pub fn new(config: SceneConfig) -> Self {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        Self {
            instance,
            state: None,
            window: None,
            config,
        }
    }

    /// Creates the surface for `window` and initializes the application state.
    ///
    /// # Errors
    /// [`StartupError`] if the surface, device or scene cannot be set up
    pub async fn set_window(&mut self, window: Window) -> Result<(), StartupError> {
        let window = Arc::new(window);
        let surface = self
            .instance
            .create_surface(window.clone())
            .map_err(RenderError::from)?;

        let state = AppState::new(&self.instance, surface, &window, self.config.clone()).await?;

        self.window.get_or_insert(window);
        self.state.get_or_insert(state);
        Ok(())
    }

    /// Handles window resize events. Zero sizes are ignored.
    pub fn handle_resized(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        match &mut self.state {
            Some(state) => state.resize_surface(width, height),
            None => error!("cannot resize surface without state initialized"),
        }
    }

    /// Runs one frame and schedules the next.
    fn handle_redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if let Err(err) = state.render() {
            error!(%err, "stopping after presentation failure");
            self.shutdown(event_loop);
        }
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(state) = self.state.take() {
            state.shutdown();
        }
        self.window = None;
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    /// Creates the window on first resume. Failures are logged and end the loop.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let window_config = &self.config.window;
        let attributes = Window::default_attributes()
            .with_title(window_config.title.clone())
            .with_inner_size(PhysicalSize::new(window_config.width, window_config.height));

        let window = match event_loop.create_window(attributes) {
            Ok(window) => window,
            Err(err) => {
                error!(%err, "failed to create window");
                event_loop.exit();
                return;
            }
        };
        if let Err(err) = pollster::block_on(self.set_window(window)) {
            error!(%err, "failed to initialize application state");
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("the close button was pressed; stopping");
                self.shutdown(event_loop);
            }

            WindowEvent::Resized(new_size) => {
                self.handle_resized(new_size.width, new_size.height);
            }

            WindowEvent::RedrawRequested => {
                self.handle_redraw(event_loop);
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
