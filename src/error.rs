//! Error types shared across the crate.
//!
//! Only configuration misuse ([`TransitionError::NotConfigured`]) is meant to reach the
//! caller as a programmer error. Everything else degrades to a skipped frame or an
//! unloaded sprite and is reported through `tracing`.

use thiserror::Error;

/// Failure to fetch or decode an image resource.
///
/// Cloned into every listener waiting on the same sprite.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The resource could not be read.
    #[error("failed to read `{locator}`: {reason}")]
    Io {
        /// Locator of the resource.
        locator: String,
        /// Underlying I/O error message.
        reason: String,
    },
    /// The resource was read but is not a decodable image.
    #[error("failed to decode `{locator}`: {reason}")]
    Decode {
        /// Locator of the resource.
        locator: String,
        /// Underlying decoder error message.
        reason: String,
    },
    /// The background worker could not be started or went away.
    #[error("loader worker for `{locator}` failed: {reason}")]
    Worker {
        /// Locator of the resource.
        locator: String,
        /// Why the worker failed.
        reason: String,
    },
}

/// Misuse of the transition API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// `begin` was called before `configure`.
    #[error("the transition hasn't been configured")]
    NotConfigured,
    /// A transition is already running; the running one is left untouched.
    #[error("a transition is already active")]
    AlreadyActive,
    /// The room has no transition installed.
    #[error("no transition installed in this room")]
    NoTransition,
}

/// A drawing resource could not be obtained for this frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    /// Offscreen composite or pattern could not be created.
    #[error("surface resource unavailable: {0}")]
    Unavailable(String),
}

/// Failure to load or validate a [`crate::config::SceneConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The config file is not valid TOML for this schema.
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// The config parsed but holds unusable values.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Failure in the wgpu presentation path of the host.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The window surface could not be created.
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    /// No adapter is compatible with the surface.
    #[error("no compatible graphics adapter")]
    NoAdapter,
    /// The adapter refused to hand out a device.
    #[error("failed to request device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    /// The surface reports no usable texture format.
    #[error("surface exposes no texture formats")]
    NoSurfaceFormat,
    /// The swap chain texture could not be acquired this frame.
    #[error("surface texture unavailable: {0}")]
    SurfaceLost(#[from] wgpu::SurfaceError),
}

/// Failure while bringing up the host's per-window state.
#[derive(Debug, Error)]
pub enum StartupError {
    /// The graphics stack could not be initialized.
    #[error(transparent)]
    Render(#[from] RenderError),
    /// The first wipe could not be started.
    #[error(transparent)]
    Scene(#[from] TransitionError),
}
