//! pixelroom demo host.
//!
//! Opens a window and shows a small pixel-art room while looping through the
//! configured sequence of dither wipes. Settings come from `$PIXELROOM_CONFIG` or
//! `pixelroom.toml` (see [`pixelroom::config`]); `RUST_LOG` overrides the
//! configured log filter.

use anyhow::{Context, Result};
use pixelroom::app::App;
use pixelroom::config::SceneConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;
use winit::event_loop::{ControlFlow, EventLoop};

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

fn main() -> Result<()> {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    let (config, source) = SceneConfig::load().context("failed to load configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!(source = %source, "configuration loaded");
    info!(
        title = %config.window.title,
        sequence = ?config.transition.sequence,
        "starting"
    );
    pollster::block_on(run(config))
}

/// Creates the event loop and runs the app until the window closes.
async fn run(config: SceneConfig) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app).context("event loop failed")?;
    Ok(())
}
