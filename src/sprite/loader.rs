//! Background image fetching for sprites.

use std::cell::RefCell;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Weak;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use image::{ImageError, RgbaImage};
use tracing::{debug, error, warn};

use super::{Sprite, SpriteInner};
use crate::error::LoadError;

/// Fetch-and-decode function run on a worker thread.
pub type Fetcher = Arc<dyn Fn(&str) -> Result<RgbaImage, LoadError> + Send + Sync>;

type Delivery = (u64, Result<RgbaImage, LoadError>);

/// Starts one background fetch per sprite and applies outcomes on the host thread.
///
/// Each [`Sprite::load`] spawns a worker that runs the fetch function and sends the
/// result back over a channel. Nothing reaches a sprite until the host calls
/// [`AssetLoader::pump`] or [`AssetLoader::finish`].
pub struct AssetLoader {
    fetcher: Fetcher,
    sender: Sender<Delivery>,
    receiver: Receiver<Delivery>,
    pending: HashMap<u64, Weak<RefCell<SpriteInner>>>,
    next_ticket: u64,
}

impl AssetLoader {
    /// Creates a loader that reads and decodes image files from disk.
    pub fn new() -> Self {
        Self::with_fetcher(Arc::new(decode_file))
    }

    /// Creates a loader with a custom fetch function.
    pub fn with_fetcher(fetcher: Fetcher) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            fetcher,
            sender,
            receiver,
            pending: HashMap::new(),
            next_ticket: 0,
        }
    }

    /// Number of started loads not yet delivered.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub(super) fn start(&mut self, sprite: &Sprite) {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.pending.insert(ticket, sprite.downgrade());

        let locator = sprite.locator();
        let fetcher = Arc::clone(&self.fetcher);
        let sender = self.sender.clone();
        let spawned = thread::Builder::new()
            .name(format!("asset-{ticket}"))
            .spawn({
                let locator = locator.clone();
                move || {
                    let result = panic::catch_unwind(AssertUnwindSafe(|| fetcher(&locator)))
                        .unwrap_or_else(|_| {
                            Err(LoadError::Worker {
                                locator: locator.clone(),
                                reason: "fetch panicked".into(),
                            })
                        });
                    // The loader may already be gone; nothing to deliver to then.
                    let _ = sender.send((ticket, result));
                }
            });

        match spawned {
            Ok(_) => debug!(%locator, ticket, "sprite load started"),
            Err(err) => {
                let failure = LoadError::Worker {
                    locator,
                    reason: err.to_string(),
                };
                let _ = self.sender.send((ticket, Err(failure)));
            }
        }
    }

    /// Delivers every finished load without blocking.
    ///
    /// # Returns
    /// Number of loads delivered, including those whose sprite was dropped
    pub fn pump(&mut self) -> usize {
        let mut delivered = 0;
        while let Ok((ticket, result)) = self.receiver.try_recv() {
            self.deliver(ticket, result);
            delivered += 1;
        }
        delivered
    }

    /// Blocks until every started load has been delivered.
    ///
    /// # Returns
    /// Number of loads delivered
    pub fn finish(&mut self) -> usize {
        let mut delivered = 0;
        while !self.pending.is_empty() {
            match self.receiver.recv() {
                Ok((ticket, result)) => {
                    self.deliver(ticket, result);
                    delivered += 1;
                }
                Err(_) => break,
            }
        }
        delivered
    }

    fn deliver(&mut self, ticket: u64, result: Result<RgbaImage, LoadError>) {
        let Some(weak) = self.pending.remove(&ticket) else {
            warn!(ticket, "delivery for unknown load ticket");
            return;
        };
        if let Err(err) = &result {
            error!(%err, "sprite failed to load");
        }
        match weak.upgrade() {
            Some(inner) => Sprite::from_inner(inner).settle(result),
            None => debug!(ticket, "discarding load for dropped sprite"),
        }
    }
}

impl Default for AssetLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_file(locator: &str) -> Result<RgbaImage, LoadError> {
    match image::open(locator) {
        Ok(image) => Ok(image.to_rgba8()),
        Err(ImageError::IoError(err)) => Err(LoadError::Io {
            locator: locator.to_string(),
            reason: err.to_string(),
        }),
        Err(err) => Err(LoadError::Decode {
            locator: locator.to_string(),
            reason: err.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprite::LoadState;
    use std::cell::Cell;
    use std::rc::Rc;

    fn solid_fetcher() -> Fetcher {
        Arc::new(|locator: &str| match locator {
            "missing" => Err(LoadError::Io {
                locator: locator.to_string(),
                reason: "not found".into(),
            }),
            _ => Ok(RgbaImage::new(locator.len() as u32, 2)),
        })
    }

    /// Loads never settle during construction, only when the host delivers them.
    #[test]
    fn test_load_settles_on_finish() {
        let mut loader = AssetLoader::with_fetcher(solid_fetcher());
        let sprite = Sprite::load("abcd", 1.0, &mut loader);
        let fired = Rc::new(Cell::new(false));
        let sink = fired.clone();
        sprite.when_loaded(move |outcome| {
            assert_eq!(outcome, Ok((4, 2)));
            sink.set(true);
        });

        assert_eq!(sprite.state(), LoadState::Pending);
        assert_eq!(loader.pending(), 1);

        assert_eq!(loader.finish(), 1);
        assert!(fired.get());
        assert!(sprite.is_loaded());
        assert_eq!(loader.pending(), 0);
        assert_eq!(loader.pump(), 0);
    }

    /// Fetch failures leave the sprite permanently failed.
    #[test]
    fn test_failed_fetch_marks_sprite_failed() {
        let mut loader = AssetLoader::with_fetcher(solid_fetcher());
        let good = Sprite::load("ok", 1.0, &mut loader);
        let bad = Sprite::load("missing", 1.0, &mut loader);
        loader.finish();

        assert!(good.is_loaded());
        assert!(matches!(bad.state(), LoadState::Failed(LoadError::Io { .. })));
        assert_eq!(bad.width(), 0);
    }

    /// Results for dropped sprites are discarded.
    #[test]
    fn test_dropped_sprite_is_skipped() {
        let mut loader = AssetLoader::with_fetcher(solid_fetcher());
        drop(Sprite::load("gone", 1.0, &mut loader));
        assert_eq!(loader.finish(), 1);
        assert_eq!(loader.pending(), 0);
    }

    /// A panicking fetch is reported as a worker failure instead of hanging.
    #[test]
    fn test_panicking_fetch_becomes_worker_error() {
        let mut loader =
            AssetLoader::with_fetcher(Arc::new(|_: &str| -> Result<RgbaImage, LoadError> {
                panic!("boom")
            }));
        let sprite = Sprite::load("x", 1.0, &mut loader);
        loader.finish();
        assert!(matches!(sprite.state(), LoadState::Failed(LoadError::Worker { .. })));
    }

    /// The default fetcher decodes PNG files and reports missing ones as I/O errors.
    #[test]
    fn test_disk_fetcher_reads_png() {
        let path = std::env::temp_dir().join(format!("pixelroom-loader-{}.png", std::process::id()));
        RgbaImage::new(5, 3).save(&path).expect("write temp png");

        let mut loader = AssetLoader::new();
        let sprite = Sprite::load(path.to_string_lossy(), 1.0, &mut loader);
        let missing = Sprite::load("/definitely/not/here.png", 1.0, &mut loader);
        loader.finish();
        let _ = std::fs::remove_file(&path);

        assert_eq!((sprite.width(), sprite.height()), (5, 3));
        assert!(matches!(missing.state(), LoadState::Failed(LoadError::Io { .. })));
    }
}
