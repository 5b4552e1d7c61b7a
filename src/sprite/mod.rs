//! Shared, asynchronously loaded image handles.
//!
//! A [`Sprite`] is created unloaded and settles exactly once, either with decoded
//! pixels or with a [`LoadError`]. Settling happens on the host thread, inside
//! [`AssetLoader::pump`] or [`AssetLoader::finish`], never during construction.

mod loader;

pub use loader::{AssetLoader, Fetcher};

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use image::RgbaImage;
use tracing::debug;

use crate::error::LoadError;

/// Outcome handed to load listeners: natural `(width, height)` or the failure.
pub type LoadOutcome = Result<(u32, u32), LoadError>;

type Listener = Box<dyn FnOnce(LoadOutcome)>;

/// Where a sprite is in its single load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// The fetch is in flight.
    Pending,
    /// Pixels are available.
    Loaded,
    /// The fetch failed; the sprite stays unloaded.
    Failed(LoadError),
}

pub(crate) struct SpriteInner {
    locator: String,
    scale: f64,
    state: LoadState,
    image: Option<Rc<RgbaImage>>,
    listeners: Vec<Listener>,
}

/// Reference-counted image resource handle.
///
/// Clones share the same resource: the load state, the pixels and the local
/// display `scale` are visible through every clone.
#[derive(Clone)]
pub struct Sprite {
    inner: Rc<RefCell<SpriteInner>>,
}

impl Sprite {
    /// Creates a sprite and starts loading `locator` on `loader` immediately.
    ///
    /// # Arguments
    /// * `locator` - Resource reference understood by the loader's fetch function
    /// * `scale` - Sprite-local display multiplier on top of the camera's global scale
    /// * `loader` - Loader that owns the fetch
    pub fn load(locator: impl Into<String>, scale: f64, loader: &mut AssetLoader) -> Self {
        let sprite = Self::detached(locator, scale);
        loader.start(&sprite);
        sprite
    }

    /// Wraps already decoded pixels. The sprite is loaded from birth.
    pub fn from_image(locator: impl Into<String>, image: RgbaImage, scale: f64) -> Self {
        let sprite = Self::detached(locator, scale);
        {
            let mut inner = sprite.inner.borrow_mut();
            inner.image = Some(Rc::new(image));
            inner.state = LoadState::Loaded;
        }
        sprite
    }

    /// A pending sprite with no fetch attached.
    pub(crate) fn detached(locator: impl Into<String>, scale: f64) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SpriteInner {
                locator: locator.into(),
                scale,
                state: LoadState::Pending,
                image: None,
                listeners: Vec::new(),
            })),
        }
    }

    pub(crate) fn downgrade(&self) -> std::rc::Weak<RefCell<SpriteInner>> {
        Rc::downgrade(&self.inner)
    }

    pub(crate) fn from_inner(inner: Rc<RefCell<SpriteInner>>) -> Self {
        Self { inner }
    }

    /// Applies the outcome of the one load. Later calls are ignored.
    ///
    /// Listeners run after the internal borrow is released, so they may freely
    /// query this sprite.
    pub(crate) fn settle(&self, result: Result<RgbaImage, LoadError>) {
        let (listeners, outcome) = {
            let mut inner = self.inner.borrow_mut();
            if inner.state != LoadState::Pending {
                debug!(locator = %inner.locator, "ignoring second settle of sprite");
                return;
            }
            let outcome = match result {
                Ok(image) => {
                    let dimensions = image.dimensions();
                    inner.image = Some(Rc::new(image));
                    inner.state = LoadState::Loaded;
                    debug!(locator = %inner.locator, ?dimensions, "sprite loaded");
                    Ok(dimensions)
                }
                Err(err) => {
                    inner.state = LoadState::Failed(err.clone());
                    Err(err)
                }
            };
            (std::mem::take(&mut inner.listeners), outcome)
        };

        for listener in listeners {
            listener(outcome.clone());
        }
    }

    /// Registers a callback for the load outcome.
    ///
    /// Runs immediately if the sprite has already settled, otherwise exactly once
    /// when it does.
    pub fn when_loaded(&self, listener: impl FnOnce(LoadOutcome) + 'static) {
        let outcome = {
            let mut inner = self.inner.borrow_mut();
            match inner.state.clone() {
                LoadState::Pending => {
                    inner.listeners.push(Box::new(listener));
                    return;
                }
                LoadState::Loaded => Ok(inner
                    .image
                    .as_ref()
                    .map(|image| image.dimensions())
                    .unwrap_or_default()),
                LoadState::Failed(err) => Err(err),
            }
        };
        listener(outcome);
    }

    /// Resource reference this sprite was created from.
    pub fn locator(&self) -> String {
        self.inner.borrow().locator.clone()
    }

    /// Current load state.
    pub fn state(&self) -> LoadState {
        self.inner.borrow().state.clone()
    }

    /// Whether pixels are available.
    pub fn is_loaded(&self) -> bool {
        self.inner.borrow().state == LoadState::Loaded
    }

    /// Natural width in pixels, 0 until loaded.
    pub fn width(&self) -> u32 {
        self.inner.borrow().image.as_ref().map_or(0, |image| image.width())
    }

    /// Natural height in pixels, 0 until loaded.
    pub fn height(&self) -> u32 {
        self.inner.borrow().image.as_ref().map_or(0, |image| image.height())
    }

    /// Sprite-local display multiplier.
    pub fn scale(&self) -> f64 {
        self.inner.borrow().scale
    }

    /// Sets the local display multiplier for every holder of this sprite.
    pub fn set_scale(&self, scale: f64) {
        self.inner.borrow_mut().scale = scale;
    }

    /// Decoded pixels, `None` until loaded.
    pub fn image(&self) -> Option<Rc<RgbaImage>> {
        self.inner.borrow().image.clone()
    }

    /// Whether two handles refer to the same resource.
    pub fn ptr_eq(&self, other: &Sprite) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Sprite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Sprite")
            .field("locator", &inner.locator)
            .field("scale", &inner.scale)
            .field("state", &inner.state)
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn failure() -> LoadError {
        LoadError::Io {
            locator: "missing.png".into(),
            reason: "not found".into(),
        }
    }

    /// Queued listeners run exactly once when the load settles.
    #[test]
    fn test_listeners_fire_once_on_settle() {
        let sprite = Sprite::detached("tile.png", 1.0);
        let calls = Rc::new(Cell::new(0));
        for _ in 0..2 {
            let calls = calls.clone();
            sprite.when_loaded(move |outcome| {
                assert_eq!(outcome, Ok((3, 5)));
                calls.set(calls.get() + 1);
            });
        }
        assert_eq!(calls.get(), 0);
        assert!(!sprite.is_loaded());
        assert_eq!((sprite.width(), sprite.height()), (0, 0));

        sprite.settle(Ok(RgbaImage::new(3, 5)));
        sprite.settle(Ok(RgbaImage::new(7, 7)));

        assert_eq!(calls.get(), 2);
        assert!(sprite.is_loaded());
        assert_eq!((sprite.width(), sprite.height()), (3, 5));
    }

    /// Registering after settle runs the listener immediately.
    #[test]
    fn test_when_loaded_after_settle_runs_immediately() {
        let sprite = Sprite::from_image("procedural", RgbaImage::new(4, 2), 2.0);
        let seen = Rc::new(Cell::new(None));
        let sink = seen.clone();
        sprite.when_loaded(move |outcome| sink.set(outcome.ok()));
        assert_eq!(seen.get(), Some((4, 2)));
    }

    /// Failed loads stay unloaded and hand the error to listeners.
    #[test]
    fn test_failed_load_reports_error() {
        let sprite = Sprite::detached("missing.png", 1.0);
        let errors = Rc::new(RefCell::new(Vec::new()));
        let sink = errors.clone();
        sprite.when_loaded(move |outcome| sink.borrow_mut().push(outcome));

        sprite.settle(Err(failure()));
        sprite.settle(Ok(RgbaImage::new(1, 1)));

        assert_eq!(*errors.borrow(), vec![Err(failure())]);
        assert_eq!(sprite.state(), LoadState::Failed(failure()));
        assert!(!sprite.is_loaded());
        assert!(sprite.image().is_none());

        let late = errors.clone();
        sprite.when_loaded(move |outcome| late.borrow_mut().push(outcome));
        assert_eq!(errors.borrow().len(), 2);
    }

    /// Scale changes are shared by every clone.
    #[test]
    fn test_scale_shared_between_clones() {
        let sprite = Sprite::from_image("a", RgbaImage::new(1, 1), 1.0);
        let other = sprite.clone();
        other.set_scale(3.0);
        assert_eq!(sprite.scale(), 3.0);
        assert!(sprite.ptr_eq(&other));
    }

    /// Listeners may query the sprite that is notifying them.
    #[test]
    fn test_listener_can_read_sprite() {
        let sprite = Sprite::detached("reentrant", 1.0);
        let handle = sprite.clone();
        let width = Rc::new(Cell::new(0));
        let sink = width.clone();
        sprite.when_loaded(move |_| sink.set(handle.width()));
        sprite.settle(Ok(RgbaImage::new(6, 1)));
        assert_eq!(width.get(), 6);
    }
}
