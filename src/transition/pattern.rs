//! Offscreen composite of the two dither tiles.

use image::{RgbaImage, imageops};

use crate::error::SurfaceError;

/// Which dither tile sits at the left edge of the pattern period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileOrder {
    /// `heavy | light`
    HeavyFirst,
    /// `light | heavy`
    LightFirst,
}

/// Two pattern periods of scaled dither tiles laid side by side.
#[derive(Debug, Clone)]
pub struct TileComposite {
    /// Composite pixels, `2 * period_width` wide.
    pub image: RgbaImage,
    /// Global scale the tiles were magnified by.
    pub scale: u32,
    /// Tile order the composite was built with.
    pub order: TileOrder,
    /// Width of one `heavy + light` period in device pixels.
    pub period_width: u32,
}

impl TileComposite {
    /// Whether this composite was built for the given scale and order.
    pub fn matches(&self, scale: u32, order: TileOrder) -> bool {
        self.scale == scale && self.order == order
    }
}

/// Builds the composite for one scale and tile order.
///
/// Each tile is magnified by `scale` with nearest-neighbour sampling. The result is
/// as tall as the taller scaled tile; the shorter one leaves transparent rows below it.
///
/// # Errors
/// [`SurfaceError::Unavailable`] if either tile is empty or the composite would
/// exceed `u32` dimensions
pub fn assemble(
    heavy: &RgbaImage,
    light: &RgbaImage,
    scale: u32,
    order: TileOrder,
) -> Result<TileComposite, SurfaceError> {
    let heavy = magnify(heavy, scale)?;
    let light = magnify(light, scale)?;
    let (first, second) = match order {
        TileOrder::HeavyFirst => (&heavy, &light),
        TileOrder::LightFirst => (&light, &heavy),
    };

    let period_width = first
        .width()
        .checked_add(second.width())
        .ok_or_else(|| SurfaceError::Unavailable("dither period overflows".into()))?;
    let width = period_width
        .checked_mul(2)
        .ok_or_else(|| SurfaceError::Unavailable("dither composite overflows".into()))?;
    let height = first.height().max(second.height());

    let mut image = RgbaImage::new(width, height);
    for period in 0..2 {
        let left = i64::from(period_width) * period;
        imageops::replace(&mut image, first, left, 0);
        imageops::replace(&mut image, second, left + i64::from(first.width()), 0);
    }

    Ok(TileComposite {
        image,
        scale,
        order,
        period_width,
    })
}

fn magnify(tile: &RgbaImage, scale: u32) -> Result<RgbaImage, SurfaceError> {
    let (width, height) = tile.dimensions();
    let scaled = width
        .checked_mul(scale)
        .zip(height.checked_mul(scale))
        .filter(|&(w, h)| w > 0 && h > 0);
    let Some((scaled_width, scaled_height)) = scaled else {
        return Err(SurfaceError::Unavailable(format!(
            "cannot magnify {width}x{height} dither tile by {scale}"
        )));
    };
    Ok(imageops::resize(
        tile,
        scaled_width,
        scaled_height,
        imageops::FilterType::Nearest,
    ))
}
