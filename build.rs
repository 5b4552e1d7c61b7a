use std::env;
use std::path::Path;

use image::{Rgba, RgbaImage};

/// Side length of the generated dither tiles in source pixels.
const DITHER_SIZE: u32 = 16;
/// Side length of the generated marker sprite in source pixels.
const MARKER_SIZE: u32 = 9;

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = env::var("OUT_DIR")?;
    let out_dir = Path::new(&out_dir);

    println!("cargo:rerun-if-changed=build.rs");

    // Heavy dither: everything black except one pixel in every 2x2 block.
    let heavy = RgbaImage::from_fn(DITHER_SIZE, DITHER_SIZE, |x, y| {
        if x % 2 == 0 && y % 2 == 0 { CLEAR } else { BLACK }
    });
    heavy.save(out_dir.join("dither_heavy.png"))?;

    // Light dither: the inverse, a single black pixel per 2x2 block.
    let light = RgbaImage::from_fn(DITHER_SIZE, DITHER_SIZE, |x, y| {
        if x % 2 == 0 && y % 2 == 0 { BLACK } else { CLEAR }
    });
    light.save(out_dir.join("dither_light.png"))?;

    // Marker: a small outlined diamond used by the demo scene.
    let centre = (MARKER_SIZE / 2) as i32;
    let marker = RgbaImage::from_fn(MARKER_SIZE, MARKER_SIZE, |x, y| {
        let distance = (x as i32 - centre).abs() + (y as i32 - centre).abs();
        match distance {
            d if d == centre => Rgba([255, 236, 39, 255]),
            d if d < centre => Rgba([255, 119, 168, 255]),
            _ => CLEAR,
        }
    });
    marker.save(out_dir.join("marker.png"))?;

    Ok(())
}
