//! Cursor picking against the lookup image and the per-frame highlight mask

use image::{Rgba, RgbaImage};

use super::region::RegionCatalog;
use crate::config::HIGHLIGHT_COLOR;

/// Fully transparent pixel
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Result of sampling the lookup image under the cursor
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pick {
    /// Raw lookup color (transparent when the cursor is off the map)
    pub color: Rgba<u8>,
    /// Index of the matching region in the catalog
    pub region: Option<usize>,
}

impl Pick {
    pub fn miss() -> Self {
        Self {
            color: TRANSPARENT,
            region: None,
        }
    }
}

/// Map a world point to a lookup-image pixel.
///
/// The map spans `[0, world_size]` in world space. A point on the far edge
/// rounds to the last pixel; anything outside the map is `None`.
pub fn image_pixel_for_world(
    world: (f32, f32),
    world_size: (f32, f32),
    image_size: (u32, u32),
) -> Option<(u32, u32)> {
    let (width, height) = image_size;
    if width == 0 || height == 0 || world_size.0 <= 0.0 || world_size.1 <= 0.0 {
        return None;
    }

    let fx = world.0 / world_size.0 * width as f32;
    let fy = world.1 / world_size.1 * height as f32;
    if !(0.0..=width as f32).contains(&fx) || !(0.0..=height as f32).contains(&fy) {
        return None;
    }

    Some(((fx as u32).min(width - 1), (fy as u32).min(height - 1)))
}

/// Sample the lookup image at a world point and resolve the region
pub fn pick(
    lookup: &RgbaImage,
    catalog: &RegionCatalog,
    world: (f32, f32),
    world_size: (f32, f32),
) -> Pick {
    let Some((x, y)) = image_pixel_for_world(world, world_size, lookup.dimensions()) else {
        return Pick::miss();
    };

    let color = *lookup.get_pixel(x, y);
    Pick {
        color,
        region: catalog.find_index_by_color(color),
    }
}

/// Build the overlay isolating the picked region.
///
/// Pixels of the picked region become the translucent highlight color and
/// every other pixel becomes transparent. A color that belongs to no region
/// yields an all-transparent mask.
pub fn compute_highlight(lookup: &RgbaImage, catalog: &RegionCatalog, picked: Rgba<u8>) -> RgbaImage {
    let (width, height) = lookup.dimensions();
    let mut mask = RgbaImage::from_pixel(width, height, TRANSPARENT);

    if catalog.find_by_color(picked).is_none() {
        return mask;
    }

    for (source, target) in lookup.pixels().zip(mask.pixels_mut()) {
        if *source == picked {
            *target = HIGHLIGHT_COLOR;
        }
    }
    mask
}
