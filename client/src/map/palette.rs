//! Owner palette and the owner-colored display image

use std::collections::HashMap;

use image::{Rgba, RgbaImage};
use log::warn;

use super::region::{pack_color, RegionCatalog};

/// Display color for each owner, indexed by owner id
#[derive(Clone, Debug, PartialEq)]
pub struct OwnerPalette {
    colors: Vec<Rgba<u8>>,
}

impl OwnerPalette {
    pub fn new(colors: Vec<Rgba<u8>>) -> Self {
        Self { colors }
    }

    pub fn from_rgb(colors: &[[u8; 3]]) -> Self {
        Self::new(colors.iter().map(|&[r, g, b]| Rgba([r, g, b, 255])).collect())
    }

    pub fn color_for(&self, owner_id: u32) -> Option<Rgba<u8>> {
        self.colors.get(owner_id as usize).copied()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl Default for OwnerPalette {
    fn default() -> Self {
        Self::from_rgb(&crate::config::DEFAULT_OWNER_COLORS)
    }
}

/// Recolor every region in the lookup image with its owner's color.
///
/// Pixels that match no region are copied unchanged. A region whose owner
/// has no palette entry keeps its identifying color.
pub fn build_owner_colored_image(
    lookup: &RgbaImage,
    catalog: &RegionCatalog,
    palette: &OwnerPalette,
) -> RgbaImage {
    let mut remap: HashMap<u32, Rgba<u8>> = HashMap::with_capacity(catalog.len());
    for region in catalog.regions() {
        match palette.color_for(region.owner_id) {
            Some(color) => {
                remap.insert(pack_color(region.color), color);
            }
            None => warn!(
                "Region '{}' has owner {} outside the palette ({} owners)",
                region.name,
                region.owner_id,
                palette.len()
            ),
        }
    }

    let mut out = lookup.clone();
    for pixel in out.pixels_mut() {
        if let Some(&color) = remap.get(&pack_color(*pixel)) {
            *pixel = color;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::region::RecordPolicy;

    fn catalog() -> RegionCatalog {
        RegionCatalog::parse(
            "Andalusia,255,0,0,0,Spain\nGalicia,0,255,0,1,UK\nAlgarve,0,0,255,2,Portugal\n",
            RecordPolicy::Strict,
        )
        .unwrap()
    }

    #[test]
    fn test_recolors_every_region_pixel() {
        let background = Rgba([10, 20, 30, 255]);
        let colors = [
            Rgba([255, 0, 0, 255]),
            Rgba([0, 255, 0, 255]),
            Rgba([0, 0, 255, 255]),
            background,
        ];
        let lookup = RgbaImage::from_fn(8, 6, |x, y| colors[((x + y) % 4) as usize]);

        let catalog = catalog();
        let palette = OwnerPalette::default();
        let out = build_owner_colored_image(&lookup, &catalog, &palette);

        assert_eq!(out.dimensions(), lookup.dimensions());
        for (original, recolored) in lookup.pixels().zip(out.pixels()) {
            match catalog.find_by_color(*original) {
                Some(region) => {
                    assert_eq!(*recolored, palette.color_for(region.owner_id).unwrap())
                }
                None => assert_eq!(recolored, original),
            }
        }
    }

    #[test]
    fn test_owner_outside_palette_is_unchanged() {
        let catalog = RegionCatalog::parse("Ceuta,9,9,9,7,Nobody\n", RecordPolicy::Strict).unwrap();
        let lookup = RgbaImage::from_pixel(2, 2, Rgba([9, 9, 9, 255]));

        let out = build_owner_colored_image(&lookup, &catalog, &OwnerPalette::default());
        assert_eq!(out, lookup);
    }

    #[test]
    fn test_empty_catalog_copies_image() {
        let lookup = RgbaImage::from_pixel(3, 1, Rgba([255, 0, 0, 255]));
        let out = build_owner_colored_image(&lookup, &RegionCatalog::default(), &OwnerPalette::default());
        assert_eq!(out, lookup);
    }
}
