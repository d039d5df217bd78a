//! CPU side of a frame: camera update, picking and highlight mask

use image::RgbaImage;
use log::trace;

use super::camera::MapCamera;
use super::highlight::{compute_highlight, pick, Pick};
use super::palette::{build_owner_colored_image, OwnerPalette};
use super::region::{Region, RegionCatalog};

/// Input gathered since the previous frame
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInput {
    /// Cursor position in physical pixels
    pub cursor: (f32, f32),
    /// Accumulated wheel steps (positive zooms in)
    pub wheel: f32,
}

/// Everything the draw step needs for one frame
#[derive(Debug)]
pub struct Frame {
    pub pick: Pick,
    /// Transient overlay, dropped once drawn
    pub mask: RgbaImage,
}

/// Map state that persists across frames
pub struct MapView {
    pub camera: MapCamera,
    catalog: RegionCatalog,
    lookup: RgbaImage,
}

impl MapView {
    pub fn new(catalog: RegionCatalog, lookup: RgbaImage, viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            camera: MapCamera::new(viewport_width, viewport_height),
            catalog,
            lookup,
        }
    }

    /// Window resized or fullscreen toggled
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.recenter(width, height);
    }

    /// World extent covered by the map; it spans the current viewport
    pub fn world_size(&self) -> (f32, f32) {
        (
            self.camera.viewport_width as f32,
            self.camera.viewport_height as f32,
        )
    }

    /// Owner-colored version of the lookup image for the display texture
    pub fn owner_colored_image(&self, palette: &OwnerPalette) -> RgbaImage {
        build_owner_colored_image(&self.lookup, &self.catalog, palette)
    }

    /// Advance camera and picking by one frame
    pub fn advance(&mut self, input: &FrameInput) -> Frame {
        let (world_w, world_h) = self.world_size();

        let delta = self.camera.edge_scroll_delta(input.cursor);
        self.camera.pan(delta);
        self.camera.clamp_to_bounds(world_w, world_h);

        self.camera.zoom_at(input.cursor, input.wheel);

        let world = self.camera.screen_to_world(input.cursor);
        let pick = pick(&self.lookup, &self.catalog, world, (world_w, world_h));
        let mask = compute_highlight(&self.lookup, &self.catalog, pick.color);

        trace!(
            "cursor {:?} world {:?} target {:?} offset {:?} zoom {:.3} pick {:?}",
            input.cursor,
            world,
            self.camera.target,
            self.camera.offset,
            self.camera.zoom,
            pick.color.0
        );

        Frame { pick, mask }
    }

    pub fn region(&self, pick: &Pick) -> Option<&Region> {
        pick.region.and_then(|index| self.catalog.get(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HIGHLIGHT_COLOR;
    use crate::map::highlight::TRANSPARENT;
    use crate::map::region::RecordPolicy;
    use image::Rgba;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn quad_view(width: u32, height: u32) -> MapView {
        let catalog = RegionCatalog::parse(
            "NW,255,0,0,0,Spain\nNE,0,255,0,1,UK\nSW,0,0,255,2,Portugal\nSE,255,255,255,0,Spain\n",
            RecordPolicy::Strict,
        )
        .unwrap();
        let lookup = RgbaImage::from_fn(2, 2, |x, y| [[RED, GREEN], [BLUE, WHITE]][y as usize][x as usize]);
        MapView::new(catalog, lookup, width, height)
    }

    fn still(cursor: (f32, f32)) -> FrameInput {
        FrameInput { cursor, wheel: 0.0 }
    }

    #[test]
    fn test_round_trip_pick_2x2() {
        let mut view = quad_view(400, 400);
        let expected = [
            ((100.0, 100.0), "NW", 0),
            ((300.0, 100.0), "NE", 1),
            ((100.0, 300.0), "SW", 2),
            ((300.0, 300.0), "SE", 0),
        ];

        for (world, name, owner) in expected {
            let screen = view.camera.world_to_screen(world);
            let frame = view.advance(&still(screen));
            let region = view.region(&frame.pick).unwrap();
            assert_eq!(region.name, name);
            assert_eq!(region.owner_id, owner);
        }
    }

    #[test]
    fn test_round_trip_pick_after_zoom() {
        let mut view = quad_view(400, 400);
        view.advance(&FrameInput {
            cursor: (150.0, 250.0),
            wheel: 4.0,
        });
        assert!(view.camera.zoom > 1.0);

        for (world, name) in [((120.0, 160.0), "NW"), ((230.0, 260.0), "SE")] {
            let screen = view.camera.world_to_screen(world);
            let frame = view.advance(&still(screen));
            assert_eq!(view.region(&frame.pick).unwrap().name, name);
        }
    }

    #[test]
    fn test_mask_follows_pick() {
        let mut view = quad_view(400, 400);
        let frame = view.advance(&still((300.0, 100.0)));
        assert_eq!(frame.pick.color, GREEN);
        assert_eq!(frame.mask.get_pixel(1, 0), &HIGHLIGHT_COLOR);
        for (x, y) in [(0, 0), (0, 1), (1, 1)] {
            assert_eq!(frame.mask.get_pixel(x, y), &TRANSPARENT);
        }

        // Next frame over a different region rebuilds from scratch
        let frame = view.advance(&still((100.0, 300.0)));
        assert_eq!(frame.mask.get_pixel(0, 1), &HIGHLIGHT_COLOR);
        assert_eq!(frame.mask.get_pixel(1, 0), &TRANSPARENT);
    }

    #[test]
    fn test_edge_cursor_pans_and_stays_in_bounds() {
        let mut view = quad_view(400, 400);
        for _ in 0..200 {
            view.advance(&still((0.0, 399.0)));
        }
        assert_eq!(view.camera.target, (0.0, 400.0));
    }

    #[test]
    fn test_empty_catalog_degrades() {
        let lookup = RgbaImage::from_pixel(2, 2, RED);
        let mut view = MapView::new(RegionCatalog::default(), lookup, 400, 400);
        let frame = view.advance(&still((200.0, 200.0)));
        assert_eq!(frame.pick.color, RED);
        assert!(view.region(&frame.pick).is_none());
        assert!(frame.mask.pixels().all(|p| *p == TRANSPARENT));
    }

    #[test]
    fn test_resize_recenters() {
        let mut view = quad_view(400, 400);
        view.advance(&FrameInput {
            cursor: (50.0, 60.0),
            wheel: 2.0,
        });
        view.resize(1000, 600);
        assert_eq!(view.world_size(), (1000.0, 600.0));
        assert_eq!(view.camera.target, (500.0, 300.0));
        assert_eq!(view.camera.offset, (500.0, 300.0));
    }

    #[test]
    fn test_camera_persists_until_resize() {
        let mut view = quad_view(400, 400);
        view.advance(&FrameInput {
            cursor: (150.0, 250.0),
            wheel: 3.0,
        });
        let camera = view.camera.clone();

        // Frames without a resize keep pan and zoom
        for _ in 0..10 {
            view.advance(&still((200.0, 200.0)));
        }
        assert_eq!(view.camera.zoom, camera.zoom);
        assert_eq!(view.camera.target, camera.target);
        assert_eq!(view.camera.offset, camera.offset);

        view.resize(400, 400);
        assert_eq!(view.camera.target, (200.0, 200.0));
    }

    #[test]
    fn test_scenario_andalusia_galicia() {
        let dir = tempfile::tempdir().unwrap();
        let table = dir.path().join("information.csv");
        std::fs::write(&table, "Andalusia,255,0,0,0,Spain\nGalicia,0,255,0,1,UK\n").unwrap();

        let catalog = RegionCatalog::load(&table, RecordPolicy::Strict).unwrap();
        let lookup = RgbaImage::from_fn(2, 1, |x, _| if x == 0 { RED } else { GREEN });
        let mut view = MapView::new(catalog, lookup, 200, 100);

        let palette = OwnerPalette::default();
        let display = view.owner_colored_image(&palette);
        assert_eq!(display.get_pixel(0, 0), &palette.color_for(0).unwrap());
        assert_eq!(display.get_pixel(1, 0), &palette.color_for(1).unwrap());
        assert_eq!(display.get_pixel(0, 0), &Rgba([212, 182, 82, 255]));

        // World (50, 50) lies over image pixel (0, 0)
        let screen = view.camera.world_to_screen((50.0, 50.0));
        let frame = view.advance(&still(screen));
        let region = view.region(&frame.pick).unwrap();
        assert_eq!(region.name, "Andalusia");
        assert_eq!(region.owner_id, 0);
    }
}
