//! egui overlay: camera debug markers and the pick readout panel

use egui::{Align2, Color32, Context, FontId, Id, LayerId, Order, Pos2, Rect, Vec2};

use super::highlight::Pick;
use super::view::MapView;
use crate::config::{MARKER_COLOR, PANEL_COLOR};

const FONT_SIZE: f32 = 20.0;
const SWATCH_RADIUS: f32 = 20.0;

/// Text lines shown in the info panel for a pick
pub fn panel_lines(view: &MapView, pick: &Pick) -> Vec<String> {
    let [r, g, b, _] = pick.color.0;
    let mut lines = vec![format!("{}, {}, {}", r, g, b)];
    if let Some(region) = view.region(pick) {
        lines.push(format!(
            "{} {} ({})",
            region.name, region.owner_id, region.owner_name
        ));
    }
    lines
}

/// Screen positions, in points, of the camera target and offset markers
pub fn marker_positions(view: &MapView, pixels_per_point: f32) -> [Pos2; 2] {
    // Camera math is in physical pixels, egui paints in points
    [view.camera.target, view.camera.offset].map(|anchor| {
        let (x, y) = view.camera.world_to_screen(anchor);
        Pos2::new(x / pixels_per_point, y / pixels_per_point)
    })
}

/// Paint markers and the info panel for this frame
///
/// Both share one layer above the map and its highlight; the panel is
/// painted last so it covers any marker that falls under it.
pub fn draw(ctx: &Context, view: &MapView, pick: &Pick) {
    let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("map_overlay")));

    let marker_color = Color32::from_rgb(MARKER_COLOR[0], MARKER_COLOR[1], MARKER_COLOR[2]);
    for position in marker_positions(view, ctx.pixels_per_point()) {
        painter.text(
            position,
            Align2::LEFT_TOP,
            "+",
            FontId::proportional(FONT_SIZE),
            marker_color,
        );
    }

    let screen = ctx.screen_rect();
    let size = Vec2::new(screen.width() / 6.0, screen.height() / 6.0);
    let panel = Rect::from_min_size(Pos2::new(0.0, screen.height() - size.y), size);

    painter.rect_filled(
        panel,
        0.0,
        Color32::from_rgb(PANEL_COLOR[0], PANEL_COLOR[1], PANEL_COLOR[2]),
    );

    let lines = panel_lines(view, pick);
    painter.text(
        panel.left_top(),
        Align2::LEFT_TOP,
        &lines[0],
        FontId::proportional(FONT_SIZE),
        Color32::WHITE,
    );

    let [r, g, b, a] = pick.color.0;
    painter.circle_filled(
        Pos2::new(screen.width() / 12.0, screen.height() - size.y / 3.0),
        SWATCH_RADIUS,
        Color32::from_rgba_unmultiplied(r, g, b, a),
    );

    if let Some(region_line) = lines.get(1) {
        painter.text(
            Pos2::new(0.0, screen.height() - size.y / 2.0),
            Align2::LEFT_TOP,
            region_line,
            FontId::proportional(FONT_SIZE),
            Color32::WHITE,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::region::{RecordPolicy, RegionCatalog};
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_panel_lines() {
        let catalog =
            RegionCatalog::parse("Galicia,0,255,0,1,UK\n", RecordPolicy::Strict).unwrap();
        let view = MapView::new(catalog, RgbaImage::new(1, 1), 100, 100);

        let hit = Pick {
            color: Rgba([0, 255, 0, 255]),
            region: Some(0),
        };
        assert_eq!(panel_lines(&view, &hit), ["0, 255, 0", "Galicia 1 (UK)"]);

        let background = Pick {
            color: Rgba([7, 8, 9, 255]),
            region: None,
        };
        assert_eq!(panel_lines(&view, &background), ["7, 8, 9"]);
    }

    #[test]
    fn test_marker_positions_follow_camera() {
        let mut view = MapView::new(RegionCatalog::default(), RgbaImage::new(1, 1), 800, 500);
        assert_eq!(
            marker_positions(&view, 1.0),
            [Pos2::new(400.0, 250.0), Pos2::new(400.0, 250.0)]
        );

        // Zooming at the cursor moves the offset there; both anchors stay under it
        view.camera.zoom_at((100.0, 50.0), 4.0);
        let [target, offset] = marker_positions(&view, 2.0);
        assert_eq!(offset, Pos2::new(50.0, 25.0));
        assert!((target - offset).length() < 1e-3);
    }
}
