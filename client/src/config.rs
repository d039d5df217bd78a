//! Command line options and viewer tuning constants

use std::path::PathBuf;

use clap::Parser;
use image::Rgba;

use crate::map::palette::OwnerPalette;
use crate::map::region::RecordPolicy;

pub const DEFAULT_WINDOW_WIDTH: u32 = 800;
pub const DEFAULT_WINDOW_HEIGHT: u32 = 500;
pub const WINDOW_TITLE: &str = "Map";
pub const DEFAULT_TARGET_FPS: u32 = 60;

// Camera
pub const MIN_ZOOM: f32 = 1.0;
pub const MAX_ZOOM: f32 = 5.0;
pub const ZOOM_STEP: f32 = 0.25; // per wheel notch
pub const EDGE_SCROLL_SPEED: f32 = 10.0; // pixels per frame
pub const PIXELS_PER_WHEEL_STEP: f32 = 50.0; // touchpads report pixel deltas

// Colors
pub const DEFAULT_OWNER_COLORS: [[u8; 3]; 3] = [
    [212, 182, 82],  // Spain
    [177, 87, 73],   // UK
    [100, 137, 103], // Portugal
];
pub const HIGHLIGHT_COLOR: Rgba<u8> = Rgba([255, 255, 255, 60]);
pub const BACKGROUND_COLOR: [u8; 3] = [88, 109, 139];
pub const PANEL_COLOR: [u8; 3] = [211, 176, 131];
pub const MARKER_COLOR: [u8; 3] = [230, 41, 55];

/// Interactive region map viewer
#[derive(Parser, Debug, Clone)]
#[command(name = "provmap")]
#[command(about = "Pan and zoom a region map, highlighting the region under the cursor", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Region table: name,r,g,b,owner_id,owner_name per line
    #[arg(long, default_value = "information.csv")]
    pub regions: PathBuf,

    /// Base map image with one flat color per region
    #[arg(long, default_value = "spain.png")]
    pub map: PathBuf,

    /// Windowed width in pixels
    #[arg(long, default_value_t = DEFAULT_WINDOW_WIDTH)]
    pub width: u32,

    /// Windowed height in pixels
    #[arg(long, default_value_t = DEFAULT_WINDOW_HEIGHT)]
    pub height: u32,

    /// Target frame rate
    #[arg(long, default_value_t = DEFAULT_TARGET_FPS, value_parser = clap::value_parser!(u32).range(1..))]
    pub fps: u32,

    /// Abort on malformed or duplicate region records instead of skipping them
    #[arg(long)]
    pub strict: bool,

    /// Owner display color as R,G,B; repeat once per owner id in order
    #[arg(long = "owner-color", value_parser = parse_rgb)]
    pub owner_colors: Vec<[u8; 3]>,
}

impl Cli {
    pub fn record_policy(&self) -> RecordPolicy {
        if self.strict {
            RecordPolicy::Strict
        } else {
            RecordPolicy::Skip
        }
    }

    pub fn palette(&self) -> OwnerPalette {
        if self.owner_colors.is_empty() {
            OwnerPalette::default()
        } else {
            OwnerPalette::from_rgb(&self.owner_colors)
        }
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.width.max(1), self.height.max(1))
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self::parse_from(["provmap"])
    }
}

fn parse_rgb(value: &str) -> Result<[u8; 3], String> {
    let channels = value
        .split(',')
        .map(|c| c.trim().parse::<u8>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid color '{}': {}", value, e))?;

    match channels.as_slice() {
        &[r, g, b] => Ok([r, g, b]),
        _ => Err(format!("expected R,G,B, got '{}'", value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::default();
        assert_eq!(cli.regions, PathBuf::from("information.csv"));
        assert_eq!(cli.window_size(), (800, 500));
        assert_eq!(cli.fps, 60);
        assert_eq!(cli.record_policy(), RecordPolicy::Skip);
        assert_eq!(cli.palette(), OwnerPalette::default());
    }

    #[test]
    fn test_owner_colors() {
        let cli = Cli::parse_from([
            "provmap",
            "--owner-color",
            "1,2,3",
            "--owner-color",
            " 4, 5 ,6",
            "--strict",
        ]);
        let palette = cli.palette();
        assert_eq!(palette.len(), 2);
        assert_eq!(palette.color_for(1), Some(Rgba([4, 5, 6, 255])));
        assert_eq!(cli.record_policy(), RecordPolicy::Strict);
    }

    #[test]
    fn test_rejects_bad_color() {
        assert!(parse_rgb("1,2").is_err());
        assert!(parse_rgb("1,2,300").is_err());
        assert!(Cli::try_parse_from(["provmap", "--fps", "0"]).is_err());
    }
}
