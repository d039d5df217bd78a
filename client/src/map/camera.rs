//! Map camera for viewport management, edge panning, and cursor-anchored zoom

use crate::config::{EDGE_SCROLL_SPEED, MAX_ZOOM, MIN_ZOOM, ZOOM_STEP};

/// Map camera state
///
/// Screen and world points are related by
/// `screen = (world - target) * zoom + offset`.
#[derive(Clone, Debug, PartialEq)]
pub struct MapCamera {
    /// World-space point the camera is focused on
    pub target: (f32, f32),

    /// Screen-space point where `target` is drawn
    pub offset: (f32, f32),

    /// Current zoom factor, kept within [MIN_ZOOM, MAX_ZOOM]
    pub zoom: f32,

    /// Viewport size in pixels
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl MapCamera {
    /// Camera centered on a viewport at zoom 1
    pub fn new(width: u32, height: u32) -> Self {
        let mut camera = Self {
            target: (0.0, 0.0),
            offset: (0.0, 0.0),
            zoom: MIN_ZOOM,
            viewport_width: width,
            viewport_height: height,
        };
        camera.recenter(width, height);
        camera
    }

    /// Update viewport size and move both anchors to its midpoint
    pub fn recenter(&mut self, width: u32, height: u32) {
        self.viewport_width = width;
        self.viewport_height = height;
        let mid = ((width / 2) as f32, (height / 2) as f32);
        self.offset = mid;
        self.target = mid;
    }

    /// Convert screen coordinates to world coordinates
    pub fn screen_to_world(&self, screen: (f32, f32)) -> (f32, f32) {
        (
            (screen.0 - self.offset.0) / self.zoom + self.target.0,
            (screen.1 - self.offset.1) / self.zoom + self.target.1,
        )
    }

    /// Convert world coordinates to screen coordinates
    pub fn world_to_screen(&self, world: (f32, f32)) -> (f32, f32) {
        (
            (world.0 - self.target.0) * self.zoom + self.offset.0,
            (world.1 - self.target.1) * self.zoom + self.offset.1,
        )
    }

    /// Pan by a screen-space delta
    pub fn pan(&mut self, delta: (f32, f32)) {
        self.target.0 += delta.0 / -self.zoom;
        self.target.1 += delta.1 / -self.zoom;
    }

    /// Keep the target inside the world rectangle
    pub fn clamp_to_bounds(&mut self, world_width: f32, world_height: f32) {
        self.target.0 = self.target.0.clamp(0.0, world_width.max(0.0));
        self.target.1 = self.target.1.clamp(0.0, world_height.max(0.0));
    }

    /// Zoom by wheel steps, keeping the world point under `screen` fixed
    pub fn zoom_at(&mut self, screen: (f32, f32), wheel: f32) {
        if wheel == 0.0 {
            return;
        }

        self.target = self.screen_to_world(screen);
        self.offset = screen;

        let mut scale = 1.0 + ZOOM_STEP * wheel.abs();
        if wheel < 0.0 {
            scale = 1.0 / scale;
        }
        self.zoom = (self.zoom * scale).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Constant-speed scroll when the cursor rests near a viewport edge
    pub fn edge_scroll_delta(&self, cursor: (f32, f32)) -> (f32, f32) {
        (
            edge_axis(cursor.0, self.viewport_width),
            edge_axis(cursor.1, self.viewport_height),
        )
    }
}

fn edge_axis(position: f32, extent: u32) -> f32 {
    let low = (extent / 10) as f32;
    let high = (extent * 9 / 10) as f32;
    if position < low {
        EDGE_SCROLL_SPEED
    } else if position > high {
        -EDGE_SCROLL_SPEED
    } else {
        0.0
    }
}

impl Default for MapCamera {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_WINDOW_WIDTH, crate::config::DEFAULT_WINDOW_HEIGHT)
    }
}
