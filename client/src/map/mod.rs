//! Region map system: lookup image, owner-colored display and cursor highlight

pub mod camera;
pub mod highlight;
pub mod overlay;
pub mod palette;
pub mod region;
pub mod renderer;
pub mod view;

use std::path::Path;

use image::RgbaImage;
use log::{error, info};

use highlight::{Pick, TRANSPARENT};
use palette::OwnerPalette;
use region::{RecordPolicy, RegionCatalog};
use renderer::{MapRenderer, MapTexture};
use view::{FrameInput, MapView};

/// Load the region table, falling back to an empty catalog
pub fn load_catalog(path: &Path, policy: RecordPolicy) -> RegionCatalog {
    match RegionCatalog::load(path, policy) {
        Ok(catalog) => {
            info!("Loaded {} regions from {}", catalog.len(), path.display());
            catalog
        }
        Err(e) => {
            error!(
                "Can't load region table {}: {}; continuing without regions",
                path.display(),
                e
            );
            RegionCatalog::default()
        }
    }
}

/// Load the base map, falling back to a single transparent pixel
pub fn load_lookup_image(path: &Path) -> RgbaImage {
    match image::open(path) {
        Ok(img) => {
            let rgba = img.to_rgba8();
            info!(
                "Loaded map {} ({}x{})",
                path.display(),
                rgba.width(),
                rgba.height()
            );
            rgba
        }
        Err(e) => {
            error!("Can't load map image {}: {}", path.display(), e);
            RgbaImage::from_pixel(1, 1, TRANSPARENT)
        }
    }
}

/// Integrated map system
pub struct MapSystem {
    pub view: MapView,
    renderer: MapRenderer,
    display: MapTexture,

    /// Pick and mask computed in update, consumed by render
    pick: Pick,
    mask: Option<RgbaImage>,
}

impl MapSystem {
    /// Build the display texture once and keep the lookup image for picking
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texture_format: wgpu::TextureFormat,
        view: MapView,
        palette: &OwnerPalette,
    ) -> Self {
        let renderer = MapRenderer::new(device, texture_format);

        // CPU copy is dropped once uploaded
        let display = {
            let owner_colored = view.owner_colored_image(palette);
            renderer.create_texture(device, queue, &owner_colored, "Display Texture")
        };

        Self {
            view,
            renderer,
            display,
            pick: Pick::miss(),
            mask: None,
        }
    }

    /// Update camera, pick and highlight mask (call each frame)
    pub fn update(&mut self, input: &FrameInput) {
        let frame = self.view.advance(input);
        self.pick = frame.pick;
        self.mask = Some(frame.mask);
    }

    /// Upload this frame's highlight mask; the texture lives until dropped
    pub fn prepare_highlight(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) -> Option<MapTexture> {
        self.mask
            .take()
            .map(|mask| self.renderer.create_texture(device, queue, &mask, "Highlight Texture"))
    }

    /// Render the map and, on top, the highlight
    pub fn render(
        &self,
        render_pass: &mut wgpu::RenderPass<'_>,
        device: &wgpu::Device,
        highlight: Option<&MapTexture>,
    ) {
        let world_size = self.view.world_size();
        let camera = &self.view.camera;

        self.renderer
            .render(render_pass, device, &self.display, camera, world_size);

        if let Some(texture) = highlight {
            self.renderer
                .render(render_pass, device, texture, camera, world_size);
        }
    }

    /// Handle viewport resize
    pub fn resize(&mut self, width: u32, height: u32) {
        self.view.resize(width, height);
    }

    /// Result of the most recent pick
    pub fn pick(&self) -> &Pick {
        &self.pick
    }
}
