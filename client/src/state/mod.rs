use std::sync::Arc;
use egui::{Context, FullOutput};
use egui_wgpu::{Renderer, RendererOptions, ScreenDescriptor};
use log::warn;
use wgpu::{Backends, ExperimentalFeatures, Features, Instance, InstanceDescriptor, MemoryHints, SurfaceError, Trace};
use winit::dpi::PhysicalSize;
use winit::event::{MouseScrollDelta, WindowEvent};
use winit::window::Window;

use crate::config::{Cli, BACKGROUND_COLOR, PIXELS_PER_WHEEL_STEP};
use crate::map::view::{FrameInput, MapView};
use crate::map::{self, overlay, MapSystem};

// Everything the viewer owns for the lifetime of the window
pub struct State {
    pub window: Arc<Window>,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub is_surface_configured: bool,
    resize_request: Option<PhysicalSize<u32>>,
    map: MapSystem,
    input: FrameInput,
    ui_renderer: Renderer,
    egui_ctx: Context,
    egui_state: egui_winit::State,
    egui_output: Option<FullOutput>,
}

impl State {
    pub async fn new(window: Arc<Window>, cli: &Cli) -> anyhow::Result<Self> {
        let instance = Instance::new(&InstanceDescriptor {
            backends: Backends::all(),
            ..Default::default()
        });

        let surface: wgpu::Surface<'_> = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Main Device"),
                required_features: Features::empty(),
                required_limits: wgpu::Limits::default(),
                experimental_features: ExperimentalFeatures::disabled(),
                memory_hints: MemoryHints::Performance,
                trace: Trace::Off,
            })
            .await?;

        let cap: wgpu::SurfaceCapabilities = surface.get_capabilities(&adapter);

        let texture_format = cap
            .formats
            .iter()
            .find(|format| format.is_srgb())
            .copied()
            .unwrap_or(cap.formats[0]);

        let size = window.inner_size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: texture_format,
            width: size.width,
            height: size.height,
            present_mode: cap.present_modes[0],
            alpha_mode: cap.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let catalog = map::load_catalog(&cli.regions, cli.record_policy());
        let lookup = map::load_lookup_image(&cli.map);
        let view = MapView::new(catalog, lookup, size.width.max(1), size.height.max(1));
        let map = MapSystem::new(&device, &queue, texture_format, view, &cli.palette());

        let ui_renderer = Renderer::new(&device, texture_format, RendererOptions {
            msaa_samples: 0,
            depth_stencil_format: None,
            dithering: false,
            predictable_texture_filtering: false,
        });
        let egui_ctx = Context::default();

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            window.as_ref(),
            egui_ctx.native_pixels_per_point(),
            window.theme(),
            None,
        );

        // Start with the cursor at the middle so the first frame doesn't edge-scroll
        let input = FrameInput {
            cursor: ((size.width / 2) as f32, (size.height / 2) as f32),
            wheel: 0.0,
        };

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            is_surface_configured: false,
            resize_request: None,
            map,
            input,
            ui_renderer,
            egui_ctx,
            egui_state,
            egui_output: None,
        })
    }

    /// Window resized or fullscreen toggled: recenter the camera
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.map.resize(width, height);
            self.request_surface_size(width, height);
        }
    }

    /// Surface lost or outdated: reconfigure it, keeping the camera
    pub fn reconfigure_surface(&mut self) {
        self.request_surface_size(self.config.width, self.config.height);
    }

    fn request_surface_size(&mut self, width: u32, height: u32) {
        if !self.is_surface_configured {
            self.apply_size(width, height);
            self.is_surface_configured = true;
        } else {
            self.resize_request = Some(PhysicalSize::new(width, height));
        }
    }

    fn apply_size(&mut self, width: u32, height: u32) {
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
    }

    pub fn handle_input(&mut self, event: &WindowEvent) -> bool {
        let response = self.egui_state.on_window_event(self.window.as_ref(), event);
        if response.consumed {
            return true;
        }

        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.input.cursor = (position.x as f32, position.y as f32);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.input.wheel += match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_WHEEL_STEP,
                };
            }
            _ => {}
        }
        false
    }

    pub fn update(&mut self) {
        self.map.update(&self.input);
        self.input.wheel = 0.0;

        let input = self.egui_state.take_egui_input(self.window.as_ref());
        let view = &self.map.view;
        let pick = self.map.pick();
        let output = self.egui_ctx.run(input, |ctx| {
            overlay::draw(ctx, view, pick);
        });
        self.egui_output = Some(output);
    }

    pub fn render(&mut self) -> Result<(), SurfaceError> {
        if !self.is_surface_configured {
            return Ok(());
        }

        if let Some(PhysicalSize { width, height }) = self.resize_request.take() {
            self.apply_size(width, height)
        }

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(_) => {
                self.surface.configure(&self.device, &self.config);
                self.surface.get_current_texture()?
            }
        };

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });

        // Transient: released at the end of this frame
        let highlight = self.map.prepare_highlight(&self.device, &self.queue);

        let ui = self.egui_output.take().map(|output| {
            let FullOutput {
                platform_output,
                textures_delta,
                shapes,
                pixels_per_point,
                viewport_output
            } = output;

            for _ in viewport_output {
                warn!("Viewport change is not handled!")
            }

            self.egui_state.handle_platform_output(self.window.as_ref(), platform_output);

            for (id, delta) in &textures_delta.set {
                self.ui_renderer.update_texture(&self.device, &self.queue, *id, delta);
            }
            let descriptor = ScreenDescriptor {
                size_in_pixels: [self.config.width, self.config.height],
                pixels_per_point,
            };
            let primitives = self.egui_ctx.tessellate(shapes, pixels_per_point);
            self.ui_renderer.update_buffers(&self.device, &self.queue, &mut encoder, &primitives, &descriptor);

            (primitives, descriptor, textures_delta.free)
        });

        {
            let clear = BACKGROUND_COLOR.map(srgb_to_linear);
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color {
                                r: clear[0],
                                g: clear[1],
                                b: clear[2],
                                a: 1.0,
                            }),
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();

            self.map.render(&mut render_pass, &self.device, highlight.as_ref());

            if let Some((primitives, descriptor, _)) = &ui {
                self.ui_renderer.render(&mut render_pass, primitives, descriptor);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();

        if let Some((_, _, free)) = ui {
            for id in free {
                self.ui_renderer.free_texture(&id)
            }
        }

        drop(highlight);
        Ok(())
    }
}

/// Clear colors are linear; configuration colors are sRGB bytes
fn srgb_to_linear(channel: u8) -> f64 {
    let c = channel as f64 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
