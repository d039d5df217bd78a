use crate::config::{Cli, WINDOW_TITLE};
use crate::state::State;
use std::sync::Arc;
use log::{error, info};
use web_time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Fullscreen, Window, WindowId};

/// Fixed-rate frame scheduling
#[derive(Debug, Clone, Copy)]
pub struct FramePacer {
    interval: Duration,
    next_frame: Instant,
}

impl FramePacer {
    pub fn new(fps: u32, now: Instant) -> Self {
        Self {
            interval: Duration::from_secs(1) / fps.max(1),
            next_frame: now,
        }
    }

    /// Whether a frame is due at `now`
    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next_frame
    }

    /// Record a frame drawn at `now` and schedule the next one
    pub fn frame_drawn(&mut self, now: Instant) {
        self.next_frame += self.interval;
        // Don't try to catch up after a stall
        if self.next_frame < now {
            self.next_frame = now + self.interval;
        }
    }

    pub fn next_frame(&self) -> Instant {
        self.next_frame
    }
}

pub struct App {
    cli: Cli,
    pacer: FramePacer,
    state: Option<State>,
    error: Option<anyhow::Error>,
}

impl App {
    pub fn new(cli: Cli) -> Self {
        let pacer = FramePacer::new(cli.fps, Instant::now());
        Self {
            cli,
            pacer,
            state: None,
            error: None,
        }
    }

    /// Fatal error that stopped the event loop, if any
    pub fn take_error(&mut self) -> Option<anyhow::Error> {
        self.error.take()
    }

    fn toggle_fullscreen(&self, window: &Window) {
        if window.fullscreen().is_some() {
            let (width, height) = self.cli.window_size();
            window.set_fullscreen(None);
            let _ = window.request_inner_size(PhysicalSize::new(width, height));
            info!("Leaving fullscreen ({}x{})", width, height);
        } else {
            // Borderless on the current monitor takes its native resolution
            window.set_fullscreen(Some(Fullscreen::Borderless(None)));
            info!("Entering fullscreen");
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let (width, height) = self.cli.window_size();
        let window_attributes = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(PhysicalSize::new(width, height));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.error = Some(e.into());
                event_loop.exit();
                return;
            }
        };

        match pollster::block_on(State::new(window.clone(), &self.cli)) {
            Ok(state) => {
                window.request_redraw();
                self.state = Some(state);
            }
            Err(e) => {
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(state) = &self.state else {
            return;
        };

        if self.pacer.is_due(Instant::now()) {
            state.window.request_redraw();
        } else {
            event_loop.set_control_flow(ControlFlow::WaitUntil(self.pacer.next_frame()));
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _: WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(v) => v,
            None => return,
        };

        if state.handle_input(&event) {
            return;
        }
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                state.resize(width, height);
            }
            WindowEvent::RedrawRequested => {
                state.update();
                match state.render() {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        state.reconfigure_surface()
                    }
                    Err(e) => {
                        error!("render: {:?}", e);
                    }
                }
                self.pacer.frame_drawn(Instant::now());
            },
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => match key_code {
                KeyCode::Escape => event_loop.exit(),
                KeyCode::KeyF => {
                    let window = state.window.clone();
                    self.toggle_fullscreen(&window);
                }
                _ => {}
            },
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pacer_schedules_at_interval() {
        let start = Instant::now();
        let mut pacer = FramePacer::new(50, start);
        assert!(pacer.is_due(start));

        pacer.frame_drawn(start);
        assert_eq!(pacer.next_frame(), start + Duration::from_millis(20));
        assert!(!pacer.is_due(start + Duration::from_millis(19)));
        assert!(pacer.is_due(start + Duration::from_millis(20)));
    }

    #[test]
    fn test_pacer_skips_missed_frames() {
        let start = Instant::now();
        let mut pacer = FramePacer::new(50, start);
        pacer.frame_drawn(start);

        let late = start + Duration::from_millis(500);
        pacer.frame_drawn(late);
        assert_eq!(pacer.next_frame(), late + Duration::from_millis(20));
    }
}
