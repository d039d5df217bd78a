//! Interactive region map viewer.
//!
//! Loads a flat-colored region map and a region table, recolors regions by
//! owner, and highlights the region under the cursor while the camera pans
//! with the cursor at the screen edges and zooms around the cursor.

pub mod app;
pub mod config;
pub mod map;
pub mod state;

use app::App;
use config::Cli;
use winit::event_loop::EventLoop;

/// Open the window and run the viewer until it is closed
pub fn run(cli: Cli) -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("provmap=info"))
        .init();

    let event_loop = EventLoop::new()?;
    let mut app = App::new(cli);
    event_loop.run_app(&mut app)?;

    match app.take_error() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
