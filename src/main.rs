mod app;
mod config;

use std::path::Path;

use crate::app::App;
use crate::config::ViewerConfig;
use atrium_runtime::Graphics;
use winit::event_loop::EventLoop;

fn run_app(event_loop: EventLoop<Graphics>, mut app: App) {
    let _ = event_loop.run_app(&mut app);
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ViewerConfig::load_or_default(Path::new("atrium.toml"))?;

    let event_loop = EventLoop::<Graphics>::with_user_event().build()?;
    let app = App::new(&event_loop, config.into_settings());
    run_app(event_loop, app);
    Ok(())
}
