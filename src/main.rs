// filepath: src/main.rs

mod bar;
mod wayland;

use bar::{BarState, INITIAL_WIDTH};
use lintel::config::BarConfig;
use lintel::Font;
use log::info;
use smithay_client_toolkit::{
    compositor::CompositorState,
    output::OutputState,
    registry::RegistryState,
    shell::wlr_layer::{Layer, LayerShell},
    shm::{slot::SlotPool, Shm},
};
use std::thread;
use std::time::{Duration, Instant};
use wayland_client::{globals::registry_queue_init, Connection};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("Starting lintel");

    let config = BarConfig::load_from_file().unwrap_or_default();
    let palette = config.palette()?;
    let font = Font::load_or_fallback(config.font.path.as_deref(), config.font.size)?;
    info!("Configuration loaded");

    let conn = Connection::connect_to_env()?;
    let (globals, mut event_queue) = registry_queue_init(&conn)?;
    let qh = event_queue.handle();

    let compositor = CompositorState::bind(&globals, &qh)?;
    let layer_shell = LayerShell::bind(&globals, &qh)?;
    let shm = Shm::bind(&globals, &qh)?;

    let pool_size = (INITIAL_WIDTH * config.height * 4) as usize;
    let pool = SlotPool::new(pool_size, &shm)?;

    let surface = compositor.create_surface(&qh);
    let layer_surface =
        layer_shell.create_layer_surface(&qh, surface, Layer::Top, Some("lintel"), None);

    let mut bar = BarState::new(
        RegistryState::new(&globals),
        OutputState::new(&globals, &qh),
        shm,
        layer_surface,
        pool,
        &config,
        palette,
        font,
    )?;

    info!("Performing initial round-trip");
    event_queue.roundtrip(&mut bar)?;

    info!("Entering event loop");
    let mut last_update = Instant::now();
    loop {
        event_queue.dispatch_pending(&mut bar)?;

        // Sleep for a short time to avoid busy-waiting
        thread::sleep(Duration::from_millis(50));

        // Redraw once per second for the clock
        if last_update.elapsed() >= Duration::from_secs(1) {
            if bar.is_configured() {
                let _ = bar.draw();
            }
            last_update = Instant::now();
        }
    }
}
