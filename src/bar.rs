// filepath: src/bar.rs
//! Bar state and frame composition for lintel

use lintel::config::{BarConfig, Palette};
use lintel::draw::DrawError;
use lintel::{Font, Surface};
use log::{debug, info};
use smithay_client_toolkit::{
    output::OutputState,
    registry::RegistryState,
    shell::{
        wlr_layer::{Anchor, KeyboardInteractivity, LayerSurface},
        WaylandSurface,
    },
    shm::{slot::SlotPool, Shm},
};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use wayland_client::protocol::wl_shm;

/// Nominal width used until the compositor tells us the real one.
pub const INITIAL_WIDTH: u32 = 800;

/// Horizontal padding around the clock text.
const PADDING: u32 = 10;

pub struct BarState {
    registry_state: RegistryState,
    output_state: OutputState,
    shm_state: Shm,
    layer_surface: Option<LayerSurface>,
    pool: SlotPool,
    width: u32,
    height: u32,
    configured: bool,
    palette: Palette,
    font: Font,
    // The frame is composed offscreen in `back`, then published into
    // `frame` with a single region copy before it is encoded for wl_shm.
    back: Surface,
    frame: Surface,
    last_draw: Option<Instant>,
}

impl BarState {
    pub fn new(
        registry_state: RegistryState,
        output_state: OutputState,
        shm_state: Shm,
        layer_surface: LayerSurface,
        pool: SlotPool,
        config: &BarConfig,
        palette: Palette,
        font: Font,
    ) -> Result<Self, DrawError> {
        info!("Configuring layer surface");
        layer_surface.set_anchor(Anchor::TOP | Anchor::LEFT | Anchor::RIGHT);
        layer_surface.set_keyboard_interactivity(KeyboardInteractivity::None);
        layer_surface.set_size(0, config.height);
        layer_surface.set_exclusive_zone(config.height as i32);
        layer_surface.set_margin(0, 0, 0, 0);
        info!("Committing layer surface configuration");
        layer_surface.wl_surface().commit();

        let back = Surface::new(INITIAL_WIDTH, config.height)?;
        let frame = Surface::new(INITIAL_WIDTH, config.height)?;

        Ok(Self {
            registry_state,
            output_state,
            shm_state,
            layer_surface: Some(layer_surface),
            pool,
            width: INITIAL_WIDTH,
            height: config.height,
            configured: false,
            palette,
            font,
            back,
            frame,
            last_draw: None,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    pub fn set_configured(&mut self, configured: bool) {
        self.configured = configured;
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn update_size(&mut self, width: u32, height: u32) -> Result<(), DrawError> {
        if width == self.width && height == self.height {
            return Ok(());
        }
        self.width = width;
        self.height = height;
        self.back.resize(width, height)?;
        self.frame.resize(width, height)?;
        Ok(())
    }

    fn status_text(&self) -> String {
        // Simple implementation that shows HH:MM:SS
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let hours = (now / 3600) % 24;
        let minutes = (now / 60) % 60;
        let seconds = now % 60;

        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    }

    pub fn draw(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        debug!("BarState::draw: drawing surface");

        if !self.configured {
            debug!("draw() called before surface is configured, skipping");
            return Ok(());
        }
        let now = Instant::now();
        if let Some(last_draw) = self.last_draw {
            if now.duration_since(last_draw) < Duration::from_millis(16) {
                return Ok(());
            }
        }
        self.last_draw = Some(now);
        info!("Drawing surface {}x{}", self.width, self.height);

        let width = self.width;
        let height = self.height;

        self.back.clear(self.palette.background);

        let text = self.status_text();
        let text_width = self.font.measure(&text);
        let text_x = width.saturating_sub(text_width + PADDING) as i32;
        let text_y = (height as i32 - self.font.height() as i32) / 2;
        self.back.rectangle(
            self.palette.separator,
            text_x - PADDING as i32,
            0,
            1,
            height,
        );
        self.back.text(
            &self.font,
            &text,
            self.palette.foreground,
            self.palette.background,
            text_x,
            text_y,
            text_width + PADDING,
        );

        self.frame.copy_from(&self.back, 0, 0, 0, 0, width, height);

        let stride = width * 4;
        let (buffer, canvas) = self.pool.create_buffer(
            width as i32,
            height as i32,
            stride as i32,
            wl_shm::Format::Argb8888,
        )?;
        self.frame.write_argb8888(canvas);

        if let Some(layer_surface) = &self.layer_surface {
            buffer.attach_to(layer_surface.wl_surface())?;
            layer_surface
                .wl_surface()
                .damage_buffer(0, 0, width as i32, height as i32);
            layer_surface.wl_surface().commit();
        }

        Ok(())
    }

    pub fn registry_state(&mut self) -> &mut RegistryState {
        &mut self.registry_state
    }

    pub fn output_state(&mut self) -> &mut OutputState {
        &mut self.output_state
    }

    pub fn shm_state(&mut self) -> &mut Shm {
        &mut self.shm_state
    }

    pub fn close_layer_surface(&mut self) {
        self.layer_surface = None;
        info!("Layer surface closed");
    }
}
