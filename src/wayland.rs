// filepath: src/wayland.rs
//! Wayland protocol handlers for lintel

use crate::bar::BarState;
use log::{debug, error, info};
use smithay_client_toolkit::{
    compositor::CompositorHandler,
    delegate_compositor, delegate_layer, delegate_output, delegate_registry, delegate_shm,
    output::{OutputHandler, OutputState},
    registry::{ProvidesRegistryState, RegistryState},
    registry_handlers,
    shell::wlr_layer::{LayerShellHandler, LayerSurface, LayerSurfaceConfigure},
    shm::{Shm, ShmHandler},
};
use wayland_client::{
    protocol::{wl_output, wl_surface},
    Connection, QueueHandle,
};

impl CompositorHandler for BarState {
    fn surface_enter(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _output: &wl_output::WlOutput,
    ) {
        // No-op
    }

    fn surface_leave(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _output: &wl_output::WlOutput,
    ) {
        // No-op
    }

    fn scale_factor_changed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _new_factor: i32,
    ) {
        debug!("CompositorHandler: scale_factor_changed");
    }

    fn transform_changed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _new_transform: wl_output::Transform,
    ) {
        debug!("CompositorHandler: transform_changed");
    }

    fn frame(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _time: u32,
    ) {
        debug!("CompositorHandler: frame");
    }
}

impl OutputHandler for BarState {
    fn output_state(&mut self) -> &mut OutputState {
        self.output_state()
    }

    fn new_output(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _output: wl_output::WlOutput,
    ) {
        info!("OutputHandler: new_output");
    }

    fn update_output(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _output: wl_output::WlOutput,
    ) {
        info!("OutputHandler: update_output");
    }

    fn output_destroyed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _output: wl_output::WlOutput,
    ) {
        info!("OutputHandler: output_destroyed");
    }
}

impl LayerShellHandler for BarState {
    fn configure(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _layer: &LayerSurface,
        configure: LayerSurfaceConfigure,
        _serial: u32,
    ) {
        info!("LayerShellHandler: configure: {:?}", configure.new_size);

        let (mut width, mut height) = self.size();

        if configure.new_size.0 != 0 {
            width = configure.new_size.0;
        }
        if configure.new_size.1 != 0 {
            height = configure.new_size.1;
        }

        if let Err(err) = self.update_size(width, height) {
            error!("Failed to resize bar surfaces: {err}");
            return;
        }
        self.set_configured(true);

        if let Err(err) = self.draw() {
            error!("Failed to draw bar: {err}");
        }

        info!("Surface now configured with size: {}x{}", width, height);
    }

    fn closed(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _layer: &LayerSurface) {
        info!("LayerShellHandler: closed");
        self.close_layer_surface();
    }
}

impl ShmHandler for BarState {
    fn shm_state(&mut self) -> &mut Shm {
        self.shm_state()
    }
}

impl ProvidesRegistryState for BarState {
    fn registry(&mut self) -> &mut RegistryState {
        self.registry_state()
    }

    registry_handlers![OutputState];
}

delegate_compositor!(BarState);
delegate_output!(BarState);
delegate_shm!(BarState);
delegate_layer!(BarState);
delegate_registry!(BarState);
