// ============================================================================
// WINDOW AND EVENT LOOP
// ============================================================================

use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::Instant;

use pixels::{Pixels, SurfaceTexture};
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::config::PanelConfig;
use crate::panel::{Panel, PanelCommand};
use crate::readout::NoiseSource;
use crate::render::{build_scene, load_font, Canvas};
use crate::schedule::PeriodicTimer;

/// Opens the panel window and runs until it is closed.
///
/// Commands arriving on `receiver` are applied before each redraw; the panel
/// core ticks on its own timer, independent of the frame rate.
pub fn run(
    config: PanelConfig,
    receiver: Option<Receiver<PanelCommand>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let panel = Panel::new(&config);
    run_with_panel(config, panel, receiver)
}

pub fn run_with_panel<N: NoiseSource>(
    config: PanelConfig,
    mut panel: Panel<N>,
    receiver: Option<Receiver<PanelCommand>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let font = match config.font_path.as_deref() {
        Some(path) => Some(load_font(path)?),
        None => {
            warn!("No font configured, labels and readouts will not be drawn");
            None
        }
    };

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title(&config.window.title)
        .with_inner_size(LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ))
        .with_resizable(false)
        .build(&event_loop)?;
    let window = Arc::new(window);

    let size = window.inner_size();
    let (width, height) = (size.width, size.height);
    let surface_texture = SurfaceTexture::new(width, height, &window);
    let mut pixels = Pixels::new(width, height, surface_texture)?;

    let now = Instant::now();
    let mut frame_timer = PeriodicTimer::new(config.frame_interval(), now);
    let mut tick_timer = PeriodicTimer::new(config.tick_interval(), now);
    info!(
        tick_interval_ms = tick_timer.interval().as_millis() as u64,
        width, height, "Panel running"
    );
    panel.tick();

    let redraw_window = window.clone();
    event_loop.run(move |event, window_target| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::CloseRequested => window_target.exit(),
            WindowEvent::RedrawRequested => {
                if let Some(receiver) = receiver.as_ref() {
                    drain_commands(&mut panel, receiver);
                }
                if tick_timer.poll(Instant::now()) {
                    panel.tick();
                }

                let scene = build_scene(&panel, &config);
                let mut canvas = Canvas::new(pixels.frame_mut(), width as usize, height as usize);
                scene.render(&mut canvas, font.as_ref());
                if let Err(err) = pixels.render() {
                    warn!(error = %err, "Frame render failed");
                    window_target.exit();
                }
            }
            _ => {}
        },
        Event::AboutToWait => {
            let now = Instant::now();
            if frame_timer.poll(now) {
                redraw_window.request_redraw();
            }
            window_target.set_control_flow(ControlFlow::WaitUntil(now + frame_timer.remaining(now)));
        }
        _ => {}
    })?;

    Ok(())
}

fn drain_commands<N: NoiseSource>(panel: &mut Panel<N>, receiver: &Receiver<PanelCommand>) {
    while let Ok(command) = receiver.try_recv() {
        if let Err(err) = panel.apply(command) {
            warn!(error = %err, "Panel command rejected");
        }
    }
}
