//! Engine builder and event-loop glue.
//!
//! [`Starfield`] is a method-chaining builder; `run()` blocks until
//! the window closes or a [`StopHandle`] fires. Unlike a canvas
//! animation that reschedules itself forever, the loop has an explicit
//! stop condition: the handle flips an atomic flag that is checked at
//! every frame boundary.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::config::StarfieldConfig;
use crate::error::StarfieldError;
use crate::field::StarField;
use crate::render::GpuState;
use crate::surface::{ResizeDebouncer, Viewport};
use crate::time::FrameClock;

/// Cancellation handle for a running starfield.
///
/// Cloneable and thread-safe; `stop()` makes the frame loop exit
/// cleanly at its next iteration.
#[derive(Debug, Clone)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request that the frame loop exit.
    pub fn stop(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether a stop has been requested.
    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// A starfield engine builder.
///
/// Use method chaining to configure, then call `.run()` to start.
///
/// ```ignore
/// use warpfield::Starfield;
///
/// Starfield::new()
///     .with_star_count(300)
///     .with_speed(6.0)
///     .run()?;
/// ```
pub struct Starfield {
    config: StarfieldConfig,
    title: String,
    window_size: winit::dpi::LogicalSize<f64>,
    stop: StopHandle,
}

impl Starfield {
    /// Create a builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: StarfieldConfig::default(),
            title: "Warpfield".into(),
            window_size: winit::dpi::LogicalSize::new(1280.0, 720.0),
            stop: StopHandle::new(),
        }
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: StarfieldConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the number of stars.
    pub fn with_star_count(mut self, count: u32) -> Self {
        self.config.star_count = count;
        self
    }

    /// Set the per-step travel speed.
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.config.speed = speed;
        self
    }

    /// Set the trail capacity per star.
    pub fn with_trail_length(mut self, length: usize) -> Self {
        self.config.trail_length = length;
        self
    }

    /// Set the dead-zone radius around the screen center.
    pub fn with_min_radius(mut self, radius: f32) -> Self {
        self.config.min_radius = radius;
        self
    }

    /// Set the window title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Obtain a cancellation handle before running.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Run the starfield. Blocks until the window closes, the stop
    /// handle fires, or setup fails.
    pub fn run(self) -> Result<(), StarfieldError> {
        // Fail fast on unsatisfiable configuration, before any window
        // or GPU work happens.
        self.config.validate()?;

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(self.config, self.title, self.window_size, self.stop);
        event_loop.run_app(&mut app)?;

        // Errors from `resumed` cannot propagate through winit's
        // callback, so they are stashed and surfaced here.
        match app.setup_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Default for Starfield {
    fn default() -> Self {
        Self::new()
    }
}

struct App {
    config: StarfieldConfig,
    title: String,
    window_size: winit::dpi::LogicalSize<f64>,
    stop: StopHandle,

    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    field: Option<StarField>,
    viewport: Viewport,
    debouncer: ResizeDebouncer,
    clock: FrameClock,
    setup_error: Option<StarfieldError>,
}

impl App {
    fn new(
        config: StarfieldConfig,
        title: String,
        window_size: winit::dpi::LogicalSize<f64>,
        stop: StopHandle,
    ) -> Self {
        Self {
            config,
            title,
            window_size,
            stop,
            window: None,
            gpu: None,
            field: None,
            viewport: Viewport::default(),
            debouncer: ResizeDebouncer::default(),
            clock: FrameClock::new(),
            setup_error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: StarfieldError) {
        self.setup_error = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(self.window_size);

        let window = match event_loop.create_window(window_attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => return self.fail(event_loop, e.into()),
        };

        self.viewport = Viewport::from_physical(window.inner_size(), window.scale_factor());

        let gpu = match pollster::block_on(GpuState::new(window.clone(), &self.config)) {
            Ok(gpu) => gpu,
            Err(e) => return self.fail(event_loop, e.into()),
        };

        let field = match StarField::new(self.config.clone(), self.viewport) {
            Ok(field) => field,
            Err(e) => return self.fail(event_loop, e),
        };

        self.window = Some(window);
        self.gpu = Some(gpu);
        self.field = Some(field);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                // Debounced: applied at the first frame after the
                // resize burst settles.
                self.debouncer.request(physical_size, Instant::now());
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.viewport.scale_factor = scale_factor;
            }
            WindowEvent::RedrawRequested => {
                if self.stop.is_stopped() {
                    event_loop.exit();
                    return;
                }

                if let Some(size) = self.debouncer.take_ready(Instant::now()) {
                    if let Some(gpu) = &mut self.gpu {
                        gpu.resize(size);
                    }
                    self.viewport = Viewport::from_physical(size, self.viewport.scale_factor);
                }

                self.clock.tick();
                let flush_interval = self.config.flush_interval;
                let flush = flush_interval > 0 && self.clock.frame() % flush_interval == 0;

                if self.clock.frame() % 30 == 0 {
                    if let Some(window) = &self.window {
                        window.set_title(&format!("{} ({:.0} FPS)", self.title, self.clock.fps()));
                    }
                }

                if let (Some(gpu), Some(field)) = (&mut self.gpu, &mut self.field) {
                    let draw = field.step(self.viewport);
                    match gpu.render(self.viewport, draw, flush) {
                        Ok(_) => {}
                        Err(wgpu::SurfaceError::Lost) => {
                            gpu.resize(winit::dpi::PhysicalSize {
                                width: gpu.config.width,
                                height: gpu.config.height,
                            })
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => event_loop.exit(),
                        Err(e) => eprintln!("Render error: {:?}", e),
                    }
                }

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}
