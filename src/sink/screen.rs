//! Interactive window output.
//!
//! The display resolution is only known once the event loop is running, so
//! layout happens in `resumed`: query the monitor, size the window, then open
//! it with a softbuffer surface behind a tiny-skia pixmap. The loop waits for
//! events and repaints on `RedrawRequested` until the window is closed.

use std::num::NonZeroU32;
use std::rc::Rc;

use emojivur_fonts::{LoadedFont, ShapedGlyph};
use tiny_skia::{Color, Pixmap};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::error::EmojivurError;
use crate::layout::{DisplayResolution, OutputMode, RenderSpec, Viewport, layout};
use crate::painter::{DeviceScale, Painter};
use crate::resources::{ResourceKind, ResourceOwner, Tracked};

pub const WINDOW_TITLE: &str = "emojivur";

/// Look-and-feel of the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSettings {
    pub min_window: Viewport,
    pub background: [u8; 3],
    pub paint_color: [u8; 4],
}

/// Pixel buffer presented in the window.
struct Canvas {
    surface: softbuffer::Surface<Rc<Window>, Rc<Window>>,
    // Outlives the surface
    _context: softbuffer::Context<Rc<Window>>,
    pixmap: Pixmap,
    scale: DeviceScale,
}

impl Canvas {
    fn new(window: &Rc<Window>, viewport: Viewport) -> Result<Self, EmojivurError> {
        let context = softbuffer::Context::new(Rc::clone(window))?;
        let surface = softbuffer::Surface::new(&context, Rc::clone(window))?;
        let mut canvas = Self {
            surface,
            _context: context,
            pixmap: Pixmap::new(viewport.width.max(1), viewport.height.max(1))
                .ok_or_else(|| EmojivurError::Canvas("empty viewport".to_string()))?,
            scale: DeviceScale::IDENTITY,
        };
        canvas.resize(window.inner_size(), window.scale_factor())?;
        Ok(canvas)
    }

    /// Match the pixmap and surface to the window's physical size.
    fn resize(&mut self, size: PhysicalSize<u32>, scale_factor: f64) -> Result<(), EmojivurError> {
        let (Some(width), Some(height)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            // Minimized
            return Ok(());
        };
        self.surface.resize(width, height)?;
        self.pixmap = Pixmap::new(width.get(), height.get()).ok_or_else(|| {
            EmojivurError::Canvas(format!("cannot allocate {}x{} pixmap", width, height))
        })?;
        self.scale = device_scale(size, scale_factor);
        log::debug!(
            "Canvas {}x{} physical, scale {:.2}x{:.2}",
            width,
            height,
            self.scale.x,
            self.scale.y
        );
        Ok(())
    }

    fn present(&mut self) -> Result<(), EmojivurError> {
        let mut buffer = self.surface.buffer_mut()?;
        for (dst, pixel) in buffer.iter_mut().zip(self.pixmap.pixels()) {
            let color = pixel.demultiply();
            *dst = pack_0rgb(color.red(), color.green(), color.blue());
        }
        buffer.present()?;
        Ok(())
    }
}

/// Physical surface size over the window's logical size.
fn device_scale(physical: PhysicalSize<u32>, scale_factor: f64) -> DeviceScale {
    let logical: LogicalSize<f64> = physical.to_logical(scale_factor);
    if physical.width == 0 || physical.height == 0 || logical.width <= 0.0 || logical.height <= 0.0 {
        return DeviceScale::uniform(scale_factor as f32);
    }
    DeviceScale {
        x: (f64::from(physical.width) / logical.width) as f32,
        y: (f64::from(physical.height) / logical.height) as f32,
    }
}

/// softbuffer pixel format: `0x00RRGGBB`.
fn pack_0rgb(red: u8, green: u8, blue: u8) -> u32 {
    (u32::from(red) << 16) | (u32::from(green) << 8) | u32::from(blue)
}

/// Handles held while the window is open. Fields drop top to bottom, the
/// reverse of the order they were acquired in.
struct ScreenState<'f> {
    canvas: Tracked<Canvas>,
    window: Tracked<Rc<Window>>,
    spec: Tracked<RenderSpec<'f>>,
}

/// Shows shaped glyphs in a window sized to them.
pub struct ScreenSink<'f> {
    font: &'f LoadedFont,
    glyphs: &'f [ShapedGlyph],
    pxsize: u32,
    settings: ScreenSettings,
    owner: ResourceOwner,
    painter: Painter,
    state: Option<ScreenState<'f>>,
    error: Option<EmojivurError>,
}

impl<'f> ScreenSink<'f> {
    pub fn new(
        font: &'f LoadedFont,
        glyphs: &'f [ShapedGlyph],
        pxsize: u32,
        settings: ScreenSettings,
        owner: ResourceOwner,
    ) -> Self {
        Self {
            font,
            glyphs,
            pxsize,
            settings,
            owner,
            painter: Painter::new(settings.paint_color),
            state: None,
            error: None,
        }
    }

    /// Run the event loop until the window is closed or something fails.
    pub fn run(mut self) -> Result<(), EmojivurError> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Wait);
        event_loop.run_app(&mut self)?;

        self.teardown();
        match self.error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn open(&self, event_loop: &ActiveEventLoop) -> Result<ScreenState<'f>, EmojivurError> {
        let display = query_display(event_loop)?;
        log::info!("Display resolution {}x{}", display.width, display.height);

        let placed = layout(
            self.glyphs,
            self.pxsize,
            OutputMode::Interactive {
                display,
                min_window: self.settings.min_window,
            },
        );
        let viewport = placed.viewport;
        log::info!(
            "Content {}x{}, window {}x{}",
            placed.extent.width,
            placed.extent.height,
            viewport.width,
            viewport.height
        );
        let spec = self.owner.track(
            ResourceKind::GlyphArray,
            RenderSpec::new(self.font, placed, self.pxsize),
        );

        let attributes = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(LogicalSize::new(viewport.width, viewport.height))
            .with_resizable(false);
        let window = self.owner.acquire(ResourceKind::Window, || {
            event_loop.create_window(attributes).map(Rc::new)
        })?;

        let canvas = self
            .owner
            .acquire(ResourceKind::Canvas, || Canvas::new(&window, viewport))?;

        Ok(ScreenState {
            canvas,
            window,
            spec,
        })
    }

    fn redraw(&mut self) -> Result<(), EmojivurError> {
        let Some(state) = self.state.as_mut() else {
            return Ok(());
        };
        let [red, green, blue] = self.settings.background;
        let canvas: &mut Canvas = &mut state.canvas;
        canvas.pixmap.fill(Color::from_rgba8(red, green, blue, 255));
        let drawn = self.painter.paint(&mut canvas.pixmap, &state.spec, canvas.scale);
        log::trace!("Redraw painted {} glyphs", drawn);
        canvas.present()
    }

    fn resize(&mut self, size: PhysicalSize<u32>, scale_factor: f64) -> Result<(), EmojivurError> {
        if let Some(state) = self.state.as_mut() {
            state.canvas.resize(size, scale_factor)?;
            state.window.request_redraw();
        }
        Ok(())
    }

    /// Record the first failure and stop the loop.
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: EmojivurError) {
        // main prints the one user-facing diagnostic
        log::debug!("Stopping event loop: {}", error);
        if self.error.is_none() {
            self.error = Some(error);
        }
        event_loop.exit();
    }

    fn teardown(&mut self) {
        if let Some(state) = self.state.take() {
            log::info!("Closing window");
            drop(state);
        }
    }
}

impl ApplicationHandler for ScreenSink<'_> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() || self.error.is_some() {
            return;
        }
        match self.open(event_loop) {
            Ok(state) => {
                state.window.request_redraw();
                self.state = Some(state);
            }
            Err(error) => self.fail(event_loop, error),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let result = match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested");
                event_loop.exit();
                Ok(())
            }
            WindowEvent::RedrawRequested => self.redraw(),
            WindowEvent::Resized(size) => {
                let scale_factor = self.state.as_ref().map_or(1.0, |state| state.window.scale_factor());
                self.resize(size, scale_factor)
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                log::debug!("Scale factor changed to {:.2}", scale_factor);
                let size = self.state.as_ref().map(|state| state.window.inner_size());
                match size {
                    Some(size) => self.resize(size, scale_factor),
                    None => Ok(()),
                }
            }
            _ => Ok(()),
        };
        if let Err(error) = result {
            self.fail(event_loop, error);
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.teardown();
    }
}

/// Resolution of the primary monitor in logical pixels, or of any monitor
/// when the platform reports no primary one.
fn query_display(event_loop: &ActiveEventLoop) -> Result<DisplayResolution, EmojivurError> {
    let monitor = event_loop
        .primary_monitor()
        .or_else(|| event_loop.available_monitors().next())
        .ok_or_else(|| EmojivurError::Display("no monitor available".to_string()))?;
    let size: LogicalSize<u32> = monitor.size().to_logical(monitor.scale_factor());
    if size.width == 0 || size.height == 0 {
        return Err(EmojivurError::Display(format!(
            "monitor reports {}x{}",
            size.width, size.height
        )));
    }
    Ok(DisplayResolution {
        width: size.width,
        height: size.height,
    })
}
