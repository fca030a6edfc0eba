use std::rc::Rc;

use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalPosition, LogicalSize, PhysicalSize};
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl, FrameCtx, WindowCtx};
use crate::device::{Gpu, GpuInit, SurfaceErrorAction};
use crate::render::{RenderCtx, RenderTarget, Renderer, RendererConfig, WgpuBackend};
use crate::text::Font;
use crate::time::FrameClock;

/// Window configuration: title, top-left position and size, all logical.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    /// `None` lets the platform place the window.
    pub position: Option<LogicalPosition<f64>>,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "tessera".to_string(),
            position: None,
            initial_size: LogicalSize::new(800.0, 450.0),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window, builds the renderer around `font`, and drives `app`
    /// until the window closes, Escape is pressed, or the app exits.
    ///
    /// Each frame: `app.on_frame`, then `Renderer::flush`, then the backend
    /// renders into the acquired surface texture, which is presented.
    pub fn run<A>(
        config: RuntimeConfig,
        gpu_init: GpuInit,
        renderer_config: RendererConfig,
        font: Rc<Font>,
        app: A,
    ) -> Result<()>
    where
        A: App + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState {
            config,
            gpu_init,
            renderer_config,
            font,
            app,
            entry: None,
            renderer: None,
            failure: None,
            exit_requested: false,
        };

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<A>
where
    A: App + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    renderer_config: RendererConfig,
    font: Rc<Font>,
    app: A,

    entry: Option<WindowEntry>,
    renderer: Option<Renderer<WgpuBackend>>,
    failure: Option<anyhow::Error>,
    exit_requested: bool,
}

impl<A> AppState<A>
where
    A: App + 'static,
{
    fn open_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let mut attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);
        if let Some(position) = self.config.position {
            attrs = attrs.with_position(position);
        }

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        let entry = WindowEntryTryBuilder {
            clock: FrameClock::default(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed")?;

        let (width, height) = entry.with_window(|w| WindowCtx { window: w }.logical_size());
        let mut renderer = Renderer::new(
            WgpuBackend::new(),
            Rc::clone(&self.font),
            self.renderer_config.clone(),
        );
        renderer.set_frame_size(width, height);
        log::info!("window {:?} open ({width}x{height})", self.config.title);

        entry.with_window(|w| w.request_redraw());
        self.entry = Some(entry);
        self.renderer = Some(renderer);
        Ok(())
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        event_loop.exit();
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure = Some(err);
        self.request_exit(event_loop);
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        let (Some(entry), Some(renderer)) = (self.entry.as_mut(), self.renderer.as_mut()) else {
            return;
        };
        entry.with_gpu_mut(|gpu| gpu.resize(size));
        let (width, height) = entry.with_window(|w| WindowCtx { window: w }.logical_size());
        renderer.set_frame_size(width, height);
        entry.with_window(|w| w.request_redraw());
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(entry), Some(renderer)) = (self.entry.as_mut(), self.renderer.as_mut()) else {
            return;
        };
        let app = &mut self.app;

        let outcome = entry.with_mut(|fields| -> Result<AppControl> {
            let time = fields.clock.tick();
            let control = {
                let mut ctx = FrameCtx {
                    window: WindowCtx {
                        window: fields.window,
                    },
                    renderer: &mut *renderer,
                    time,
                };
                app.on_frame(&mut ctx)?
            };

            renderer.flush();
            let presented = present(fields.window, fields.gpu, renderer)?;

            if control == AppControl::Exit || presented == AppControl::Exit {
                Ok(AppControl::Exit)
            } else {
                Ok(AppControl::Continue)
            }
        });

        match outcome {
            Ok(AppControl::Continue) => {}
            Ok(AppControl::Exit) => self.request_exit(event_loop),
            Err(err) => self.fail(event_loop, err),
        }
    }
}

/// Replays the renderer's recorded frame into the next surface texture.
fn present(
    window: &Window,
    gpu: &mut Gpu<'_>,
    renderer: &mut Renderer<WgpuBackend>,
) -> Result<AppControl> {
    let size = gpu.size();
    if size.width == 0 || size.height == 0 {
        renderer.backend_mut().discard_frame();
        return Ok(AppControl::Continue);
    }

    let mut frame = match gpu.acquire_frame() {
        Ok(frame) => frame,
        Err(err) => {
            renderer.backend_mut().discard_frame();
            return Ok(match gpu.handle_surface_error(err) {
                SurfaceErrorAction::Fatal => AppControl::Exit,
                _ => AppControl::Continue,
            });
        }
    };

    let ctx = RenderCtx::new(
        gpu.device(),
        gpu.queue(),
        gpu.surface_format(),
        window.scale_factor() as f32,
    );

    // RenderTarget borrows frame.encoder; dropped before present() takes frame.
    {
        let mut target =
            RenderTarget::new(&mut frame.encoder, &frame.view, size.width, size.height);
        renderer
            .backend_mut()
            .render(&ctx, &mut target)
            .context("failed to render frame")?;
    }

    window.pre_present_notify();
    gpu.present(frame);
    Ok(AppControl::Continue)
}

impl<A> ApplicationHandler for AppState<A>
where
    A: App + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }
        if let Err(err) = self.open_window(event_loop) {
            self.fail(event_loop, err.context("failed to open the initial window"));
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw.
        if let Some(entry) = self.entry.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        if self.app.on_window_event(&event) == AppControl::Exit {
            self.request_exit(event_loop);
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("window closed");
                self.request_exit(event_loop);
            }

            WindowEvent::KeyboardInput { event: key, .. }
                if key.state == ElementState::Pressed
                    && key.physical_key == PhysicalKey::Code(KeyCode::Escape) =>
            {
                log::info!("escape pressed");
                self.request_exit(event_loop);
            }

            WindowEvent::Resized(size) => self.resize(size),

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(size) = self.entry.as_ref().map(|e| e.with_window(|w| w.inner_size())) {
                    self.resize(size);
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }
}
