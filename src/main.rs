use clap::Parser;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use scene_primer::cli::Cli;
use scene_primer::config::DemoConfig;
use scene_primer::core::{ExitReason, FpsCounter, FrameClock, InputState, LoopState};
use scene_primer::renderer::Renderer;
use scene_primer::rotator::{KeyRotator, MouseRotator, Rotator};
use scene_primer::scene::compose_frame;

const FPS_UPDATE_INTERVAL: f32 = 1.0;

struct App {
    config: DemoConfig,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    input: InputState,
    key_rotator: KeyRotator,
    mouse_rotator: MouseRotator,
    clock: FrameClock,
    fps: FpsCounter,
    state: LoopState,
}

impl App {
    fn new(config: DemoConfig) -> Self {
        Self {
            config,
            window: None,
            renderer: None,
            input: InputState::new(),
            key_rotator: KeyRotator::new(),
            mouse_rotator: MouseRotator::new(),
            clock: FrameClock::new(),
            fps: FpsCounter::new(FPS_UPDATE_INTERVAL),
            state: LoopState::default(),
        }
    }

    fn setup(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let monitor_height = event_loop.primary_monitor().map(|m| m.size().height);
        let (width, height) = self.config.window.size(monitor_height);

        let window = Arc::new(
            event_loop.create_window(
                Window::default_attributes()
                    .with_title(self.config.window.title.clone())
                    .with_inner_size(winit::dpi::PhysicalSize::new(width, height)),
            )?,
        );
        let renderer = pollster::block_on(Renderer::new(window.clone(), &self.config))?;

        self.window = Some(window);
        self.renderer = Some(renderer);
        self.clock = FrameClock::new();
        Ok(())
    }

    fn redraw(&mut self) {
        let (Some(renderer), Some(window)) = (&mut self.renderer, &self.window) else {
            return;
        };

        let delta = self.clock.tick();
        let now = self.clock.elapsed();

        // The window may have been resized without a Resized event reaching us
        let inner = window.inner_size();
        renderer.resize(inner.width, inner.height);
        let viewport = renderer.size();

        self.key_rotator.poll(&self.input, now, viewport);
        self.mouse_rotator.poll(&self.input, now, viewport);

        let aspect = self.config.projection.aspect_for(viewport.0, viewport.1);
        let transforms = compose_frame(
            &self.config.scene,
            &self.config.projection,
            now,
            self.key_rotator.rotation(),
            self.mouse_rotator.rotation(),
            aspect,
        );

        match renderer.render(&transforms, window, self.fps.fps()) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => renderer.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of GPU memory, shutting down");
                self.state.request_close(ExitReason::DeviceLost);
            }
            Err(e) => log::warn!("Skipped frame: {}", e),
        }

        if let Some(fps) = self.fps.tick(delta) {
            window.set_title(&format!("{} - {:.1} FPS", self.config.window.title, fps));
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.setup(event_loop) {
            log::error!("Failed to initialize: {:#}", e);
            self.state.request_close(ExitReason::SetupFailed);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Let egui handle the event first
        if let (Some(renderer), Some(window)) = (&mut self.renderer, &self.window) {
            if renderer.handle_event(window, &event) {
                if InputState::tracks_through_overlay(&event) {
                    self.input.process_event(&event);
                }
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => self.state.request_close(ExitReason::WindowClosed),
            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            other => {
                self.input.process_event(&other);
                self.state.poll_exit(&self.input);
            }
        }

        if !self.state.is_running() {
            log::info!("Exiting: {:?}", self.state.exit_reason());
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Runs the demo and returns the process exit code
fn run() -> i32 {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .filter_module("wgpu_hal", log::LevelFilter::Warn)
        .filter_module("wgpu_core", log::LevelFilter::Warn)
        .init();

    let cli = Cli::parse();
    let config = match DemoConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{:#}", e);
            return -1;
        }
    };

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("Failed to create event loop: {}", e);
            return -1;
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    log::info!("Controls: arrow keys or left-drag to rotate, Escape to quit");

    let mut app = App::new(config);
    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {}", e);
        return -1;
    }
    app.state.exit_code()
}

fn main() {
    // run() drops the window and every GPU resource before the process exits
    std::process::exit(run());
}
