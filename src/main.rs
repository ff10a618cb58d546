// main.rs
#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::sync::Arc;

    use winit::{
        application::ApplicationHandler,
        event::{ElementState, KeyEvent, WindowEvent},
        event_loop::{ActiveEventLoop, EventLoop},
        keyboard::{Key, NamedKey},
        window::{Window, WindowId},
    };

    use wgpu_primitives::renderer::variants;
    use wgpu_primitives::{
        FrameClock, PrimitiveKind, Render, RenderMode, RenderSettings, SystemClock, WgpuHost,
    };

    const SURFACE_ID: &str = "gl-playground";

    struct App {
        kind: PrimitiveKind,
        settings: RenderSettings,
        mode: RenderMode,
        clock: SystemClock,
        window: Option<Arc<Window>>,
        renderer: Option<Box<dyn Render>>,
    }

    impl App {
        fn new(kind: PrimitiveKind, settings: RenderSettings) -> Self {
            Self {
                kind,
                mode: settings.default_mode,
                settings,
                clock: SystemClock::new(),
                window: None,
                renderer: None,
            }
        }

        fn toggle_mode(&mut self) {
            self.mode = match self.mode {
                RenderMode::Solid => RenderMode::Wireframe,
                RenderMode::Wireframe => RenderMode::Solid,
            };
            log::info!("Render mode: {:?}", self.mode);
        }
    }

    impl ApplicationHandler for App {
        fn resumed(&mut self, event_loop: &ActiveEventLoop) {
            if self.window.is_some() {
                return;
            }

            let resolution = self.settings.resolution;
            let attributes = Window::default_attributes()
                .with_title(format!("wgpu primitives: {}", self.kind.name()))
                .with_inner_size(winit::dpi::PhysicalSize::new(
                    resolution.width,
                    resolution.height,
                ));

            let window = match event_loop.create_window(attributes) {
                Ok(window) => Arc::new(window),
                Err(err) => {
                    log::error!("Failed to create window: {}", err);
                    event_loop.exit();
                    return;
                }
            };

            let mut host = WgpuHost::new(self.settings.clone());
            host.register_window(SURFACE_ID, Arc::clone(&window));

            match variants::for_kind(host, SURFACE_ID, self.kind, self.settings.clone()) {
                Ok(renderer) => self.renderer = Some(renderer),
                Err(err) => {
                    log::error!("Failed to create renderer: {}", err);
                    event_loop.exit();
                    return;
                }
            }

            self.clock.reset();
            window.request_redraw();
            self.window = Some(window);
        }

        fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
            let Some(window) = self.window.clone() else {
                return;
            };
            if window.id() != id {
                return;
            }

            match event {
                WindowEvent::CloseRequested | WindowEvent::Destroyed => event_loop.exit(),
                WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            logical_key,
                            state: ElementState::Pressed,
                            ..
                        },
                    ..
                } => match logical_key {
                    Key::Named(NamedKey::Escape) => event_loop.exit(),
                    Key::Named(NamedKey::Space) => self.toggle_mode(),
                    _ => {}
                },
                WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                    window.request_redraw();
                }
                WindowEvent::RedrawRequested => {
                    let Some(renderer) = self.renderer.as_mut() else {
                        return;
                    };

                    let size = window.inner_size();
                    let elapsed_ms = self.clock.elapsed_ms();
                    if let Err(err) =
                        renderer.render(size.width, size.height, elapsed_ms, self.mode.as_i32())
                    {
                        log::error!("Render failed: {}", err);
                        event_loop.exit();
                        return;
                    }

                    window.request_redraw();
                }
                _ => {}
            }
        }
    }

    fn parse_kind(arg: Option<String>) -> Result<PrimitiveKind, String> {
        match arg.as_deref() {
            None | Some("cube") => Ok(PrimitiveKind::Cube),
            Some("triangle") => Ok(PrimitiveKind::Triangle),
            Some(other) => Err(format!(
                "unknown primitive '{other}', expected 'triangle' or 'cube'"
            )),
        }
    }

    pub fn run() -> Result<(), String> {
        wgpu_primitives::init_logging();

        let kind = parse_kind(std::env::args().nth(1))?;
        let settings = RenderSettings::load();
        log::info!("Starting {} demo on '{}'", kind.name(), SURFACE_ID);

        let event_loop = EventLoop::new().map_err(|err| err.to_string())?;
        let mut app = App::new(kind, settings);
        let result = event_loop.run_app(&mut app).map_err(|err| err.to_string());

        log::info!("Application shutdown complete");
        result
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(err) = demo::run() {
        eprintln!("Application error: {err}");
        std::process::exit(1);
    }
}

// The web build is driven from JavaScript through the exported classes.
#[cfg(target_arch = "wasm32")]
fn main() {}
