//! Spinning-primitive renderers on wgpu.
//!
//! A renderer is bound to a surface id at construction and does nothing on the GPU
//! until its first `render` call, which builds the graphics context, pipeline and
//! geometry. Later calls reuse them; after a context loss they are rebuilt once.
//! Frame timing is the caller's job: `render` takes the elapsed milliseconds.

pub mod error;
pub mod renderer;
pub mod settings;
pub mod time;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use error::RenderError;
pub use renderer::backend::{HeadlessHost, SurfaceHost, WgpuHost};
pub use renderer::{Cube, GeometryDescriptor, PrimitiveKind, Render, RenderMode, Triangle};
pub use settings::RenderSettings;
pub use time::{FrameClock, ManualClock, SystemClock};

#[cfg(target_arch = "wasm32")]
pub fn init_logging() {
    use std::sync::Once;

    static INIT: Once = Once::new();
    INIT.call_once(|| {
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));
        // Fails only if another logger is already installed.
        let _ = console_log::init_with_level(log::Level::Info);
    });
}

/// Sets up `env_logger`, honouring `RUST_LOG` and defaulting to `info`. Safe to call
/// more than once.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
