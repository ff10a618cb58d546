use std::ops::{Deref, DerefMut};

use crate::error::RenderError;
use crate::settings::RenderSettings;

use super::backend::SurfaceHost;
use super::primitives::PrimitiveKind;
use super::renderer_core::RenderCore;

/// A renderer the embedding layer can drive frame by frame.
pub trait Render {
    fn render(
        &mut self,
        width: u32,
        height: u32,
        elapsed_ms: f64,
        mode: i32,
    ) -> Result<(), RenderError>;

    fn render_default(&mut self) -> Result<(), RenderError>;
}

macro_rules! primitive_renderer {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        pub struct $name<H: SurfaceHost> {
            core: RenderCore<H>,
        }

        impl<H: SurfaceHost> $name<H> {
            /// Fails with `SurfaceNotFound` if `surface_id` does not resolve. Allocates
            /// nothing on the GPU.
            pub fn new(host: H, surface_id: &str) -> Result<Self, RenderError> {
                Ok(Self {
                    core: RenderCore::new(host, surface_id, $kind)?,
                })
            }

            pub fn with_settings(
                host: H,
                surface_id: &str,
                settings: RenderSettings,
            ) -> Result<Self, RenderError> {
                Ok(Self {
                    core: RenderCore::with_settings(host, surface_id, $kind, settings)?,
                })
            }
        }

        impl<H: SurfaceHost> Render for $name<H> {
            fn render(
                &mut self,
                width: u32,
                height: u32,
                elapsed_ms: f64,
                mode: i32,
            ) -> Result<(), RenderError> {
                self.core.render(width, height, elapsed_ms, mode)
            }

            fn render_default(&mut self) -> Result<(), RenderError> {
                self.core.render_default()
            }
        }

        impl<H: SurfaceHost> Deref for $name<H> {
            type Target = RenderCore<H>;

            fn deref(&self) -> &RenderCore<H> {
                &self.core
            }
        }

        impl<H: SurfaceHost> DerefMut for $name<H> {
            fn deref_mut(&mut self) -> &mut RenderCore<H> {
                &mut self.core
            }
        }
    };
}

primitive_renderer!(
    /// Flat-shaded triangle spinning around the view axis.
    Triangle,
    PrimitiveKind::Triangle
);

primitive_renderer!(
    /// Lit cube spinning around a tilted axis.
    Cube,
    PrimitiveKind::Cube
);

/// Builds a renderer for `kind` behind the `Render` trait.
pub fn for_kind<H>(
    host: H,
    surface_id: &str,
    kind: PrimitiveKind,
    settings: RenderSettings,
) -> Result<Box<dyn Render>, RenderError>
where
    H: SurfaceHost + 'static,
{
    Ok(match kind {
        PrimitiveKind::Triangle => Box::new(Triangle::with_settings(host, surface_id, settings)?),
        PrimitiveKind::Cube => Box::new(Cube::with_settings(host, surface_id, settings)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::backend::HeadlessHost;

    #[test]
    fn variants_report_their_kind() {
        let host = HeadlessHost::new().with_surface("c", 10, 10);
        let triangle = Triangle::new(host.clone(), "c").unwrap();
        let cube = Cube::new(host, "c").unwrap();

        assert_eq!(triangle.kind(), PrimitiveKind::Triangle);
        assert_eq!(cube.kind(), PrimitiveKind::Cube);
        assert_eq!(cube.surface_id(), "c");
    }

    #[test]
    fn boxed_renderer_draws_through_the_trait() {
        let host = HeadlessHost::new().with_surface("c", 10, 10);
        let mut renderer =
            for_kind(host.clone(), "c", PrimitiveKind::Triangle, RenderSettings::default())
                .unwrap();

        renderer.render(10, 10, 0.0, 1).unwrap();
        let frame = host.last_frame("c").unwrap();
        assert_eq!(frame.draws[0].program, "triangle.wireframe");
    }
}
