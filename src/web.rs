//! JavaScript bindings: `new Triangle(canvasId)`, `new Cube(canvasId)`, then
//! `render(width, height, elapsedTimeMs, mode)` or `renderDefault()` from the page's
//! own timer.

use wasm_bindgen::prelude::*;

use crate::error::RenderError;
use crate::renderer::backend::WgpuHost;
use crate::renderer::{self, Render};
use crate::settings::RenderSettings;

fn to_js(err: RenderError) -> JsValue {
    log::error!("{}", err);
    JsValue::from_str(&err.to_string())
}

fn host() -> WgpuHost {
    crate::init_logging();
    WgpuHost::new(RenderSettings::load())
}

#[wasm_bindgen(js_name = Triangle)]
pub struct WebTriangle {
    inner: renderer::Triangle<WgpuHost>,
}

#[wasm_bindgen(js_class = Triangle)]
impl WebTriangle {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: String) -> Result<WebTriangle, JsValue> {
        let host = host();
        let settings = host.settings().clone();
        let inner = renderer::Triangle::with_settings(host, &canvas_id, settings).map_err(to_js)?;
        Ok(Self { inner })
    }

    pub fn render(
        &mut self,
        width: u32,
        height: u32,
        elapsed_time_ms: f64,
        mode: i32,
    ) -> Result<(), JsValue> {
        self.inner
            .render(width, height, elapsed_time_ms, mode)
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = renderDefault)]
    pub fn render_default(&mut self) -> Result<(), JsValue> {
        self.inner.render_default().map_err(to_js)
    }
}

#[wasm_bindgen(js_name = Cube)]
pub struct WebCube {
    inner: renderer::Cube<WgpuHost>,
}

#[wasm_bindgen(js_class = Cube)]
impl WebCube {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: String) -> Result<WebCube, JsValue> {
        let host = host();
        let settings = host.settings().clone();
        let inner = renderer::Cube::with_settings(host, &canvas_id, settings).map_err(to_js)?;
        Ok(Self { inner })
    }

    pub fn render(
        &mut self,
        width: u32,
        height: u32,
        elapsed_time_ms: f64,
        mode: i32,
    ) -> Result<(), JsValue> {
        self.inner
            .render(width, height, elapsed_time_ms, mode)
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = renderDefault)]
    pub fn render_default(&mut self) -> Result<(), JsValue> {
        self.inner.render_default().map_err(to_js)
    }
}
