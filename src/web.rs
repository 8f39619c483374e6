//! Browser host
//!
//! Canvas 2D surface, `requestAnimationFrame` scheduling and the window
//! resize listener, plus `ExplosionView`: the mounted burst component.
//! Dropping the view unmounts the engine before its JS callbacks are freed.

use std::cell::RefCell;
use std::rc::Rc;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Window};

use crate::engine::{EngineError, Host, ParticleEngine};
use crate::surface::Surface2d;
use crate::tuning::BurstTuning;

/// Canvas element plus its 2D context
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// None when the browser will not hand out a 2D context
    pub fn new(canvas: HtmlCanvasElement) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(Self { canvas, ctx })
    }
}

impl Surface2d for CanvasSurface {
    type Error = JsValue;

    fn size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ctx.clear_rect(x, y, width, height);
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn translate(&mut self, x: f64, y: f64) {
        let _ = self.ctx.translate(x, y);
    }

    fn rotate(&mut self, radians: f64) {
        let _ = self.ctx.rotate(radians);
    }

    fn scale(&mut self, x: f64, y: f64) {
        let _ = self.ctx.scale(x, y);
    }

    fn set_font_params(&mut self, font: &str) {
        self.ctx.set_font(font);
        self.ctx.set_text_align("center");
        self.ctx.set_text_baseline("middle");
    }

    fn set_fill_style(&mut self, color: &str) {
        self.ctx.set_fill_style_str(color);
    }

    fn fill_text_at_origin(&mut self, text: &str) -> Result<(), JsValue> {
        self.ctx.fill_text(text, 0.0, 0.0)
    }
}

/// Window-backed host. The callbacks are owned by `ExplosionView`.
pub struct WebHost {
    window: Window,
    surface: Option<CanvasSurface>,
    on_frame: js_sys::Function,
    on_resize: js_sys::Function,
}

impl Host for WebHost {
    type Surface = CanvasSurface;
    type FrameHandle = i32;
    type ResizeToken = ();

    fn viewport_size(&self) -> (u32, u32) {
        let dim = |v: Result<JsValue, JsValue>| {
            v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0).max(0.0) as u32
        };
        (dim(self.window.inner_width()), dim(self.window.inner_height()))
    }

    fn surface(&mut self) -> Option<&mut CanvasSurface> {
        self.surface.as_mut()
    }

    fn request_frame(&mut self) -> Option<i32> {
        match self.window.request_animation_frame(&self.on_frame) {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::warn!("requestAnimationFrame failed: {:?}", e);
                None
            }
        }
    }

    fn cancel_frame(&mut self, handle: i32) {
        let _ = self.window.cancel_animation_frame(handle);
    }

    fn listen_resize(&mut self) -> Option<()> {
        self.window
            .add_event_listener_with_callback("resize", &self.on_resize)
            .ok()
    }

    fn unlisten_resize(&mut self, _token: ()) {
        let _ = self
            .window
            .remove_event_listener_with_callback("resize", &self.on_resize);
    }
}

type EngineSlot = Rc<RefCell<Option<ParticleEngine<WebHost>>>>;

/// A burst running on a canvas for as long as this value lives
pub struct ExplosionView {
    engine: EngineSlot,
    _on_frame: Closure<dyn FnMut(f64)>,
    _on_resize: Closure<dyn FnMut(web_sys::Event)>,
}

impl ExplosionView {
    /// Mount a burst on `canvas`, seeded from the clock
    pub fn mount(canvas: HtmlCanvasElement, tuning: &BurstTuning) -> Result<Self, EngineError> {
        let window = web_sys::window().ok_or(EngineError::NoDrawingContext)?;
        let slot: EngineSlot = Rc::new(RefCell::new(None));

        let on_frame = {
            let slot = Rc::downgrade(&slot);
            Closure::<dyn FnMut(f64)>::new(move |_time: f64| {
                if let Some(slot) = slot.upgrade() {
                    if let Some(engine) = slot.borrow_mut().as_mut() {
                        engine.on_frame();
                    }
                }
            })
        };

        let on_resize = {
            let slot = Rc::downgrade(&slot);
            Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if let Some(slot) = slot.upgrade() {
                    if let Some(engine) = slot.borrow_mut().as_mut() {
                        engine.on_resize();
                    }
                }
            })
        };

        let host = WebHost {
            window,
            surface: CanvasSurface::new(canvas),
            on_frame: on_frame.as_ref().unchecked_ref::<js_sys::Function>().clone(),
            on_resize: on_resize.as_ref().unchecked_ref::<js_sys::Function>().clone(),
        };

        let seed = js_sys::Date::now() as u64;
        let mut rng = Pcg32::seed_from_u64(seed);
        let engine = ParticleEngine::mount(host, tuning, &mut rng)?;
        log::info!("Burst seeded with {}", seed);
        *slot.borrow_mut() = Some(engine);

        Ok(Self {
            engine: slot,
            _on_frame: on_frame,
            _on_resize: on_resize,
        })
    }
}

impl Drop for ExplosionView {
    fn drop(&mut self) {
        let engine = self.engine.borrow_mut().take();
        if let Some(engine) = engine {
            engine.unmount();
        }
    }
}
