use crate::audio::WebAudioBackend;
use crate::config::WaveParams;
use crate::core::{AnalysisFeed, BackgroundEffectGate, FrameInput, Scope, StrandPath, WaveField};
use crate::dom::{self, EventListener};
use crate::events::pointer::PointerTracker;
use crate::render::CanvasPainter;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

pub type SharedFeed = Rc<RefCell<AnalysisFeed<WebAudioBackend>>>;

/// Self-rescheduling `requestAnimationFrame` loop. Dropping it cancels the
/// pending frame and frees the callback.
pub struct AnimationLoop {
    handle: Rc<Cell<Option<i32>>>,
    tick: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>,
}

impl AnimationLoop {
    pub fn start(mut frame: impl FnMut(f64) + 'static) -> Result<Self, JsValue> {
        let window = web::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let handle: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
        let tick: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
        let tick_weak: Weak<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::downgrade(&tick);
        let handle_tick = handle.clone();
        let window_tick = window.clone();
        *tick.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
            handle_tick.set(None);
            frame(ts);
            if let Some(tick) = tick_weak.upgrade() {
                if let Some(cb) = tick.borrow().as_ref() {
                    handle_tick.set(
                        window_tick
                            .request_animation_frame(cb.as_ref().unchecked_ref())
                            .ok(),
                    );
                }
            }
        }) as Box<dyn FnMut(f64)>));
        if let Some(cb) = tick.borrow().as_ref() {
            handle.set(Some(
                window.request_animation_frame(cb.as_ref().unchecked_ref())?,
            ));
        }
        Ok(Self { handle, tick })
    }
}

impl Drop for AnimationLoop {
    fn drop(&mut self) {
        if let (Some(w), Some(id)) = (web::window(), self.handle.take()) {
            _ = w.cancel_animation_frame(id);
        }
        self.tick.borrow_mut().take();
    }
}

struct FrameContext {
    window: web::Window,
    document: web::Document,
    canvas: web::HtmlCanvasElement,
    painter: CanvasPainter,
    feed: SharedFeed,
    gate: BackgroundEffectGate,
    pointer: PointerTracker,
    field: WaveField,
    strands: Vec<StrandPath>,
}

impl FrameContext {
    fn frame(&mut self) {
        let width = self.canvas.width() as f32;
        let height = self.canvas.height() as f32;
        let input = FrameInput {
            width,
            height,
            page_height: dom::page_height(&self.document) as f32,
            scroll_y: self.window.scroll_y().unwrap_or(0.0) as f32,
            pointer: self.pointer.position(),
        };
        {
            let mut feed = self.feed.borrow_mut();
            feed.sample();
            self.field.step(
                &input,
                feed.latest_snapshot(),
                self.gate.is_active(),
                &mut self.strands,
            );
        }
        self.painter.begin_frame(width as f64, height as f64);
        self.painter.draw(&self.strands);
    }
}

/// The animated wave field on the background canvas. Everything it
/// acquires (frame loop, resize and pointer listeners) is released on
/// `unmount` or drop.
pub struct WaveRenderer {
    scope: Scope,
}

impl WaveRenderer {
    pub fn mount(
        canvas: &web::HtmlCanvasElement,
        feed: SharedFeed,
        gate: BackgroundEffectGate,
        params: WaveParams,
    ) -> Result<Self, JsValue> {
        let window = web::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<web::CanvasRenderingContext2d>()?;
        let painter = CanvasPainter::new(ctx);
        let mut scope = Scope::new();

        dom::sync_canvas_backing_size(canvas);
        // Resizing the backing store also clears it.
        let canvas_resize = canvas.clone();
        scope.hold(EventListener::new(&window, "resize", move |_| {
            dom::sync_canvas_backing_size(&canvas_resize);
        })?);

        let (pointer, pointer_listener) = PointerTracker::wire(&window, canvas)?;
        scope.hold(pointer_listener);

        let strands = params.strands;
        let mut ctx = FrameContext {
            window,
            document,
            canvas: canvas.clone(),
            painter,
            feed,
            gate,
            pointer,
            field: WaveField::new(params),
            strands: Vec::with_capacity(strands),
        };
        scope.hold(AnimationLoop::start(move |_ts| ctx.frame())?);
        log::info!("[waves] mounted ({} strands)", strands);
        Ok(Self { scope })
    }

    pub fn unmount(&mut self) {
        if !self.scope.is_empty() {
            self.scope.dispose();
            log::info!("[waves] unmounted");
        }
    }
}

impl Drop for WaveRenderer {
    fn drop(&mut self) {
        self.unmount();
    }
}
