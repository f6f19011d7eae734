use crate::dom::EventListener;
use glam::Vec2;
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

/// Last pointer position in canvas pixels, shared with the frame loop.
#[derive(Clone)]
pub struct PointerTracker {
    position: Rc<Cell<Vec2>>,
}

impl PointerTracker {
    /// Start tracking on `window`; the returned listener stops tracking
    /// when dropped. Starts at the canvas centre.
    pub fn wire(
        window: &web::Window,
        canvas: &web::HtmlCanvasElement,
    ) -> Result<(Self, EventListener), JsValue> {
        let center = Vec2::new(canvas.width() as f32 * 0.5, canvas.height() as f32 * 0.5);
        let tracker = Self {
            position: Rc::new(Cell::new(center)),
        };
        let position = tracker.position.clone();
        let canvas = canvas.clone();
        let listener = EventListener::new(window, "pointermove", move |ev: web::Event| {
            if let Some(ev) = ev.dyn_ref::<web::MouseEvent>() {
                position.set(pointer_canvas_px(ev, &canvas));
            }
        })?;
        Ok((tracker, listener))
    }

    pub fn position(&self) -> Vec2 {
        self.position.get()
    }
}

#[inline]
pub fn pointer_canvas_px(ev: &web::MouseEvent, canvas: &web::HtmlCanvasElement) -> Vec2 {
    let rect = canvas.get_bounding_client_rect();
    let x_css = ev.client_x() as f32 - rect.left() as f32;
    let y_css = ev.client_y() as f32 - rect.top() as f32;
    let w = rect.width() as f32;
    let h = rect.height() as f32;
    if w > 0.0 && h > 0.0 {
        Vec2::new(
            x_css / w * canvas.width() as f32,
            y_css / h * canvas.height() as f32,
        )
    } else {
        Vec2::new(x_css, y_css)
    }
}
