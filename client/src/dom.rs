use std::cell::Cell;

use js_sys::Reflect;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, HtmlCanvasElement, HtmlInputElement, HtmlSpanElement, PointerEvent,
};

use paint_shared::Point;

pub fn document_ready_state(document: &Document) -> Option<String> {
    Reflect::get(document.as_ref(), &JsValue::from_str("readyState"))
        .ok()?
        .as_string()
}

pub fn get_element<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    let element = document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("Missing element: {id}")))?;
    element
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("Invalid element type: {id}")))
}

pub fn update_size_label(input: &HtmlInputElement, value: &HtmlSpanElement) {
    value.set_text_content(Some(&input.value()));
}

pub fn set_status(status_el: &Element, state: &str, text: &str) {
    let _ = status_el.set_attribute("data-state", state);
    status_el.set_text_content(Some(text));
}

/// Pointer position in canvas pixels, compensating for CSS scaling of the element.
pub fn event_to_point(canvas: &HtmlCanvasElement, event: &PointerEvent) -> Option<Point> {
    let rect = canvas.get_bounding_client_rect();
    if rect.width() <= 0.0 || rect.height() <= 0.0 {
        return None;
    }
    let scale_x = f64::from(canvas.width()) / rect.width();
    let scale_y = f64::from(canvas.height()) / rect.height();
    let point = Point {
        x: (f64::from(event.client_x()) - rect.left()) * scale_x,
        y: (f64::from(event.client_y()) - rect.top()) * scale_y,
    };
    point.is_finite().then_some(point)
}

/// The one pointer allowed to draw. Other pointers are ignored until it lifts.
#[derive(Debug, Default)]
pub struct ActivePointer {
    id: Cell<Option<i32>>,
}

impl ActivePointer {
    /// Takes the pointer when none is active; false if another one already is.
    pub fn claim(&self, pointer_id: i32) -> bool {
        match self.id.get() {
            Some(active) => active == pointer_id,
            None => {
                self.id.set(Some(pointer_id));
                true
            }
        }
    }

    pub fn is(&self, pointer_id: i32) -> bool {
        self.id.get() == Some(pointer_id)
    }

    /// Releases the pointer if it is the active one.
    pub fn release(&self, pointer_id: i32) -> bool {
        if !self.is(pointer_id) {
            return false;
        }
        self.id.set(None);
        true
    }
}
