use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, Document, Element, Event, HtmlButtonElement, HtmlCanvasElement,
    HtmlInputElement, HtmlSpanElement, PointerEvent, Window,
};

use crate::dom::{
    document_ready_state, event_to_point, get_element, set_status, update_size_label,
    ActivePointer,
};
use crate::export::export_png;
use crate::net::Transmit;
use crate::painter::Painter;
use crate::preferences::{KeyValueStore, LocalStorage};
use crate::render::render_stroke;
use crate::surface::{CanvasSurface, Surface};
use crate::ws::{connect_ws, WsEvent};

type SharedPainter<S, T, K> = Rc<RefCell<Painter<S, T, K>>>;

#[wasm_bindgen(start)]
pub fn run() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Missing window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;
    let started = Rc::new(Cell::new(false));

    if document_ready_state(&document).as_deref() == Some("complete") {
        started.set(true);
        return start_app(&window, &document);
    }

    let onload_started = started.clone();
    let onload_window = window.clone();
    let onload = Closure::<dyn FnMut(Event)>::new(move |_| {
        if onload_started.replace(true) {
            return;
        }
        if let Err(error) = start_app(&onload_window, &document) {
            log::error!("failed to start: {error:?}");
        }
    });
    window.add_event_listener_with_callback("load", onload.as_ref().unchecked_ref())?;
    onload.forget();

    Ok(())
}

fn start_app(window: &Window, document: &Document) -> Result<(), JsValue> {
    let canvas: HtmlCanvasElement = get_element(document, "board")?;
    let ctx = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("Missing canvas context"))?
        .dyn_into::<CanvasRenderingContext2d>()?;
    let color_input: HtmlInputElement = get_element(document, "color")?;
    let size_input: HtmlInputElement = get_element(document, "size")?;
    let size_value: HtmlSpanElement = get_element(document, "sizeValue")?;
    let save_button: HtmlButtonElement = get_element(document, "save")?;
    let status_el: Element = get_element(document, "status")?;

    let surface = CanvasSurface::new(ctx);
    set_status(&status_el, "connecting", "Connecting...");

    let mut remote_surface = surface.clone();
    let sender = connect_ws(window, move |event| match event {
        WsEvent::Stroke(stroke) => render_stroke(&mut remote_surface, &stroke),
        WsEvent::Open => set_status(&status_el, "open", "Connected"),
        WsEvent::Close => set_status(&status_el, "closed", "Disconnected"),
        WsEvent::Error => set_status(&status_el, "error", "Connection error"),
    })?;

    let painter = Rc::new(RefCell::new(Painter::restore(
        surface,
        sender,
        LocalStorage::new(window),
    )));

    {
        let brush = painter.borrow().state().brush.clone();
        color_input.set_value(&brush.color);
        size_input.set_value(&brush.size.to_string());
        update_size_label(&size_input, &size_value);
    }

    bind_pointer(window, &canvas, &painter)?;
    bind_controls(&color_input, &size_input, &size_value, &painter)?;

    {
        let document = document.clone();
        let canvas = canvas.clone();
        let onsave = Closure::<dyn FnMut(Event)>::new(move |_| {
            if let Err(error) = export_png(&document, &canvas) {
                log::error!("export failed: {error:?}");
            }
        });
        save_button.add_event_listener_with_callback("click", onsave.as_ref().unchecked_ref())?;
        onsave.forget();
    }

    Ok(())
}

fn bind_pointer<S, T, K>(
    window: &Window,
    canvas: &HtmlCanvasElement,
    painter: &SharedPainter<S, T, K>,
) -> Result<(), JsValue>
where
    S: Surface + 'static,
    T: Transmit + 'static,
    K: KeyValueStore + 'static,
{
    let active = Rc::new(ActivePointer::default());

    {
        let painter = painter.clone();
        let active = active.clone();
        let down_canvas = canvas.clone();
        let ondown = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            if event.button() != 0 {
                return;
            }
            let Some(point) = event_to_point(&down_canvas, &event) else {
                return;
            };
            event.prevent_default();
            if !active.claim(event.pointer_id()) {
                return;
            }
            let _ = down_canvas.set_pointer_capture(event.pointer_id());
            painter.borrow_mut().pointer_down(point);
        });
        canvas.add_event_listener_with_callback("pointerdown", ondown.as_ref().unchecked_ref())?;
        ondown.forget();
    }

    {
        let painter = painter.clone();
        let active = active.clone();
        let move_canvas = canvas.clone();
        let onmove = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            if !active.is(event.pointer_id()) {
                return;
            }
            let Some(point) = event_to_point(&move_canvas, &event) else {
                return;
            };
            painter.borrow_mut().pointer_move(point);
        });
        canvas.add_event_listener_with_callback("pointermove", onmove.as_ref().unchecked_ref())?;
        onmove.forget();
    }

    {
        // Released anywhere, including outside the canvas.
        let painter = painter.clone();
        let stop_canvas = canvas.clone();
        let onstop = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            if !active.release(event.pointer_id()) {
                return;
            }
            if stop_canvas.has_pointer_capture(event.pointer_id()) {
                let _ = stop_canvas.release_pointer_capture(event.pointer_id());
            }
            painter.borrow_mut().pointer_up();
        });
        window.add_event_listener_with_callback("pointerup", onstop.as_ref().unchecked_ref())?;
        window
            .add_event_listener_with_callback("pointercancel", onstop.as_ref().unchecked_ref())?;
        onstop.forget();
    }

    Ok(())
}

fn bind_controls<S, T, K>(
    color_input: &HtmlInputElement,
    size_input: &HtmlInputElement,
    size_value: &HtmlSpanElement,
    painter: &SharedPainter<S, T, K>,
) -> Result<(), JsValue>
where
    S: Surface + 'static,
    T: Transmit + 'static,
    K: KeyValueStore + 'static,
{
    {
        let painter = painter.clone();
        let input = color_input.clone();
        let oncolor = Closure::<dyn FnMut(Event)>::new(move |_| {
            painter.borrow_mut().set_color(&input.value());
        });
        color_input.add_event_listener_with_callback("input", oncolor.as_ref().unchecked_ref())?;
        oncolor.forget();
    }

    {
        let painter = painter.clone();
        let input = size_input.clone();
        let label = size_value.clone();
        let onsize = Closure::<dyn FnMut(Event)>::new(move |_| {
            match input.value().parse::<f64>() {
                Ok(size) => painter.borrow_mut().set_size(size),
                Err(error) => log::warn!("ignoring brush size {:?}: {error}", input.value()),
            }
            update_size_label(&input, &label);
        });
        size_input.add_event_listener_with_callback("input", onsize.as_ref().unchecked_ref())?;
        onsize.forget();
    }

    Ok(())
}
