use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, Event, MessageEvent, WebSocket, Window};

use paint_shared::{decode, StrokeMessage};

use crate::net::{websocket_url, Transmit, TransmitError};

#[derive(Debug)]
pub enum WsEvent {
    Open,
    Close,
    Error,
    Stroke(StrokeMessage),
}

pub struct WsSender {
    socket: WebSocket,
}

impl WsSender {
    pub fn is_open(&self) -> bool {
        self.socket.ready_state() == WebSocket::OPEN
    }
}

impl Transmit for WsSender {
    fn transmit(&self, text: &str) -> Result<(), TransmitError> {
        if !self.is_open() {
            return Err(TransmitError::NotOpen);
        }
        self.socket
            .send_with_str(text)
            .map_err(|error| TransmitError::Rejected(format!("{error:?}")))
    }
}

const LOGGED_PAYLOAD_CHARS: usize = 200;

fn snippet(text: &str) -> String {
    match text.char_indices().nth(LOGGED_PAYLOAD_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

pub fn connect_ws(
    window: &Window,
    on_event: impl 'static + FnMut(WsEvent),
) -> Result<Rc<WsSender>, JsValue> {
    let ws_url = websocket_url(window)?;
    let socket = WebSocket::new(&ws_url)?;
    log::info!("connecting to {ws_url}");

    let sender = Rc::new(WsSender {
        socket: socket.clone(),
    });

    let on_event = Rc::new(RefCell::new(on_event));

    {
        let on_event = on_event.clone();
        let onopen = Closure::<dyn FnMut(Event)>::new(move |_| {
            on_event.borrow_mut()(WsEvent::Open);
        });
        socket.set_onopen(Some(onopen.as_ref().unchecked_ref()));
        onopen.forget();
    }

    {
        let on_event = on_event.clone();
        let onclose = Closure::<dyn FnMut(CloseEvent)>::new(move |event: CloseEvent| {
            log::info!(
                "channel closed code={} reason={:?}",
                event.code(),
                event.reason()
            );
            on_event.borrow_mut()(WsEvent::Close);
        });
        socket.set_onclose(Some(onclose.as_ref().unchecked_ref()));
        onclose.forget();
    }

    {
        let on_event = on_event.clone();
        let onerror = Closure::<dyn FnMut(Event)>::new(move |_| {
            on_event.borrow_mut()(WsEvent::Error);
        });
        socket.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onerror.forget();
    }

    {
        let on_event = on_event.clone();
        let onmessage = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
            let Some(text) = event.data().as_string() else {
                log::warn!("dropping non-text frame");
                return;
            };
            // One bad frame from a peer costs that frame only.
            match decode(&text) {
                Ok(stroke) => on_event.borrow_mut()(WsEvent::Stroke(stroke)),
                Err(error) => {
                    log::warn!("dropping malformed stroke: {error} payload={:?}", snippet(&text));
                }
            }
        });
        socket.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
        onmessage.forget();
    }

    {
        let socket = socket.clone();
        let onbeforeunload = Closure::<dyn FnMut(Event)>::new(move |_| {
            let _ = socket.close();
        });
        window.add_event_listener_with_callback(
            "beforeunload",
            onbeforeunload.as_ref().unchecked_ref(),
        )?;
        onbeforeunload.forget();
    }

    Ok(sender)
}
