use std::rc::Rc;

use thiserror::Error;
use wasm_bindgen::JsValue;
use web_sys::Window;

pub const WS_PATH: &str = "/ws";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransmitError {
    #[error("channel is not open")]
    NotOpen,
    #[error("send rejected: {0}")]
    Rejected(String),
}

/// Outbound half of a channel. Sends are fire-and-forget: a failure is
/// reported to the caller and nothing is queued for retry.
pub trait Transmit {
    fn transmit(&self, text: &str) -> Result<(), TransmitError>;
}

impl<T: Transmit + ?Sized> Transmit for Rc<T> {
    fn transmit(&self, text: &str) -> Result<(), TransmitError> {
        (**self).transmit(text)
    }
}

pub fn websocket_url(window: &Window) -> Result<String, JsValue> {
    let location = window.location();
    let protocol = location.protocol()?;
    let host = location.host()?;
    Ok(websocket_url_for(&protocol, &host))
}

/// `wss` exactly when the page itself came over `https:`.
pub fn websocket_url_for(protocol: &str, host: &str) -> String {
    let scheme = if protocol == "https:" { "wss" } else { "ws" };
    format!("{scheme}://{host}{WS_PATH}")
}
