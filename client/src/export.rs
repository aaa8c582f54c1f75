use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlAnchorElement, HtmlCanvasElement};

pub const EXPORT_FILE_NAME: &str = "painting.png";
const EXPORT_MIME: &str = "image/png";

/// Offers the current canvas pixels as a PNG download.
pub fn export_png(document: &Document, canvas: &HtmlCanvasElement) -> Result<(), JsValue> {
    let data_url = canvas.to_data_url_with_type(EXPORT_MIME)?;
    let anchor = document
        .create_element("a")?
        .dyn_into::<HtmlAnchorElement>()
        .map_err(|_| JsValue::from_str("Invalid element type: a"))?;
    anchor.set_download(EXPORT_FILE_NAME);
    anchor.set_href(&data_url);
    anchor.click();
    log::debug!("exported {EXPORT_FILE_NAME} ({} bytes of data url)", data_url.len());
    Ok(())
}
