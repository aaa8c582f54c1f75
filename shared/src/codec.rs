//! Text codec for [`StrokeMessage`].
//!
//! Wire shape:
//! ```text
//! {"from":{"x":10.0,"y":10.0},"to":{"x":20.0,"y":20.0},"brushSize":5.0,"brushColor":"#ff0000"}
//! ```
//! Decoding is strict about shape and lenient about field order and unknown
//! extra fields. Input comes from untrusted peers, so every failure is a
//! [`MalformedMessage`] value rather than a panic.

use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::{normalize_color, Point, StrokeMessage};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedMessage {
    #[error("payload is not valid JSON: {0}")]
    NotJson(String),
    #[error("payload is not a JSON object")]
    NotAnObject,
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("field `{0}` has the wrong type")]
    WrongType(&'static str),
    #[error("brushColor is not a hex color")]
    InvalidColor,
    #[error("brushSize must be a positive number")]
    NonPositiveSize,
}

pub fn encode(message: &StrokeMessage) -> String {
    json!({
        "from": point_value(message.from),
        "to": point_value(message.to),
        "brushSize": message.brush_size,
        "brushColor": message.brush_color,
    })
    .to_string()
}

pub fn decode(text: &str) -> Result<StrokeMessage, MalformedMessage> {
    let value: Value =
        serde_json::from_str(text).map_err(|error| MalformedMessage::NotJson(error.to_string()))?;
    let object = value.as_object().ok_or(MalformedMessage::NotAnObject)?;

    let from = read_point(object, "from")?;
    let to = read_point(object, "to")?;
    let brush_size = read_number(object, "brushSize")?;
    if brush_size <= 0.0 {
        return Err(MalformedMessage::NonPositiveSize);
    }
    let brush_color = match field(object, "brushColor")? {
        Value::String(color) => normalize_color(color).ok_or(MalformedMessage::InvalidColor)?,
        _ => return Err(MalformedMessage::WrongType("brushColor")),
    };

    Ok(StrokeMessage {
        from,
        to,
        brush_size,
        brush_color,
    })
}

fn point_value(point: Point) -> Value {
    json!({ "x": point.x, "y": point.y })
}

fn field<'a>(
    object: &'a Map<String, Value>,
    name: &'static str,
) -> Result<&'a Value, MalformedMessage> {
    object.get(name).ok_or(MalformedMessage::MissingField(name))
}

fn read_number(object: &Map<String, Value>, name: &'static str) -> Result<f64, MalformedMessage> {
    field(object, name)?
        .as_f64()
        .filter(|value| value.is_finite())
        .ok_or(MalformedMessage::WrongType(name))
}

fn read_point(object: &Map<String, Value>, name: &'static str) -> Result<Point, MalformedMessage> {
    let inner = field(object, name)?
        .as_object()
        .ok_or(MalformedMessage::WrongType(name))?;
    let x = inner.get("x").and_then(Value::as_f64);
    let y = inner.get("y").and_then(Value::as_f64);
    match (x, y) {
        (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Ok(Point { x, y }),
        _ => Err(MalformedMessage::WrongType(name)),
    }
}
