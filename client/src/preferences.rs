//! Per-device brush preferences.
//!
//! Stored under [`STORAGE_KEY`] as a JSON object with optional fields
//! `brushColor`, `brushSize`, `lastPoint` and `mouseDown`. Each field is
//! validated on its own; anything absent or malformed falls back to its
//! default without affecting the other fields.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use web_sys::{Storage, Window};

use paint_shared::{
    is_valid_brush_size, normalize_color, BrushSettings, Point, DEFAULT_BRUSH_COLOR,
    DEFAULT_BRUSH_SIZE,
};

pub const STORAGE_KEY: &str = "paint.session";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("local storage is unavailable")]
    Unavailable,
    #[error("failed to read local storage: {0}")]
    Read(String),
    #[error("failed to write local storage: {0}")]
    Write(String),
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Browser `localStorage`. Private browsing modes may deny access entirely,
/// in which case every call reports [`StorageError::Unavailable`].
pub struct LocalStorage {
    storage: Option<Storage>,
}

impl LocalStorage {
    pub fn new(window: &Window) -> Self {
        Self {
            storage: window.local_storage().ok().flatten(),
        }
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let storage = self.storage.as_ref().ok_or(StorageError::Unavailable)?;
        storage
            .get_item(key)
            .map_err(|error| StorageError::Read(format!("{error:?}")))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let storage = self.storage.as_ref().ok_or(StorageError::Unavailable)?;
        storage
            .set_item(key, value)
            .map_err(|error| StorageError::Write(format!("{error:?}")))
    }
}

/// The persisted view of a session.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    pub brush_color: String,
    pub brush_size: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_point: Option<Point>,
    pub mouse_down: bool,
}

impl Default for StoredSession {
    fn default() -> Self {
        Self {
            brush_color: DEFAULT_BRUSH_COLOR.to_string(),
            brush_size: DEFAULT_BRUSH_SIZE,
            last_point: None,
            mouse_down: false,
        }
    }
}

impl StoredSession {
    pub fn brush(&self) -> BrushSettings {
        BrushSettings {
            color: self.brush_color.clone(),
            size: self.brush_size,
        }
    }

    /// Field-by-field parse; never fails.
    pub fn parse(text: &str) -> Self {
        let defaults = Self::default();
        let object = match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(object)) => object,
            Ok(_) => {
                log::warn!("stored session is not an object, using defaults");
                return defaults;
            }
            Err(error) => {
                log::warn!("stored session is unreadable ({error}), using defaults");
                return defaults;
            }
        };

        Self {
            brush_color: read_color(&object).unwrap_or(defaults.brush_color),
            brush_size: read_size(&object).unwrap_or(defaults.brush_size),
            last_point: read_point(&object),
            mouse_down: object
                .get("mouseDown")
                .and_then(Value::as_bool)
                .unwrap_or(defaults.mouse_down),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

fn read_color(object: &Map<String, Value>) -> Option<String> {
    let value = object.get("brushColor")?;
    let color = value.as_str().and_then(normalize_color);
    if color.is_none() {
        log::debug!("ignoring stored brushColor {value}");
    }
    color
}

fn read_size(object: &Map<String, Value>) -> Option<f64> {
    let value = object.get("brushSize")?;
    let size = value.as_f64().filter(|size| is_valid_brush_size(*size));
    if size.is_none() {
        log::debug!("ignoring stored brushSize {value}");
    }
    size
}

fn read_point(object: &Map<String, Value>) -> Option<Point> {
    let value = object.get("lastPoint")?.clone();
    serde_json::from_value::<Point>(value)
        .ok()
        .filter(|point| point.is_finite())
}

pub fn load_session<K: KeyValueStore + ?Sized>(store: &K) -> StoredSession {
    match store.get(STORAGE_KEY) {
        Ok(Some(text)) => StoredSession::parse(&text),
        Ok(None) => StoredSession::default(),
        Err(error) => {
            log::warn!("{error}, using default preferences");
            StoredSession::default()
        }
    }
}

pub fn save_session<K: KeyValueStore + ?Sized>(
    store: &mut K,
    session: &StoredSession,
) -> Result<(), StorageError> {
    store.set(STORAGE_KEY, &session.to_json())
}
