mod app;
mod dom;
mod export;
pub mod net;
pub mod painter;
pub mod preferences;
pub mod render;
pub mod surface;
mod ws;

pub use app::run;
