//! Rendering of converted documents.

mod json;

pub use json::{primitives_to_json, to_json, JsonFormat};
