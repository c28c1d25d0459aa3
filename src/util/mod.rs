//! Shared text utilities.

mod text;

pub use text::{strip_html, truncate};
