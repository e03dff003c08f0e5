pub mod color;
pub mod config;
pub mod draw;
pub mod font;

// Re-export the drawing surface API
pub use crate::color::{Color, ColorError};
pub use crate::draw::{DrawError, Surface};
pub use crate::font::{Font, FontError};
