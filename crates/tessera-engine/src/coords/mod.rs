//! Coordinate and geometry types shared by the renderer and text layout.
//!
//! Canonical CPU space ("frame space"):
//! - Logical pixels
//! - Origin top-left
//! - +X right, +Y down
//!
//! The vertex shader maps frame space to NDC using the `frame_size` uniform.

mod rect;
mod tex_rect;
mod vec2;

pub use rect::Rect;
pub use tex_rect::TexRect;
pub use vec2::Vec2;
