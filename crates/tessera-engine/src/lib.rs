//! Tessera engine crate.
//!
//! A small 2D renderer built around quad batching: solid rects, image rects
//! and text are collected into three fixed-capacity batches and submitted to
//! the GPU when a batch fills, when an image needs the texture slot, or at
//! the end of the frame.

pub mod core;
pub mod device;
pub mod time;
pub mod window;

pub mod coords;
pub mod logging;
pub mod paint;
pub mod raster;
pub mod render;
pub mod text;
