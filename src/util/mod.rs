//! Shared helpers: aligned buffers, page arithmetic and timing math

pub mod buffer;
pub mod time;
