//! Core types for Marginalia's AI layer.

pub mod message;
pub mod stream;

pub use message::*;
pub use stream::*;
