//! Sakura Overlay - lifecycle management and the caller-facing API
//!
//! The overlay engine paints a transparent decorative layer above the host
//! application's UI. Callers supply an [`sakura_engine::OverlayConfig`],
//! mount the engine onto a layer, and drive it with animation-frame ticks;
//! document/element visibility and capability signals pause or scale it.

mod clock;
mod lifecycle;

pub use clock::FrameClock;
pub use lifecycle::{EngineState, OverlayEngine};
