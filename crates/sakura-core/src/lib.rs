//! Sakura Core - Foundational types for the Sakura overlay engine
//!
//! This crate provides the core types that all other Sakura crates depend on:
//! - `Vec2`, `Viewport` - 2D spatial types in layer-local logical pixels
//! - `Color` - RGBA color with hex constructor
//! - Error types and Result alias
//! - Linear interpolation helpers

mod curves;
mod error;
mod types;

pub use curves::lerp_f32;
pub use error::{OverlayError, Result};
pub use types::{Color, Vec2, Viewport};
