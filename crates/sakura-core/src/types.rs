//! Spatial and common types

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// A 2D vector in layer-local logical pixels
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

/// Logical bounds of the decorative layer, in CSS-pixel-style units.
///
/// The render surface may be larger by a device scale factor; simulation
/// and retirement checks always work in logical units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// True if `point` lies inside the viewport expanded by `margin` on
    /// every side. Used for retirement: leaving the margin band, not merely
    /// touching an edge, is what releases a particle.
    pub fn contains_with_margin(&self, point: Vec2, margin: f32) -> bool {
        point.x >= -margin
            && point.x <= self.width + margin
            && point.y >= -margin
            && point.y <= self.height + margin
    }
}

/// RGBA color
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    pub const TRANSPARENT: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
            a: 1.0,
        }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_operations() {
        let v1 = Vec2::new(1.0, 2.0);
        let v2 = Vec2::new(4.0, 6.0);

        assert_eq!(v1 + v2, Vec2::new(5.0, 8.0));
        assert_eq!(v2 - v1, Vec2::new(3.0, 4.0));
        assert_eq!(v1 * 2.0, Vec2::new(2.0, 4.0));
    }

    #[test]
    fn test_viewport_margin_band() {
        let vp = Viewport::new(100.0, 50.0);
        assert!(vp.contains_with_margin(Vec2::new(50.0, 25.0), 0.0));
        // On the edge still counts as inside
        assert!(vp.contains_with_margin(Vec2::new(100.0, 50.0), 0.0));
        // Inside the margin band
        assert!(vp.contains_with_margin(Vec2::new(-10.0, 25.0), 20.0));
        // Beyond the margin band
        assert!(!vp.contains_with_margin(Vec2::new(-30.0, 25.0), 20.0));
        assert!(!vp.contains_with_margin(Vec2::new(50.0, 80.0), 20.0));
    }

    #[test]
    fn test_empty_viewport() {
        assert!(Viewport::new(0.0, 100.0).is_empty());
        assert!(Viewport::new(100.0, -1.0).is_empty());
        assert!(!Viewport::new(1.0, 1.0).is_empty());
    }

    #[test]
    fn test_color_from_hex() {
        let c = Color::from_hex(0xFFB7C5);
        assert!((c.r - 1.0).abs() < 0.01);
        assert!((c.g - 0.718).abs() < 0.01);
        assert!((c.b - 0.773).abs() < 0.01);
        assert!((c.a - 1.0).abs() < 1e-6);

        let faded = c.with_alpha(0.5);
        assert!((faded.a - 0.5).abs() < 1e-6);
        assert!((faded.r - c.r).abs() < 1e-6);
    }
}
