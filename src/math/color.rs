//! # Color
//!
//! RGB color with components nominally in `[0, 1]` and a packed 24-bit hex
//! value alongside them.
//!
//! The two representations are kept in sync in one direction only:
//! [`Color::set_hex`] rewrites the components, while the component setters
//! leave `hex` untouched. Call [`Color::sync_to_hex`] or
//! [`Color::sync_from_hex`] when the other side must follow.

use std::fmt;

/// An RGB color paired with its packed hex encoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    hex: u32,
    r: f64,
    g: f64,
    b: f64,
}

/// Hue, saturation and value, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Hsv {
    pub hue: f64,
    pub saturation: f64,
    pub value: f64,
}

impl Default for Color {
    fn default() -> Self {
        Self::from_hex(0xFFFFFF)
    }
}

impl Color {
    /// Create a color from a packed `0xRRGGBB` value.
    pub fn from_hex(hex: u32) -> Self {
        let mut color = Self {
            hex: 0,
            r: 0.0,
            g: 0.0,
            b: 0.0,
        };
        color.set_hex(hex);
        color
    }

    /// Create a color from components. `hex` stays 0 until [`sync_to_hex`](Self::sync_to_hex).
    pub fn from_rgb(r: f64, g: f64, b: f64) -> Self {
        Self { hex: 0, r, g, b }
    }

    pub fn r(&self) -> f64 {
        self.r
    }

    pub fn g(&self) -> f64 {
        self.g
    }

    pub fn b(&self) -> f64 {
        self.b
    }

    /// Packed value as last set or synced. May be stale after component writes.
    pub fn hex(&self) -> u32 {
        self.hex
    }

    pub fn set_r(&mut self, r: f64) {
        self.r = r;
    }

    pub fn set_g(&mut self, g: f64) {
        self.g = g;
    }

    pub fn set_b(&mut self, b: f64) {
        self.b = b;
    }

    /// Set the packed value (masked to 24 bits) and recompute the components.
    pub fn set_hex(&mut self, hex: u32) {
        self.hex = hex & 0xFFFFFF;
        self.sync_from_hex();
    }

    /// Set all three components. Does not touch `hex`.
    pub fn set_rgb(&mut self, r: f64, g: f64, b: f64) -> &mut Self {
        self.r = r;
        self.g = g;
        self.b = b;
        self
    }

    /// Set the components from HSV. Does not touch `hex`.
    pub fn set_hsv(&mut self, h: f64, s: f64, v: f64) -> &mut Self {
        if v == 0.0 {
            return self.set_rgb(0.0, 0.0, 0.0);
        }

        let i = (h * 6.0).floor();
        let f = h * 6.0 - i;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));

        let (r, g, b) = match i as i64 {
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            5 => (v, p, q),
            0 | 6 => (v, t, p),
            _ => (0.0, 0.0, 0.0),
        };
        self.set_rgb(r, g, b)
    }

    /// Recompute `hex` from the current components.
    pub fn sync_to_hex(&mut self) {
        let channel = |c: f64| ((c * 255.0).floor() as i64 as u32) & 0xFF;
        self.hex = channel(self.r) << 16 ^ channel(self.g) << 8 ^ channel(self.b);
    }

    /// Recompute the components from `hex`.
    pub fn sync_from_hex(&mut self) {
        self.r = ((self.hex >> 16) & 255) as f64 / 255.0;
        self.g = ((self.hex >> 8) & 255) as f64 / 255.0;
        self.b = (self.hex & 255) as f64 / 255.0;
    }

    /// Copy another color's components (not its hex).
    pub fn copy_from(&mut self, other: &Color) {
        self.set_rgb(other.r, other.g, other.b);
    }

    pub fn copy_gamma_to_linear(&mut self, other: &Color) -> &mut Self {
        self.set_rgb(other.r * other.r, other.g * other.g, other.b * other.b)
    }

    pub fn copy_linear_to_gamma(&mut self, other: &Color) -> &mut Self {
        self.set_rgb(other.r.sqrt(), other.g.sqrt(), other.b.sqrt())
    }

    pub fn convert_gamma_to_linear(&mut self) -> &mut Self {
        let src = *self;
        self.copy_gamma_to_linear(&src)
    }

    pub fn convert_linear_to_gamma(&mut self) -> &mut Self {
        let src = *self;
        self.copy_linear_to_gamma(&src)
    }

    /// Move each component toward `other` by `alpha`.
    pub fn lerp(&mut self, other: &Color, alpha: f64) {
        self.r += (other.r - self.r) * alpha;
        self.g += (other.g - self.g) * alpha;
        self.b += (other.b - self.b) * alpha;
    }

    pub fn to_hsv(&self) -> Hsv {
        rgb_to_hsv(self)
    }

    /// Shift hue, saturation and value by the given deltas, clamping each to `[0, 1]`.
    pub fn adjust_hsv(&mut self, h: f64, s: f64, v: f64) {
        let hsv = rgb_to_hsv(self);
        self.set_hsv(
            (hsv.hue + h).clamp(0.0, 1.0),
            (hsv.saturation + s).clamp(0.0, 1.0),
            (hsv.value + v).clamp(0.0, 1.0),
        );
    }

    /// Components as `f32`, for vertex arrays.
    pub fn to_array(&self) -> [f32; 3] {
        [self.r as f32, self.g as f32, self.b as f32]
    }
}

/// Convert a color's components to HSV.
pub fn rgb_to_hsv(color: &Color) -> Hsv {
    let (r, g, b) = (color.r, color.g, color.b);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);

    if min == max {
        return Hsv {
            hue: 0.0,
            saturation: 0.0,
            value: max,
        };
    }

    let delta = max - min;
    let mut hue = if r == max {
        (g - b) / delta
    } else if g == max {
        2.0 + (b - r) / delta
    } else {
        4.0 + (r - g) / delta
    };

    hue /= 6.0;
    if hue < 0.0 {
        hue += 1.0;
    }
    if hue > 1.0 {
        hue -= 1.0;
    }

    Hsv {
        hue,
        saturation: delta / max,
        value: max,
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rgb({},{},{})",
            (self.r * 255.0).floor(),
            (self.g * 255.0).floor(),
            (self.b * 255.0).floor()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_default_is_white() {
        let c = Color::default();
        assert_eq!(c.hex(), 0xFFFFFF);
        assert_eq!((c.r(), c.g(), c.b()), (1.0, 1.0, 1.0));
    }

    #[test]
    fn test_hex_round_trip() {
        let mut c = Color::default();
        for hex in (0..=0xFFFFFFu32).step_by(0x010203) {
            c.set_hex(hex);
            assert_eq!(c.hex(), hex);
        }
        c.set_hex(0xFFFFFF);
        assert_eq!(c.hex(), 0xFFFFFF);
    }

    #[test]
    fn test_set_hex_masks_to_24_bits() {
        let c = Color::from_hex(0xAB123456);
        assert_eq!(c.hex(), 0x123456);
        assert!((c.r() - 0x12 as f64 / 255.0).abs() < EPS);
    }

    #[test]
    fn test_set_rgb_leaves_hex_stale() {
        let mut c = Color::from_hex(0xFF0000);
        c.set_rgb(0.0, 1.0, 0.0);
        assert_eq!(c.hex(), 0xFF0000);

        c.sync_to_hex();
        assert_eq!(c.hex(), 0x00FF00);
    }

    #[test]
    fn test_sync_from_hex_discards_component_edits() {
        let mut c = Color::from_hex(0x336699);
        c.set_b(0.0);
        c.sync_from_hex();
        assert!((c.b() - 0x99 as f64 / 255.0).abs() < EPS);
    }

    #[test]
    fn test_set_hsv_primaries() {
        let mut c = Color::default();
        c.set_hsv(0.0, 1.0, 1.0);
        assert_eq!((c.r(), c.g(), c.b()), (1.0, 0.0, 0.0));

        c.set_hsv(1.0 / 3.0, 1.0, 1.0);
        assert!((c.g() - 1.0).abs() < EPS);
        assert!(c.r().abs() < EPS);

        c.set_hsv(0.5, 1.0, 0.0);
        assert_eq!((c.r(), c.g(), c.b()), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_rgb_to_hsv() {
        let hsv = rgb_to_hsv(&Color::from_hex(0x0000FF));
        assert!((hsv.hue - 2.0 / 3.0).abs() < EPS);
        assert_eq!(hsv.saturation, 1.0);
        assert_eq!(hsv.value, 1.0);

        let grey = rgb_to_hsv(&Color::from_rgb(0.5, 0.5, 0.5));
        assert_eq!(grey, Hsv { hue: 0.0, saturation: 0.0, value: 0.5 });
    }

    #[test]
    fn test_adjust_hsv_clamps() {
        let mut c = Color::from_hex(0xFF0000);
        c.adjust_hsv(0.0, 0.0, 5.0);
        assert_eq!((c.r(), c.g(), c.b()), (1.0, 0.0, 0.0));

        c.adjust_hsv(0.0, -1.0, 0.0);
        assert_eq!((c.r(), c.g(), c.b()), (1.0, 1.0, 1.0));
    }

    #[test]
    fn test_gamma_conversion() {
        let mut c = Color::from_rgb(0.5, 0.25, 1.0);
        c.convert_gamma_to_linear();
        assert!((c.r() - 0.25).abs() < EPS);
        assert!((c.g() - 0.0625).abs() < EPS);
        c.convert_linear_to_gamma();
        assert!((c.r() - 0.5).abs() < EPS);
        assert!((c.g() - 0.25).abs() < EPS);
    }

    #[test]
    fn test_lerp() {
        let mut c = Color::from_rgb(0.0, 0.0, 0.0);
        c.lerp(&Color::from_rgb(1.0, 0.5, 0.0), 0.5);
        assert!((c.r() - 0.5).abs() < EPS);
        assert!((c.g() - 0.25).abs() < EPS);
    }

    #[test]
    fn test_display() {
        assert_eq!(Color::from_hex(0xFF00FF).to_string(), "rgb(255,0,255)");
        assert_eq!(Color::from_rgb(0.5, 0.0, 0.0).to_string(), "rgb(127,0,0)");
    }
}
