//! # Color Module
//!
//! Packed RGBA voxel colors and the HSV arithmetic the painting tools need.
//!
//! Colors are stored as four 8-bit channels and exchanged with hosts as a
//! `0xRRGGBBAA` integer. Brightness adjustments follow the usual
//! "lighter/darker by percentage" convention of desktop color APIs:
//! a factor of 150 brightens by half, 100 leaves the color untouched.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// The contents of a single grid cell: empty, or a color.
pub type Voxel = Option<Color>;

/// An RGBA color with 8 bits per channel.
///
/// # Memory Layout
/// `#[repr(C)]` keeps the channels in `r, g, b, a` order so the color can be
/// reinterpreted as a big-endian `0xRRGGBBAA` word without copying fields.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Alpha channel
    pub a: u8,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// Creates a color from all four channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    /// Creates a fully opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 0xff }
    }

    /// Unpacks a `0xRRGGBBAA` word.
    pub fn from_rgba(packed: u32) -> Self {
        bytemuck::cast(packed.to_be_bytes())
    }

    /// Packs the color into a `0xRRGGBBAA` word.
    pub fn to_rgba(self) -> u32 {
        u32::from_be_bytes(bytemuck::cast(self))
    }

    /// Returns the same color with alpha forced to full opacity.
    pub fn opaque(self) -> Self {
        Color { a: 0xff, ..self }
    }

    /// Converts to HSV, every component in `[0, 1]`.
    ///
    /// Hue is a fraction of the full circle (`0.5` is cyan). Achromatic colors
    /// report a hue of `0.0`.
    pub fn to_hsv(self) -> (f32, f32, f32) {
        let r = self.r as f32 / 255.0;
        let g = self.g as f32 / 255.0;
        let b = self.b as f32 / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let v = max;
        if delta <= f32::EPSILON {
            return (0.0, 0.0, v);
        }
        let s = delta / max;

        let sector = if max == r {
            ((g - b) / delta).rem_euclid(6.0)
        } else if max == g {
            (b - r) / delta + 2.0
        } else {
            (r - g) / delta + 4.0
        };

        ((sector / 6.0).rem_euclid(1.0), s, v)
    }

    /// Builds a color from HSV components in `[0, 1]`.
    ///
    /// Hue wraps around the circle; saturation and value are clamped.
    pub fn from_hsv(h: f32, s: f32, v: f32, a: u8) -> Self {
        let h = h.rem_euclid(1.0) * 6.0;
        let s = s.clamp(0.0, 1.0);
        let v = v.clamp(0.0, 1.0);

        let c = v * s;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let m = v - c;

        let (r1, g1, b1) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        Color::new(to_channel(r1 + m), to_channel(g1 + m), to_channel(b1 + m), a)
    }

    /// Returns a brighter (or darker) version of the color.
    ///
    /// `factor` is a percentage applied to the HSV value. Values below 100
    /// darken, 0 and 100 return the color unchanged. When the value would
    /// overflow, the excess is taken out of the saturation instead so very
    /// bright colors fade towards white.
    pub fn lighter(self, factor: u32) -> Self {
        if factor == 0 || factor == 100 {
            return self;
        }
        if factor < 100 {
            return self.darker(10_000 / factor);
        }

        let (h, mut s, v) = self.to_hsv();
        let mut v = v * factor as f32 / 100.0;
        if v > 1.0 {
            s = (s - (v - 1.0)).max(0.0);
            v = 1.0;
        }
        Color::from_hsv(h, s, v, self.a)
    }

    /// Returns a darker (or lighter) version of the color.
    ///
    /// The inverse convention of [`Color::lighter`]: a factor of 200 halves
    /// the value.
    pub fn darker(self, factor: u32) -> Self {
        if factor == 0 || factor == 100 {
            return self;
        }
        if factor < 100 {
            return self.lighter(10_000 / factor);
        }

        let (h, s, v) = self.to_hsv();
        Color::from_hsv(h, s, v * 100.0 / factor as f32, self.a)
    }
}

impl From<u32> for Color {
    fn from(packed: u32) -> Self {
        Color::from_rgba(packed)
    }
}

fn to_channel(component: f32) -> u8 {
    (component.clamp(0.0, 1.0) * 255.0).round() as u8
}
