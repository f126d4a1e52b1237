//! Bridge between 8-bit sRGB buffers and the float-linear pipeline.
//!
//! The pipeline itself works on normalized linear RGB; collaborators holding
//! ordinary image data convert on the way in and out. The sRGB transfer
//! function is delegated to the linear-srgb crate's const LUTs.

use crate::color::{Rgb, Rgba};

/// sRGB gamma → linear (single channel, 0..255 → 0.0..1.0).
#[inline(always)]
pub fn srgb_to_linear(c: u8) -> f32 {
    linear_srgb::default::srgb_u8_to_linear(c)
}

/// Linear → sRGB gamma (single channel, 0.0..1.0 → 0..255).
#[inline(always)]
pub fn linear_to_srgb(c: f32) -> u8 {
    linear_srgb::default::linear_to_srgb_u8(c.clamp(0.0, 1.0))
}

/// Batch convert interleaved 8-bit sRGB RGBA (e.g. a decoded PNG) to linear
/// float pixels. Alpha is passed through as `a / 255`.
pub fn srgb8_to_linear_pixels(data: &[u8], out: &mut Vec<Rgba>) {
    debug_assert_eq!(data.len() % 4, 0);

    out.clear();
    out.reserve(data.len() / 4);
    let conv = linear_srgb::lut::SrgbConverter::new();

    for px in data.chunks_exact(4) {
        out.push(Rgba {
            r: conv.srgb_u8_to_linear(px[0]),
            g: conv.srgb_u8_to_linear(px[1]),
            b: conv.srgb_u8_to_linear(px[2]),
            a: f32::from(px[3]) / 255.0,
        });
    }
}

/// Batch convert linear float RGBA pixels back to interleaved 8-bit sRGB.
pub fn linear_pixels_to_srgb8(pixels: &[Rgba], out: &mut Vec<u8>) {
    out.clear();
    out.reserve(pixels.len() * 4);

    for p in pixels {
        out.push(linear_to_srgb(p.r));
        out.push(linear_to_srgb(p.g));
        out.push(linear_to_srgb(p.b));
        out.push((p.a.clamp(0.0, 1.0) * 255.0).round() as u8);
    }
}

/// Convert one 8-bit sRGB triple to a linear pixel.
pub fn srgb8_to_linear_rgb(r: u8, g: u8, b: u8) -> Rgb {
    Rgb {
        r: srgb_to_linear(r),
        g: srgb_to_linear(g),
        b: srgb_to_linear(b),
    }
}
