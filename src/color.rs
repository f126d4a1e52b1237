//! Float-RGB pixel helpers and the HSV projection used by the perceptual
//! matcher. All channels are normalized linear values in `[0, 1]`.

/// Linear RGB pixel, channels in `[0, 1]`.
pub type Rgb = rgb::RGB<f32>;

/// Linear RGBA pixel, channels in `[0, 1]`. Alpha is carried but never
/// enters averaging or distance math.
pub type Rgba = rgb::RGBA<f32>;

/// Hue, saturation, value triple. Hue is normalized to `[0, 1)` rather than
/// degrees; a gray color reports hue 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub h: f32,
    pub s: f32,
    pub v: f32,
}

/// Convert a linear RGB color to HSV.
pub fn rgb_to_hsv(c: Rgb) -> Hsv {
    let max = c.r.max(c.g).max(c.b);
    let min = c.r.min(c.g).min(c.b);
    let delta = max - min;

    let h = if delta <= 0.0 {
        0.0
    } else if max == c.r {
        let h = (c.g - c.b) / delta / 6.0;
        if h < 0.0 { h + 1.0 } else { h }
    } else if max == c.g {
        ((c.b - c.r) / delta + 2.0) / 6.0
    } else {
        ((c.r - c.g) / delta + 4.0) / 6.0
    };

    let s = if max <= 0.0 { 0.0 } else { delta / max };

    Hsv { h, s, v: max }
}

/// Convert an HSV triple back to linear RGB. Hue wraps at 1.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Rgb {
    let h = (h - h.floor()) * 6.0;
    let sector = (h as usize).min(5);
    let f = h - sector as f32;

    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match sector {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    Rgb { r, g, b }
}

/// Brightness (HSV value) of a color.
pub fn value(c: Rgb) -> f32 {
    c.r.max(c.g).max(c.b)
}

/// Circular hue distance between two colors, in `[0, 0.5]`.
pub fn hue_difference(a: Rgb, b: Rgb) -> f32 {
    let difference = (rgb_to_hsv(a).h - rgb_to_hsv(b).h).abs();
    if difference > 0.5 { 1.0 - difference } else { difference }
}

/// Channel-wise inversion: `1 - c`.
pub fn invert(c: Rgb) -> Rgb {
    Rgb {
        r: 1.0 - c.r,
        g: 1.0 - c.g,
        b: 1.0 - c.b,
    }
}

/// Complement around the color's own value range: each channel becomes
/// `max + min - channel`, keeping the brightest and darkest channels swapped.
pub fn complement(c: Rgb) -> Rgb {
    let max = c.r.max(c.g).max(c.b);
    let min = c.r.min(c.g).min(c.b);

    Rgb {
        r: max + min - c.r,
        g: max + min - c.g,
        b: max + min - c.b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hsv_of(r: f32, g: f32, b: f32) -> Hsv {
        rgb_to_hsv(Rgb { r, g, b })
    }

    #[test]
    fn primaries_map_to_expected_hues() {
        let red = hsv_of(1.0, 0.0, 0.0);
        assert!(red.h.abs() < 1e-6);
        assert!((red.s - 1.0).abs() < 1e-6);
        assert!((red.v - 1.0).abs() < 1e-6);

        let green = hsv_of(0.0, 1.0, 0.0);
        assert!((green.h - 1.0 / 3.0).abs() < 1e-6);

        let blue = hsv_of(0.0, 0.0, 1.0);
        assert!((blue.h - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn gray_has_zero_saturation_and_hue() {
        let gray = hsv_of(0.5, 0.5, 0.5);
        assert_eq!(gray.h, 0.0);
        assert_eq!(gray.s, 0.0);
        assert!((gray.v - 0.5).abs() < 1e-6);
    }

    #[test]
    fn hsv_roundtrip() {
        let samples = [
            Rgb { r: 1.0, g: 0.0, b: 0.0 },
            Rgb { r: 1.0, g: 1.0, b: 0.0 },
            Rgb { r: 0.0, g: 0.75, b: 0.25 },
            Rgb { r: 0.1, g: 0.2, b: 0.9 },
            Rgb { r: 0.3, g: 0.3, b: 0.3 },
        ];

        for c in samples {
            let hsv = rgb_to_hsv(c);
            let back = hsv_to_rgb(hsv.h, hsv.s, hsv.v);
            assert!(
                (back.r - c.r).abs() < 1e-5
                    && (back.g - c.g).abs() < 1e-5
                    && (back.b - c.b).abs() < 1e-5,
                "roundtrip mismatch for {c:?}: got {back:?}"
            );
        }
    }

    #[test]
    fn hue_wraps_at_one() {
        let a = hsv_to_rgb(0.0, 1.0, 1.0);
        let b = hsv_to_rgb(1.0, 1.0, 1.0);
        assert!((a.r - b.r).abs() < 1e-6);
        assert!((a.g - b.g).abs() < 1e-6);
        assert!((a.b - b.b).abs() < 1e-6);
    }

    #[test]
    fn hue_difference_is_circular() {
        // Hues 0.95 and 0.05 are 0.1 apart around the circle, not 0.9.
        let a = hsv_to_rgb(0.95, 1.0, 1.0);
        let b = hsv_to_rgb(0.05, 1.0, 1.0);
        let d = hue_difference(a, b);
        assert!((d - 0.1).abs() < 1e-4, "expected ~0.1, got {d}");
        assert!((hue_difference(b, a) - d).abs() < 1e-7);
    }

    #[test]
    fn invert_flips_channels() {
        let c = invert(Rgb { r: 1.0, g: 0.25, b: 0.0 });
        assert_eq!(c, Rgb { r: 0.0, g: 0.75, b: 1.0 });
    }

    #[test]
    fn complement_swaps_extremes() {
        let c = complement(Rgb { r: 0.8, g: 0.5, b: 0.2 });
        assert!((c.r - 0.2).abs() < 1e-6);
        assert!((c.g - 0.5).abs() < 1e-6);
        assert!((c.b - 0.8).abs() < 1e-6);
    }
}
