use rayon::prelude::*;

use crate::color::{hsv_to_rgb, rgb_to_hsv, Hsv, Rgb};
use crate::grid::Block;
use crate::oklab::{linear_rgb_to_oklab, Oklab};
use crate::palette::Palette;

/// Channels with no measurable difference are excluded from the weighted
/// average below this threshold.
const CHANNEL_EPSILON: f32 = 1e-5;

/// How a matched palette color replaces a block's color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorizationStyle {
    /// The block takes the palette color exactly (brightness re-quantized
    /// when a value ramp is active).
    Replace,
    /// Only the palette color's hue is kept; the block's own saturation and
    /// brightness are reapplied, preserving the original shading.
    ReplaceWithOriginalSaturationAndValue,
}

/// Distance metric used for the nearest-palette-color search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceMetric {
    /// Adaptive HSV metric: hue differences dominate for vivid mid-bright
    /// colors, value differences dominate for dark colors.
    PerceptualHsv,
    /// Squared Euclidean distance in OKLab.
    OklabEuclidean,
}

/// Configuration for a colorize pass.
#[derive(Debug, Clone, Copy)]
pub struct ColorizeOptions {
    pub style: ColorizationStyle,
    pub use_value_ramp: bool,
    /// Number of brightness levels when the value ramp is active (>= 2).
    pub step_count: u32,
    pub metric: DistanceMetric,
}

impl Default for ColorizeOptions {
    fn default() -> Self {
        Self {
            style: ColorizationStyle::Replace,
            use_value_ramp: false,
            step_count: 2,
            metric: DistanceMetric::PerceptualHsv,
        }
    }
}

impl ColorizeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn style(mut self, style: ColorizationStyle) -> Self {
        self.style = style;
        self
    }

    pub fn value_ramp(mut self, step_count: u32) -> Self {
        self.use_value_ramp = true;
        self.step_count = step_count;
        self
    }

    pub fn metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }
}

/// Brightness quantizer: a step curve of `step_count` flat segments over
/// `[0, 1]`, emitting `step_count` distinct levels from 0 to 1.
#[derive(Debug, Clone, Copy)]
pub struct ValueRamp {
    step_count: u32,
}

impl ValueRamp {
    pub fn new(step_count: u32) -> Self {
        debug_assert!(step_count >= 2, "value ramp needs at least two levels");
        Self { step_count }
    }

    /// Snap a brightness to its segment's level. Monotonic; `0` maps to the
    /// first level (0) and `1` to the last (1).
    pub fn quantize(&self, v: f32) -> f32 {
        let steps = self.step_count as f32;
        let segment = (v.clamp(0.0, 1.0) * steps).floor().min(steps - 1.0);
        segment / (steps - 1.0)
    }
}

/// Remap every block's current color to its nearest palette entry.
///
/// The palette is scanned linearly per block (palettes are small); ties go
/// to the lowest palette index. Caller guarantees a non-empty palette and a
/// valid step count.
pub(crate) fn colorize_blocks(blocks: &mut [Block], palette: &Palette, options: &ColorizeOptions) {
    let ramp = options
        .use_value_ramp
        .then(|| ValueRamp::new(options.step_count));

    match options.metric {
        DistanceMetric::PerceptualHsv => {
            let palette_hsv: Vec<Hsv> =
                palette.colors().iter().map(|&c| rgb_to_hsv(c)).collect();

            blocks.par_iter_mut().for_each(|block| {
                let hsv = rgb_to_hsv(block.color());
                let index = nearest_index(palette_hsv.len(), |j| {
                    perceptual_hsv_difference(hsv, palette_hsv[j])
                });
                apply(block, palette.colors()[index], hsv, ramp, options.style);
            });
        }
        DistanceMetric::OklabEuclidean => {
            let palette_lab: Vec<Oklab> = palette
                .colors()
                .iter()
                .map(|&c| linear_rgb_to_oklab(c))
                .collect();

            blocks.par_iter_mut().for_each(|block| {
                let current = block.color();
                let lab = linear_rgb_to_oklab(current);
                let index =
                    nearest_index(palette_lab.len(), |j| lab.distance_sq(palette_lab[j]));
                apply(block, palette.colors()[index], rgb_to_hsv(current), ramp, options.style);
            });
        }
    }
}

/// Write the replacement color for one block. `current_hsv` is the block's
/// color before replacement; the ramp always quantizes that pre-replacement
/// brightness.
fn apply(
    block: &mut Block,
    palette_color: Rgb,
    current_hsv: Hsv,
    ramp: Option<ValueRamp>,
    style: ColorizationStyle,
) {
    let ramp_value = ramp.map(|r| r.quantize(current_hsv.v));

    match style {
        ColorizationStyle::Replace => {
            let replacement = match ramp_value {
                Some(v) => {
                    let p = rgb_to_hsv(palette_color);
                    hsv_to_rgb(p.h, p.s, v)
                }
                None => palette_color,
            };
            block.set_color(replacement);
        }
        ColorizationStyle::ReplaceWithOriginalSaturationAndValue => {
            let hue = rgb_to_hsv(palette_color).h;
            let v = ramp_value.unwrap_or(current_hsv.v);
            block.set_color(hsv_to_rgb(hue, current_hsv.s, v));
        }
    }
}

fn nearest_index(count: usize, mut distance: impl FnMut(usize) -> f32) -> usize {
    let mut best_index = 0;
    let mut best_distance = f32::MAX;

    for j in 0..count {
        let d = distance(j);
        if d < best_distance {
            best_distance = d;
            best_index = j;
        }
    }

    best_index
}

/// Adaptive perceptual difference between two HSV colors, in `[0, 1]`.
///
/// Channel weights shift with the colors being compared: hue carries the
/// most weight between vivid, mid-bright colors; value takes over as either
/// color approaches black; saturation sits in between. Channels whose raw
/// difference is negligible are excluded from the weighted average so they
/// cannot dilute it.
pub fn perceptual_hsv_difference(a: Hsv, b: Hsv) -> f32 {
    let raw_hue = (a.h - b.h).abs();
    let hue_diff = raw_hue.min(1.0 - raw_hue) * 2.0;
    let sat_diff = (a.s - b.s).abs();
    let val_diff = (a.v - b.v).abs();

    let min_sat = a.s.min(b.s);
    let min_val = a.v.min(b.v);

    let darkness = smooth_ramp(1.0 - min_val, 0.0, 1.0);
    let vividness = min_sat * min_val;

    let hue_drive = (0.8 * smooth_ramp(min_sat, 0.15, 0.30) * smooth_ramp(min_val, 0.15, 0.30)
        + 0.4 * smooth_ramp(vividness, 0.35, 0.85))
    .clamp(0.0, 1.0);

    let hue_weight =
        lerp(0.0, 4.0, hue_drive) * (1.0 + 2.0 * smooth_ramp(vividness, 0.40, 0.90)) * (1.0 - darkness);
    let sat_weight = lerp(0.3, 1.0, min_val) * (1.0 - 0.8 * darkness);
    let val_weight = lerp(
        lerp(1.0, 0.4, min_sat) * lerp(0.4, 1.0, min_val),
        3.0,
        darkness,
    );

    let numerator = hue_weight * hue_diff + sat_weight * sat_diff + val_weight * val_diff;

    let mut denominator = 0.0;
    if hue_diff > CHANNEL_EPSILON {
        denominator += hue_weight;
    }
    if sat_diff > CHANNEL_EPSILON {
        denominator += sat_weight;
    }
    if val_diff > CHANNEL_EPSILON {
        denominator += val_weight;
    }

    if denominator <= CHANNEL_EPSILON {
        return 0.0;
    }

    (numerator / denominator).clamp(0.0, 1.0)
}

/// Clamped cubic Hermite ramp between `edge0` and `edge1`.
fn smooth_ramp(value: f32, edge0: f32, edge1: f32) -> f32 {
    if edge1 <= edge0 {
        return if value >= edge1 { 1.0 } else { 0.0 };
    }

    let step = ((value - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    step * step * (3.0 - 2.0 * step)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::value;

    fn hsv(h: f32, s: f32, v: f32) -> Hsv {
        Hsv { h, s, v }
    }

    fn block_of(c: Rgb) -> Block {
        Block::new(c)
    }

    #[test]
    fn difference_is_zero_for_equal_colors() {
        for t in [hsv(0.0, 0.0, 0.0), hsv(0.3, 0.8, 0.6), hsv(0.99, 1.0, 1.0)] {
            assert_eq!(perceptual_hsv_difference(t, t), 0.0);
        }
    }

    #[test]
    fn difference_is_symmetric() {
        let pairs = [
            (hsv(0.1, 0.9, 0.8), hsv(0.6, 0.4, 0.3)),
            (hsv(0.0, 0.0, 1.0), hsv(0.5, 1.0, 0.5)),
            (hsv(0.95, 0.7, 0.2), hsv(0.05, 0.8, 0.9)),
        ];
        for (a, b) in pairs {
            let d1 = perceptual_hsv_difference(a, b);
            let d2 = perceptual_hsv_difference(b, a);
            assert!((d1 - d2).abs() < 1e-7, "asymmetric for {a:?} / {b:?}");
        }
    }

    #[test]
    fn difference_stays_normalized() {
        for i in 0..10 {
            for j in 0..10 {
                let a = hsv(i as f32 / 10.0, (i % 3) as f32 / 2.0, (i % 4) as f32 / 3.0);
                let b = hsv(j as f32 / 10.0, (j % 4) as f32 / 3.0, (j % 3) as f32 / 2.0);
                let d = perceptual_hsv_difference(a, b);
                assert!((0.0..=1.0).contains(&d), "out of range: {d} for {a:?} / {b:?}");
            }
        }
    }

    #[test]
    fn hue_dominates_for_vivid_colors() {
        // Between fully vivid colors, a hue shift should read as a larger
        // difference than the same-size value shift.
        let base = hsv(0.0, 1.0, 1.0);
        let hue_shifted = hsv(0.15, 1.0, 1.0);
        let val_shifted = hsv(0.0, 1.0, 0.85);

        assert!(
            perceptual_hsv_difference(base, hue_shifted)
                > perceptual_hsv_difference(base, val_shifted)
        );
    }

    #[test]
    fn value_dominates_for_dark_colors() {
        // Near black, hue is meaningless; value separation must win.
        let dark_red = hsv(0.0, 1.0, 0.05);
        let dark_blue = hsv(0.66, 1.0, 0.05);
        let brighter_red = hsv(0.0, 1.0, 0.5);

        assert!(
            perceptual_hsv_difference(dark_red, dark_blue)
                < perceptual_hsv_difference(dark_red, brighter_red)
        );
    }

    #[test]
    fn ramp_emits_exactly_step_count_levels() {
        for step_count in 2..=10 {
            let ramp = ValueRamp::new(step_count);
            let mut levels: Vec<f32> = (0..=1000)
                .map(|i| ramp.quantize(i as f32 / 1000.0))
                .collect();
            levels.dedup();

            assert_eq!(levels.len(), step_count as usize, "step_count {step_count}");
            assert_eq!(levels[0], 0.0);
            assert_eq!(*levels.last().unwrap(), 1.0);
            assert!(levels.windows(2).all(|w| w[0] < w[1]), "not monotonic");
        }
    }

    #[test]
    fn replace_is_bit_identical_without_ramp() {
        let palette = Palette::from_colors(vec![
            Rgb { r: 0.8, g: 0.1, b: 0.2 },
            Rgb { r: 0.1, g: 0.2, b: 0.9 },
        ]);
        let mut blocks = vec![
            block_of(Rgb { r: 0.7, g: 0.2, b: 0.2 }),
            block_of(Rgb { r: 0.2, g: 0.2, b: 0.8 }),
        ];

        colorize_blocks(&mut blocks, &palette, &ColorizeOptions::default());

        for block in &blocks {
            let c = block.color();
            assert!(
                palette.colors().iter().any(|&p| p == c),
                "{c:?} is not a palette entry"
            );
        }
        assert_eq!(blocks[0].color(), palette.colors()[0]);
        assert_eq!(blocks[1].color(), palette.colors()[1]);
    }

    #[test]
    fn ties_go_to_the_first_palette_entry() {
        // A pure gray block has zero hue weight; red and blue differ from it
        // by saturation and value alone, symmetrically. First entry wins.
        let red = Rgb { r: 1.0, g: 0.0, b: 0.0 };
        let blue = Rgb { r: 0.0, g: 0.0, b: 1.0 };
        let gray = Rgb { r: 0.5, g: 0.5, b: 0.5 };

        let mut blocks = vec![block_of(gray)];
        colorize_blocks(
            &mut blocks,
            &Palette::from_colors(vec![red, blue]),
            &ColorizeOptions::default(),
        );
        assert_eq!(blocks[0].color(), red);

        let mut blocks = vec![block_of(gray)];
        colorize_blocks(
            &mut blocks,
            &Palette::from_colors(vec![blue, red]),
            &ColorizeOptions::default(),
        );
        assert_eq!(blocks[0].color(), blue);
    }

    #[test]
    fn keep_shading_style_preserves_saturation_and_value() {
        let red = Rgb { r: 1.0, g: 0.0, b: 0.0 };
        let dull_green = hsv_to_rgb(1.0 / 3.0, 0.4, 0.6);

        let mut blocks = vec![block_of(dull_green)];
        colorize_blocks(
            &mut blocks,
            &Palette::from_colors(vec![red]),
            &ColorizeOptions::new()
                .style(ColorizationStyle::ReplaceWithOriginalSaturationAndValue),
        );

        let result = rgb_to_hsv(blocks[0].color());
        assert!(result.h.abs() < 1e-4, "hue should come from the palette");
        assert!((result.s - 0.4).abs() < 1e-4, "saturation should be kept");
        assert!((result.v - 0.6).abs() < 1e-4, "value should be kept");
    }

    #[test]
    fn replace_with_ramp_quantizes_pre_replacement_brightness() {
        let red = Rgb { r: 1.0, g: 0.0, b: 0.0 };
        let options = ColorizeOptions::new().value_ramp(2);
        let palette = Palette::from_colors(vec![red]);

        // Brightness 0.3 falls in the first of two segments → level 0.
        let mut blocks = vec![block_of(hsv_to_rgb(0.0, 1.0, 0.3))];
        colorize_blocks(&mut blocks, &palette, &options);
        assert!(value(blocks[0].color()) < 1e-6);

        // Brightness 0.6 falls in the second segment → level 1.
        let mut blocks = vec![block_of(hsv_to_rgb(0.0, 1.0, 0.6))];
        colorize_blocks(&mut blocks, &palette, &options);
        assert!((value(blocks[0].color()) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn oklab_metric_finds_perceptual_neighbor() {
        let palette = Palette::from_colors(vec![
            Rgb { r: 0.0, g: 0.0, b: 0.0 },
            Rgb { r: 1.0, g: 1.0, b: 1.0 },
        ]);
        let mut blocks = vec![
            block_of(Rgb { r: 0.05, g: 0.05, b: 0.05 }),
            block_of(Rgb { r: 0.9, g: 0.9, b: 0.9 }),
        ];

        colorize_blocks(
            &mut blocks,
            &palette,
            &ColorizeOptions::new().metric(DistanceMetric::OklabEuclidean),
        );

        assert_eq!(blocks[0].color(), palette.colors()[0]);
        assert_eq!(blocks[1].color(), palette.colors()[1]);
    }
}
