use core::cmp::Ordering;

use crate::color::{rgb_to_hsv, Rgb};

/// An ordered, mutable list of quantization target colors.
///
/// Insertion order is preserved and duplicates are allowed; order only
/// matters for the user-facing sorts and for nearest-color tie-breaking
/// (lowest index wins).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_colors(colors: Vec<Rgb>) -> Self {
        Self { colors }
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn push(&mut self, color: Rgb) {
        self.colors.push(color);
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Sort by hue, folded at the half-way point so hues near both ends of
    /// the circle sort together.
    pub fn sort_by_hue(&mut self) {
        self.sort_by_key(|c| {
            let h = rgb_to_hsv(c).h;
            if h < 0.5 { h } else { 1.0 - h }
        });
    }

    pub fn sort_by_saturation(&mut self) {
        self.sort_by_key(|c| rgb_to_hsv(c).s);
    }

    pub fn sort_by_value(&mut self) {
        self.sort_by_key(|c| rgb_to_hsv(c).v);
    }

    // Stable, so equal keys keep their insertion order.
    fn sort_by_key(&mut self, key: impl Fn(Rgb) -> f32) {
        self.colors.sort_by(|&a, &b| {
            key(a).partial_cmp(&key(b)).unwrap_or(Ordering::Equal)
        });
    }
}

impl From<Vec<Rgb>> for Palette {
    fn from(colors: Vec<Rgb>) -> Self {
        Self::from_colors(colors)
    }
}

impl<'a> IntoIterator for &'a Palette {
    type Item = &'a Rgb;
    type IntoIter = core::slice::Iter<'a, Rgb>;

    fn into_iter(self) -> Self::IntoIter {
        self.colors.iter()
    }
}
