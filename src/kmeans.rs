use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::color::Rgb;
use crate::oklab::{linear_rgb_to_oklab, oklab_to_linear_rgb, Oklab};

/// Refinement always runs a fixed ten rounds; there is no convergence check.
const ITERATIONS: usize = 10;

/// Seeded k-means over a color set, clustering in OKLab space.
///
/// Owns the working buffers (OKLab projections, assignments, per-lane
/// partial sums) so repeated runs only reallocate when shapes change.
#[derive(Debug, Default)]
pub struct Clusterer {
    oklab: Vec<Oklab>,
    assignments: Vec<usize>,
    partial_sums: Vec<Oklab>,
    partial_counts: Vec<u32>,
    centroids: Vec<Oklab>,
}

impl Clusterer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cluster `colors` into `color_count` representative colors.
    ///
    /// Centroids are initialized by sampling `color_count` input colors
    /// uniformly at random with replacement, then refined with a fixed
    /// number of assign/accumulate/update rounds. A centroid that ends an
    /// iteration with no assigned colors is left unchanged rather than
    /// reseeded, so a dead palette entry can persist; callers accept that
    /// in exchange for never dividing by zero.
    ///
    /// Preconditions (enforced by the public entry points): `colors` is
    /// non-empty and `color_count >= 1`.
    pub fn run(&mut self, colors: &[Rgb], color_count: usize, seed: u64) -> Vec<Rgb> {
        debug_assert!(!colors.is_empty(), "clustering over an empty color set");
        debug_assert!(color_count >= 1, "cluster count must be at least 1");

        let n = colors.len();

        self.oklab.clear();
        self.oklab.resize(n, Oklab::new(0.0, 0.0, 0.0));
        self.oklab
            .par_iter_mut()
            .zip(colors.par_iter())
            .for_each(|(lab, &c)| *lab = linear_rgb_to_oklab(c));

        let mut rng = StdRng::seed_from_u64(seed);
        self.centroids.clear();
        for _ in 0..color_count {
            let pick = self.oklab[rng.gen_range(0..n)];
            self.centroids.push(pick);
        }

        self.assignments.clear();
        self.assignments.resize(n, 0);

        // One lane per pool worker plus a fallback lane; each lane owns an
        // exclusive k-sized slice of the partials, so accumulation needs no
        // locks or atomics.
        let lane_count = rayon::current_num_threads().max(1) + 1;
        let chunk_len = n.div_ceil(lane_count);
        self.partial_sums.clear();
        self.partial_sums
            .resize(lane_count * color_count, Oklab::new(0.0, 0.0, 0.0));
        self.partial_counts.clear();
        self.partial_counts.resize(lane_count * color_count, 0);

        let Self {
            oklab,
            assignments,
            partial_sums,
            partial_counts,
            centroids,
        } = self;
        let oklab: &[Oklab] = oklab;

        for _ in 0..ITERATIONS {
            // Assign
            let current: &[Oklab] = centroids;
            assignments
                .par_iter_mut()
                .zip(oklab.par_iter())
                .for_each(|(slot, &color)| *slot = nearest_centroid(color, current));

            // Accumulate, one statically partitioned index range per lane
            partial_sums.fill(Oklab::new(0.0, 0.0, 0.0));
            partial_counts.fill(0);

            let assigned: &[usize] = assignments;
            partial_sums
                .par_chunks_mut(color_count)
                .zip(partial_counts.par_chunks_mut(color_count))
                .enumerate()
                .for_each(|(lane, (sums, counts))| {
                    let start = lane * chunk_len;
                    let end = ((lane + 1) * chunk_len).min(n);
                    for i in start..end {
                        let c = oklab[i];
                        let slot = assigned[i];
                        sums[slot].l += c.l;
                        sums[slot].a += c.a;
                        sums[slot].b += c.b;
                        counts[slot] += 1;
                    }
                });

            // Reduce across lanes, then update
            for (ci, centroid) in centroids.iter_mut().enumerate() {
                let mut sum = Oklab::new(0.0, 0.0, 0.0);
                let mut count = 0u32;

                for lane in 0..lane_count {
                    let idx = lane * color_count + ci;
                    sum.l += partial_sums[idx].l;
                    sum.a += partial_sums[idx].a;
                    sum.b += partial_sums[idx].b;
                    count += partial_counts[idx];
                }

                if count > 0 {
                    let inv = 1.0 / count as f32;
                    *centroid = Oklab::new(sum.l * inv, sum.a * inv, sum.b * inv);
                }
            }
        }

        centroids.iter().map(|&c| oklab_to_linear_rgb(c)).collect()
    }
}

/// One-shot clustering without a reusable scratch.
pub fn learn_palette(colors: &[Rgb], color_count: usize, seed: u64) -> Vec<Rgb> {
    Clusterer::new().run(colors, color_count, seed)
}

fn nearest_centroid(color: Oklab, centroids: &[Oklab]) -> usize {
    let mut best_index = 0;
    let mut best_distance = f32::MAX;

    for (i, &centroid) in centroids.iter().enumerate() {
        let d = color.distance_sq(centroid);
        if d < best_distance {
            best_distance = d;
            best_index = i;
        }
    }

    best_index
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(r: f32, g: f32, b: f32) -> Rgb {
        Rgb { r, g, b }
    }

    #[test]
    fn returns_exactly_k_colors() {
        let colors = vec![rgb(0.1, 0.1, 0.1), rgb(0.9, 0.9, 0.9)];
        for k in 1..=6 {
            let palette = learn_palette(&colors, k, 7);
            assert_eq!(palette.len(), k);
        }
    }

    #[test]
    fn k1_converges_to_the_mean() {
        let colors = vec![
            rgb(0.0, 0.0, 0.0),
            rgb(1.0, 1.0, 1.0),
            rgb(0.5, 0.0, 0.5),
            rgb(0.25, 0.75, 0.5),
        ];

        let palette = learn_palette(&colors, 1, 123);
        assert_eq!(palette.len(), 1);

        // Expected: mean in OKLab, round-tripped back to RGB.
        let mut mean = Oklab::new(0.0, 0.0, 0.0);
        for &c in &colors {
            let lab = linear_rgb_to_oklab(c);
            mean.l += lab.l;
            mean.a += lab.a;
            mean.b += lab.b;
        }
        mean.l /= colors.len() as f32;
        mean.a /= colors.len() as f32;
        mean.b /= colors.len() as f32;
        let expected = oklab_to_linear_rgb(mean);

        assert!((palette[0].r - expected.r).abs() < 1e-3);
        assert!((palette[0].g - expected.g).abs() < 1e-3);
        assert!((palette[0].b - expected.b).abs() < 1e-3);
    }

    #[test]
    fn same_seed_is_deterministic() {
        let colors: Vec<Rgb> = (0..64)
            .map(|i| {
                let t = i as f32 / 63.0;
                rgb(t, 1.0 - t, t * t)
            })
            .collect();

        let a = learn_palette(&colors, 4, 42);
        let b = learn_palette(&colors, 4, 42);
        assert_eq!(a, b);
    }

    #[test]
    fn uniform_input_keeps_every_centroid() {
        // Every point assigns to centroid 0; the rest stay frozen at their
        // initial sample, which is the same color. k is preserved.
        let colors = vec![rgb(0.3, 0.3, 0.3); 10];
        let palette = learn_palette(&colors, 3, 0);

        assert_eq!(palette.len(), 3);
        for c in &palette {
            assert!((c.r - 0.3).abs() < 1e-3);
            assert!((c.g - 0.3).abs() < 1e-3);
            assert!((c.b - 0.3).abs() < 1e-3);
        }
    }

    #[test]
    fn separates_two_clear_clusters() {
        let mut colors = Vec::new();
        for i in 0..20 {
            let jitter = i as f32 * 0.001;
            colors.push(rgb(0.1 + jitter, 0.1, 0.1));
            colors.push(rgb(0.9 - jitter, 0.9, 0.9));
        }

        let mut palette = learn_palette(&colors, 2, 9);
        palette.sort_by(|a, b| a.r.partial_cmp(&b.r).unwrap());

        assert!(palette[0].r < 0.3, "dark centroid drifted: {:?}", palette[0]);
        assert!(palette[1].r > 0.7, "bright centroid drifted: {:?}", palette[1]);
    }

    #[test]
    fn scratch_reuse_matches_fresh_runs() {
        let colors: Vec<Rgb> = (0..32).map(|i| rgb(i as f32 / 31.0, 0.5, 0.2)).collect();

        let mut clusterer = Clusterer::new();
        let first = clusterer.run(&colors, 3, 5);
        let second = clusterer.run(&colors, 3, 5);
        assert_eq!(first, second);

        let fresh = learn_palette(&colors, 3, 5);
        assert_eq!(first, fresh);
    }
}
