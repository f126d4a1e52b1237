use rayon::prelude::*;

use crate::color::{Rgb, Rgba};

/// Expand a block-color grid into a full-resolution pixel buffer.
///
/// Every block becomes a uniform `pix_size * pix_size` square; alpha is
/// forced to fully opaque. The output is `(grid_width * pix_size) x
/// (grid_height * pix_size)`, row-major.
///
/// Each source row is processed independently: its first destination row is
/// written by replicating block colors across their runs, then bulk-copied
/// down the remaining `pix_size - 1` rows instead of writing per pixel.
///
/// Caller guarantees non-zero inputs and that the output dimensions are
/// within bounds.
pub fn expand_blocks(
    colors: &[Rgb],
    grid_width: usize,
    grid_height: usize,
    pix_size: usize,
    out: &mut Vec<Rgba>,
) {
    debug_assert_eq!(colors.len(), grid_width * grid_height);
    debug_assert!(pix_size >= 1);

    let out_width = grid_width * pix_size;
    let band_len = out_width * pix_size;

    out.clear();
    out.resize(
        band_len * grid_height,
        Rgba { r: 0.0, g: 0.0, b: 0.0, a: 1.0 },
    );

    out.par_chunks_mut(band_len)
        .enumerate()
        .for_each(|(by, band)| {
            let row = &colors[by * grid_width..(by + 1) * grid_width];
            let (first, rest) = band.split_at_mut(out_width);

            for (bx, &c) in row.iter().enumerate() {
                first[bx * pix_size..(bx + 1) * pix_size]
                    .fill(Rgba { r: c.r, g: c.g, b: c.b, a: 1.0 });
            }

            for dst_row in rest.chunks_mut(out_width) {
                dst_row.copy_from_slice(first);
            }
        });
}
