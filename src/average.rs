use rayon::prelude::*;

use crate::color::{Rgb, Rgba};

/// Downsample a source image into `grid_width * grid_height` block-average
/// colors, row-major.
///
/// Block `(bx, by)` averages the `(src_width / grid_width) *
/// (src_height / grid_height)` source pixels starting at
/// `(bx * src_width / grid_width, by * src_height / grid_height)`, all in
/// floor division. When the source dimensions don't divide evenly, the
/// trailing source rows/columns are not covered by any block; that
/// truncation is part of the contract and changing it would change every
/// averaged value.
///
/// Caller guarantees non-zero dimensions, `pixels.len() == src_width *
/// src_height`, and grid dimensions no larger than the source.
pub fn average_blocks(
    pixels: &[Rgb],
    src_width: usize,
    src_height: usize,
    grid_width: usize,
    grid_height: usize,
    out: &mut Vec<Rgb>,
) {
    out.clear();
    out.resize(grid_width * grid_height, Rgb { r: 0.0, g: 0.0, b: 0.0 });

    out.par_iter_mut().enumerate().for_each(|(index, slot)| {
        *slot = average_one(
            index,
            grid_width,
            grid_height,
            src_width,
            src_height,
            |i| pixels[i],
        );
    });
}

/// RGBA variant of [`average_blocks`]. Alpha is carried by the source but
/// does not participate in the average.
pub fn average_blocks_rgba(
    pixels: &[Rgba],
    src_width: usize,
    src_height: usize,
    grid_width: usize,
    grid_height: usize,
    out: &mut Vec<Rgb>,
) {
    out.clear();
    out.resize(grid_width * grid_height, Rgb { r: 0.0, g: 0.0, b: 0.0 });

    out.par_iter_mut().enumerate().for_each(|(index, slot)| {
        *slot = average_one(
            index,
            grid_width,
            grid_height,
            src_width,
            src_height,
            |i| {
                let p = pixels[i];
                Rgb { r: p.r, g: p.g, b: p.b }
            },
        );
    });
}

fn average_one(
    index: usize,
    grid_width: usize,
    grid_height: usize,
    src_width: usize,
    src_height: usize,
    sample: impl Fn(usize) -> Rgb,
) -> Rgb {
    let bx = index % grid_width;
    let by = index / grid_width;

    let start_x = bx * src_width / grid_width;
    let start_y = by * src_height / grid_height;
    let size_x = src_width / grid_width;
    let size_y = src_height / grid_height;

    let mut r = 0.0f32;
    let mut g = 0.0f32;
    let mut b = 0.0f32;

    for y in 0..size_y {
        let row_start = (start_y + y) * src_width + start_x;
        for x in 0..size_x {
            let c = sample(row_start + x);
            r += c.r;
            g += c.g;
            b += c.b;
        }
    }

    let count = (size_x * size_y) as f32;
    Rgb {
        r: r / count,
        g: g / count,
        b: b / count,
    }
}
