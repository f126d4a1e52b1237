//! Pixelize an image into palette-quantized blocks and save the result.
//!
//! Usage:
//!   cargo run --example pixelize_png --release -- <input.png> [output.png] [grid] [colors] [pix]

use pixquant::{convert, grid::preserve_ratio, ColorizeOptions, PixelizeConfig};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let input = args
        .get(1)
        .expect("usage: pixelize_png <input.png> [output.png] [grid] [colors] [pix]");
    let output = args
        .get(2)
        .cloned()
        .unwrap_or_else(|| input.replace(".png", "_px.png").replace(".jpg", "_px.png"));
    let grid: usize = args.get(3).map_or(64, |s| s.parse().expect("grid size"));
    let colors: usize = args.get(4).map_or(8, |s| s.parse().expect("color count"));
    let pix: usize = args.get(5).map_or(8, |s| s.parse().expect("pix size"));

    let img = image::open(input).expect("failed to open input").to_rgba8();
    let (w, h) = (img.width() as usize, img.height() as usize);

    let mut pixels = Vec::new();
    convert::srgb8_to_linear_pixels(img.as_raw(), &mut pixels);

    // Match the grid to the image's aspect ratio, capped by the source.
    let (grid_w, grid_h) = preserve_ratio(w, h, grid, grid * h / w.max(1));
    let (grid_w, grid_h) = (grid_w.min(w), grid_h.min(h));

    let config = PixelizeConfig::new()
        .grid(grid_w, grid_h)
        .pix_size(pix)
        .learn_palette(colors)
        .colorize(ColorizeOptions::default())
        .seed(42);

    let result = pixquant::pixelize_rgba(&pixels, w, h, &config).expect("pixelize failed");

    let mut bytes = Vec::new();
    convert::linear_pixels_to_srgb8(result.pixels(), &mut bytes);

    let out_img = image::RgbaImage::from_raw(
        result.output_width() as u32,
        result.output_height() as u32,
        bytes,
    )
    .expect("output buffer size mismatch");
    out_img.save(&output).expect("failed to save output");

    eprintln!(
        "{input} ({w}x{h}) → {output} ({}x{} blocks, {} colors, pix {pix})",
        result.grid_width(),
        result.grid_height(),
        result.palette().map_or(0, |p| p.len()),
    );
}
