//! Recolor an image against a fixed palette while keeping its shading.
//!
//! Usage:
//!   cargo run --example recolor_png --release -- <input.png> <output.png> <#rrggbb> [#rrggbb ...]

use pixquant::{
    convert, ColorizationStyle, ColorizeOptions, Palette, PixelizeConfig,
};

fn parse_hex(s: &str) -> (u8, u8, u8) {
    let s = s.trim_start_matches('#');
    assert_eq!(s.len(), 6, "colors must look like #rrggbb, got {s}");
    let r = u8::from_str_radix(&s[0..2], 16).expect("bad hex color");
    let g = u8::from_str_radix(&s[2..4], 16).expect("bad hex color");
    let b = u8::from_str_radix(&s[4..6], 16).expect("bad hex color");
    (r, g, b)
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        eprintln!("usage: recolor_png <input.png> <output.png> <#rrggbb> [#rrggbb ...]");
        std::process::exit(2);
    }
    let input = &args[1];
    let output = &args[2];

    let mut palette = Palette::new();
    for hex in &args[3..] {
        let (r, g, b) = parse_hex(hex);
        palette.push(convert::srgb8_to_linear_rgb(r, g, b));
    }

    let img = image::open(input).expect("failed to open input").to_rgba8();
    let (w, h) = (img.width() as usize, img.height() as usize);

    let mut pixels = Vec::new();
    convert::srgb8_to_linear_pixels(img.as_raw(), &mut pixels);

    // One block per pixel: pure recoloring, no downsampling.
    let palette_len = palette.len();
    let config = PixelizeConfig::new()
        .grid(w.min(16384), h.min(16384))
        .palette(palette)
        .colorize(
            ColorizeOptions::new()
                .style(ColorizationStyle::ReplaceWithOriginalSaturationAndValue),
        );

    let result = pixquant::pixelize_rgba(&pixels, w, h, &config).expect("recolor failed");

    let mut bytes = Vec::new();
    convert::linear_pixels_to_srgb8(result.pixels(), &mut bytes);

    let out_img = image::RgbaImage::from_raw(
        result.output_width() as u32,
        result.output_height() as u32,
        bytes,
    )
    .expect("output buffer size mismatch");
    out_img.save(output).expect("failed to save output");

    eprintln!("{input} ({w}x{h}) → {output} ({palette_len} palette colors)");
}
