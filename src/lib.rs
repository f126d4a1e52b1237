//! Pixel-art stylization pipeline.
//!
//! A source image is downsampled into a grid of block-average colors,
//! optionally quantized against a palette (supplied, or learned by k-means
//! in OKLab space), and re-expanded into a full-resolution buffer of uniform
//! squares. All pixel math runs on normalized linear RGB; see [`convert`]
//! for bridging 8-bit sRGB buffers. Given a fixed seed the pipeline is
//! deterministic.

#![forbid(unsafe_code)]

pub mod average;
pub mod color;
pub mod convert;
pub mod error;
pub mod expand;
pub mod grid;
pub mod kmeans;
pub mod matcher;
pub mod oklab;
pub mod palette;
pub mod pixelizer;

pub use color::{Rgb, Rgba};
pub use error::PixelizeError;
pub use grid::{Block, BlockGrid};
pub use matcher::{ColorizationStyle, ColorizeOptions, DistanceMetric, ValueRamp};
pub use palette::Palette;
pub use pixelizer::{GridResize, OutputImage, Pixelizer};

/// Maximum texture dimension, applied to the block grid and the expanded
/// output alike.
pub const MAX_DIMENSION: usize = 16384;

/// Where the palette for the colorize pass comes from.
#[derive(Debug, Clone, Default)]
pub enum PaletteSource {
    /// No palette; blocks keep their averaged colors.
    #[default]
    None,
    /// Use the given palette as-is.
    Fixed(Palette),
    /// Learn a palette of `color_count` entries from the block colors.
    Learn { color_count: usize },
}

/// Configuration for the one-shot pipeline.
#[derive(Debug, Clone)]
pub struct PixelizeConfig {
    /// Block grid width (1..=16384, no larger than the source width).
    pub grid_width: usize,
    /// Block grid height (1..=16384, no larger than the source height).
    pub grid_height: usize,
    /// Side length of each expanded block square.
    pub pix_size: usize,
    /// Palette source for the colorize pass.
    pub palette: PaletteSource,
    /// Colorize options; `None` skips the matching stage entirely.
    pub colorize: Option<ColorizeOptions>,
    /// RNG seed for palette learning.
    pub seed: u64,
}

impl Default for PixelizeConfig {
    fn default() -> Self {
        Self {
            grid_width: 64,
            grid_height: 64,
            pix_size: 1,
            palette: PaletteSource::None,
            colorize: None,
            seed: 0,
        }
    }
}

impl PixelizeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grid(mut self, width: usize, height: usize) -> Self {
        self.grid_width = width;
        self.grid_height = height;
        self
    }

    pub fn pix_size(mut self, pix_size: usize) -> Self {
        self.pix_size = pix_size;
        self
    }

    pub fn palette(mut self, palette: Palette) -> Self {
        self.palette = PaletteSource::Fixed(palette);
        self
    }

    pub fn learn_palette(mut self, color_count: usize) -> Self {
        self.palette = PaletteSource::Learn { color_count };
        self
    }

    pub fn colorize(mut self, options: ColorizeOptions) -> Self {
        self.colorize = Some(options);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Result of the one-shot pipeline.
#[derive(Debug, Clone)]
pub struct PixelizeResult {
    grid_width: usize,
    grid_height: usize,
    pix_size: usize,
    original_colors: Vec<Rgb>,
    block_colors: Vec<Rgb>,
    palette: Option<Palette>,
    pixels: Vec<Rgba>,
}

impl PixelizeResult {
    /// Block grid width.
    pub fn grid_width(&self) -> usize {
        self.grid_width
    }

    /// Block grid height.
    pub fn grid_height(&self) -> usize {
        self.grid_height
    }

    /// Expanded output width in pixels.
    pub fn output_width(&self) -> usize {
        self.grid_width * self.pix_size
    }

    /// Expanded output height in pixels.
    pub fn output_height(&self) -> usize {
        self.grid_height * self.pix_size
    }

    /// Block-average colors as produced by the averaging stage, row-major.
    pub fn original_colors(&self) -> &[Rgb] {
        &self.original_colors
    }

    /// Final (possibly recolored) block colors, row-major.
    pub fn block_colors(&self) -> &[Rgb] {
        &self.block_colors
    }

    /// The learned palette, when one was requested.
    pub fn palette(&self) -> Option<&Palette> {
        self.palette.as_ref()
    }

    /// The expanded output pixels, row-major, fully opaque.
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }
}

/// Run the whole pipeline over a linear RGB image.
pub fn pixelize(
    pixels: &[Rgb],
    width: usize,
    height: usize,
    config: &PixelizeConfig,
) -> Result<PixelizeResult, PixelizeError> {
    validate_config(config)?;

    let mut pixelizer = Pixelizer::new();
    pixelizer.pixelize(pixels, width, height, config.grid_width, config.grid_height)?;
    finish(pixelizer, config)
}

/// Run the whole pipeline over a linear RGBA image. Alpha is carried by the
/// source but ignored by every stage; the output is fully opaque.
pub fn pixelize_rgba(
    pixels: &[Rgba],
    width: usize,
    height: usize,
    config: &PixelizeConfig,
) -> Result<PixelizeResult, PixelizeError> {
    validate_config(config)?;

    let mut pixelizer = Pixelizer::new();
    pixelizer.pixelize_rgba(pixels, width, height, config.grid_width, config.grid_height)?;
    finish(pixelizer, config)
}

fn finish(
    mut pixelizer: Pixelizer,
    config: &PixelizeConfig,
) -> Result<PixelizeResult, PixelizeError> {
    let palette = match &config.palette {
        PaletteSource::None => None,
        PaletteSource::Fixed(palette) => Some(palette.clone()),
        PaletteSource::Learn { color_count } => {
            Some(pixelizer.learn_palette(*color_count, config.seed)?)
        }
    };

    if let Some(options) = &config.colorize {
        let palette = palette.as_ref().ok_or(PixelizeError::EmptyPalette)?;
        pixelizer.colorize(palette, options)?;
    }

    pixelizer.expand(config.pix_size)?;

    let grid = pixelizer.grid();
    Ok(PixelizeResult {
        grid_width: grid.width(),
        grid_height: grid.height(),
        pix_size: config.pix_size,
        original_colors: grid.original_colors(),
        block_colors: grid.current_colors(),
        palette,
        pixels: pixelizer
            .output()
            .map(|o| o.pixels().to_vec())
            .unwrap_or_default(),
    })
}

/// Validate everything that can be checked before any stage runs, so a bad
/// configuration never triggers partial work.
fn validate_config(config: &PixelizeConfig) -> Result<(), PixelizeError> {
    if config.pix_size == 0 {
        return Err(PixelizeError::ZeroPixSize);
    }

    if config.grid_width > MAX_DIMENSION {
        return Err(PixelizeError::GridTooLarge(config.grid_width));
    }
    if config.grid_height > MAX_DIMENSION {
        return Err(PixelizeError::GridTooLarge(config.grid_height));
    }

    let out_width = config.grid_width.saturating_mul(config.pix_size);
    let out_height = config.grid_height.saturating_mul(config.pix_size);
    if out_width > MAX_DIMENSION || out_height > MAX_DIMENSION {
        return Err(PixelizeError::OutputTooLarge {
            width: out_width,
            height: out_height,
        });
    }

    match &config.palette {
        PaletteSource::Fixed(palette) if palette.is_empty() => {
            return Err(PixelizeError::EmptyPalette);
        }
        PaletteSource::Learn { color_count: 0 } => {
            return Err(PixelizeError::ZeroColorCount);
        }
        _ => {}
    }

    if let Some(options) = &config.colorize {
        if matches!(config.palette, PaletteSource::None) {
            return Err(PixelizeError::EmptyPalette);
        }
        if options.use_value_ramp && options.step_count < 2 {
            return Err(PixelizeError::InvalidStepCount(options.step_count));
        }
    }

    Ok(())
}
