use std::time::Instant;

use log::debug;

use crate::average::{average_blocks, average_blocks_rgba};
use crate::color::{Rgb, Rgba};
use crate::error::PixelizeError;
use crate::expand::expand_blocks;
use crate::grid::BlockGrid;
use crate::kmeans::Clusterer;
use crate::matcher::{colorize_blocks, ColorizeOptions};
use crate::palette::Palette;
use crate::MAX_DIMENSION;

/// Outcome of a grid (re)build, for callers that track grid geometry.
///
/// Returned instead of broadcasting an event: the caller forwards it to
/// whoever needs to react to a dimension change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridResize {
    pub width: usize,
    pub height: usize,
    /// Whether the dimensions differ from the previous grid.
    pub changed: bool,
}

/// Borrowed view of the expanded output buffer.
#[derive(Debug, Clone, Copy)]
pub struct OutputImage<'a> {
    pixels: &'a [Rgba],
    width: usize,
    height: usize,
}

impl<'a> OutputImage<'a> {
    pub fn pixels(&self) -> &'a [Rgba] {
        self.pixels
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }
}

/// Stateful pipeline driver.
///
/// Owns the block grid and every reusable working buffer (k-means scratch,
/// current-color snapshot, output pixels), so repeated runs over same-sized
/// inputs do not reallocate. Each method is a blocking call that fans out
/// internally and joins before returning; a call that fails validation
/// leaves all previous outputs untouched.
#[derive(Debug, Default)]
pub struct Pixelizer {
    grid: BlockGrid,
    clusterer: Clusterer,
    block_colors: Vec<Rgb>,
    color_scratch: Vec<Rgb>,
    output: Vec<Rgba>,
    output_width: usize,
    output_height: usize,
}

impl Pixelizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current block grid.
    pub fn grid(&self) -> &BlockGrid {
        &self.grid
    }

    /// Downsample a linear RGB source into a fresh `grid_width x
    /// grid_height` block grid.
    pub fn pixelize(
        &mut self,
        pixels: &[Rgb],
        width: usize,
        height: usize,
        grid_width: usize,
        grid_height: usize,
    ) -> Result<GridResize, PixelizeError> {
        validate_source(pixels.len(), width, height)?;
        validate_grid(grid_width, grid_height, width, height)?;

        let start = Instant::now();
        average_blocks(
            pixels,
            width,
            height,
            grid_width,
            grid_height,
            &mut self.block_colors,
        );
        let resize = self.rebuild_grid(grid_width, grid_height);
        debug!("pixelize ({grid_width}x{grid_height}) took {:?}", start.elapsed());

        Ok(resize)
    }

    /// RGBA variant of [`Pixelizer::pixelize`]; alpha is ignored.
    pub fn pixelize_rgba(
        &mut self,
        pixels: &[Rgba],
        width: usize,
        height: usize,
        grid_width: usize,
        grid_height: usize,
    ) -> Result<GridResize, PixelizeError> {
        validate_source(pixels.len(), width, height)?;
        validate_grid(grid_width, grid_height, width, height)?;

        let start = Instant::now();
        average_blocks_rgba(
            pixels,
            width,
            height,
            grid_width,
            grid_height,
            &mut self.block_colors,
        );
        let resize = self.rebuild_grid(grid_width, grid_height);
        debug!("pixelize ({grid_width}x{grid_height}) took {:?}", start.elapsed());

        Ok(resize)
    }

    fn rebuild_grid(&mut self, grid_width: usize, grid_height: usize) -> GridResize {
        let changed = grid_width != self.grid.width() || grid_height != self.grid.height();
        self.grid.rebuild(grid_width, grid_height, &self.block_colors);

        GridResize {
            width: grid_width,
            height: grid_height,
            changed,
        }
    }

    /// Learn a `color_count`-entry palette by clustering the current block
    /// colors.
    pub fn learn_palette(
        &mut self,
        color_count: usize,
        seed: u64,
    ) -> Result<Palette, PixelizeError> {
        if self.grid.is_empty() {
            return Err(PixelizeError::NoBlocks);
        }
        if color_count == 0 {
            return Err(PixelizeError::ZeroColorCount);
        }

        let start = Instant::now();
        self.grid.copy_current_colors_into(&mut self.color_scratch);
        let colors = self.clusterer.run(&self.color_scratch, color_count, seed);
        debug!("palette learning (k={color_count}) took {:?}", start.elapsed());

        Ok(Palette::from_colors(colors))
    }

    /// Remap every block to its nearest palette color.
    pub fn colorize(
        &mut self,
        palette: &Palette,
        options: &ColorizeOptions,
    ) -> Result<(), PixelizeError> {
        if self.grid.is_empty() {
            return Err(PixelizeError::NoBlocks);
        }
        if palette.is_empty() {
            return Err(PixelizeError::EmptyPalette);
        }
        if options.use_value_ramp && options.step_count < 2 {
            return Err(PixelizeError::InvalidStepCount(options.step_count));
        }

        let start = Instant::now();
        colorize_blocks(self.grid.blocks_mut(), palette, options);
        debug!("colorize ({} blocks) took {:?}", self.grid.len(), start.elapsed());

        Ok(())
    }

    /// Restore every block to its original averaged color.
    pub fn reset_colors(&mut self) -> Result<(), PixelizeError> {
        if self.grid.is_empty() {
            return Err(PixelizeError::NoBlocks);
        }
        self.grid.reset_colors();
        Ok(())
    }

    /// Invert every block's current color.
    pub fn invert_colors(&mut self) -> Result<(), PixelizeError> {
        if self.grid.is_empty() {
            return Err(PixelizeError::NoBlocks);
        }
        self.grid.invert_colors();
        Ok(())
    }

    /// Complement every block's current color.
    pub fn complement_colors(&mut self) -> Result<(), PixelizeError> {
        if self.grid.is_empty() {
            return Err(PixelizeError::NoBlocks);
        }
        self.grid.complement_colors();
        Ok(())
    }

    /// Expand the current block colors into a full-resolution buffer where
    /// every block covers a `pix_size * pix_size` opaque square.
    pub fn expand(&mut self, pix_size: usize) -> Result<OutputImage<'_>, PixelizeError> {
        if self.grid.is_empty() {
            return Err(PixelizeError::NoBlocks);
        }
        if pix_size == 0 {
            return Err(PixelizeError::ZeroPixSize);
        }

        let width = self.grid.width().saturating_mul(pix_size);
        let height = self.grid.height().saturating_mul(pix_size);
        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(PixelizeError::OutputTooLarge { width, height });
        }

        let start = Instant::now();
        self.grid.copy_current_colors_into(&mut self.color_scratch);
        expand_blocks(
            &self.color_scratch,
            self.grid.width(),
            self.grid.height(),
            pix_size,
            &mut self.output,
        );
        self.output_width = width;
        self.output_height = height;
        debug!("expand ({width}x{height}) took {:?}", start.elapsed());

        Ok(OutputImage {
            pixels: &self.output,
            width,
            height,
        })
    }

    /// The most recently expanded output, if any.
    pub fn output(&self) -> Option<OutputImage<'_>> {
        if self.output.is_empty() {
            return None;
        }
        Some(OutputImage {
            pixels: &self.output,
            width: self.output_width,
            height: self.output_height,
        })
    }
}

fn validate_source(len: usize, width: usize, height: usize) -> Result<(), PixelizeError> {
    if width == 0 || height == 0 {
        return Err(PixelizeError::ZeroDimension);
    }
    if len != width * height {
        return Err(PixelizeError::DimensionMismatch { len, width, height });
    }
    Ok(())
}

fn validate_grid(
    grid_width: usize,
    grid_height: usize,
    source_width: usize,
    source_height: usize,
) -> Result<(), PixelizeError> {
    if grid_width == 0 || grid_height == 0 {
        return Err(PixelizeError::ZeroDimension);
    }
    if grid_width > MAX_DIMENSION {
        return Err(PixelizeError::GridTooLarge(grid_width));
    }
    if grid_height > MAX_DIMENSION {
        return Err(PixelizeError::GridTooLarge(grid_height));
    }
    if grid_width > source_width || grid_height > source_height {
        return Err(PixelizeError::GridExceedsSource {
            grid_width,
            grid_height,
            source_width,
            source_height,
        });
    }
    Ok(())
}
