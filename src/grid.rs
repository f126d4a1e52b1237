use crate::color::{complement, invert, Rgb};

/// One cell of the downsampled grid.
///
/// `original` is set once when the grid is built from block averages and
/// never mutated afterwards; `current` is the working color that the matcher
/// and the color-adjustment operations rewrite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block {
    original: Rgb,
    current: Rgb,
}

impl Block {
    pub(crate) fn new(color: Rgb) -> Self {
        Self {
            original: color,
            current: color,
        }
    }

    pub fn original_color(&self) -> Rgb {
        self.original
    }

    pub fn color(&self) -> Rgb {
        self.current
    }

    pub(crate) fn set_color(&mut self, color: Rgb) {
        self.current = color;
    }

    pub fn reset_color(&mut self) {
        self.current = self.original;
    }

    pub fn invert_color(&mut self) {
        self.current = invert(self.current);
    }

    pub fn complement_color(&mut self) {
        self.current = complement(self.current);
    }
}

/// The downsampled block grid, row-major. `blocks.len() == width * height`
/// holds after every rebuild; the collection is replaced wholesale when the
/// grid dimensions change, never patched incrementally.
#[derive(Debug, Clone, Default)]
pub struct BlockGrid {
    width: usize,
    height: usize,
    blocks: Vec<Block>,
}

impl BlockGrid {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub(crate) fn blocks_mut(&mut self) -> &mut [Block] {
        &mut self.blocks
    }

    /// Block at grid position `(x, y)`.
    pub fn block_at(&self, x: usize, y: usize) -> Option<&Block> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.blocks.get(y * self.width + x)
    }

    /// Replace the whole grid with freshly averaged block colors.
    pub(crate) fn rebuild(&mut self, width: usize, height: usize, colors: &[Rgb]) {
        debug_assert_eq!(colors.len(), width * height);

        self.width = width;
        self.height = height;
        self.blocks.clear();
        self.blocks.extend(colors.iter().map(|&c| Block::new(c)));
    }

    /// Original block-average colors, row-major.
    pub fn original_colors(&self) -> Vec<Rgb> {
        self.blocks.iter().map(Block::original_color).collect()
    }

    /// Current (possibly recolored) block colors, row-major.
    pub fn current_colors(&self) -> Vec<Rgb> {
        self.blocks.iter().map(Block::color).collect()
    }

    pub(crate) fn copy_current_colors_into(&self, out: &mut Vec<Rgb>) {
        out.clear();
        out.extend(self.blocks.iter().map(Block::color));
    }

    pub fn reset_colors(&mut self) {
        for block in &mut self.blocks {
            block.reset_color();
        }
    }

    pub fn invert_colors(&mut self) {
        for block in &mut self.blocks {
            block.invert_color();
        }
    }

    pub fn complement_colors(&mut self) {
        for block in &mut self.blocks {
            block.complement_color();
        }
    }
}

/// Fit grid dimensions to the source aspect ratio.
///
/// The larger requested dimension is kept and the other is recomputed from
/// the source ratio, floored, with a minimum of 1. Mirrors how interactive
/// grid sizing keeps block regions square-ish.
pub fn preserve_ratio(
    source_width: usize,
    source_height: usize,
    grid_width: usize,
    grid_height: usize,
) -> (usize, usize) {
    if source_width == 0 || source_height == 0 {
        return (grid_width.max(1), grid_height.max(1));
    }

    let ratio = source_width as f32 / source_height as f32;

    if grid_width >= grid_height {
        let width = grid_width.max(1);
        let height = ((width as f32 * (1.0 / ratio)).floor() as usize).max(1);
        (width, height)
    } else {
        let height = grid_height.max(1);
        let width = ((height as f32 * ratio).floor() as usize).max(1);
        (width, height)
    }
}
