use thiserror::Error;

#[derive(Debug, Error)]
pub enum PixelizeError {
    #[error("image dimensions cannot be zero")]
    ZeroDimension,

    #[error("pixel buffer length {len} does not match dimensions {width}x{height}")]
    DimensionMismatch {
        len: usize,
        width: usize,
        height: usize,
    },

    #[error("grid {grid_width}x{grid_height} exceeds source {source_width}x{source_height}")]
    GridExceedsSource {
        grid_width: usize,
        grid_height: usize,
        source_width: usize,
        source_height: usize,
    },

    #[error("grid dimension {0} exceeds the maximum of 16384")]
    GridTooLarge(usize),

    #[error("no blocks to operate on; pixelize an image first")]
    NoBlocks,

    #[error("color palette has no colors")]
    EmptyPalette,

    #[error("palette color count must be at least 1")]
    ZeroColorCount,

    #[error("value ramp step count must be at least 2, got {0}")]
    InvalidStepCount(u32),

    #[error("pix size must be at least 1")]
    ZeroPixSize,

    #[error("output {width}x{height} exceeds the maximum texture size of 16384")]
    OutputTooLarge { width: usize, height: usize },
}
