use crate::Command;
use thiserror::Error;

/// Error during run encoding, frame diffing or decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("run length must be at least 1")]
    InvalidLength,

    #[error("stream ends inside the run starting at byte {offset}")]
    TruncatedStream { offset: usize },

    #[error("run starting at byte {offset} has a length that does not fit in usize")]
    LengthOverflow { offset: usize },

    #[error("a {width}x{height} frame has more pixels than fit in usize")]
    PixelCountOverflow { width: u32, height: u32 },

    #[error("expected {expected} pixels, found {found}")]
    PixelCountMismatch { expected: usize, found: usize },

    #[error("{command:?} run at byte {offset} needs a previous frame")]
    MissingPreviousFrame { command: Command, offset: usize },

    #[error("frame is {}x{}, expected {}x{}", .found.0, .found.1, .expected.0, .expected.1)]
    DimensionMismatch {
        expected: (u32, u32),
        found: (u32, u32),
    },
}

pub type Result<T> = std::result::Result<T, Error>;
