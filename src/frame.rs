use crate::{Error, Result};
use image::{DynamicImage, GrayImage, Luma};

/// Intensity at and above which a grayscale pixel counts as foreground.
pub const DEFAULT_THRESHOLD: u8 = 64;

/// Unicode sextants indexed by the six pixels of a 2x3 cell.
///
/// ```text
/// bit layout
/// 0 1
/// 2 3
/// 4 5
/// ```
const SEXTANTS: [char; 64] = [
    ' ', '🬀', '🬁', '🬂', '🬃', '🬄', '🬅', '🬆',
    '🬇', '🬈', '🬉', '🬊', '🬋', '🬌', '🬍', '🬎',
    '🬏', '🬐', '🬑', '🬒', '🬓', '▌', '🬔', '🬕',
    '🬖', '🬗', '🬘', '🬙', '🬚', '🬛', '🬜', '🬝',
    '🬞', '🬟', '🬠', '🬡', '🬢', '🬣', '🬤', '🬥',
    '🬦', '🬧', '▐', '🬨', '🬩', '🬪', '🬫', '🬬',
    '🬭', '🬮', '🬯', '🬰', '🬱', '🬲', '🬳', '🬴',
    '🬵', '🬶', '🬷', '🬸', '🬹', '🬺', '🬻', '█',
];
const CELL_WIDTH: u32 = 2;
const CELL_HEIGHT: u32 = 3;

/// `width * height`, or `PixelCountOverflow` when it does not fit in usize.
pub(crate) fn pixel_count(width: u32, height: u32) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .ok_or(Error::PixelCountOverflow { width, height })
}

/// A bitonal raster, row-major, `true` being foreground.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<bool>,
}

impl Frame {
    pub fn new(width: u32, height: u32, pixels: Vec<bool>) -> Result<Frame> {
        let expected = pixel_count(width, height)?;
        if pixels.len() != expected {
            return Err(Error::PixelCountMismatch {
                expected,
                found: pixels.len(),
            });
        }
        Ok(Frame {
            width,
            height,
            pixels,
        })
    }

    pub fn filled(width: u32, height: u32, pixel: bool) -> Result<Frame> {
        Ok(Frame {
            width,
            height,
            pixels: vec![pixel; pixel_count(width, height)?],
        })
    }

    /// Thresholds a grayscale image: intensity `>= threshold` is foreground.
    pub fn from_luma(image: &GrayImage, threshold: u8) -> Frame {
        let pixels = image.pixels().map(|Luma([value])| *value >= threshold).collect();
        Frame {
            width: image.width(),
            height: image.height(),
            pixels,
        }
    }

    pub fn from_image(image: &DynamicImage, threshold: u8) -> Frame {
        Frame::from_luma(&image.to_luma8(), threshold)
    }

    /// Renders foreground as 255 and background as 0.
    pub fn to_luma(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            Luma([if self.pixels[self.index(x, y)] { 0xFF } else { 0 }])
        })
    }

    /// Reconstructs a frame from its encoded stream.
    ///
    /// `previous` MUST be given for every frame but the first of a stream.
    pub fn decode(
        stream: &[u8],
        previous: Option<&Frame>,
        width: u32,
        height: u32,
    ) -> Result<Frame> {
        if let Some(previous) = previous {
            previous.check_dimensions(width, height)?;
        }
        let pixel_count = pixel_count(width, height)?;
        let pixels = crate::decode_frame(stream, previous.map(Frame::pixels), pixel_count)?;
        Ok(Frame {
            width,
            height,
            pixels,
        })
    }

    /// Draws the frame with one sextant character per 2x3 pixel cell, one
    /// line per row of cells.
    ///
    /// Pixels of a cell that fall outside the frame count as background.
    pub fn render_sextants(&self) -> String {
        let columns = self.width.div_ceil(CELL_WIDTH);
        let rows = self.height.div_ceil(CELL_HEIGHT);
        let mut out = String::with_capacity((columns as usize + 1) * rows as usize * 4);
        for row in 0..rows {
            if row > 0 {
                out.push('\n');
            }
            for column in 0..columns {
                let mut bits = 0;
                for bit in 0..CELL_WIDTH * CELL_HEIGHT {
                    let x = column * CELL_WIDTH + bit % CELL_WIDTH;
                    let y = row * CELL_HEIGHT + bit / CELL_WIDTH;
                    if self.get(x, y) == Some(true) {
                        bits |= 1 << bit;
                    }
                }
                out.push(SEXTANTS[bits]);
            }
        }
        out
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    pub fn pixels(&self) -> &[bool] {
        &self.pixels
    }

    pub fn get(&self, x: u32, y: u32) -> Option<bool> {
        if x < self.width && y < self.height {
            Some(self.pixels[self.index(x, y)])
        } else {
            None
        }
    }

    pub(crate) fn check_dimensions(&self, width: u32, height: u32) -> Result<()> {
        if self.dimensions() != (width, height) {
            return Err(Error::DimensionMismatch {
                expected: (width, height),
                found: self.dimensions(),
            });
        }
        Ok(())
    }

    #[inline(always)]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}
