use crate::{decode_run, Command, Error, Result, Run};

/// Iterator over the runs of an encoded frame, yielding each run with the
/// byte offset it starts at.
///
/// Stops after the first error.
pub struct Runs<'a> {
    stream: &'a [u8],
    offset: usize,
}

impl<'a> Runs<'a> {
    pub fn new(stream: &'a [u8]) -> Runs<'a> {
        Runs { stream, offset: 0 }
    }
}

impl Iterator for Runs<'_> {
    type Item = Result<(usize, Run)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.stream.len() {
            return None;
        }
        let offset = self.offset;
        match decode_run(self.stream, offset) {
            Ok((run, consumed)) => {
                self.offset += consumed;
                Some(Ok((offset, run)))
            }
            Err(e) => {
                self.offset = self.stream.len();
                Some(Err(e))
            }
        }
    }
}

/// Rebuilds one frame run by run.
pub struct DeRle<'a> {
    previous: Option<&'a [bool]>,
    pixels: Vec<bool>,
    pixel_count: usize,
}

impl<'a> DeRle<'a> {
    pub fn new(previous: Option<&'a [bool]>, pixel_count: usize) -> Result<DeRle<'a>> {
        if let Some(previous) = previous {
            if previous.len() != pixel_count {
                return Err(Error::PixelCountMismatch {
                    expected: pixel_count,
                    found: previous.len(),
                });
            }
        }
        Ok(DeRle {
            previous,
            pixels: Vec::with_capacity(pixel_count),
            pixel_count,
        })
    }

    /// Number of pixels decoded so far.
    pub fn position(&self) -> usize {
        self.pixels.len()
    }

    /// Applies a run that starts at byte `offset` of the stream.
    #[inline(always)]
    pub fn update(&mut self, run: Run, offset: usize) -> Result<()> {
        let start = self.pixels.len();
        let end = start.saturating_add(run.length);
        trace!("{:?} x{} at pixel {start}", run.command, run.length);
        if end > self.pixel_count {
            return Err(Error::PixelCountMismatch {
                expected: self.pixel_count,
                found: end,
            });
        }
        match (run.command, self.previous) {
            (Command::White, _) => self.pixels.resize(end, true),
            (Command::Black, _) => self.pixels.resize(end, false),
            (Command::Skip, Some(previous)) => {
                self.pixels.extend_from_slice(&previous[start..end])
            }
            (Command::Flip, Some(previous)) => {
                self.pixels.extend(previous[start..end].iter().map(|pixel| !pixel))
            }
            (command, None) => return Err(Error::MissingPreviousFrame { command, offset }),
        }
        Ok(())
    }

    /// Fills what the stream did not cover from the previous frame.
    ///
    /// `stream_len` is reported as the offset of the implicit SKIP.
    pub fn finalize(mut self, stream_len: usize) -> Result<Vec<bool>> {
        let rem = self.pixel_count - self.pixels.len();
        if rem != 0 {
            trace!("implicit skip x{rem}");
            self.update(Run::new(Command::Skip, rem), stream_len)?;
        }
        debug_assert_eq!(self.pixels.len(), self.pixel_count);
        Ok(self.pixels)
    }
}

/// Decodes one frame of `pixel_count` pixels.
///
/// `previous` MUST be the decoded predecessor for every frame but the first.
pub fn decode_frame(
    stream: &[u8],
    previous: Option<&[bool]>,
    pixel_count: usize,
) -> Result<Vec<bool>> {
    let mut derle = DeRle::new(previous, pixel_count)?;
    for item in Runs::new(stream) {
        let (offset, run) = item?;
        derle.update(run, offset)?;
    }
    let pixels = derle.finalize(stream.len())?;
    debug!("decoded {} bytes into {pixel_count} pixels", stream.len());
    Ok(pixels)
}
