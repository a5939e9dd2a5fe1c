use crate::frame::pixel_count;
use crate::{encode_frame, Frame, Result};

/// Metadata kept out of band, next to the encoded frames.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StreamInfo {
    pub width: u32,
    pub height: u32,
    /// nominal frames per second
    pub frame_rate: f64,
}

impl StreamInfo {
    pub fn new(width: u32, height: u32, frame_rate: f64) -> StreamInfo {
        StreamInfo {
            width,
            height,
            frame_rate,
        }
    }

    pub fn pixel_count(&self) -> Result<usize> {
        pixel_count(self.width, self.height)
    }
}

/// Encoded frames in presentation order.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameStream {
    info: StreamInfo,
    frames: Vec<Vec<u8>>,
}

impl FrameStream {
    /// Wraps frames encoded elsewhere, e.g. read back from an embedded table.
    pub fn new(info: StreamInfo, frames: Vec<Vec<u8>>) -> FrameStream {
        FrameStream { info, frames }
    }

    pub fn info(&self) -> StreamInfo {
        self.info
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frame(&self, index: usize) -> Option<&[u8]> {
        self.frames.get(index).map(Vec::as_slice)
    }

    pub fn frames(&self) -> impl Iterator<Item = &[u8]> {
        self.frames.iter().map(Vec::as_slice)
    }

    /// Total bytes over all frames.
    pub fn encoded_size(&self) -> usize {
        self.frames.iter().map(Vec::len).sum()
    }

    pub fn playback(&self) -> Playback<'_> {
        Playback {
            stream: self,
            index: 0,
            previous: None,
            failed: false,
        }
    }

    pub fn into_frames(self) -> Vec<Vec<u8>> {
        self.frames
    }
}

/// Encodes frames one after another, each against the one pushed before it.
pub struct StreamEncoder {
    stream: FrameStream,
    previous: Option<Frame>,
}

impl StreamEncoder {
    pub fn new(info: StreamInfo) -> StreamEncoder {
        StreamEncoder {
            stream: FrameStream::new(info, vec![]),
            previous: None,
        }
    }

    /// Encodes the next frame and returns its encoded length.
    ///
    /// A frame whose dimensions differ from the stream's is rejected and
    /// leaves the encoder untouched.
    pub fn push(&mut self, frame: Frame) -> Result<usize> {
        let info = self.stream.info;
        frame.check_dimensions(info.width, info.height)?;
        let bytes = encode_frame(&frame, self.previous.as_ref())?;
        let len = bytes.len();
        debug!(
            "frame {}: {} pixels -> {len} bytes",
            self.stream.frames.len(),
            frame.pixel_count()
        );
        self.stream.frames.push(bytes);
        self.previous = Some(frame);
        Ok(len)
    }

    pub fn frame_count(&self) -> usize {
        self.stream.frames.len()
    }

    pub fn finish(self) -> FrameStream {
        info!(
            "encoded {} frames of {}x{} into {} bytes",
            self.stream.frame_count(),
            self.stream.info.width,
            self.stream.info.height,
            self.stream.encoded_size()
        );
        self.stream
    }
}

/// Decodes a [`FrameStream`] frame by frame.
///
/// Yields nothing more after the first error.
pub struct Playback<'a> {
    stream: &'a FrameStream,
    index: usize,
    previous: Option<Frame>,
    failed: bool,
}

impl Iterator for Playback<'_> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let bytes = self.stream.frame(self.index)?;
        let info = self.stream.info;
        trace!("play frame {} ({} bytes)", self.index, bytes.len());
        match Frame::decode(bytes, self.previous.as_ref(), info.width, info.height) {
            Ok(frame) => {
                self.index += 1;
                self.previous = Some(frame.clone());
                Some(Ok(frame))
            }
            Err(e) => {
                warn!("frame {} is corrupted: {e}", self.index);
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
