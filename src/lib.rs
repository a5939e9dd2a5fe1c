//! # Run Encoding Scheme
//!
//! Every run is a `(command, length)` pair packed into one or more bytes.
//!
//! ```text
//!         MSB      LSB
//!          │        │
//!          ▼        ▼
//!         CCMN NNNN   [MNNN NNNN]...
//!         ▲▲▲
//! COMMAND─┘│└─MORE
//! ```
//!
//! | command | bits | meaning                                   |
//! |---------|------|-------------------------------------------|
//! | SKIP    | `00` | keep the previous frame's pixels          |
//! | WHITE   | `01` | paint foreground                          |
//! | BLACK   | `10` | paint background                          |
//! | FLIP    | `11` | invert the previous frame's pixels        |
//!
//! Treat `length - 1` as unsigned integer N. The first byte holds the low 5
//! bits of N. Each following byte holds a 7 bit digit `d` which adds
//! `(d + 1) << shift`, shift starting at 5 and growing by 7. The `MORE` bit
//! is set on every byte except the last.
//!
//! ```text
//! xx000000                      1
//! xx011111                     32
//! xx100000 00000000            33
//! xx111111 01111111          4128
//! xx100000 10000000 00000000 4129
//! xx111111 11111111 01111111 528416
//! ```
//!
//! # Frame Scheme
//!
//! A frame is encoded as the concatenation of its runs, with no count and no
//! terminator. The decoder MUST know the pixel count of the frame.
//!
//! The first frame of a stream only uses WHITE and BLACK. Later frames are
//! deltas against their predecessor, and a SKIP run reaching the end of the
//! frame is not encoded at all: a stream that ends early leaves the remaining
//! pixels unchanged.
//!
//! Width, height, frame count and frame rate are kept out of band.

#[macro_use]
extern crate log;

mod derle;
mod error;
mod frame;
mod rle;
mod stream;
mod varint;

#[cfg(test)]
mod test_utils;

pub use derle::{decode_frame, DeRle, Runs};
pub use error::{Error, Result};
pub use frame::{Frame, DEFAULT_THRESHOLD};
pub use rle::{choose_run, encode_delta_frame, encode_first_frame, encode_frame, Differ};
pub use stream::{FrameStream, Playback, StreamEncoder, StreamInfo};
pub use varint::{decode_run, encode_run, encoded_len, Command, Run};

const COMMAND_SHIFT: u8 = 6;
/// set on the first byte when a continuation byte follows
const FIRST_MORE_BIT: u8 = 0b0010_0000;
const FIRST_VALUE_MASK: u8 = 0b0001_1111;
const FIRST_VALUE_BITS: u32 = 5;
/// set on a continuation byte when another one follows
const MORE_BIT: u8 = 0b1000_0000;
const VALUE_MASK: u8 = 0b0111_1111;
const VALUE_BITS: u32 = 7;
