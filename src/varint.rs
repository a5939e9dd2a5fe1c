use crate::{
    Error, Result, COMMAND_SHIFT, FIRST_MORE_BIT, FIRST_VALUE_BITS, FIRST_VALUE_MASK, MORE_BIT,
    VALUE_BITS, VALUE_MASK,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    /// keep the previous frame's pixel
    Skip = 0b00,
    White = 0b01,
    Black = 0b10,
    /// invert the previous frame's pixel
    Flip = 0b11,
}

impl Command {
    /// Reads the command from the two high bits of `byte`.
    #[inline(always)]
    pub fn from_bits(byte: u8) -> Command {
        match byte >> COMMAND_SHIFT {
            0b00 => Command::Skip,
            0b01 => Command::White,
            0b10 => Command::Black,
            _ => Command::Flip,
        }
    }

    #[inline(always)]
    pub fn bits(self) -> u8 {
        (self as u8) << COMMAND_SHIFT
    }

    /// The absolute paint command for a pixel value.
    #[inline(always)]
    pub fn paint(pixel: bool) -> Command {
        if pixel {
            Command::White
        } else {
            Command::Black
        }
    }

    /// Whether the command reads the previous frame.
    #[inline(always)]
    pub fn is_relative(self) -> bool {
        matches!(self, Command::Skip | Command::Flip)
    }
}

/// A command applied to `length` consecutive pixels.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Run {
    pub command: Command,
    pub length: usize,
}

impl Run {
    pub fn new(command: Command, length: usize) -> Run {
        Run { command, length }
    }
}

/// Appends the encoding of one run to `buf` and returns how many bytes were written.
pub fn encode_run(command: Command, length: usize, buf: &mut Vec<u8>) -> Result<usize> {
    if length == 0 {
        return Err(Error::InvalidLength);
    }
    let start = buf.len();
    let mut n = (length - 1) as u64;

    let mut byte = command.bits() | (n as u8 & FIRST_VALUE_MASK);
    n >>= FIRST_VALUE_BITS;
    if n != 0 {
        byte |= FIRST_MORE_BIT;
    }
    buf.push(byte);

    while n != 0 {
        n -= 1;
        let mut byte = n as u8 & VALUE_MASK;
        n >>= VALUE_BITS;
        if n != 0 {
            byte |= MORE_BIT;
        }
        buf.push(byte);
    }

    trace!(
        "encode {command:?} x{length}: {}",
        hex::encode(&buf[start..])
    );
    Ok(buf.len() - start)
}

/// Number of bytes `encode_run` produces for `length`, 0 for an invalid length.
pub fn encoded_len(length: usize) -> usize {
    if length == 0 {
        return 0;
    }
    let mut n = ((length - 1) as u64) >> FIRST_VALUE_BITS;
    let mut len = 1;
    while n != 0 {
        n = (n - 1) >> VALUE_BITS;
        len += 1;
    }
    len
}

/// Decodes the run starting at `buf[offset]`.
///
/// Returns the run and the number of bytes it occupies.
pub fn decode_run(buf: &[u8], offset: usize) -> Result<(Run, usize)> {
    let first = *buf.get(offset).ok_or(Error::TruncatedStream { offset })?;
    let command = Command::from_bits(first);
    let mut n = (first & FIRST_VALUE_MASK) as u64;
    let mut shift = FIRST_VALUE_BITS;
    let mut pos = offset + 1;
    let mut more = first & FIRST_MORE_BIT != 0;

    while more {
        let byte = *buf.get(pos).ok_or(Error::TruncatedStream { offset })?;
        pos += 1;
        let digit = (byte & VALUE_MASK) as u64 + 1;
        n = digit
            .checked_shl(shift)
            .filter(|value| value >> shift == digit)
            .and_then(|value| n.checked_add(value))
            .ok_or(Error::LengthOverflow { offset })?;
        shift += VALUE_BITS;
        more = byte & MORE_BIT != 0;
    }

    let length = n
        .checked_add(1)
        .and_then(|length| usize::try_from(length).ok())
        .ok_or(Error::LengthOverflow { offset })?;
    let consumed = pos - offset;
    trace!("decode {command:?} x{length} from {consumed} bytes at {offset}");
    Ok((Run::new(command, length), consumed))
}
