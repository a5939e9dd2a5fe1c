use crate::{encode_run, Command, Error, Frame, Result, Run};

/// Picks the run starting at `index`.
///
/// Without a previous frame this is always the maximal paint run. With one:
///
/// - an unchanged pixel starts a SKIP, unless the paint run is strictly longer
/// - a changed pixel starts a FLIP, unless the paint run is at least as long
///
/// `previous` MUST have as many pixels as `frame`, and `index` MUST lie
/// inside the frame.
pub fn choose_run(frame: &[bool], previous: Option<&[bool]>, index: usize) -> Result<Run> {
    if let Some(previous) = previous {
        if previous.len() != frame.len() {
            return Err(Error::PixelCountMismatch {
                expected: frame.len(),
                found: previous.len(),
            });
        }
    }
    if index >= frame.len() {
        return Err(Error::PixelCountMismatch {
            expected: frame.len(),
            found: index.saturating_add(1),
        });
    }
    Ok(next_run(frame, previous, index))
}

/// `choose_run` without the bounds checks, for callers that validated once.
#[inline(always)]
fn next_run(frame: &[bool], previous: Option<&[bool]>, index: usize) -> Run {
    let pixel = frame[index];
    let repeat_len = run_len(frame.len(), index, |i| frame[i] == pixel);
    let paint = Run::new(Command::paint(pixel), repeat_len);

    let Some(previous) = previous else {
        return paint;
    };
    if previous[index] == pixel {
        let skip_len = run_len(frame.len(), index, |i| frame[i] == previous[i]);
        trace!("unchanged at {index}: repeat_len={repeat_len}, skip_len={skip_len}");
        if repeat_len > skip_len {
            paint
        } else {
            Run::new(Command::Skip, skip_len)
        }
    } else {
        let flip_len = run_len(frame.len(), index, |i| frame[i] != previous[i]);
        trace!("changed at {index}: repeat_len={repeat_len}, flip_len={flip_len}");
        if repeat_len >= flip_len {
            paint
        } else {
            Run::new(Command::Flip, flip_len)
        }
    }
}

/// Length of the run starting at `index` whose pixels all satisfy `pred`,
/// the pixel at `index` being part of it.
#[inline(always)]
fn run_len(len: usize, index: usize, pred: impl Fn(usize) -> bool) -> usize {
    1 + (index + 1..len).take_while(|&i| pred(i)).count()
}

/// Iterator over the runs of one frame.
///
/// A SKIP run reaching the end of the frame is not yielded.
pub struct Differ<'a> {
    frame: &'a [bool],
    previous: Option<&'a [bool]>,
    index: usize,
}

impl<'a> Differ<'a> {
    /// Runs of a frame without predecessor, WHITE and BLACK only.
    pub fn first(frame: &'a Frame) -> Differ<'a> {
        Differ {
            frame: frame.pixels(),
            previous: None,
            index: 0,
        }
    }

    /// Runs of `frame` relative to `previous`.
    pub fn delta(frame: &'a Frame, previous: &'a Frame) -> Result<Differ<'a>> {
        previous.check_dimensions(frame.width(), frame.height())?;
        Ok(Differ {
            frame: frame.pixels(),
            previous: Some(previous.pixels()),
            index: 0,
        })
    }

    /// Index of the first pixel not yet covered.
    pub fn position(&self) -> usize {
        self.index
    }
}

impl Iterator for Differ<'_> {
    type Item = Run;

    fn next(&mut self) -> Option<Run> {
        if self.index >= self.frame.len() {
            return None;
        }
        let run = next_run(self.frame, self.previous, self.index);
        self.index += run.length;
        if run.command == Command::Skip && self.index == self.frame.len() {
            trace!("omit trailing {run:?}");
            return None;
        }
        Some(run)
    }
}

fn encode_runs(runs: Differ<'_>) -> Result<Vec<u8>> {
    let mut buf = vec![];
    let mut count = 0;
    for run in runs {
        encode_run(run.command, run.length, &mut buf)?;
        count += 1;
    }
    debug!("encoded {count} runs into {} bytes", buf.len());
    trace!("frame bytes: {}", hex::encode(&buf));
    Ok(buf)
}

/// Encodes a frame with no predecessor.
pub fn encode_first_frame(frame: &Frame) -> Result<Vec<u8>> {
    encode_runs(Differ::first(frame))
}

/// Encodes `frame` as a delta against `previous`.
///
/// Both frames MUST have the same dimensions.
pub fn encode_delta_frame(frame: &Frame, previous: &Frame) -> Result<Vec<u8>> {
    encode_runs(Differ::delta(frame, previous)?)
}

pub fn encode_frame(frame: &Frame, previous: Option<&Frame>) -> Result<Vec<u8>> {
    match previous {
        Some(previous) => encode_delta_frame(frame, previous),
        None => encode_first_frame(frame),
    }
}

#[cfg(test)]
mod tests {
    use super::{choose_run, encode_delta_frame, encode_first_frame, Differ};
    use crate::test_utils::setup;
    use crate::{Command, Error, Frame, Run};
    use proptest::prelude::*;

    const T: bool = true;
    const F: bool = false;

    fn frame(pixels: &[bool]) -> Frame {
        Frame::new(pixels.len() as u32, 1, pixels.to_vec()).unwrap()
    }

    fn runs(frame: &Frame, previous: Option<&Frame>) -> Vec<Run> {
        match previous {
            Some(previous) => Differ::delta(frame, previous).unwrap().collect(),
            None => Differ::first(frame).collect(),
        }
    }

    #[test]
    fn test_first_frame() {
        setup();
        let current = frame(&[T, T, F, F, F, T, F]);
        assert_eq!(
            vec![
                Run::new(Command::White, 2),
                Run::new(Command::Black, 3),
                Run::new(Command::White, 1),
                Run::new(Command::Black, 1),
            ],
            runs(&current, None)
        );
        assert_eq!(
            hex::decode("41824080").unwrap(),
            encode_first_frame(&current).unwrap()
        );
    }

    #[test]
    fn test_first_frame_is_never_omitted() {
        let current = Frame::filled(40, 30, false).unwrap();
        assert_eq!(vec![Run::new(Command::Black, 1200)], runs(&current, None));
        assert_eq!(
            hex::decode("af24").unwrap(),
            encode_first_frame(&current).unwrap()
        );
    }

    #[test]
    fn test_identical_frame_is_empty() {
        setup();
        let previous = frame(&[T, F, T, T, F, F, T, F]);
        assert!(encode_delta_frame(&previous, &previous).unwrap().is_empty());

        let blank = Frame::filled(480, 270, true).unwrap();
        assert!(encode_delta_frame(&blank, &blank).unwrap().is_empty());
    }

    #[test]
    fn test_paint_beats_skip_and_tail_is_omitted() {
        setup();
        let previous = frame(&[T, T, T, T, F, F, F, F]);
        let current = frame(&[T, T, T, T, T, T, F, F]);
        assert_eq!(vec![Run::new(Command::White, 6)], runs(&current, Some(&previous)));
        let stream = encode_delta_frame(&current, &previous).unwrap();
        assert_eq!(hex::decode("45").unwrap(), stream);
        assert_eq!(
            current,
            Frame::decode(&stream, Some(&previous), 8, 1).unwrap()
        );
    }

    #[test]
    fn test_skip_and_flip() {
        let previous = frame(&[T, F, T, F, T, F, T, F]);
        let current = frame(&[T, F, T, T, F, T, T, F]);
        assert_eq!(
            vec![Run::new(Command::Skip, 3), Run::new(Command::Flip, 3)],
            runs(&current, Some(&previous))
        );
        assert_eq!(
            hex::decode("02c2").unwrap(),
            encode_delta_frame(&current, &previous).unwrap()
        );
    }

    #[test]
    fn test_skip_wins_tie() {
        // repeat_len == skip_len == 2
        let previous = frame(&[F, F, F, T]);
        let current = frame(&[F, F, T, T]);
        assert_eq!(
            Run::new(Command::Skip, 2),
            choose_run(current.pixels(), Some(previous.pixels()), 0).unwrap()
        );
        assert_eq!(
            vec![Run::new(Command::Skip, 2), Run::new(Command::White, 2)],
            runs(&current, Some(&previous))
        );
    }

    #[test]
    fn test_paint_wins_tie_against_flip() {
        // repeat_len == flip_len == 2
        let previous = frame(&[F, F, F, F]);
        let current = frame(&[T, T, F, F]);
        assert_eq!(
            Run::new(Command::White, 2),
            choose_run(current.pixels(), Some(previous.pixels()), 0).unwrap()
        );

        // flip_len 3 > repeat_len 1
        let previous = frame(&[F, T, F, F]);
        let current = frame(&[T, F, T, F]);
        assert_eq!(
            Run::new(Command::Flip, 3),
            choose_run(current.pixels(), Some(previous.pixels()), 0).unwrap()
        );
        assert_eq!(
            vec![Run::new(Command::Flip, 3)],
            runs(&current, Some(&previous))
        );
    }

    #[test]
    fn test_skip_in_the_middle_is_kept() {
        let previous = frame(&[F, F, F, F, F, F]);
        let current = frame(&[T, F, F, F, F, T]);
        assert_eq!(
            vec![
                Run::new(Command::White, 1),
                Run::new(Command::Skip, 4),
                Run::new(Command::White, 1),
            ],
            runs(&current, Some(&previous))
        );

        let mut differ = Differ::delta(&current, &previous).unwrap();
        assert_eq!(0, differ.position());
        differ.next();
        assert_eq!(1, differ.position());
        assert_eq!(Some(Run::new(Command::Skip, 4)), differ.next());
        assert_eq!(5, differ.position());
        differ.next();
        assert_eq!(6, differ.position());
        assert_eq!(None, differ.next());
    }

    #[test]
    fn test_choose_run_rejects_bad_input() {
        assert_eq!(
            Err(Error::PixelCountMismatch {
                expected: 2,
                found: 1
            }),
            choose_run(&[T, T], Some(&[T]), 0)
        );
        assert_eq!(
            Err(Error::PixelCountMismatch {
                expected: 1,
                found: 3
            }),
            choose_run(&[T], Some(&[T, F, F]), 0)
        );
        assert_eq!(
            Err(Error::PixelCountMismatch {
                expected: 1,
                found: 2
            }),
            choose_run(&[T], None, 1)
        );
        assert_eq!(
            Err(Error::PixelCountMismatch {
                expected: 0,
                found: 1
            }),
            choose_run(&[], None, 0)
        );
        assert_eq!(Ok(Run::new(Command::White, 1)), choose_run(&[F, T], None, 1));
    }

    #[test]
    fn test_dimension_mismatch() {
        let previous = Frame::filled(4, 2, false).unwrap();
        let current = Frame::filled(2, 4, false).unwrap();
        assert_eq!(
            Err(Error::DimensionMismatch {
                expected: (2, 4),
                found: (4, 2)
            }),
            encode_delta_frame(&current, &previous)
        );
    }

    #[test]
    fn test_long_runs() {
        setup();
        let mut pixels = vec![false; 5000];
        pixels.extend(vec![true; 600_000]);
        let current = Frame::new(pixels.len() as u32, 1, pixels).unwrap();
        let stream = encode_first_frame(&current).unwrap();
        // 5000 -> 3 bytes, 600000 -> 4 bytes
        assert_eq!(7, stream.len());
        assert_eq!(current, Frame::decode(&stream, None, 605_000, 1).unwrap());
    }

    fn frame_pair() -> impl Strategy<Value = (Vec<bool>, Vec<bool>)> {
        (1usize..300).prop_flat_map(|len| {
            (
                prop::collection::vec(any::<bool>(), len),
                prop::collection::vec(any::<bool>(), len),
            )
        })
    }

    proptest! {
        #[test]
        fn proptest_first_frame_partition(pixels in prop::collection::vec(any::<bool>(), 1..500)) {
            let current = frame(&pixels);
            let runs = runs(&current, None);
            prop_assert_eq!(pixels.len(), runs.iter().map(|run| run.length).sum::<usize>());
            prop_assert!(runs.iter().all(|run| !run.command.is_relative()));
            prop_assert!(runs.windows(2).all(|pair| pair[0].command != pair[1].command));
            let stream = encode_first_frame(&current).unwrap();
            prop_assert_eq!(current, Frame::decode(&stream, None, pixels.len() as u32, 1).unwrap());
        }

        #[test]
        fn proptest_delta_round_trip((previous, current) in frame_pair()) {
            let previous = frame(&previous);
            let current = frame(&current);
            let runs = runs(&current, Some(&previous));
            prop_assert!(runs.iter().map(|run| run.length).sum::<usize>() <= current.pixel_count());
            let stream = encode_delta_frame(&current, &previous).unwrap();
            let decoded = Frame::decode(&stream, Some(&previous), current.width(), 1).unwrap();
            prop_assert_eq!(current, decoded);
        }
    }
}
