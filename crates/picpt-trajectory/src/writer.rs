//! Trajectory writer.
//!
//! [`TrajectoryWriter`] streams frames to any `Write` sink. The header is
//! written on construction, so the frame count must be known up front.

use std::io::Write;

use picpt_core::ParticleState;

use crate::codec::{encode_frame, encode_header};
use crate::error::TrajectoryError;
use crate::types::OutputScale;

/// Writes trajectory frames to a byte stream.
///
/// Generic over `W: Write` so tests can use `Vec<u8>` and production
/// code can use `BufWriter<File>`.
///
/// # Examples
///
/// ```
/// use picpt_core::{Particle, ParticleState};
/// use picpt_trajectory::{OutputScale, TrajectoryReader, TrajectoryWriter};
///
/// let frame = ParticleState::from_particles(&[Particle::new([1.0, 2.0, 3.0], [0.0; 3])]);
///
/// let mut buf = Vec::new();
/// let mut writer = TrajectoryWriter::new(&mut buf, 1, 2, OutputScale::UNIT).unwrap();
/// writer.write_frame(&frame).unwrap();
/// writer.write_frame(&frame).unwrap();
/// writer.finish().unwrap();
///
/// let mut reader = TrajectoryReader::open(buf.as_slice()).unwrap();
/// assert_eq!(reader.particles(), 1);
/// assert_eq!(reader.frames_declared(), 2);
/// assert_eq!(reader.next_frame().unwrap().unwrap()[..3], [1.0, 2.0, 3.0]);
/// ```
pub struct TrajectoryWriter<W: Write> {
    writer: W,
    particles: usize,
    declared_frames: usize,
    frames_written: usize,
    scale: OutputScale,
}

impl<W: Write> TrajectoryWriter<W> {
    /// Create a writer for `frames` frames of `particles` particles,
    /// immediately writing the header.
    pub fn new(
        mut writer: W,
        particles: usize,
        frames: usize,
        scale: OutputScale,
    ) -> Result<Self, TrajectoryError> {
        encode_header(&mut writer, particles, frames)?;
        Ok(Self {
            writer,
            particles,
            declared_frames: frames,
            frames_written: 0,
            scale,
        })
    }

    /// Append one frame.
    ///
    /// Rejects frames of the wrong size and frames beyond the count
    /// declared in the header.
    pub fn write_frame(&mut self, frame: &ParticleState) -> Result<(), TrajectoryError> {
        if frame.len() != self.particles {
            return Err(TrajectoryError::ParticleCountMismatch {
                expected: self.particles,
                found: frame.len(),
            });
        }
        if self.frames_written == self.declared_frames {
            return Err(TrajectoryError::FrameCountMismatch {
                declared: self.declared_frames,
                written: self.frames_written + 1,
            });
        }
        encode_frame(&mut self.writer, frame, &self.scale)?;
        self.frames_written += 1;
        Ok(())
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> Result<(), TrajectoryError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Number of frames written so far.
    pub fn frames_written(&self) -> usize {
        self.frames_written
    }

    /// Flush, check that every declared frame was written, and return the
    /// underlying sink.
    pub fn finish(mut self) -> Result<W, TrajectoryError> {
        self.writer.flush()?;
        if self.frames_written != self.declared_frames {
            return Err(TrajectoryError::FrameCountMismatch {
                declared: self.declared_frames,
                written: self.frames_written,
            });
        }
        Ok(self.writer)
    }

    /// Consume the writer and return the underlying `Write` sink without
    /// checking the frame count.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use picpt_core::Particle;

    fn frame(n: usize) -> ParticleState {
        (0..n)
            .map(|i| Particle::new([i as f64, 0.0, 0.0], [0.0, 1.0, 0.0]))
            .collect()
    }

    #[test]
    fn header_then_frames() {
        let mut buf = Vec::new();
        let mut w = TrajectoryWriter::new(&mut buf, 2, 1, OutputScale::UNIT).unwrap();
        w.write_frame(&frame(2)).unwrap();
        assert_eq!(w.frames_written(), 1);
        w.finish().unwrap();
        assert_eq!(&buf[..4], b"2 1\n");
        assert_eq!(buf.len(), 4 + 2 * 6 * 4);
    }

    #[test]
    fn wrong_particle_count_rejected() {
        let mut w = TrajectoryWriter::new(Vec::new(), 3, 1, OutputScale::UNIT).unwrap();
        match w.write_frame(&frame(2)) {
            Err(TrajectoryError::ParticleCountMismatch {
                expected: 3,
                found: 2,
            }) => {}
            other => panic!("expected ParticleCountMismatch, got {other:?}"),
        }
        assert_eq!(w.frames_written(), 0);
    }

    #[test]
    fn extra_frame_rejected() {
        let mut w = TrajectoryWriter::new(Vec::new(), 1, 1, OutputScale::UNIT).unwrap();
        w.write_frame(&frame(1)).unwrap();
        match w.write_frame(&frame(1)) {
            Err(TrajectoryError::FrameCountMismatch {
                declared: 1,
                written: 2,
            }) => {}
            other => panic!("expected FrameCountMismatch, got {other:?}"),
        }
    }

    #[test]
    fn finish_detects_missing_frames() {
        let mut w = TrajectoryWriter::new(Vec::new(), 1, 3, OutputScale::UNIT).unwrap();
        w.write_frame(&frame(1)).unwrap();
        match w.finish() {
            Err(TrajectoryError::FrameCountMismatch {
                declared: 3,
                written: 1,
            }) => {}
            other => panic!("expected FrameCountMismatch, got {:?}", other.map(|_| ())),
        }
    }
}
