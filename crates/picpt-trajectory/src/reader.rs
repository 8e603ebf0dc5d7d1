//! Trajectory reader.
//!
//! [`TrajectoryReader`] reads frames from any `Read` source. The header is
//! parsed on construction and bounds how many frames are read.

use std::io::Read;

use crate::codec::{decode_frame, decode_header, frame_to_state};
use crate::error::TrajectoryError;
use crate::types::{OutputScale, Trajectory};

/// Reads trajectory data from a byte stream.
///
/// Frames are returned as stored (`f32`, already divided by the output
/// scale). Use [`read_trajectory`](Self::read_trajectory) to get
/// simulation units back.
pub struct TrajectoryReader<R: Read> {
    reader: R,
    particles: usize,
    frames_declared: usize,
    frames_read: usize,
}

impl<R: Read> TrajectoryReader<R> {
    /// Open a trajectory stream, reading and parsing the header.
    pub fn open(mut reader: R) -> Result<Self, TrajectoryError> {
        let (particles, frames_declared) = decode_header(&mut reader)?;
        Ok(Self {
            reader,
            particles,
            frames_declared,
            frames_read: 0,
        })
    }

    /// Particles per frame.
    pub fn particles(&self) -> usize {
        self.particles
    }

    /// Frame count from the header.
    pub fn frames_declared(&self) -> usize {
        self.frames_declared
    }

    /// Read the next stored frame, or `None` after the declared count.
    ///
    /// A stream that ends before the declared count is an error.
    pub fn next_frame(&mut self) -> Result<Option<Vec<f32>>, TrajectoryError> {
        next_stored(
            &mut self.reader,
            self.particles,
            self.frames_declared,
            &mut self.frames_read,
        )
    }

    /// Number of frames read so far.
    pub fn frames_read(&self) -> usize {
        self.frames_read
    }

    /// Read every remaining frame and rebuild a [`Trajectory`], multiplying
    /// stored values by `scale`.
    pub fn read_trajectory(mut self, scale: &OutputScale) -> Result<Trajectory, TrajectoryError> {
        let first = self.next_frame()?.ok_or(TrajectoryError::FrameCountMismatch {
            declared: self.frames_declared,
            written: 0,
        })?;
        let mut trajectory = Trajectory::new(frame_to_state(&first, scale)?);
        while let Some(stored) = self.next_frame()? {
            trajectory.push(frame_to_state(&stored, scale)?)?;
        }
        Ok(trajectory)
    }

    /// Convert into a frame iterator.
    pub fn frames(self) -> FrameIter<R> {
        FrameIter {
            reader: self.reader,
            particles: self.particles,
            frames_declared: self.frames_declared,
            frames_read: self.frames_read,
            done: false,
        }
    }
}

fn next_stored(
    reader: &mut dyn Read,
    particles: usize,
    declared: usize,
    frames_read: &mut usize,
) -> Result<Option<Vec<f32>>, TrajectoryError> {
    if *frames_read == declared {
        return Ok(None);
    }
    match decode_frame(reader, particles)? {
        Some(frame) => {
            *frames_read += 1;
            Ok(Some(frame))
        }
        None => Err(TrajectoryError::FrameCountMismatch {
            declared,
            written: *frames_read,
        }),
    }
}

/// Iterator adapter over stored trajectory frames.
pub struct FrameIter<R: Read> {
    reader: R,
    particles: usize,
    frames_declared: usize,
    frames_read: usize,
    done: bool,
}

impl<R: Read> Iterator for FrameIter<R> {
    type Item = Result<Vec<f32>, TrajectoryError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match next_stored(
            &mut self.reader,
            self.particles,
            self.frames_declared,
            &mut self.frames_read,
        ) {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
