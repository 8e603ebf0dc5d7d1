//! Binary encode/decode for the trajectory format.
//!
//! The header is a single ASCII line `"<Np> <numFrames>\n"`; everything
//! after it is little-endian `f32`, `Np * 6` values per frame.

use std::io::{self, Read, Write};

use picpt_core::{ParticleState, STATE_WIDTH};

use crate::error::TrajectoryError;
use crate::types::OutputScale;
use crate::MAX_HEADER_LEN;

// ── Header ──────────────────────────────────────────────────────

/// Write the `"<Np> <numFrames>\n"` header line.
pub fn encode_header(
    w: &mut dyn Write,
    particles: usize,
    frames: usize,
) -> Result<(), TrajectoryError> {
    writeln!(w, "{particles} {frames}")?;
    Ok(())
}

/// Read and parse the header line, returning `(particles, frames)`.
///
/// Reads byte by byte so nothing past the newline is consumed.
pub fn decode_header(r: &mut dyn Read) -> Result<(usize, usize), TrajectoryError> {
    let mut line = Vec::with_capacity(MAX_HEADER_LEN);
    let mut byte = [0u8; 1];
    loop {
        match r.read(&mut byte) {
            Ok(0) => {
                return Err(TrajectoryError::MalformedHeader {
                    detail: "stream ended before header newline".into(),
                })
            }
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
        if byte[0] == b'\n' {
            break;
        }
        line.push(byte[0]);
        if line.len() >= MAX_HEADER_LEN {
            return Err(TrajectoryError::MalformedHeader {
                detail: format!("no newline within {MAX_HEADER_LEN} bytes"),
            });
        }
    }

    let text = std::str::from_utf8(&line).map_err(|e| TrajectoryError::MalformedHeader {
        detail: format!("header is not UTF-8: {e}"),
    })?;
    let mut fields = text.split_whitespace();
    let mut next = |what: &str| -> Result<usize, TrajectoryError> {
        let field = fields.next().ok_or_else(|| TrajectoryError::MalformedHeader {
            detail: format!("missing {what}"),
        })?;
        field.parse().map_err(|e| TrajectoryError::MalformedHeader {
            detail: format!("bad {what} {field:?}: {e}"),
        })
    };
    let particles = next("particle count")?;
    let frames = next("frame count")?;
    if frame_len(particles).is_none() {
        return Err(TrajectoryError::MalformedHeader {
            detail: format!("particle count {particles} overflows the frame size"),
        });
    }
    if let Some(extra) = fields.next() {
        return Err(TrajectoryError::MalformedHeader {
            detail: format!("unexpected trailing field {extra:?}"),
        });
    }
    Ok((particles, frames))
}

// ── Frames ──────────────────────────────────────────────────────

/// Write one frame, dividing each value by `scale`.
pub fn encode_frame(
    w: &mut dyn Write,
    frame: &ParticleState,
    scale: &OutputScale,
) -> Result<(), TrajectoryError> {
    let mut bytes = Vec::with_capacity(frame.as_flat().len() * 4);
    for row in frame.as_flat().chunks_exact(STATE_WIDTH) {
        for (k, v) in row.iter().enumerate() {
            let stored = (v / scale.divisor(k)) as f32;
            bytes.extend_from_slice(&stored.to_le_bytes());
        }
    }
    w.write_all(&bytes)?;
    Ok(())
}

/// Values in a frame of `particles` rows, or `None` if its byte length
/// does not fit in `usize`.
pub fn frame_len(particles: usize) -> Option<usize> {
    let values = particles.checked_mul(STATE_WIDTH)?;
    values.checked_mul(4)?;
    Some(values)
}

/// Upper bound on values reserved before any frame data has been read.
const PREALLOC_VALUES: usize = 1 << 16;

/// Read one frame of `particles` rows as stored (no rescaling).
///
/// Returns `Ok(None)` on a clean end of stream before the first byte.
/// Rows are read one at a time, so a header claiming more particles than
/// the stream holds fails with [`TrajectoryError::MalformedFrame`] rather
/// than allocating the claimed size up front.
pub fn decode_frame(
    r: &mut dyn Read,
    particles: usize,
) -> Result<Option<Vec<f32>>, TrajectoryError> {
    let len = frame_len(particles).ok_or_else(|| TrajectoryError::MalformedFrame {
        detail: format!("{particles} particles overflow the frame size"),
    })?;
    let mut values = Vec::with_capacity(len.min(PREALLOC_VALUES));
    let mut row = [0u8; STATE_WIDTH * 4];
    for i in 0..particles {
        let filled = read_full(r, &mut row)?;
        if filled == 0 && i == 0 {
            return Ok(None);
        }
        if filled < row.len() {
            return Err(TrajectoryError::MalformedFrame {
                detail: format!(
                    "expected {} bytes, got {}",
                    len * 4,
                    i * row.len() + filled
                ),
            });
        }
        values.extend(
            row.chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]])),
        );
    }
    Ok(Some(values))
}

/// Fill `buf` from `r`, stopping early only at end of stream.
fn read_full(r: &mut dyn Read, buf: &mut [u8]) -> Result<usize, TrajectoryError> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

/// Convert a stored frame back to simulation units.
pub fn frame_to_state(
    stored: &[f32],
    scale: &OutputScale,
) -> Result<ParticleState, TrajectoryError> {
    let data = stored
        .chunks_exact(STATE_WIDTH)
        .flat_map(|row| {
            row.iter()
                .enumerate()
                .map(|(k, &v)| f64::from(v) * scale.divisor(k))
        })
        .collect();
    ParticleState::from_flat(data).map_err(|e| TrajectoryError::MalformedFrame {
        detail: e.to_string(),
    })
}
