//! Frame scanner.
//!
//! Walks a fully composed frame once, strips every marker and reports where
//! each one sat. Positions are measured against the output being built, so
//! markers already removed earlier in the frame never shift later
//! coordinates.
//!
//! The scan works on bytes: markers are pure ASCII plus the two-byte ST, so
//! they can be found without decoding, and invalid UTF-8 in the frame is
//! copied through untouched instead of derailing the walk.

use std::borrow::Cow;
use std::sync::Arc;

use memchr::{memchr, memchr_iter, memrchr};
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::area::Coord;
use crate::marker::{self, Token, OPEN_BYTE};
use crate::stats::Stats;
use crate::width::DisplayWidth;
use crate::worker::Message;

/// A marker found in a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    pub token: Token,
    pub coord: Coord,
}

/// Strip markers from `frame`, calling `emit` for each in discovery order.
///
/// This is the whole algorithm without the queue; [`Scanner`] feeds its
/// observations to the consumer task.
pub fn strip_markers<F>(frame: &[u8], width: &dyn DisplayWidth, mut emit: F) -> Vec<u8>
where
    F: FnMut(Observation),
{
    let mut out = Vec::with_capacity(frame.len());
    let mut cursor = 0;
    let mut row = 0usize;
    // Offset in `out` where the current line starts.
    let mut line_start = 0usize;
    // Width of `out[line_start..measured]`, carried from marker to marker so
    // each stretch of a line is measured once.
    let mut measured = 0usize;
    let mut column = 0usize;

    while let Some(offset) = memchr(OPEN_BYTE, &frame[cursor..]) {
        let at = cursor + offset;
        copy_tracking_lines(&frame[cursor..at], &mut out, &mut row, &mut line_start);

        match marker::try_parse(&frame[at..]) {
            Some((token, len)) => {
                if measured < line_start {
                    measured = line_start;
                    column = 0;
                }
                column += width.width(&lossy(&out[measured..]));
                measured = out.len();

                emit(Observation {
                    token,
                    coord: Coord::new(saturate(row), saturate(column)),
                });
                cursor = at + len;
            }
            None => {
                // Foreign escape sequence, keep it and move past the ESC.
                out.push(OPEN_BYTE);
                cursor = at + 1;
            }
        }
    }

    copy_tracking_lines(&frame[cursor..], &mut out, &mut row, &mut line_start);
    out
}

fn copy_tracking_lines(chunk: &[u8], out: &mut Vec<u8>, row: &mut usize, line_start: &mut usize) {
    if let Some(last) = memrchr(b'\n', chunk) {
        *row += memchr_iter(b'\n', chunk).count();
        *line_start = out.len() + last + 1;
    }
    out.extend_from_slice(chunk);
}

fn lossy(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

fn saturate(value: usize) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

/// Scans frames on the render path and publishes observations.
///
/// Publishing never blocks: when the queue is full the observation is
/// dropped and the next frame corrects the store.
pub struct Scanner {
    tx: mpsc::Sender<Message>,
    width: Arc<dyn DisplayWidth>,
    stats: Arc<Stats>,
}

impl Scanner {
    pub(crate) fn new(
        tx: mpsc::Sender<Message>,
        width: Arc<dyn DisplayWidth>,
        stats: Arc<Stats>,
    ) -> Self {
        Self { tx, width, stats }
    }

    /// Strip markers from a frame and publish their coordinates.
    pub fn scan(&self, frame: &str) -> String {
        if memchr(OPEN_BYTE, frame.as_bytes()).is_none() {
            self.stats.frame_scanned();
            return frame.to_owned();
        }

        let out = self.scan_bytes(frame.as_bytes());
        // Only whole markers were removed, so valid input stays valid.
        String::from_utf8(out)
            .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned())
    }

    /// [`scan`](Self::scan) for frames that may not be valid UTF-8.
    pub fn scan_bytes(&self, frame: &[u8]) -> Vec<u8> {
        self.stats.frame_scanned();
        strip_markers(frame, self.width.as_ref(), |observation| {
            self.publish(observation)
        })
    }

    /// Width of `text` as measured by this scanner.
    pub fn display_width(&self, text: &str) -> usize {
        self.width.width(text)
    }

    fn publish(&self, observation: Observation) {
        match self.tx.try_send(Message::Observed(observation)) {
            Ok(()) => self.stats.published(),
            Err(TrySendError::Full(_)) => {
                self.stats.dropped();
                tracing::debug!(
                    "Observation queue full, dropping token {} at {:?}",
                    observation.token,
                    observation.coord
                );
            }
            Err(TrySendError::Closed(_)) => {
                self.stats.dropped();
                tracing::trace!("Observation queue closed, dropping token {}", observation.token);
            }
        }
    }
}
