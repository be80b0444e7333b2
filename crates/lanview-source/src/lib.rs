// lanview-source/src/lib.rs
// ============================================================
// Frame acquisition layer for lanview
// Puts the network video receiver behind the FrameSource trait
// so the relay and the viewer never touch SDK types directly.
// ------------------------------------------------------------
// Public API:
//   * FrameSource::poll() – bounded wait for the next Event
//   * PatternSource::new() – built-in moving test pattern
//   * ndi::NdiSource – NDI-backed receiver (feature `ndi`)
// ------------------------------------------------------------
// Build notes
//   * Default build has no native deps; the NDI backend needs
//     the NDI runtime and is gated behind `--features ndi`.
// ============================================================

//! lanview – source layer
//!
//! A [`FrameSource`] produces a sequence of [`Event`]s: decoded RGBA video
//! frames plus the no-data / audio / metadata / status chatter a real
//! receiver emits.  The capture loop in the viewer polls it with a bounded
//! timeout and forwards video frames into the relay; everything that is not
//! video is logged and dropped.  Non-video payloads are owned summaries –
//! a backend extracts what is worth logging and releases the SDK buffer
//! before the event is returned, so no exit path can leak one.

use std::time::Duration;

use thiserror::Error;

mod cancel;
mod pattern;

#[cfg(feature = "ndi")]
pub mod ndi;

pub use cancel::CancelToken;
pub use pattern::PatternSource;

// Custom error types for this crate, useful as this project grows
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("discovery cancelled before a source was found")]
    Cancelled,
    #[error("failed to connect to source: {0}")]
    ConnectionFailed(String),
    #[error("capture failed: {0}")]
    Capture(String),
}

pub type Result<T> = std::result::Result<T, SourceError>;

/// A single decoded video frame, 8-bit RGBA.
///
/// `stride` is the byte distance between source rows and may exceed
/// `width * 4` when the producer pads its rows; `pixels` holds at least
/// `height * stride` bytes.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub stride: u32,
    pub pixels: Vec<u8>,
    pub pts: Duration,
}

/// One receiver poll outcome.
#[derive(Debug)]
pub enum Event {
    /// Nothing arrived within the poll timeout.  Expected, not an error.
    NoData,
    Video(Frame),
    /// Audio arrived.  The payload was already released; only the shape
    /// survives for logging.
    Audio { samples: u32, channels: u32 },
    /// Sideband metadata arrived (NDI sends XML snippets).
    Metadata(String),
    /// The receiver reconfigured itself (new web UI, format change, …).
    StatusChanged,
}

/// A connected video source the capture loop can poll.
///
/// `poll` blocks for at most `timeout` and is the only suspension point
/// the capture loop has, so the timeout also bounds shutdown latency.
pub trait FrameSource {
    fn poll(&mut self, timeout: Duration) -> Result<Event>;
}
