// lanview-relay/src/lib.rs
// ============================================================
// Latest-frame relay for lanview
// Single-slot, lock-protected handoff between the capture
// thread (producer) and the paint path (consumer).
// ------------------------------------------------------------
// Public API:
//   * FrameRelay::publish() – replace the slot with a new frame
//   * FrameRelay::snapshot() – copy of the newest complete frame
// ============================================================

//! lanview – frame relay
//!
//! One producer publishes decoded frames into a single slot; one consumer
//! snapshots it whenever the window wants to repaint.  The consumer always
//! sees the most recently *completed* frame and never a partial write, and
//! the producer never waits for a read to finish.  There is no queue:
//! a publish unconditionally replaces whatever was stored, so frames that
//! were never snapshotted are simply lost.  That keep-latest policy is the
//! point – a viewer wants the newest picture, not a backlog.

use std::sync::{Mutex, MutexGuard};

use lanview_source::Frame;

/// Tightly packed copy of the newest frame (stride == width * 4).
struct StoredFrame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

/// A self-consistent copy of exactly one published frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub width: u32,
    pub height: u32,
    /// RGBA, tightly packed.
    pub pixels: Vec<u8>,
}

/// Single-slot, latest-wins frame buffer guarded by one exclusive lock.
///
/// The lock is held only for the row copy (publish) or the buffer clone
/// (snapshot); neither side ever blocks waiting for new data.
#[derive(Default)]
pub struct FrameRelay {
    slot: Mutex<Option<StoredFrame>>,
}

impl FrameRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored frame with `frame`.
    ///
    /// The stored buffer is reallocated only when the incoming dimensions
    /// differ from the stored ones; same-size streams reuse it.  Rows are
    /// copied through the source stride into the packed destination, so
    /// padding bytes never reach a snapshot.
    ///
    /// An undersized pixel buffer or zero dimensions are a caller contract
    /// violation and fail fast.
    pub fn publish(&self, frame: &Frame) {
        let w = frame.width as usize;
        let h = frame.height as usize;
        let src_stride = frame.stride as usize;
        let row_bytes = w * 4;
        assert!(w > 0 && h > 0, "frame must have non-zero dimensions");
        assert!(src_stride >= row_bytes, "stride shorter than a packed row");
        assert!(
            frame.pixels.len() >= h * src_stride,
            "pixel buffer shorter than height * stride"
        );

        let mut slot = self.lock();
        let stored = slot.get_or_insert_with(|| StoredFrame {
            width: 0,
            height: 0,
            pixels: Vec::new(),
        });
        if stored.width != frame.width || stored.height != frame.height {
            stored.width = frame.width;
            stored.height = frame.height;
            stored.pixels.resize(row_bytes * h, 0);
        }
        for y in 0..h {
            let src = &frame.pixels[y * src_stride..y * src_stride + row_bytes];
            stored.pixels[y * row_bytes..(y + 1) * row_bytes].copy_from_slice(src);
        }
    }

    /// Copy of the newest complete frame, or `None` before the first publish.
    ///
    /// Two snapshots with no publish in between are bit-identical.
    pub fn snapshot(&self) -> Option<Snapshot> {
        let slot = self.lock();
        slot.as_ref().map(|stored| Snapshot {
            width: stored.width,
            height: stored.height,
            pixels: stored.pixels.clone(),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Option<StoredFrame>> {
        // a poisoned lock still holds a fully written frame: publish only
        // mutates the slot after its input checks have passed
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    /// Frame filled with one marker byte in every channel; `pad` extra
    /// stride bytes per row are set to 0xFF so a stride bug shows up.
    fn solid(width: u32, height: u32, pad: u32, marker: u8) -> Frame {
        let stride = width * 4 + pad;
        let mut pixels = vec![0xFFu8; (stride * height) as usize];
        for y in 0..height as usize {
            let start = y * stride as usize;
            pixels[start..start + width as usize * 4].fill(marker);
        }
        Frame {
            width,
            height,
            stride,
            pixels,
            pts: Duration::ZERO,
        }
    }

    #[test]
    fn empty_before_first_publish() {
        let relay = FrameRelay::new();
        assert!(relay.snapshot().is_none());
    }

    #[test]
    fn snapshot_returns_latest_publish() {
        let relay = FrameRelay::new();
        relay.publish(&solid(4, 4, 0, 1));
        relay.publish(&solid(4, 4, 0, 2));
        let snap = relay.snapshot().unwrap();
        assert!(snap.pixels.iter().all(|&b| b == 2));
    }

    #[test]
    fn resize_leaves_no_residual_bytes() {
        let relay = FrameRelay::new();
        relay.publish(&solid(64, 64, 0, 1));
        relay.publish(&solid(128, 96, 0, 2));
        let snap = relay.snapshot().unwrap();
        assert_eq!((snap.width, snap.height), (128, 96));
        assert_eq!(snap.pixels.len(), 128 * 96 * 4);
        assert!(snap.pixels.iter().all(|&b| b == 2));
    }

    #[test]
    fn shrink_truncates_to_new_dimensions() {
        let relay = FrameRelay::new();
        relay.publish(&solid(128, 96, 0, 1));
        relay.publish(&solid(64, 64, 0, 2));
        let snap = relay.snapshot().unwrap();
        assert_eq!((snap.width, snap.height), (64, 64));
        assert_eq!(snap.pixels.len(), 64 * 64 * 4);
        assert!(snap.pixels.iter().all(|&b| b == 2));
    }

    #[test]
    fn stride_padding_is_not_copied() {
        let relay = FrameRelay::new();
        // 8 padding bytes per row, all 0xFF
        relay.publish(&solid(16, 8, 8, 3));
        let snap = relay.snapshot().unwrap();
        assert_eq!(snap.pixels.len(), 16 * 8 * 4);
        assert!(snap.pixels.iter().all(|&b| b == 3));
    }

    #[test]
    fn snapshot_is_idempotent() {
        let relay = FrameRelay::new();
        relay.publish(&solid(32, 32, 4, 7));
        let first = relay.snapshot().unwrap();
        let second = relay.snapshot().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn concurrent_publish_and_snapshot_never_tear() {
        let relay = Arc::new(FrameRelay::new());
        let writer = {
            let relay = Arc::clone(&relay);
            thread::spawn(move || {
                for i in 0..500u32 {
                    let (w, h, marker) = if i % 2 == 0 {
                        (64, 64, 0xAA)
                    } else {
                        (128, 96, 0x55)
                    };
                    relay.publish(&solid(w, h, 0, marker));
                }
            })
        };

        let mut seen = 0u32;
        while !writer.is_finished() || seen == 0 {
            let Some(snap) = relay.snapshot() else { continue };
            seen += 1;
            let marker = snap.pixels[0];
            assert!(marker == 0xAA || marker == 0x55, "unknown marker {marker}");
            assert!(
                snap.pixels.iter().all(|&b| b == marker),
                "torn snapshot after {seen} reads"
            );
            let expected = if marker == 0xAA { (64, 64) } else { (128, 96) };
            assert_eq!((snap.width, snap.height), expected);
        }
        writer.join().unwrap();
        assert!(seen > 0);
    }

    #[test]
    #[should_panic(expected = "stride shorter than a packed row")]
    fn undersized_stride_fails_fast() {
        let relay = FrameRelay::new();
        let mut frame = solid(8, 8, 0, 1);
        frame.stride = 8; // < width * 4
        relay.publish(&frame);
    }
}
