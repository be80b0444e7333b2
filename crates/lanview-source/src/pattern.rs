// lanview-source/src/pattern.rs
use std::thread;
use std::time::{Duration, Instant};

use log::debug;

use crate::{Event, Frame, FrameSource, Result};

/// Synthetic moving-gradient source for demos and tests.
///
/// Paced like a real receiver: `poll` sleeps until the next frame is due
/// or the timeout runs out, answering `NoData` for empty intervals.
pub struct PatternSource {
    width: u32,
    height: u32,
    interval: Duration,
    started: Instant,
    next_due: Instant,
    seq: u64,
}

impl PatternSource {
    pub fn new(width: u32, height: u32, fps: u32) -> Self {
        debug!("pattern source: {}x{} @ {} fps", width, height, fps);
        let now = Instant::now();
        Self {
            width: width.max(1),
            height: height.max(1),
            interval: Duration::from_secs(1) / fps.max(1),
            started: now,
            next_due: now,
            seq: 0,
        }
    }

    /// Horizontal/vertical gradient with a per-frame phase shift so motion
    /// is visible; deterministic for a given sequence number.
    fn render(&self) -> Frame {
        let w = self.width as usize;
        let h = self.height as usize;
        let phase = (self.seq % 256) as u8;
        let mut pixels = vec![0u8; w * h * 4];
        for y in 0..h {
            let row = &mut pixels[y * w * 4..(y + 1) * w * 4];
            let g = (y * 255 / h) as u8;
            for x in 0..w {
                let px = &mut row[x * 4..x * 4 + 4];
                px[0] = ((x * 255 / w) as u8).wrapping_add(phase);
                px[1] = g;
                px[2] = phase;
                px[3] = 255;
            }
        }
        Frame {
            width: self.width,
            height: self.height,
            stride: self.width * 4,
            pixels,
            pts: self.started.elapsed(),
        }
    }
}

impl FrameSource for PatternSource {
    fn poll(&mut self, timeout: Duration) -> Result<Event> {
        let now = Instant::now();
        if self.next_due > now {
            let wait = self.next_due - now;
            if wait > timeout {
                thread::sleep(timeout);
                return Ok(Event::NoData);
            }
            thread::sleep(wait);
        }
        let frame = self.render();
        self.seq += 1;
        // no catch-up bursts after a stall
        self.next_due = Instant::now() + self.interval;
        Ok(Event::Video(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_have_declared_shape() {
        let mut src = PatternSource::new(64, 48, 30);
        match src.poll(Duration::from_secs(1)).unwrap() {
            Event::Video(frame) => {
                assert_eq!(frame.width, 64);
                assert_eq!(frame.height, 48);
                assert_eq!(frame.stride, 64 * 4);
                assert_eq!(frame.pixels.len(), 64 * 48 * 4);
            }
            other => panic!("expected a video frame, got {:?}", other),
        }
    }

    #[test]
    fn no_data_when_polled_faster_than_frame_rate() {
        let mut src = PatternSource::new(8, 8, 10);
        // first frame is due immediately
        assert!(matches!(src.poll(Duration::from_secs(1)), Ok(Event::Video(_))));
        // next frame is 100ms away; a zero-length wait must come back empty
        assert!(matches!(src.poll(Duration::ZERO), Ok(Event::NoData)));
    }

    #[test]
    fn consecutive_frames_move() {
        let mut src = PatternSource::new(16, 16, 1000);
        let first = match src.poll(Duration::from_secs(1)).unwrap() {
            Event::Video(f) => f,
            other => panic!("expected video, got {:?}", other),
        };
        let second = loop {
            match src.poll(Duration::from_secs(1)).unwrap() {
                Event::Video(f) => break f,
                Event::NoData => continue,
                other => panic!("expected video, got {:?}", other),
            }
        };
        assert_ne!(first.pixels, second.pixels);
    }
}
