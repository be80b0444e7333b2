// lanview-source/src/ndi.rs
//! NDI-backed frame source (enable with `--features ndi`).
//!
//! Thin adapter over the `grafton-ndi` bindings: find sources on the LAN,
//! connect to the first match with RGBA output, and map the SDK's frame
//! kinds onto [`Event`].  SDK-owned buffers live in RAII wrappers that free
//! themselves on drop, so every poll exit path returns its buffer.

use std::time::Duration;

use grafton_ndi::{Find, Finder, FrameType, Receiver, Recv, RecvBandwidth, RecvColorFormat, NDI};
use log::{debug, info};

use crate::{CancelToken, Event, Frame, FrameSource, Result, SourceError};

/// Bounded wait per discovery cycle, same ceiling the stock NDI example uses.
const FIND_WAIT_MS: u32 = 1000;

pub struct NdiSource {
    recv: Recv<'static>,
}

impl NdiSource {
    /// Discover sources on the network and connect to the first one whose
    /// name contains `name_filter` (any source when no filter is given).
    ///
    /// Loops in bounded waits until something shows up or `token` is
    /// cancelled, so a viewer started before its source never hangs.
    pub fn connect(token: &CancelToken, name_filter: Option<&str>) -> Result<Self> {
        let ndi = NDI::new().map_err(|e| SourceError::ConnectionFailed(e.to_string()))?;
        // The receiver borrows the runtime for its whole life and the viewer
        // only ever opens one, so parking the runtime for the process is fine.
        let ndi: &'static NDI = Box::leak(Box::new(ndi));

        let find = Find::new(ndi, &Finder::default())
            .map_err(|e| SourceError::ConnectionFailed(e.to_string()))?;

        let source = loop {
            if token.is_cancelled() {
                return Err(SourceError::Cancelled);
            }
            find.wait_for_sources(FIND_WAIT_MS);
            let sources = find
                .get_sources(0)
                .map_err(|e| SourceError::ConnectionFailed(e.to_string()))?;
            let hit = match name_filter {
                Some(filter) => sources.into_iter().find(|s| s.name.contains(filter)),
                None => sources.into_iter().next(),
            };
            match hit {
                Some(source) => break source,
                None => debug!("no matching source yet, still looking"),
            }
        };
        info!("connecting to NDI source '{}'", source.name);

        let recv = Recv::new(
            ndi,
            &Receiver {
                source_to_connect_to: source,
                color_format: RecvColorFormat::RGBX_RGBA,
                bandwidth: RecvBandwidth::Highest,
                allow_video_fields: true,
                ndi_recv_name: Some("lanview".into()),
            },
        )
        .map_err(|e| SourceError::ConnectionFailed(e.to_string()))?;

        Ok(Self { recv })
    }
}

impl FrameSource for NdiSource {
    fn poll(&mut self, timeout: Duration) -> Result<Event> {
        let timeout_ms = timeout.as_millis().min(u32::MAX as u128) as u32;
        #[allow(deprecated)]
        let captured = self
            .recv
            .capture(timeout_ms)
            .map_err(|e| SourceError::Capture(e.to_string()))?;

        Ok(match captured {
            FrameType::Video(video) => {
                let frame = Frame {
                    width: video.xres as u32,
                    height: video.yres as u32,
                    stride: video.line_stride_in_bytes as u32,
                    pixels: video.data().to_vec(),
                    // NDI timecodes are 100ns ticks
                    pts: Duration::from_nanos(video.timecode.max(0) as u64 * 100),
                };
                // `video` drops here, returning the SDK buffer
                Event::Video(frame)
            }
            FrameType::Audio(audio) => Event::Audio {
                samples: audio.no_samples as u32,
                channels: audio.no_channels as u32,
            },
            FrameType::Metadata(metadata) => Event::Metadata(metadata.data().to_string()),
            FrameType::None => Event::NoData,
            FrameType::StatusChange => Event::StatusChanged,
        })
    }
}
