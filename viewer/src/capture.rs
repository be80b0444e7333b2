// viewer/src/capture.rs
//! Background capture task: connects to the frame source, polls it with a
//! bounded wait, and publishes each video frame into the relay.
//!
//! Connection and discovery happen on the capture thread so the window can
//! come up immediately; until a frame lands, snapshots stay empty.  The
//! thread owns the source outright – it is dropped (torn down) on the
//! thread once the loop exits, before `stop` returns to the caller.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::Sender;
use log::{debug, error, info};

use lanview_relay::FrameRelay;
use lanview_source::{CancelToken, Event, FrameSource};

pub struct CaptureTask {
    token: CancelToken,
    handle: JoinHandle<()>,
}

impl CaptureTask {
    /// Spawn the capture thread.  `connect` runs first, on the new thread;
    /// if it fails the thread logs and exits, and the viewer just never
    /// gets a frame (the shell observes a permanently empty snapshot).
    pub fn start<S, F>(
        connect: F,
        relay: Arc<FrameRelay>,
        redraw: Sender<()>,
        token: CancelToken,
        poll_timeout: Duration,
    ) -> Self
    where
        S: FrameSource + 'static,
        F: FnOnce(&CancelToken) -> lanview_source::Result<S> + Send + 'static,
    {
        let handle = thread::Builder::new()
            .name("capture".into())
            .spawn({
                let token = token.clone();
                move || {
                    let source = match connect(&token) {
                        Ok(source) => source,
                        Err(e) => {
                            error!("failed to open source: {e}");
                            return;
                        }
                    };
                    run(source, &relay, &redraw, &token, poll_timeout);
                }
            })
            .expect("failed to spawn capture thread");
        Self { token, handle }
    }

    /// Signal the loop to stop and wait for it to exit.  Returns once the
    /// in-flight poll (at most the poll ceiling) has completed and the
    /// source has been torn down.
    pub fn stop(self) {
        self.token.cancel();
        let _ = self.handle.join();
    }
}

fn run<S: FrameSource>(
    mut source: S,
    relay: &FrameRelay,
    redraw: &Sender<()>,
    token: &CancelToken,
    poll_timeout: Duration,
) {
    info!("capture loop started");
    loop {
        if token.is_cancelled() {
            break;
        }
        let event = match source.poll(poll_timeout) {
            Ok(event) => event,
            Err(e) => {
                // terminal: no reconnect, the viewer keeps its last frame
                error!("capture failed: {e}");
                break;
            }
        };
        // a stop requested mid-poll drops the event unpublished
        if token.is_cancelled() {
            break;
        }
        match event {
            Event::Video(frame) => {
                debug!("video frame {}x{}", frame.width, frame.height);
                relay.publish(&frame);
                // best effort – a full channel means a redraw is already due
                let _ = redraw.try_send(());
            }
            Event::NoData => debug!("no data this interval"),
            Event::Audio { samples, channels } => {
                debug!("audio frame: {samples} samples x {channels} channels")
            }
            Event::Metadata(xml) => debug!("metadata frame: {xml}"),
            Event::StatusChanged => info!("receiver status changed"),
        }
    }
    info!("capture loop exited");
}
