// viewer/src/main.rs
//! lanview – minimal network video viewer.
//!
//! A background capture thread polls the frame source and publishes the
//! newest frame into a lock-protected relay; the SDL2 event loop snapshots
//! the relay whenever a redraw is due and blits it scaled to the window.
//! Shutdown order: stop the capture task (cancel + join), then let the
//! source and window tear down.

mod capture;
mod display;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::Parser;
use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use log::info;
use sdl2::event::{Event, WindowEvent};

use capture::CaptureTask;
use lanview_relay::FrameRelay;
use lanview_source::{CancelToken, PatternSource};

/// How long the event loop waits for a redraw notification per lap; also
/// paces event handling while idle.
const EVENT_WAIT: Duration = Duration::from_millis(16);

#[derive(Parser)]
#[command(name = "lanview", about = "Minimal network video viewer")]
struct Args {
    /// Use the built-in moving test pattern instead of a network source.
    #[arg(long)]
    pattern: bool,

    /// Only connect to sources whose name contains this string.
    #[arg(long)]
    source: Option<String>,

    /// Poll ceiling for the capture loop, in milliseconds.
    #[arg(long, default_value = "500")]
    timeout_ms: u64,

    /// Initial window width; also the test pattern width.
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Initial window height; also the test pattern height.
    #[arg(long, default_value = "720")]
    height: u32,

    /// Test pattern frame rate.
    #[arg(long, default_value = "30")]
    fps: u32,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let token = CancelToken::new();
    ctrlc::set_handler({
        let token = token.clone();
        move || token.cancel()
    })?;

    let relay = Arc::new(FrameRelay::new());
    let (redraw_tx, redraw_rx) = bounded::<()>(1);
    let poll_timeout = Duration::from_millis(args.timeout_ms.max(1));

    let task = if args.pattern {
        let (width, height, fps) = (args.width, args.height, args.fps);
        CaptureTask::start(
            move |_| Ok(PatternSource::new(width, height, fps)),
            Arc::clone(&relay),
            redraw_tx,
            token.clone(),
            poll_timeout,
        )
    } else {
        start_network(&args, Arc::clone(&relay), redraw_tx, token.clone(), poll_timeout)?
    };

    let (sdl_context, mut canvas) = display::init(args.width, args.height)?;
    let mut event_pump = sdl_context
        .event_pump()
        .map_err(|e| anyhow!("Failed to get SDL2 event pump: {}", e))?;

    let mut needs_redraw = true;
    let mut capture_alive = true;
    'running: loop {
        while let Some(event) = event_pump.poll_event() {
            match event {
                Event::Quit { .. } => break 'running,
                Event::Window {
                    win_event:
                        WindowEvent::Exposed | WindowEvent::Resized(..) | WindowEvent::SizeChanged(..),
                    ..
                } => needs_redraw = true,
                _ => {}
            }
        }
        if token.is_cancelled() {
            break; // ctrl-c
        }

        if capture_alive {
            match redraw_rx.recv_timeout(EVENT_WAIT) {
                Ok(()) => needs_redraw = true,
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    // capture exited; keep showing the last frame
                    capture_alive = false;
                }
            }
        } else {
            std::thread::sleep(EVENT_WAIT);
        }

        if needs_redraw {
            if let Some(snap) = relay.snapshot() {
                display::present(&mut canvas, &snap)?;
            }
            needs_redraw = false;
        }
    }

    info!("shutting down");
    task.stop();
    Ok(())
}

#[cfg(feature = "ndi")]
fn start_network(
    args: &Args,
    relay: Arc<FrameRelay>,
    redraw_tx: Sender<()>,
    token: CancelToken,
    poll_timeout: Duration,
) -> Result<CaptureTask> {
    let filter = args.source.clone();
    Ok(CaptureTask::start(
        move |token| lanview_source::ndi::NdiSource::connect(token, filter.as_deref()),
        relay,
        redraw_tx,
        token,
        poll_timeout,
    ))
}

#[cfg(not(feature = "ndi"))]
fn start_network(
    _args: &Args,
    _relay: Arc<FrameRelay>,
    _redraw_tx: Sender<()>,
    _token: CancelToken,
    _poll_timeout: Duration,
) -> Result<CaptureTask> {
    Err(anyhow!(
        "this build has no network backend (enable the `ndi` feature); run with --pattern"
    ))
}
