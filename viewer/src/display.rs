// viewer/src/display.rs
//! SDL2 display shell: window, canvas, and the paint path that blits the
//! newest snapshot scaled to the viewport with its aspect ratio kept.

use anyhow::{anyhow, Result};
use sdl2::pixels::{Color, PixelFormatEnum};
use sdl2::rect::Rect;
use sdl2::render::Canvas;
use sdl2::video::Window;

use lanview_relay::Snapshot;

pub fn init(width: u32, height: u32) -> Result<(sdl2::Sdl, Canvas<Window>)> {
    let sdl_context = sdl2::init().map_err(|e| anyhow!("Failed to initialize SDL2: {}", e))?;
    let video_subsystem = sdl_context
        .video()
        .map_err(|e| anyhow!("Failed to get SDL2 video subsystem: {}", e))?;
    let window = video_subsystem
        .window("lanview", width, height)
        .position_centered()
        .resizable()
        .build()
        .map_err(|e| anyhow!("Failed to build SDL2 window: {}", e))?;

    let canvas = window
        .into_canvas()
        .accelerated()
        .build()
        .map_err(|e| anyhow!("Failed to build SDL2 canvas: {}", e))?;

    Ok((sdl_context, canvas))
}

/// Upload the snapshot into a streaming texture and blit it letterboxed
/// into the current window size.
pub fn present(canvas: &mut Canvas<Window>, snap: &Snapshot) -> Result<()> {
    let (win_w, win_h) = canvas.window().size();
    let (x, y, out_w, out_h) = fit_rect(snap.width, snap.height, win_w, win_h);
    if out_w == 0 || out_h == 0 {
        return Ok(());
    }

    let creator = canvas.texture_creator();
    let mut texture = creator
        .create_texture_streaming(PixelFormatEnum::RGBA32, snap.width, snap.height)
        .map_err(|e| anyhow!("Failed to create streaming texture: {}", e))?;

    let row_bytes = snap.width as usize * 4;
    texture
        .with_lock(None, |buffer: &mut [u8], pitch: usize| {
            for (row, src) in snap.pixels.chunks_exact(row_bytes).enumerate() {
                buffer[row * pitch..row * pitch + row_bytes].copy_from_slice(src);
            }
        })
        .map_err(|e| anyhow!("Failed to upload frame: {}", e))?;

    canvas.set_draw_color(Color::BLACK);
    canvas.clear();
    canvas
        .copy(&texture, None, Rect::new(x, y, out_w, out_h))
        .map_err(|e| anyhow!("Failed to blit frame: {}", e))?;
    canvas.present();
    Ok(())
}

/// Largest rect with the frame's aspect ratio that fits the viewport,
/// centered.  Returns `(x, y, w, h)`; degenerate inputs collapse to zero.
fn fit_rect(src_w: u32, src_h: u32, win_w: u32, win_h: u32) -> (i32, i32, u32, u32) {
    if src_w == 0 || src_h == 0 || win_w == 0 || win_h == 0 {
        return (0, 0, 0, 0);
    }
    // compare aspect ratios without floats: src_w/src_h vs win_w/win_h
    let (out_w, out_h) = if u64::from(src_w) * u64::from(win_h) >= u64::from(src_h) * u64::from(win_w)
    {
        // frame is wider than the window: full width, bars above and below
        let h = (u64::from(src_h) * u64::from(win_w) / u64::from(src_w)) as u32;
        (win_w, h.max(1))
    } else {
        let w = (u64::from(src_w) * u64::from(win_h) / u64::from(src_h)) as u32;
        (w.max(1), win_h)
    };
    let x = ((win_w - out_w) / 2) as i32;
    let y = ((win_h - out_h) / 2) as i32;
    (x, y, out_w, out_h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_frame_in_tall_window_is_letterboxed() {
        // 16:9 frame into a square window: full width, centered bars
        let (x, y, w, h) = fit_rect(1920, 1080, 600, 600);
        assert_eq!((x, w), (0, 600));
        assert_eq!(h, 337); // 1080 * 600 / 1920
        assert_eq!(y, (600 - 337) as i32 / 2);
    }

    #[test]
    fn tall_frame_in_wide_window_is_pillarboxed() {
        let (x, y, w, h) = fit_rect(600, 1200, 1000, 500);
        assert_eq!((y, h), (0, 500));
        assert_eq!(w, 250); // 600 * 500 / 1200
        assert_eq!(x, (1000 - 250) as i32 / 2);
    }

    #[test]
    fn matching_aspect_fills_the_window() {
        assert_eq!(fit_rect(1280, 720, 640, 360), (0, 0, 640, 360));
    }

    #[test]
    fn degenerate_sizes_collapse_to_zero() {
        assert_eq!(fit_rect(0, 720, 640, 360), (0, 0, 0, 0));
        assert_eq!(fit_rect(1280, 720, 0, 360), (0, 0, 0, 0));
    }

    #[test]
    fn output_never_exceeds_the_window() {
        for (sw, sh) in [(1, 1000), (1000, 1), (33, 17), (1920, 1080)] {
            for (ww, wh) in [(1, 1), (17, 33), (800, 600), (600, 800)] {
                let (x, y, w, h) = fit_rect(sw, sh, ww, wh);
                assert!(w <= ww && h <= wh, "{sw}x{sh} into {ww}x{wh}");
                assert!(x >= 0 && y >= 0);
                assert!(x as u32 + w <= ww && y as u32 + h <= wh);
            }
        }
    }
}
