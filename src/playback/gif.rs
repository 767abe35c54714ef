use std::io::Cursor;
use std::time::{Duration, Instant};

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, Delay, ImageDecoder};

use crate::core::error::LoadError;
use crate::playback::source::{FrameImage, FrameSource};

/// Delays shorter than this are treated as unspecified and bumped to the
/// de-facto default of 100ms, matching what browsers do with 0/1/2cs GIFs.
const MIN_FRAME_DELAY: Duration = Duration::from_millis(30);
const DEFAULT_FRAME_DELAY: Duration = Duration::from_millis(100);

/// Playable GIF built from fully composited RGBA frames.
///
/// Frame compositing (disposal methods, local color tables, LZW) is handled
/// by the `image` crate while collecting frames; this type only owns the
/// frame store and the timer pacing.
pub struct GifFrameSource {
    width: u32,
    height: u32,
    frames: Vec<FrameImage>,
    delays: Vec<Duration>,
    current_frame: usize,
    presented: Option<usize>,
    is_animated: bool,
    completed_loop: bool,
    running: bool,
    next_frame_at: Option<Instant>,
}

impl GifFrameSource {
    /// Decodes a complete GIF byte buffer into a playable source.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LoadError> {
        let decoder =
            GifDecoder::new(Cursor::new(bytes)).map_err(|e| LoadError::Decode(e.to_string()))?;
        let (width, height) = decoder.dimensions();

        let raw_frames = decoder
            .into_frames()
            .collect_frames()
            .map_err(|e| LoadError::Decode(e.to_string()))?;
        if raw_frames.is_empty() {
            return Err(LoadError::Decode("image contains no frames".to_string()));
        }

        let mut frames = Vec::with_capacity(raw_frames.len());
        let mut delays = Vec::with_capacity(raw_frames.len());
        for frame in raw_frames {
            delays.push(frame_interval(frame.delay()));
            let buffer = frame.into_buffer();
            frames.push(FrameImage {
                width: buffer.width(),
                height: buffer.height(),
                rgba: buffer.into_raw(),
            });
        }

        log::debug!(
            "Decoded gif: {}x{}, {} frame(s)",
            width,
            height,
            frames.len()
        );

        let is_animated = frames.len() > 1;
        Ok(Self {
            width,
            height,
            frames,
            delays,
            current_frame: 0,
            presented: None,
            is_animated,
            completed_loop: false,
            running: false,
            next_frame_at: None,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn is_animated(&self) -> bool {
        self.is_animated
    }
}

impl FrameSource for GifFrameSource {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn start(&mut self) {
        if self.running || self.frames.is_empty() {
            return;
        }

        // A non-looping image still plays through at least once.
        if self.is_animated || !self.completed_loop {
            if self.next_frame_at.is_none() {
                self.next_frame_at = Some(Instant::now() + self.delays[self.current_frame]);
            }
            self.running = true;
        }
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn restart(&mut self) {
        self.current_frame = 0;
        self.completed_loop = false;
    }

    fn render_frame(&mut self) -> bool {
        if self.frames.is_empty() {
            return false;
        }

        self.presented = Some(self.current_frame);
        self.next_frame_at = Some(Instant::now() + self.delays[self.current_frame]);
        self.current_frame = (self.current_frame + 1) % self.frames.len();
        self.current_frame == 0
    }

    fn tick(&mut self, now: Instant) -> bool {
        if !self.running || self.frames.is_empty() {
            return false;
        }
        let Some(deadline) = self.next_frame_at else {
            return false;
        };
        if now < deadline {
            return false;
        }

        let completed_loop = self.render_frame();
        if completed_loop {
            self.completed_loop = true;
            if !self.is_animated {
                self.running = false;
            }
        }
        true
    }

    fn frame_image(&self) -> Option<&FrameImage> {
        self.presented.and_then(|i| self.frames.get(i))
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn clear_resources(&mut self) {
        self.running = false;
        self.frames.clear();
        self.delays.clear();
        self.width = 0;
        self.height = 0;
        self.current_frame = 0;
        self.presented = None;
        self.is_animated = false;
        self.completed_loop = false;
        self.next_frame_at = None;
    }
}

pub(crate) fn frame_interval(delay: Delay) -> Duration {
    let (numer, denom) = delay.numer_denom_ms();
    let millis = if denom == 0 {
        0
    } else {
        (numer / denom) as u64
    };

    let interval = Duration::from_millis(millis);
    if interval < MIN_FRAME_DELAY {
        DEFAULT_FRAME_DELAY
    } else {
        interval
    }
}
