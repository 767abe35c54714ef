use std::time::Instant;

/// RGBA pixel data for one composited frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameImage {
    pub width: u32,
    pub height: u32,
    /// `width * height * 4` bytes, RGBA.
    pub rgba: Vec<u8>,
}

/// A decoded, playable image attached to the control.
///
/// Implementations own the composited frames and the pacing state. All
/// methods are called from the UI thread; `Send` is required only so a
/// freshly decoded source can cross the decode worker's channel.
///
/// `start`/`stop` are idempotent, and `clear_resources` may be called more
/// than once; only the first call does work.
pub trait FrameSource: Send {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Begins animation. No-op if already running, or if the image is not
    /// animated and has already played through once.
    fn start(&mut self);

    /// Halts animation. No-op if already stopped.
    fn stop(&mut self);

    /// Rewinds to the first frame and re-arms the play-through-once logic.
    fn restart(&mut self);

    /// Presents the current frame, schedules the next interval and advances
    /// the frame index. Returns true when an animation loop just completed.
    ///
    /// Used directly by the controller to show a static first frame even
    /// while animation is paused.
    fn render_frame(&mut self) -> bool;

    /// Timer pulse. Advances a frame when the current interval has elapsed;
    /// returns true if the presented frame changed. A non-animated image
    /// stops itself after one completed loop.
    fn tick(&mut self, now: Instant) -> bool;

    /// Pixels of the most recently presented frame, if any frame has been
    /// rendered since the source was created.
    fn frame_image(&self) -> Option<&FrameImage>;

    /// Whether the animation timer is currently running.
    fn is_running(&self) -> bool;

    /// Releases all frames and pacing state. Idempotent.
    fn clear_resources(&mut self);
}
