#[cfg(test)]
mod tests {

    use std::time::{Duration, Instant};

    use image::codecs::gif::{GifEncoder, Repeat};
    use image::{Delay, Frame, Rgba, RgbaImage};

    use crate::core::error::LoadError;
    use crate::playback::gif::{frame_interval, GifFrameSource};
    use crate::playback::source::FrameSource;

    /// Encodes solid-color frames into a real GIF byte buffer.
    fn encode_gif(width: u32, height: u32, colors: &[[u8; 4]], delay_ms: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        {
            let mut encoder = GifEncoder::new(&mut bytes);
            encoder.set_repeat(Repeat::Infinite).unwrap();
            for color in colors {
                let buffer = RgbaImage::from_pixel(width, height, Rgba(*color));
                let frame = Frame::from_parts(
                    buffer,
                    0,
                    0,
                    Delay::from_numer_denom_ms(delay_ms, 1),
                );
                encoder.encode_frame(frame).unwrap();
            }
        }
        bytes
    }

    fn animated_source() -> GifFrameSource {
        let bytes = encode_gif(4, 3, &[[255, 0, 0, 255], [0, 255, 0, 255]], 100);
        GifFrameSource::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn test_decodes_dimensions_and_frames() {
        let source = animated_source();
        assert_eq!(source.width(), 4);
        assert_eq!(source.height(), 3);
        assert_eq!(source.frame_count(), 2);
        assert!(source.is_animated());

        // Nothing presented until the first render.
        assert!(source.frame_image().is_none());
        assert!(!source.is_running());
    }

    #[test]
    fn test_rejects_invalid_bytes() {
        let result = GifFrameSource::from_bytes(b"definitely not a gif");
        assert!(matches!(result, Err(LoadError::Decode(_))));
    }

    #[test]
    fn test_render_frame_presents_and_reports_loop_completion() {
        let mut source = animated_source();

        assert!(!source.render_frame());
        let frame = source.frame_image().expect("frame after render");
        assert_eq!(frame.width, 4);
        assert_eq!(frame.height, 3);
        assert_eq!(frame.rgba.len(), 4 * 3 * 4);

        // Second render wraps back to frame 0: one loop completed.
        assert!(source.render_frame());
    }

    #[test]
    fn test_start_and_stop_are_idempotent() {
        let mut source = animated_source();
        assert!(!source.is_running());

        source.start();
        source.start();
        assert!(source.is_running());

        source.stop();
        source.stop();
        assert!(!source.is_running());
    }

    #[test]
    fn test_tick_advances_only_after_the_frame_delay() {
        let mut source = animated_source();
        source.render_frame();
        source.start();

        let now = Instant::now();
        assert!(!source.tick(now));
        assert!(source.tick(now + Duration::from_millis(250)));
    }

    #[test]
    fn test_single_frame_image_plays_through_once_and_stops() {
        let bytes = encode_gif(2, 2, &[[0, 0, 255, 255]], 100);
        let mut source = GifFrameSource::from_bytes(&bytes).unwrap();
        assert!(!source.is_animated());

        // Plays through at least once even though it is not animated.
        source.start();
        assert!(source.is_running());

        assert!(source.tick(Instant::now() + Duration::from_millis(250)));
        assert!(!source.is_running());
        assert!(source.frame_image().is_some());

        // Completed its single loop: start becomes a no-op.
        source.start();
        assert!(!source.is_running());

        // Until rewound.
        source.restart();
        source.start();
        assert!(source.is_running());
    }

    #[test]
    fn test_clear_resources_is_idempotent_and_empties_the_source() {
        let mut source = animated_source();
        source.render_frame();
        source.start();

        source.clear_resources();
        assert_eq!(source.frame_count(), 0);
        assert_eq!(source.width(), 0);
        assert_eq!(source.height(), 0);
        assert!(source.frame_image().is_none());
        assert!(!source.is_running());

        source.clear_resources();
        assert!(!source.tick(Instant::now()));
        assert!(!source.render_frame());
    }

    #[test]
    fn test_short_delays_are_clamped_to_default() {
        assert_eq!(
            frame_interval(Delay::from_numer_denom_ms(0, 1)),
            Duration::from_millis(100)
        );
        assert_eq!(
            frame_interval(Delay::from_numer_denom_ms(20, 1)),
            Duration::from_millis(100)
        );
        assert_eq!(
            frame_interval(Delay::from_numer_denom_ms(50, 1)),
            Duration::from_millis(50)
        );
    }
}
