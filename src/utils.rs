use image::{Delay, Frame, RgbaImage};

/// Smallest delay most renderers honour; anything lower is played back at ~10cs.
pub const MIN_DELAY_CENTISECS: u32 = 2;

pub fn get_delay(delay_centisecs: u32) -> Delay {
    Delay::from_numer_denom_ms(delay_centisecs.max(MIN_DELAY_CENTISECS).saturating_mul(10), 1)
}

pub fn get_delay_centisecs(delay: Delay) -> u32 {
    let (numerator, denominator) = delay.numer_denom_ms();
    if denominator == 0 {
        return 0;
    }

    (numerator as f64 / denominator as f64 / 10.0).round() as u32
}

/// Delay of the first frame, assuming every frame shares it.
pub fn first_delay_centisecs(frames: &[Frame]) -> u32 {
    frames
        .first()
        .map(|frame| get_delay_centisecs(frame.delay()))
        .unwrap_or(MIN_DELAY_CENTISECS)
        .max(MIN_DELAY_CENTISECS)
}

pub fn set_delay(frame: &mut Frame, delay_centisecs: u32) {
    let left = frame.left();
    let top = frame.top();
    let buffer = std::mem::take(frame.buffer_mut());

    *frame = Frame::from_parts(buffer, left, top, get_delay(delay_centisecs));
}

pub fn set_buffer(frame: &mut Frame, buffer: RgbaImage) {
    let left = frame.left();
    let top = frame.top();
    let delay = frame.delay();

    *frame = Frame::from_parts(buffer, left, top, delay);
}

/// Turns a fractional frame interval into a usable frame count.
pub fn frame_interval(interval: f32) -> usize {
    // 0.9 / 0.03 lands a hair below 30 in f32
    ((interval + 1e-3).floor() as usize).max(1)
}

/// Runs `f` on every frame, in parallel when the `rayon` feature is enabled.
pub fn transform_frames<F>(frames: &mut [Frame], f: F)
where
    F: Fn(usize, &mut Frame) + Send + Sync,
{
    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        frames
            .par_iter_mut()
            .enumerate()
            .for_each(|(index, frame)| f(index, frame));
    }

    #[cfg(not(feature = "rayon"))]
    frames
        .iter_mut()
        .enumerate()
        .for_each(|(index, frame)| f(index, frame));
}

/// Renders `amount` images from their index, in parallel when `rayon` is enabled.
pub fn render_frames<F>(amount: usize, f: F) -> Vec<RgbaImage>
where
    F: Fn(usize) -> RgbaImage + Send + Sync,
{
    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        (0..amount).into_par_iter().map(f).collect()
    }

    #[cfg(not(feature = "rayon"))]
    (0..amount).map(f).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_round_trips_through_centisecs() {
        for centisecs in [2, 4, 6, 8, 10, 13, 100] {
            assert_eq!(get_delay_centisecs(get_delay(centisecs)), centisecs);
        }
    }

    #[test]
    fn delay_is_clamped_to_minimum() {
        assert_eq!(get_delay_centisecs(get_delay(0)), 2);
        assert_eq!(get_delay_centisecs(get_delay(1)), 2);
    }

    #[test]
    fn huge_delays_saturate() {
        assert_eq!(get_delay(500_000_000).numer_denom_ms(), (u32::MAX, 1));
    }

    #[test]
    fn frame_interval_survives_float_error() {
        assert_eq!(frame_interval(0.9 / 0.03), 30);
        assert_eq!(frame_interval(22.5), 22);
        assert_eq!(frame_interval(0.0), 1);
    }

    #[test]
    fn set_delay_keeps_pixels() {
        let mut frame = Frame::new(RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 4])));
        set_delay(&mut frame, 7);

        assert_eq!(get_delay_centisecs(frame.delay()), 7);
        assert_eq!(frame.buffer().get_pixel(1, 1).0, [1, 2, 3, 4]);
    }
}
