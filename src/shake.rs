use image::{imageops, Frame, RgbaImage};
use rand::Rng;

use crate::{
    command::Speed,
    effect::Rendered,
    timing::{ShakeOffset, ShakePlan},
    utils::{first_delay_centisecs, get_delay, transform_frames},
};

pub fn shake<R: Rng + ?Sized>(
    frames: &mut Vec<Frame>,
    speed: Speed,
    max_frames: usize,
    rng: &mut R,
) {
    if frames.is_empty() {
        return;
    }

    let delay_centisecs = first_delay_centisecs(frames);
    let plan = ShakePlan::new(frames.len(), delay_centisecs, speed.value(), max_frames);
    tracing::debug!(?plan, source_frames = frames.len(), "shake plan");

    *frames = plan.apply(std::mem::take(frames), rng);
    let offsets = plan.offsets(frames.len());
    let delay = get_delay(plan.delay);

    transform_frames(frames, |index, frame| {
        let shaken = shake_frame_data(frame.buffer(), offsets[index]);
        *frame = Frame::from_parts(shaken, frame.left(), frame.top(), delay);
    });
}

pub fn shake_still(image: &RgbaImage, speed: Speed) -> Rendered {
    Rendered {
        images: ShakeOffset::cycle()
            .into_iter()
            .map(|offset| shake_frame_data(image, offset))
            .collect(),
        delay_centisecs: speed.value(),
    }
}

/// Moves a one-pixel-smaller crop of the image by the offset's bits.
fn shake_frame_data(image: &RgbaImage, offset: ShakeOffset) -> RgbaImage {
    let (width, height) = image.dimensions();
    if width < 2 || height < 2 {
        return image.clone();
    }

    let (dx, dy, sx, sy) = offset.decode();
    let cropped = imageops::crop_imm(image, sx, sy, width - 1, height - 1).to_image();

    let mut shaken_buffer = RgbaImage::new(width, height);
    imageops::replace(&mut shaken_buffer, &cropped, dx as i64, dy as i64);

    shaken_buffer
}

#[cfg(test)]
mod tests {
    use image::Rgba;
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::utils::get_delay_centisecs;

    fn gradient() -> RgbaImage {
        RgbaImage::from_fn(4, 4, |x, y| Rgba([(x * 60) as u8, (y * 60) as u8, 0, 255]))
    }

    #[test]
    fn still_cycles_four_offsets() {
        let image = gradient();
        let rendered = shake_still(&image, Speed(4));

        assert_eq!(rendered.images.len(), 4);
        assert_eq!(rendered.delay_centisecs, 4);

        // 0011: crop from (1, 1) drawn at (0, 0)
        assert_eq!(rendered.images[0].get_pixel(0, 0), image.get_pixel(1, 1));
        assert_eq!(rendered.images[0].get_pixel(3, 3).0[3], 0);

        // 1100: crop from (0, 0) drawn at (1, 1)
        assert_eq!(rendered.images[2].get_pixel(1, 1), image.get_pixel(0, 0));
        assert_eq!(rendered.images[2].get_pixel(0, 0).0[3], 0);
    }

    #[test]
    fn gif_duration_is_kept() {
        let mut frames: Vec<Frame> = (0..4)
            .map(|_| Frame::from_parts(gradient(), 0, 0, get_delay(10)))
            .collect();

        shake(&mut frames, Speed(4), 800, &mut StdRng::seed_from_u64(8));

        let total: u32 = frames
            .iter()
            .map(|frame| get_delay_centisecs(frame.delay()))
            .sum();
        assert_eq!(total, 40);
        assert!(frames
            .iter()
            .all(|frame| frame.buffer().dimensions() == (4, 4)));
    }
}
