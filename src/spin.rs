use image::{imageops, Frame, RgbaImage};
use rand::Rng;

use crate::{
    align::align,
    command::Speed,
    effect::Rendered,
    rotate::{rotate_frame, rotate_image},
    utils::{first_delay_centisecs, frame_interval, render_frames, set_buffer, transform_frames},
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

impl Direction {
    fn sign(self) -> f32 {
        match self {
            Self::Clockwise => 1.0,
            Self::CounterClockwise => -1.0,
        }
    }
}

/// Degrees turned per frame and the frame count of one full turn.
fn rotation_step(delay_centisecs: u32, speed: Speed) -> (f32, usize) {
    let centisecs_per_rotation = (200.0 * speed.value() as f32) / 8.0;
    let degrees = (360.0 * delay_centisecs as f32) / centisecs_per_rotation;
    let interval = frame_interval(360.0 / degrees);

    (degrees, interval)
}

pub fn spin<R: Rng + ?Sized>(
    frames: &mut Vec<Frame>,
    speed: Speed,
    direction: Direction,
    rng: &mut R,
) {
    if frames.is_empty() {
        return;
    }

    let delay_centisecs = first_delay_centisecs(frames);
    let (degrees, interval) = rotation_step(delay_centisecs, speed);
    let degrees = degrees * direction.sign();
    tracing::debug!(degrees, interval, "spin step");

    for frame in frames.iter_mut() {
        let squared = square(frame.buffer());
        set_buffer(frame, squared);
    }

    *frames = align(frames, interval, rng);

    transform_frames(frames, |index, frame| {
        let angle = (index as f32 * degrees) % 360.0;
        if angle != 0.0 {
            rotate_frame(frame, angle);
        }
    });
}

pub fn spin_still(image: &RgbaImage, speed: Speed, direction: Direction) -> Rendered {
    let delay_centisecs = speed.value();
    let (degrees, interval) = rotation_step(delay_centisecs, speed);
    let degrees = degrees * direction.sign();
    let squared = square(image);

    let images = render_frames(interval, |index| {
        let angle = (index as f32 * degrees) % 360.0;
        if angle == 0.0 {
            squared.clone()
        } else {
            rotate_image(&squared, angle)
        }
    });

    Rendered {
        images,
        delay_centisecs,
    }
}

/// Centers `image` on a transparent square so corners survive rotation.
fn square(image: &RgbaImage) -> RgbaImage {
    let (width, height) = image.dimensions();
    if width == height {
        return image.clone();
    }

    let side = width.max(height);
    let mut canvas = RgbaImage::new(side, side);
    imageops::replace(
        &mut canvas,
        image,
        ((side - width) / 2) as i64,
        ((side - height) / 2) as i64,
    );

    canvas
}

#[cfg(test)]
mod tests {
    use image::Rgba;
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::utils::get_delay;

    #[test]
    fn still_spin_turns_once() {
        let mut image = RgbaImage::from_pixel(20, 10, Rgba([255, 255, 255, 255]));
        image.put_pixel(0, 0, Rgba([255, 0, 0, 255]));

        let rendered = spin_still(&image, Speed(6), Direction::Clockwise);
        let (degrees, interval) = rotation_step(6, Speed(6));

        assert_eq!(rendered.delay_centisecs, 6);
        assert_eq!(rendered.images.len(), (360.0 / degrees).floor() as usize);
        assert_eq!(rendered.images.len(), interval);
        assert!(rendered
            .images
            .iter()
            .all(|frame| frame.dimensions() == (20, 20)));

        // first frame is only padded: the red corner sits 5 rows down
        assert_eq!(rendered.images[0].get_pixel(0, 5).0, [255, 0, 0, 255]);
        assert_eq!(rendered.images[0].get_pixel(0, 0).0[3], 0);
    }

    #[test]
    fn default_speed_turns_in_25_frames() {
        assert_eq!(rotation_step(8, Speed::DEFAULT), (14.4, 25));
        assert_eq!(rotation_step(4, Speed::DEFAULT).1, 50);
    }

    #[test]
    fn cycle_ends_within_one_step_of_a_full_turn() {
        for delay in 2..=20 {
            for speed in Speed::MIN.value()..=Speed::MAX.value() {
                let (degrees, interval) = rotation_step(delay, Speed(speed));
                let turned = degrees * interval as f32;

                assert!(
                    turned <= 360.0 + 1e-3 * degrees && turned >= 360.0 - degrees - 1e-2,
                    "delay {delay} speed {speed}: {interval} x {degrees} = {turned}"
                );
            }
        }
    }

    #[test]
    fn gif_spin_aligns_to_a_full_turn() {
        let mut frames: Vec<Frame> = (0..4)
            .map(|_| {
                Frame::from_parts(
                    RgbaImage::from_pixel(8, 8, Rgba([0, 0, 255, 255])),
                    0,
                    0,
                    get_delay(8),
                )
            })
            .collect();

        spin(
            &mut frames,
            Speed::DEFAULT,
            Direction::CounterClockwise,
            &mut StdRng::seed_from_u64(4),
        );

        assert_eq!(frames.len() % 25, 0);
        assert!(frames.iter().all(|frame| frame.buffer().dimensions() == (8, 8)));
    }
}
