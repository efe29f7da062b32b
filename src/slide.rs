use image::{imageops, Frame, RgbaImage};
use rand::Rng;

use crate::{
    align::align,
    command::Speed,
    effect::Rendered,
    utils::{render_frames, set_buffer, transform_frames},
};

const STILL_DELAY_CENTISECS: u32 = 4;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Forwards,
    Backwards,
}

pub fn slide<R: Rng + ?Sized>(
    frames: &mut Vec<Frame>,
    speed: Speed,
    direction: Direction,
    rng: &mut R,
) {
    if frames.is_empty() {
        return;
    }

    let interval = 2 * speed.value() as usize;
    *frames = align(frames, interval, rng);

    transform_frames(frames, |index, frame| {
        let shift = shift_for(index, interval, frame.buffer().width());
        let shifted = shift_frame_data(frame.buffer(), shift, direction);
        set_buffer(frame, shifted);
    });
}

pub fn slide_still(image: &RgbaImage, speed: Speed, direction: Direction) -> Rendered {
    let interval = 2 * speed.value() as usize;
    let width = image.width();

    Rendered {
        images: render_frames(interval, |index| {
            shift_frame_data(image, shift_for(index, interval, width), direction)
        }),
        delay_centisecs: STILL_DELAY_CENTISECS,
    }
}

fn shift_for(index: usize, interval: usize, width: u32) -> u32 {
    let cycle = index % interval;
    let shift = (cycle as f32 * width as f32 / interval as f32).round() as u32;

    shift % width.max(1)
}

/// Rotates the image horizontally by `shift` pixels, wrapping around the edge.
fn shift_frame_data(image: &RgbaImage, shift: u32, direction: Direction) -> RgbaImage {
    let (width, height) = image.dimensions();
    let mut shifted_buffer = RgbaImage::new(width, height);
    let shift = shift as i64;
    let width = width as i64;

    let (x, wrapped_x) = match direction {
        Direction::Forwards => (-shift, width - shift),
        Direction::Backwards => (shift, shift - width),
    };

    imageops::replace(&mut shifted_buffer, image, x, 0);
    imageops::replace(&mut shifted_buffer, image, wrapped_x, 0);

    shifted_buffer
}
