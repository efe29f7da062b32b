use image::{imageops, Frame, RgbaImage};
use rand::Rng;

use crate::{
    align::align,
    command::WiggleSize,
    effect::Rendered,
    utils::{render_frames, set_buffer, transform_frames},
};

const STILL_DELAY_CENTISECS: u32 = 8;
const STRIPES: u32 = 32;

/// Horizontal offsets of a triangle wave bouncing between the canvas margins.
#[derive(Clone, Debug, PartialEq)]
pub struct Wave {
    /// Extra canvas width; the image rests at `margin / 2`.
    pub margin: u32,
    pub shift_size: i64,
    pub stripe_height: u32,
    /// One full period of offsets, starting at rest and moving left.
    pub shifts: Vec<i64>,
}

impl Wave {
    pub fn new(width: u32, height: u32, size: WiggleSize) -> Self {
        let margin = 2 * ((width as f32 * size.0 as f32 / 150.0).floor() as u32);
        let shift_size = (margin as i64 / 6).max(1);
        let stripe_height = (height / STRIPES).max(1);

        Self {
            margin,
            shift_size,
            stripe_height,
            shifts: Self::period(margin as i64, shift_size),
        }
    }

    fn period(margin: i64, shift_size: i64) -> Vec<i64> {
        let start = (margin / 2, true);
        let mut state = start;
        let mut shifts = Vec::new();

        // Bounded walk; stop at the first return to rest
        let limit = 4 * (margin / shift_size + 3) as usize;
        for _ in 0..limit {
            shifts.push(state.0);
            state = Self::step(state, margin, shift_size);
            if state == start {
                break;
            }
        }

        shifts
    }

    /// Moves one step, turning around once a step would leave `[-shift_size, margin + shift_size]`.
    fn step((shift, moving_left): (i64, bool), margin: i64, shift_size: i64) -> (i64, bool) {
        if moving_left {
            if shift - shift_size < -shift_size {
                (shift + shift_size, false)
            } else {
                (shift - shift_size, true)
            }
        } else if shift + shift_size > margin + shift_size {
            (shift - shift_size, true)
        } else {
            (shift + shift_size, false)
        }
    }

    pub fn interval(&self) -> usize {
        self.shifts.len()
    }

    fn shift(&self, position: usize) -> i64 {
        self.shifts[position % self.shifts.len()]
    }
}

pub fn wiggle<R: Rng + ?Sized>(frames: &mut Vec<Frame>, size: WiggleSize, rng: &mut R) {
    let Some(frame) = frames.first() else { return };
    let (width, height) = frame.buffer().dimensions();
    let wave = Wave::new(width, height, size);
    tracing::debug!(
        margin = wave.margin,
        shift_size = wave.shift_size,
        interval = wave.interval(),
        "wiggle wave"
    );

    *frames = align(frames, wave.interval(), rng);

    transform_frames(frames, |index, frame| {
        let wiggled = wiggle_frame_data(frame.buffer(), &wave, index);
        set_buffer(frame, wiggled);
    });
}

pub fn wiggle_still(image: &RgbaImage, size: WiggleSize) -> Rendered {
    let wave = Wave::new(image.width(), image.height(), size);

    Rendered {
        images: render_frames(wave.interval(), |index| {
            wiggle_frame_data(image, &wave, index)
        }),
        delay_centisecs: STILL_DELAY_CENTISECS,
    }
}

/// Draws each stripe at the wave position of its frame, one step further per stripe.
fn wiggle_frame_data(image: &RgbaImage, wave: &Wave, frame_index: usize) -> RgbaImage {
    let (width, height) = image.dimensions();
    let mut wiggled_buffer = RgbaImage::new(width + wave.margin, height);

    (0..height)
        .step_by(wave.stripe_height as usize)
        .enumerate()
        .for_each(|(index, stripe)| {
            let stripe_height = wave.stripe_height.min(height - stripe);
            let cropped_buffer =
                imageops::crop_imm(image, 0, stripe, width, stripe_height).to_image();

            imageops::replace(
                &mut wiggled_buffer,
                &cropped_buffer,
                wave.shift(frame_index + index),
                stripe as i64,
            );
        });

    wiggled_buffer
}
