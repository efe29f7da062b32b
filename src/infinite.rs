use image::{
    imageops::{self, FilterType},
    Frame, RgbaImage,
};
use rand::Rng;

use crate::{
    align::align,
    codec::requantize,
    command::Speed,
    effect::Rendered,
    utils::{render_frames, set_buffer, transform_frames},
};

const SCALES_AMOUNT: usize = 5;
// Difference between each scale
const SCALE_DIFF: f32 = 0.9;
const STILL_SCALE_STEP: f32 = 0.06;
const STILL_COLORS: usize = 256;

/// Zoom ladder that loops after `interval` frames.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Zoom {
    pub interval: usize,
    /// Scale shift between frames, an exact fraction of the scale difference.
    pub step: f32,
}

impl Zoom {
    pub fn new(nominal_step: f32) -> Self {
        let interval = ((SCALE_DIFF / nominal_step).round() as usize).max(1);

        Self {
            interval,
            step: SCALE_DIFF / interval as f32,
        }
    }

    pub fn for_speed(speed: Speed) -> Self {
        Self::new((0.03 * 8.0) / speed.value() as f32)
    }

    /// Scales of every depth at `frame_index`, largest first.
    pub fn scales(&self, frame_index: usize) -> [f32; SCALES_AMOUNT] {
        let progress = self.step * ((frame_index % self.interval) + 1) as f32;

        std::array::from_fn(|depth| (SCALES_AMOUNT - depth - 1) as f32 * SCALE_DIFF + progress)
    }
}

pub fn infinite<R: Rng + ?Sized>(frames: &mut Vec<Frame>, speed: Speed, rng: &mut R) {
    if frames.is_empty() {
        return;
    }

    let zoom = Zoom::for_speed(speed);
    tracing::debug!(interval = zoom.interval, step = zoom.step, "zoom ladder");
    *frames = align(frames, zoom.interval, rng);

    transform_frames(frames, |index, frame| {
        let stacked = infinite_shift_frame(frame.buffer(), &zoom.scales(index));
        set_buffer(frame, stacked);
    });
}

pub fn infinite_still(image: &RgbaImage, speed: Speed) -> Rendered {
    let zoom = Zoom::new(STILL_SCALE_STEP);

    Rendered {
        images: render_frames(zoom.interval, |index| {
            let mut stacked = infinite_shift_frame(image, &zoom.scales(index));
            requantize(&mut stacked, STILL_COLORS);
            stacked
        }),
        delay_centisecs: speed.value(),
    }
}

fn infinite_shift_frame(image: &RgbaImage, scales: &[f32]) -> RgbaImage {
    let buffer_width = image.width() as f32;
    let buffer_height = image.height() as f32;

    let mut stacked_buffer = RgbaImage::new(image.width(), image.height());

    for &scale in scales {
        let scaled_width = (buffer_width * scale).round();
        let scaled_height = (buffer_height * scale).round();
        if scaled_width < 1.0 || scaled_height < 1.0 {
            continue;
        }

        let scaled_buffer = imageops::resize(
            image,
            scaled_width as u32,
            scaled_height as u32,
            FilterType::Nearest,
        );

        let dx = ((scaled_width - buffer_width) / 2.0).round() as i64;
        let dy = ((scaled_height - buffer_height) / 2.0).round() as i64;

        imageops::overlay(&mut stacked_buffer, &scaled_buffer, -dx, -dy);
    }

    stacked_buffer
}
