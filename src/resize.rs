use image::{
    imageops::{self, FilterType},
    Frame,
};

use crate::{command::Scale, utils::set_buffer};

/// Scaled canvas size, never below one pixel.
pub fn scaled_dimensions(width: u32, height: u32, scale: Scale) -> (u32, u32) {
    let width = ((width as f32 * scale.x).round() as u32).max(1);
    let height = ((height as f32 * scale.y).round() as u32).max(1);

    (width, height)
}

pub fn resize(frames: &mut [Frame], scale: Scale) {
    let Some(frame) = frames.first() else { return };
    let (width, height) = frame.buffer().dimensions();
    let (target_width, target_height) = scaled_dimensions(width, height, scale);

    for frame in frames {
        let new_buffer = imageops::resize(
            frame.buffer(),
            target_width,
            target_height,
            FilterType::Nearest,
        );

        set_buffer(frame, new_buffer);
    }
}
