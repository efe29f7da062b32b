use image::{imageops, Frame, Rgba, RgbaImage};
use imageproc::geometric_transformations::{self, Interpolation};

use crate::{command::Rotation, utils::set_buffer};

/// Turns every frame by a right angle, clockwise.
pub fn rotate(frames: &mut [Frame], rotation: Rotation) {
    for frame in frames {
        let rotated = match rotation {
            Rotation::Quarter => imageops::rotate90(frame.buffer()),
            Rotation::Half => imageops::rotate180(frame.buffer()),
            Rotation::ThreeQuarters => imageops::rotate270(frame.buffer()),
        };

        set_buffer(frame, rotated);
    }
}

pub fn rotate_frame(frame: &mut Frame, degrees: f32) {
    let new_buffer = rotate_image(frame.buffer(), degrees);

    *frame.buffer_mut() = new_buffer;
}

/// Rotates about the center on a same-sized canvas; uncovered pixels are transparent.
pub fn rotate_image(image: &RgbaImage, degrees: f32) -> RgbaImage {
    geometric_transformations::rotate_about_center(
        image,
        degrees.to_radians(),
        Interpolation::Nearest,
        Rgba([0, 0, 0, 0]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_turn_swaps_dimensions() {
        let mut image = RgbaImage::new(4, 2);
        image.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        let mut frames = vec![Frame::new(image)];

        rotate(&mut frames, Rotation::Quarter);

        let buffer = frames[0].buffer();
        assert_eq!(buffer.dimensions(), (2, 4));
        // top-left ends up top-right after a clockwise quarter turn
        assert_eq!(buffer.get_pixel(1, 0).0, [255, 0, 0, 255]);
    }

    #[test]
    fn half_turn_keeps_dimensions() {
        let mut image = RgbaImage::new(3, 3);
        image.put_pixel(0, 0, Rgba([1, 2, 3, 255]));
        let mut frames = vec![Frame::new(image)];

        rotate(&mut frames, Rotation::Half);

        assert_eq!(frames[0].buffer().get_pixel(2, 2).0, [1, 2, 3, 255]);
    }

    #[test]
    fn free_rotation_keeps_canvas() {
        let image = RgbaImage::from_pixel(6, 6, Rgba([9, 9, 9, 255]));
        let rotated = rotate_image(&image, 45.0);

        assert_eq!(rotated.dimensions(), (6, 6));
        assert_eq!(rotated.get_pixel(0, 0).0[3], 0);
        assert_eq!(rotated.get_pixel(3, 3).0, [9, 9, 9, 255]);
    }
}
