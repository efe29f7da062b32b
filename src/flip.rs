use image::{imageops, Frame};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Horizontal,
    Vertical,
}

pub fn flip(frames: &mut [Frame], direction: Direction) {
    for frame in frames {
        match direction {
            Direction::Horizontal => imageops::flip_horizontal_in_place(frame.buffer_mut()),
            Direction::Vertical => imageops::flip_vertical_in_place(frame.buffer_mut()),
        }
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::*;

    fn marked() -> Vec<Frame> {
        let mut image = RgbaImage::new(3, 2);
        image.put_pixel(0, 0, Rgba([7, 7, 7, 255]));
        vec![Frame::new(image)]
    }

    #[test]
    fn horizontal_mirrors_columns() {
        let mut frames = marked();
        flip(&mut frames, Direction::Horizontal);
        assert_eq!(frames[0].buffer().get_pixel(2, 0).0, [7, 7, 7, 255]);
    }

    #[test]
    fn vertical_mirrors_rows() {
        let mut frames = marked();
        flip(&mut frames, Direction::Vertical);
        assert_eq!(frames[0].buffer().get_pixel(0, 1).0, [7, 7, 7, 255]);
    }
}
