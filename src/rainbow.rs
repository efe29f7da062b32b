use colors_transform::Hsl;
use image::{Frame, RgbaImage};
use rand::Rng;

use crate::{
    align::align,
    color::{shift_hue, to_hsl, to_rgb},
    command::Speed,
    effect::Rendered,
    utils::{render_frames, transform_frames},
};

const STILL_FRAMES: usize = 32;

// Near-black and near-white carry no usable hue
const DARK_THRESHOLD: u8 = 30;
const LIGHT_THRESHOLD: u8 = 220;

/// Hues, in degrees, of the replacement colors for pixels without a usable
/// hue. Drawn once per request.
#[derive(Copy, Clone, Debug)]
struct Palette {
    dark_hue: f32,
    light_hue: f32,
}

impl Palette {
    fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            dark_hue: rng.gen_range(0.0..360.0),
            light_hue: rng.gen_range(0.0..360.0),
        }
    }

    fn dark(self) -> Hsl {
        Hsl::from(self.dark_hue, 50.0, 20.0)
    }

    fn light(self) -> Hsl {
        Hsl::from(self.light_hue, 50.0, 80.0)
    }
}

pub fn rainbow<R: Rng + ?Sized>(frames: &mut Vec<Frame>, speed: Speed, rng: &mut R) {
    if frames.is_empty() {
        return;
    }

    let interval = 4 * speed.value() as usize;
    let palette = Palette::new(rng);
    *frames = align(frames, interval, rng);

    transform_frames(frames, |index, frame| {
        let shift = (index % interval) as f32 / interval as f32;
        shift_colors(frame.buffer_mut(), shift, palette);
    });
}

pub fn rainbow_still<R: Rng + ?Sized>(image: &RgbaImage, speed: Speed, rng: &mut R) -> Rendered {
    let palette = Palette::new(rng);

    Rendered {
        images: render_frames(STILL_FRAMES, |index| {
            let mut buffer = image.clone();
            shift_colors(&mut buffer, index as f32 / STILL_FRAMES as f32, palette);
            buffer
        }),
        delay_centisecs: speed.value(),
    }
}

fn shift_colors(buffer: &mut RgbaImage, shift: f32, palette: Palette) {
    for pixel in buffer.pixels_mut() {
        let [red, green, blue, alpha] = pixel.0;
        if alpha == 0 {
            continue;
        }

        let hsl = if red <= DARK_THRESHOLD && green <= DARK_THRESHOLD && blue <= DARK_THRESHOLD {
            palette.dark()
        } else if red >= LIGHT_THRESHOLD && green >= LIGHT_THRESHOLD && blue >= LIGHT_THRESHOLD {
            palette.light()
        } else {
            to_hsl([red, green, blue])
        };

        let [red, green, blue] = to_rgb(&shift_hue(&hsl, shift));
        pixel.0 = [red, green, blue, alpha];
    }
}

#[cfg(test)]
mod tests {
    use colors_transform::Color;
    use image::Rgba;
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::utils::get_delay;

    #[test]
    fn still_walks_the_hue_circle() {
        let image = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255]));
        let rendered = rainbow_still(&image, Speed(6), &mut StdRng::seed_from_u64(3));

        assert_eq!(rendered.images.len(), 32);
        assert_eq!(rendered.delay_centisecs, 6);
        assert_eq!(rendered.images[0].get_pixel(0, 0).0, [255, 0, 0, 255]);

        let hues: Vec<f32> = rendered
            .images
            .iter()
            .map(|image| {
                let [r, g, b, _] = image.get_pixel(0, 0).0;
                to_hsl([r, g, b]).get_hue()
            })
            .collect();
        for pair in hues.windows(2) {
            assert!(pair[1] > pair[0], "{hues:?}");
        }
    }

    #[test]
    fn transparent_pixels_are_untouched() {
        let mut image = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 0]));
        image.put_pixel(1, 0, Rgba([10, 10, 10, 255]));

        shift_colors(
            &mut image,
            0.25,
            Palette {
                dark_hue: 0.0,
                light_hue: 180.0,
            },
        );

        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0, 0]);
        // dark pixels take the dark palette color, shifted a quarter turn
        assert_eq!(
            image.get_pixel(1, 0).0,
            {
                let [r, g, b] = to_rgb(&Hsl::from(90.0, 50.0, 20.0));
                [r, g, b, 255]
            }
        );
    }

    #[test]
    fn gif_length_is_multiple_of_interval() {
        let mut frames: Vec<Frame> = (0..4)
            .map(|_| {
                Frame::from_parts(
                    RgbaImage::from_pixel(3, 3, Rgba([0, 90, 200, 255])),
                    0,
                    0,
                    get_delay(8),
                )
            })
            .collect();

        rainbow(&mut frames, Speed::DEFAULT, &mut StdRng::seed_from_u64(12));

        assert_eq!(frames.len() % 32, 0);
        assert!(!frames.is_empty());
    }
}
