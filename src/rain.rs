use image::{imageops, Frame, Rgba, RgbaImage};
use rand::Rng;

use crate::{
    align::extend_to,
    command::Param,
    effect::Rendered,
    utils::first_delay_centisecs,
};

const STILL_FRAMES: usize = 12;
const STILL_DELAY_CENTISECS: u32 = 8;
const PLAIN_COLOR: Rgba<u8> = Rgba([0, 120, 255, 255]);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RainKind {
    Plain,
    Glitter,
}

impl RainKind {
    pub fn from_param(param: Option<&Param>) -> Self {
        match param.and_then(Param::text).as_deref() {
            Some("glitter") => Self::Glitter,
            _ => Self::Plain,
        }
    }
}

#[derive(Clone, Debug)]
struct Drop {
    x: u32,
    y: u32,

    speed: u32,
    len: u32,
    size: u32,

    color: Rgba<u8>,
}

impl Drop {
    fn new<R: Rng + ?Sized>(width: u32, height: u32, delay: u32, kind: RainKind, rng: &mut R) -> Self {
        let x = rng.gen_range(0..width);
        let y = rng.gen_range(0..height);
        let (speed, len, size) = Self::reset_drop_static(delay, rng);

        let color = match kind {
            RainKind::Glitter => Rgba([rng.gen(), rng.gen(), rng.gen(), 255]),
            RainKind::Plain => PLAIN_COLOR,
        };

        Self {
            x,
            y,
            speed,
            len,
            size,
            color,
        }
    }

    fn reset_drop_static<R: Rng + ?Sized>(delay: u32, rng: &mut R) -> (u32, u32, u32) {
        let random: f64 = rng.gen();
        let delay = delay as f64;

        let speed = (random * delay + delay).floor() as u32;
        let len = (random * 5.0 + 1.0).floor() as u32;
        let size = (random * 2.0 + 1.0).floor() as u32;

        (speed, len, size)
    }

    fn fall<R: Rng + ?Sized>(&mut self, height: u32, delay: u32, rng: &mut R) {
        self.y += self.speed;

        if self.y > height {
            self.y = 0;
            (self.speed, self.len, self.size) = Self::reset_drop_static(delay, rng);
        }
    }
}

/// Drops falling across a fixed canvas, advanced one frame at a time.
struct Rain {
    width: u32,
    height: u32,
    delay: u32,
    drops: Vec<Drop>,
}

impl Rain {
    fn new<R: Rng + ?Sized>(width: u32, height: u32, delay: u32, kind: RainKind, rng: &mut R) -> Self {
        let amount = (width + height).div_ceil(5);
        let drops = (0..amount)
            .map(|_| Drop::new(width, height, delay, kind, rng))
            .collect();

        Self {
            width,
            height,
            delay,
            drops,
        }
    }

    /// Draws the current drops over `buffer`, then lets them fall.
    fn write_drops<R: Rng + ?Sized>(&mut self, buffer: &mut RgbaImage, rng: &mut R) {
        let mut overlay = RgbaImage::new(self.width, self.height);

        for drop in &mut self.drops {
            for i in 0..drop.len {
                for j in 0..drop.size {
                    let x = drop.x + j;
                    let y = drop.y + i;

                    if x >= self.width || y >= self.height {
                        continue;
                    }
                    overlay.put_pixel(x, y, drop.color);
                }
            }

            drop.fall(self.height, self.delay, rng);
        }

        imageops::overlay(buffer, &overlay, 0, 0);
    }
}

pub fn rain<R: Rng + ?Sized>(frames: &mut Vec<Frame>, kind: RainKind, min_frames: usize, rng: &mut R) {
    let Some(frame) = frames.first() else { return };
    let (width, height) = frame.buffer().dimensions();
    let delay_centisecs = first_delay_centisecs(frames);
    let mut rain = Rain::new(width, height, delay_centisecs, kind, rng);

    if frames.len() < min_frames {
        *frames = extend_to(frames, min_frames);
    }

    for frame in frames.iter_mut() {
        rain.write_drops(frame.buffer_mut(), rng);
    }
}

pub fn rain_still<R: Rng + ?Sized>(image: &RgbaImage, kind: RainKind, rng: &mut R) -> Rendered {
    let mut rain = Rain::new(image.width(), image.height(), STILL_DELAY_CENTISECS, kind, rng);

    let images = (0..STILL_FRAMES)
        .map(|_| {
            let mut buffer = image.clone();
            rain.write_drops(&mut buffer, rng);
            buffer
        })
        .collect();

    Rendered {
        images,
        delay_centisecs: STILL_DELAY_CENTISECS,
    }
}
