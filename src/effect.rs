use image::{Frame, RgbaImage};
use rand::Rng;

use crate::{
    codec::{
        decode_animation, decode_still, encode_animation, encode_stream, prepare_still,
        MediaKind, StreamSettings,
    },
    command::{Scale, Speed, WiggleSize},
    config::Config,
    error::Result,
    infinite::{infinite, infinite_still},
    rain::{rain, rain_still, RainKind},
    rainbow::{rainbow, rainbow_still},
    shake::{shake, shake_still},
    slide::{self, slide, slide_still},
    spin::{self, spin, spin_still},
    wiggle::{wiggle, wiggle_still},
};

/// A pixel effect with its validated parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Effect {
    Spin {
        direction: spin::Direction,
        speed: Speed,
    },
    Shake {
        speed: Speed,
    },
    Rainbow {
        speed: Speed,
    },
    Wiggle {
        size: WiggleSize,
    },
    Infinite {
        speed: Speed,
    },
    Slide {
        direction: slide::Direction,
        speed: Speed,
    },
    Rain {
        kind: RainKind,
    },
}

impl Effect {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Spin {
                direction: spin::Direction::Clockwise,
                ..
            } => "spin",
            Self::Spin { .. } => "spinrev",
            Self::Shake { .. } => "shake",
            Self::Rainbow { .. } => "rainbow",
            Self::Wiggle { .. } => "wiggle",
            Self::Infinite { .. } => "infinite",
            Self::Slide {
                direction: slide::Direction::Forwards,
                ..
            } => "slide",
            Self::Slide { .. } => "sliderev",
            Self::Rain { .. } => "rain",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EffectOptions {
    pub effect: Effect,
    pub kind: MediaKind,
    /// Shrink applied to a still source before rendering.
    pub size: Scale,
    /// The source already went through a resize.
    pub is_resized: bool,
}

/// Frames rendered from a single still image, sharing one delay.
pub struct Rendered {
    pub images: Vec<RgbaImage>,
    pub delay_centisecs: u32,
}

/// Applies one effect to an encoded image, returning the encoded GIF.
pub fn apply_effect<R: Rng + ?Sized>(
    data: &[u8],
    options: &EffectOptions,
    config: &Config,
    rng: &mut R,
) -> Result<Vec<u8>> {
    match options.kind {
        MediaKind::Gif => {
            let mut frames = decode_animation(data)?.frames;
            animate(options.effect, &mut frames, config, rng);
            tracing::debug!(effect = options.effect.name(), frames = frames.len(), "animated gif");

            encode_animation(frames, config.encoder_speed)
        }
        MediaKind::Still => {
            let image = prepare_still(decode_still(data)?, options.size, options.is_resized);
            let rendered = render(options.effect, &image, rng);
            tracing::debug!(
                effect = options.effect.name(),
                frames = rendered.images.len(),
                delay = rendered.delay_centisecs,
                "rendered still"
            );

            encode_stream(
                rendered.images,
                StreamSettings {
                    quality: config.stream_quality,
                    delay_centisecs: rendered.delay_centisecs,
                },
            )
        }
    }
}

pub fn animate<R: Rng + ?Sized>(
    effect: Effect,
    frames: &mut Vec<Frame>,
    config: &Config,
    rng: &mut R,
) {
    match effect {
        Effect::Spin { direction, speed } => spin(frames, speed, direction, rng),
        Effect::Shake { speed } => shake(frames, speed, config.max_shake_frames, rng),
        Effect::Rainbow { speed } => rainbow(frames, speed, rng),
        Effect::Wiggle { size } => wiggle(frames, size, rng),
        Effect::Infinite { speed } => infinite(frames, speed, rng),
        Effect::Slide { direction, speed } => slide(frames, speed, direction, rng),
        Effect::Rain { kind } => rain(frames, kind, config.min_rain_frames, rng),
    }
}

pub fn render<R: Rng + ?Sized>(effect: Effect, image: &RgbaImage, rng: &mut R) -> Rendered {
    match effect {
        Effect::Spin { direction, speed } => spin_still(image, speed, direction),
        Effect::Shake { speed } => shake_still(image, speed),
        Effect::Rainbow { speed } => rainbow_still(image, speed, rng),
        Effect::Wiggle { size } => wiggle_still(image, size),
        Effect::Infinite { speed } => infinite_still(image, speed),
        Effect::Slide { direction, speed } => slide_still(image, speed, direction),
        Effect::Rain { kind } => rain_still(image, kind, rng),
    }
}
