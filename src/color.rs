//! Pixel <-> HSL helpers on top of `colors_transform`.
//!
//! Hues are in degrees, saturation and lightness in percent, as the crate
//! stores them.

use colors_transform::{Color, Hsl, Rgb};

pub fn to_hsl([red, green, blue]: [u8; 3]) -> Hsl {
    Rgb::from(red as f32, green as f32, blue as f32).to_hsl()
}

pub fn to_rgb(hsl: &Hsl) -> [u8; 3] {
    let (red, green, blue) = hsl.to_rgb().as_tuple();
    [channel(red), channel(green), channel(blue)]
}

/// Rotates the hue by `turns` of the color wheel, keeping it in `[0, 360)`.
pub fn shift_hue(hsl: &Hsl, turns: f32) -> Hsl {
    let hue = hsl.get_hue();
    let shifted = (hue + turns * 360.0).rem_euclid(360.0);
    hsl.adjust_hue(shifted - hue)
}

fn channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
