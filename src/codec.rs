//! Decoding sources into frames and encoding frames back into GIFs.

use std::io::Cursor;

use color_quant::NeuQuant;
use gif::{Encoder, Repeat as GifRepeat};
use image::{codecs::gif::GifDecoder, AnimationDecoder, Frame, ImageFormat, Rgba, RgbaImage};

use crate::{
    command::Scale,
    error::{EmoteError, Result},
    utils::{get_delay, get_delay_centisecs, set_delay, MIN_DELAY_CENTISECS},
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MediaKind {
    Gif,
    Still,
}

/// Frames sharing one canvas. Always encoded to loop forever.
#[derive(Clone)]
pub struct Animation {
    pub width: u32,
    pub height: u32,
    pub frames: Vec<Frame>,
}

impl Animation {
    pub fn new(frames: Vec<Frame>) -> Result<Self> {
        let first = frames.first().ok_or(EmoteError::EmptyImage)?;
        let (width, height) = first.buffer().dimensions();
        if width == 0 || height == 0 {
            return Err(EmoteError::EmptyImage);
        }

        Ok(Self {
            width,
            height,
            frames,
        })
    }
}

pub fn detect_kind(data: &[u8]) -> Result<MediaKind> {
    match image::guess_format(data).map_err(EmoteError::Decode)? {
        ImageFormat::Gif => Ok(MediaKind::Gif),
        _ => Ok(MediaKind::Still),
    }
}

pub fn decode_animation(data: &[u8]) -> Result<Animation> {
    let decoder = GifDecoder::new(Cursor::new(data)).map_err(EmoteError::Decode)?;
    let mut frames = decoder
        .into_frames()
        .collect_frames()
        .map_err(EmoteError::Decode)?;

    for frame in &mut frames {
        if get_delay_centisecs(frame.delay()) < MIN_DELAY_CENTISECS {
            set_delay(frame, MIN_DELAY_CENTISECS);
        }
    }

    tracing::debug!(frames = frames.len(), "decoded gif");
    Animation::new(frames)
}

pub fn decode_still(data: &[u8]) -> Result<RgbaImage> {
    let mut image = image::load_from_memory(data)
        .map_err(EmoteError::Decode)?
        .into_rgba8();

    if image.width() == 0 || image.height() == 0 {
        return Err(EmoteError::EmptyImage);
    }

    // GIFs only have one pixel value indicating transparency, so if alpha is 0 then change the pixel to that pixel value
    for pixel in image.pixels_mut() {
        if pixel.0[3] == 0 {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }

    Ok(image)
}

/// Scales a still image unless an earlier stage already did.
pub fn prepare_still(image: RgbaImage, size: Scale, is_resized: bool) -> RgbaImage {
    if is_resized || size.is_identity() {
        return image;
    }

    let width = ((image.width() as f32 * size.x).floor() as u32).max(1);
    let height = ((image.height() as f32 * size.y).floor() as u32).max(1);

    image::imageops::resize(&image, width, height, image::imageops::FilterType::Nearest)
}

/// Encodes frames with their own delays. Every frame must share the first frame's size.
pub fn encode_animation(frames: Vec<Frame>, speed: i32) -> Result<Vec<u8>> {
    let first = frames.first().ok_or(EmoteError::EmptyImage)?;
    let (width, height) = first.buffer().dimensions();
    let mut stream = FrameStream::new(
        width,
        height,
        StreamSettings {
            quality: speed,
            delay_centisecs: MIN_DELAY_CENTISECS,
        },
    )?;

    for frame in frames {
        let delay_centisecs = get_delay_centisecs(frame.delay());
        stream.push_with_delay(frame.into_buffer(), delay_centisecs)?;
    }

    stream.finish()
}

#[derive(Copy, Clone, Debug)]
pub struct StreamSettings {
    /// NeuQuant sampling factor, 1 (best) to 30 (fastest).
    pub quality: i32,
    pub delay_centisecs: u32,
}

/// Incremental encoder, looping forever. Frames share one delay unless pushed with their own.
///
/// Fully transparent pixels become the frame's transparent color.
pub struct FrameStream {
    width: u32,
    height: u32,
    settings: StreamSettings,
    encoder: Encoder<Vec<u8>>,
    frames: usize,
}

impl FrameStream {
    pub fn new(width: u32, height: u32, settings: StreamSettings) -> Result<Self> {
        let (Ok(w), Ok(h)) = (u16::try_from(width), u16::try_from(height)) else {
            return Err(EmoteError::FrameSize {
                width: u16::MAX as u32,
                height: u16::MAX as u32,
                got_width: width,
                got_height: height,
            });
        };
        if w == 0 || h == 0 {
            return Err(EmoteError::EmptyImage);
        }

        let mut encoder = Encoder::new(Vec::new(), w, h, &[])?;
        encoder.set_repeat(GifRepeat::Infinite)?;

        Ok(Self {
            width,
            height,
            settings,
            encoder,
            frames: 0,
        })
    }

    pub fn push(&mut self, image: RgbaImage) -> Result<()> {
        self.push_with_delay(image, self.settings.delay_centisecs)
    }

    /// Previous frames are cleared before the next one is drawn, so
    /// transparent areas never show older frames.
    pub fn push_with_delay(&mut self, image: RgbaImage, delay_centisecs: u32) -> Result<()> {
        if image.dimensions() != (self.width, self.height) {
            return Err(EmoteError::FrameSize {
                width: self.width,
                height: self.height,
                got_width: image.width(),
                got_height: image.height(),
            });
        }

        let mut pixels = image.into_raw();
        let mut frame = gif::Frame::from_rgba_speed(
            self.width as u16,
            self.height as u16,
            &mut pixels,
            self.settings.quality.clamp(1, 30),
        );
        frame.delay = delay_centisecs.clamp(MIN_DELAY_CENTISECS, u16::MAX as u32) as u16;
        frame.dispose = gif::DisposalMethod::Background;

        self.encoder.write_frame(&frame)?;
        self.frames += 1;
        Ok(())
    }

    pub fn finish(self) -> Result<Vec<u8>> {
        if self.frames == 0 {
            return Err(EmoteError::EmptyImage);
        }

        Ok(self.encoder.into_inner()?)
    }
}

/// Encodes rendered images as a stream, sized after the first one.
pub fn encode_stream(images: Vec<RgbaImage>, settings: StreamSettings) -> Result<Vec<u8>> {
    let first = images.first().ok_or(EmoteError::EmptyImage)?;
    let mut stream = FrameStream::new(first.width(), first.height(), settings)?;

    for image in images {
        stream.push(image)?;
    }

    stream.finish()
}

/// Wraps a still image into a single-frame GIF.
pub fn still_to_gif(image: RgbaImage, speed: i32) -> Result<Vec<u8>> {
    let frame = Frame::from_parts(image, 0, 0, get_delay(MIN_DELAY_CENTISECS));
    encode_animation(vec![frame], speed)
}

/// Reduces the opaque pixels of `image` to at most `colors` distinct colors.
pub fn requantize(image: &mut RgbaImage, colors: usize) {
    let opaque: Vec<u8> = image
        .pixels()
        .filter(|pixel| pixel.0[3] > 0)
        .flat_map(|pixel| pixel.0)
        .collect();
    if opaque.is_empty() {
        return;
    }

    let quant = NeuQuant::new(10, colors, &opaque);
    let palette = quant.color_map_rgba();

    for pixel in image.pixels_mut() {
        if pixel.0[3] == 0 {
            continue;
        }

        let index = quant.index_of(&pixel.0) * 4;
        let alpha = pixel.0[3];
        pixel.0 = [palette[index], palette[index + 1], palette[index + 2], alpha];
    }
}
