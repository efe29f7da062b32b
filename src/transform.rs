//! Structural operations that reshape a GIF without synthesizing new pixels.

use std::fmt::Write as _;

use image::Frame;

use crate::{
    codec::{decode_animation, encode_animation},
    command::{Rotation, Scale},
    error::Result,
    flip::{self, flip},
    resize::resize,
    rotate::rotate,
    utils::{get_delay_centisecs, set_delay},
};

#[derive(Clone, Debug, PartialEq)]
pub enum Op {
    Scale(Scale),
    Reverse,
    Rotate(Rotation),
    FlipHorizontal,
    FlipVertical,
    /// Sets every frame's delay, in centiseconds.
    Delay(u32),
    /// Removes the frames at these indices.
    Delete(Vec<usize>),
    Unoptimize,
    Optimize,
}

impl Op {
    /// Command-line arguments gifsicle expects for this operation.
    pub fn args(&self) -> Vec<String> {
        match self {
            Self::Scale(scale) => vec!["--scale".into(), scale.to_string()],
            Self::Reverse => vec!["#-1-0".into()],
            Self::Rotate(rotation) => {
                vec![format!("--rotate-{}", rotation.degrees()), "#0-".into()]
            }
            Self::FlipHorizontal => vec!["--flip-horizontal".into()],
            Self::FlipVertical => vec!["--flip-vertical".into()],
            Self::Delay(delay) => vec![format!("-d{delay}")],
            Self::Delete(indices) => std::iter::once("--delete".to_owned())
                .chain(indices.iter().map(|index| format!("#{index}")))
                .collect(),
            Self::Unoptimize => vec!["-U".into()],
            Self::Optimize => vec!["--optimize".into()],
        }
    }
}

/// Executes structural operations on an encoded GIF.
#[allow(async_fn_in_trait)]
pub trait Transformer {
    async fn transform(&self, data: &[u8], ops: &[Op]) -> Result<Vec<u8>>;

    /// A gifsicle-style `-I` report of the GIF's frames.
    async fn info(&self, data: &[u8]) -> Result<String>;
}

/// Counts the frames listed in an info report.
pub fn frame_count_from_info(info: &str) -> usize {
    info.matches("image #").count()
}

/// Applies operations to decoded frames in this process.
#[derive(Copy, Clone, Debug)]
pub struct InProcess {
    encoder_speed: i32,
}

impl InProcess {
    pub fn new(encoder_speed: i32) -> Self {
        Self {
            encoder_speed: encoder_speed.clamp(1, 30),
        }
    }

    pub fn apply(frames: &mut Vec<Frame>, op: &Op) {
        match op {
            Op::Scale(scale) => resize(frames, *scale),
            Op::Reverse => frames.reverse(),
            Op::Rotate(rotation) => rotate(frames, *rotation),
            Op::FlipHorizontal => flip(frames, flip::Direction::Horizontal),
            Op::FlipVertical => flip(frames, flip::Direction::Vertical),
            Op::Delay(delay) => {
                for frame in frames.iter_mut() {
                    set_delay(frame, *delay);
                }
            }
            Op::Delete(indices) => {
                let mut index = 0;
                frames.retain(|_| {
                    let retain = !indices.contains(&index);
                    index += 1;
                    retain
                });
            }
            // Decoded frames are always full canvases
            Op::Unoptimize | Op::Optimize => {}
        }
    }
}

impl Default for InProcess {
    fn default() -> Self {
        Self::new(10)
    }
}

impl Transformer for InProcess {
    async fn transform(&self, data: &[u8], ops: &[Op]) -> Result<Vec<u8>> {
        let mut frames = decode_animation(data)?.frames;

        for op in ops {
            Self::apply(&mut frames, op);
        }

        tracing::debug!(ops = ops.len(), frames = frames.len(), "transformed in process");
        encode_animation(frames, self.encoder_speed)
    }

    async fn info(&self, data: &[u8]) -> Result<String> {
        let animation = decode_animation(data)?;
        let mut info = String::new();

        // Writing into a String cannot fail
        let _ = writeln!(info, "* <stdin> {} images", animation.frames.len());
        let _ = writeln!(
            info,
            "  logical screen {}x{}",
            animation.width, animation.height
        );
        let _ = writeln!(info, "  loop forever");
        for (index, frame) in animation.frames.iter().enumerate() {
            let (width, height) = frame.buffer().dimensions();
            let _ = writeln!(info, "  + image #{index} {width}x{height}");
            let _ = writeln!(
                info,
                "    disposal asis delay {:.2}s",
                get_delay_centisecs(frame.delay()) as f32 / 100.0
            );
        }

        Ok(info)
    }
}
