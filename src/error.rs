//! Error type shared by every stage of the pipeline.

use image::ImageError;
use thiserror::Error;

pub type Result<T, E = EmoteError> = std::result::Result<T, E>;

/// Any failure while turning a source and a command list into a GIF.
///
/// Nothing is retried: the first stage that fails aborts the whole request and
/// its error is what the caller sees.
#[derive(Debug, Error)]
pub enum EmoteError {
    /// The input is not a decodable image or GIF.
    #[error("failed to decode image: {0}")]
    Decode(#[source] ImageError),

    /// Frames could not be written back out as a GIF.
    #[error("failed to encode gif: {0}")]
    Encode(#[from] gif::EncodingError),

    /// The input decoded but has no frames or a zero-sized canvas.
    #[error("image has no frames or no pixels")]
    EmptyImage,

    /// A frame does not match the size the stream was opened with.
    #[error("frame size mismatch: got {got_width}x{got_height}, expected {width}x{height}")]
    FrameSize {
        width: u32,
        height: u32,
        got_width: u32,
        got_height: u32,
    },

    /// A known command carried a parameter it cannot use.
    #[error("invalid parameter `{param}` for command `{command}`")]
    InvalidParam { command: String, param: String },

    /// The structural transformer could not be started.
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The structural transformer ran and failed.
    #[error("gif transform exited with {status}: {stderr}")]
    Transform { status: String, stderr: String },

    /// The source could not be downloaded.
    #[error("failed to fetch `{url}`: {reason}")]
    Fetch { url: String, reason: String },

    /// The source kind cannot be handled in this build.
    #[error("unsupported source: {0}")]
    UnsupportedSource(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EmoteError {
    pub fn invalid_param(command: impl Into<String>, param: impl Into<String>) -> Self {
        Self::InvalidParam {
            command: command.into(),
            param: param.into(),
        }
    }
}
