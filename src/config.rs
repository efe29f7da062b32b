//! Operational settings for a [`Pipeline`](crate::Pipeline).
//!
//! ```
//! use emote_fx::Config;
//!
//! let config = Config::new()
//!     .with_gifsicle("/usr/local/bin/gifsicle")
//!     .with_seed(42);
//! assert_eq!(config.seed, Some(42));
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{
    error::{EmoteError, Result},
    timing::DEFAULT_MAX_FRAMES,
};

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Program run by the gifsicle transformer.
    pub gifsicle: PathBuf,
    /// NeuQuant speed when re-encoding decoded animations, 1 (best) to 30.
    pub encoder_speed: i32,
    /// NeuQuant sampling factor for freshly rendered still effects.
    pub stream_quality: i32,
    /// Frame budget before shake halves the source.
    pub max_shake_frames: usize,
    /// Rain repeats short GIFs to at least this many frames.
    pub min_rain_frames: usize,
    /// Fixes the random source of every request.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            gifsicle: PathBuf::from("gifsicle"),
            encoder_speed: 10,
            stream_quality: 5,
            max_shake_frames: DEFAULT_MAX_FRAMES,
            min_rain_frames: 12,
            seed: None,
        }
    }

    /// Reads a JSON config file. Missing fields keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;

        Self::from_json(&text)
            .map_err(|err| EmoteError::Config(format!("{}: {err}", path.display())))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|err| EmoteError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=30).contains(&self.encoder_speed) {
            return Err(EmoteError::Config(format!(
                "encoder_speed must be within 1..=30, got {}",
                self.encoder_speed
            )));
        }
        if !(1..=30).contains(&self.stream_quality) {
            return Err(EmoteError::Config(format!(
                "stream_quality must be within 1..=30, got {}",
                self.stream_quality
            )));
        }
        if self.max_shake_frames == 0 {
            return Err(EmoteError::Config("max_shake_frames must be positive".into()));
        }

        Ok(())
    }

    #[must_use]
    pub fn with_gifsicle(mut self, program: impl Into<PathBuf>) -> Self {
        self.gifsicle = program.into();
        self
    }

    /// Clamped to `1..=30`.
    #[must_use]
    pub fn with_encoder_speed(mut self, speed: i32) -> Self {
        self.encoder_speed = speed.clamp(1, 30);
        self
    }

    /// Clamped to `1..=30`.
    #[must_use]
    pub fn with_stream_quality(mut self, quality: i32) -> Self {
        self.stream_quality = quality.clamp(1, 30);
        self
    }

    #[must_use]
    pub fn with_max_shake_frames(mut self, frames: usize) -> Self {
        self.max_shake_frames = frames.max(1);
        self
    }

    #[must_use]
    pub fn with_min_rain_frames(mut self, frames: usize) -> Self {
        self.min_rain_frames = frames;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
