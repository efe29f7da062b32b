//! Threads a source through the command buckets.
//!
//! GIF sources are shrunk and unoptimized first, then every effect runs in
//! order on the previous effect's output, then the remaining structural
//! operations run in one batch and the result is optimized.

use std::path::PathBuf;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    codec::{decode_still, detect_kind, prepare_still, still_to_gif, MediaKind},
    command::{Commands, RawCommand, Scale},
    config::Config,
    effect::{apply_effect, Effect, EffectOptions},
    error::{EmoteError, Result},
    transform::{frame_count_from_info, Op, Transformer},
};

/// Hyperspeed only drops frames from GIFs longer than this.
const HYPERSPEED_MIN_FRAMES: usize = 4;
const HYPERSPEED_DELAY_CENTISECS: u32 = 2;

#[derive(Clone, Debug, PartialEq)]
pub enum Source {
    Bytes(Vec<u8>),
    Url(String),
    Path(PathBuf),
}

impl Source {
    /// `http(s)://` locations are remote, anything else is a file path.
    pub fn from_location(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::Url(location.to_owned())
        } else {
            let path = location.strip_prefix("file://").unwrap_or(location);
            Self::Path(PathBuf::from(path))
        }
    }
}

/// One source and the commands to run on it.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub source: Source,
    pub commands: Vec<RawCommand>,
}

impl Request {
    pub fn new(source: Source, commands: Vec<RawCommand>) -> Self {
        Self { source, commands }
    }
}

pub struct Pipeline<T> {
    transformer: T,
    config: Config,
}

impl<T: Transformer> Pipeline<T> {
    pub fn new(transformer: T, config: Config) -> Self {
        Self {
            transformer,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transformer(&self) -> &T {
        &self.transformer
    }

    #[tracing::instrument(skip_all, fields(commands = request.commands.len()))]
    pub async fn process(&self, request: Request) -> Result<Vec<u8>> {
        let commands = Commands::parse(&request.commands)?;
        let data = load(request.source).await?;

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let output = self.run(data, &commands, &mut rng).await?;
        tracing::info!(length = output.len(), "processed emote");
        Ok(output)
    }

    /// Runs already parsed commands on an encoded image.
    pub async fn run<R: Rng + ?Sized>(
        &self,
        mut data: Vec<u8>,
        commands: &Commands,
        rng: &mut R,
    ) -> Result<Vec<u8>> {
        let kind = detect_kind(&data)?;
        let mut size = Scale::IDENTITY;
        tracing::debug!(?kind, length = data.len(), "detected source");

        match kind {
            MediaKind::Gif => {
                // Shrinking after unoptimizing leaves artifacts
                if !commands.priority.is_empty() {
                    data = self.transformer.transform(&data, &commands.priority).await?;
                }
                data = self.transformer.transform(&data, &[Op::Unoptimize]).await?;
            }
            MediaKind::Still => size = commands.still_size(),
        }

        if !commands.special.is_empty() {
            data = self.apply_effects(data, kind, size, &commands.special, rng)?;
        } else if kind == MediaKind::Still {
            let image = prepare_still(decode_still(&data)?, size, false);
            data = still_to_gif(image, self.config.encoder_speed)?;
        }

        if commands.has_normal_work() {
            data = self.apply_normal(data, commands).await?;
        }

        self.transformer.transform(&data, &[Op::Optimize]).await
    }

    fn apply_effects<R: Rng + ?Sized>(
        &self,
        data: Vec<u8>,
        kind: MediaKind,
        size: Scale,
        effects: &[Effect],
        rng: &mut R,
    ) -> Result<Vec<u8>> {
        effects
            .iter()
            .enumerate()
            .try_fold(data, |data, (index, &effect)| {
                tracing::info!(effect = effect.name(), index, "applying effect");

                let options = EffectOptions {
                    effect,
                    kind: if index == 0 { kind } else { MediaKind::Gif },
                    size,
                    is_resized: index > 0,
                };

                apply_effect(&data, &options, &self.config, rng)
            })
    }

    async fn apply_normal(&self, data: Vec<u8>, commands: &Commands) -> Result<Vec<u8>> {
        let mut ops = Vec::with_capacity(commands.normal.len() + 3);
        ops.push(Op::Unoptimize);
        ops.extend(commands.normal.iter().cloned());

        if commands.hyperspeed {
            let info = self.transformer.info(&data).await?;
            ops.extend(hyperspeed_ops(frame_count_from_info(&info)));
        }

        tracing::debug!(?ops, "applying structural ops");
        self.transformer.transform(&data, &ops).await
    }
}

/// Minimum delay everywhere, and every other frame dropped from longer GIFs.
pub fn hyperspeed_ops(frame_count: usize) -> Vec<Op> {
    let mut ops = vec![Op::Delay(HYPERSPEED_DELAY_CENTISECS)];

    if frame_count > HYPERSPEED_MIN_FRAMES {
        ops.push(Op::Delete((1..frame_count).step_by(2).collect()));
    }

    ops
}

async fn load(source: Source) -> Result<Vec<u8>> {
    match source {
        Source::Bytes(data) => Ok(data),
        Source::Path(path) => read_path(path).await,
        Source::Url(url) => fetch(url).await,
    }
}

#[cfg(not(target_arch = "wasm32"))]
async fn read_path(path: PathBuf) -> Result<Vec<u8>> {
    Ok(tokio::fs::read(&path).await?)
}

#[cfg(target_arch = "wasm32")]
async fn read_path(path: PathBuf) -> Result<Vec<u8>> {
    Err(EmoteError::UnsupportedSource(path.display().to_string()))
}

#[cfg(all(feature = "remote", not(target_arch = "wasm32")))]
async fn fetch(url: String) -> Result<Vec<u8>> {
    tracing::debug!(%url, "fetching source");

    let fetch_error = |err: reqwest::Error| EmoteError::Fetch {
        url: url.clone(),
        reason: err.to_string(),
    };

    let response = reqwest::get(url.as_str())
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(fetch_error)?;
    let bytes = response.bytes().await.map_err(fetch_error)?;

    Ok(bytes.to_vec())
}

#[cfg(not(all(feature = "remote", not(target_arch = "wasm32"))))]
async fn fetch(url: String) -> Result<Vec<u8>> {
    Err(EmoteError::UnsupportedSource(format!(
        "{url} (remote sources need the `remote` feature)"
    )))
}
