use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use emote_fx::{
    Config, EmoteError, Gifsicle, InProcess, Pipeline, RawCommand, Request, Source, Transformer,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "emote-fx", version, about)]
struct Cli {
    /// Source image or GIF; `http(s)://` URLs need the `remote` feature.
    input: Option<String>,

    /// Where to write the resulting GIF.
    #[arg(short, long)]
    out: PathBuf,

    /// Command as `name` or `name=param`, e.g. `spin=fast`. Repeatable.
    #[arg(short, long = "command")]
    commands: Vec<String>,

    /// JSON request `{"url": ..., "options": [[name, param], ...]}` instead of INPUT.
    #[arg(long, conflicts_with_all = ["input", "commands"])]
    request: Option<PathBuf>,

    /// JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Apply structural operations in process instead of running gifsicle.
    #[arg(long)]
    in_process: bool,

    /// gifsicle program to run.
    #[arg(long)]
    gifsicle: Option<PathBuf>,

    /// Fixes the random source.
    #[arg(long)]
    seed: Option<u64>,

    /// Frame budget before shake drops every other source frame.
    #[arg(long)]
    max_shake_frames: Option<usize>,

    /// Shortest GIF rain repeats up to.
    #[arg(long)]
    min_rain_frames: Option<usize>,
}

impl Cli {
    fn config(&self) -> Result<Config, EmoteError> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::new(),
        };

        if let Some(program) = &self.gifsicle {
            config = config.with_gifsicle(program);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(frames) = self.max_shake_frames {
            config = config.with_max_shake_frames(frames);
        }
        if let Some(frames) = self.min_rain_frames {
            config = config.with_min_rain_frames(frames);
        }

        Ok(config)
    }

    fn request(&self) -> Result<Request, EmoteError> {
        if let Some(path) = &self.request {
            let text = std::fs::read_to_string(path)?;
            return serde_json::from_str(&text)
                .map_err(|err| EmoteError::Config(format!("{}: {err}", path.display())));
        }

        let input = self
            .input
            .as_deref()
            .ok_or_else(|| EmoteError::Config("either INPUT or --request is required".into()))?;
        let commands = self
            .commands
            .iter()
            .map(|command| RawCommand::from_shorthand(command))
            .collect();

        Ok(Request::new(Source::from_location(input), commands))
    }
}

async fn process<T: Transformer>(
    transformer: T,
    config: Config,
    request: Request,
) -> Result<Vec<u8>, EmoteError> {
    Pipeline::new(transformer, config).process(request).await
}

async fn run(cli: Cli) -> Result<(), EmoteError> {
    let config = cli.config()?;
    let request = cli.request()?;

    let output = if cli.in_process {
        process(InProcess::new(config.encoder_speed), config, request).await?
    } else {
        process(Gifsicle::new(config.gifsicle.clone()), config, request).await?
    };

    tokio::fs::write(&cli.out, &output).await?;
    tracing::info!(out = %cli.out.display(), length = output.len(), "wrote gif");

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
