//! Meme-emote effects for images and GIFs.
//!
//! A [`Request`] pairs a source with `[name, param?]` commands. The
//! [`Pipeline`] sorts them into structural operations, run by a
//! [`Transformer`], and pixel effects, synthesized here frame by frame.
//!
//! ```no_run
//! # async fn run() -> emote_fx::Result<()> {
//! use emote_fx::{Config, InProcess, Pipeline, RawCommand, Request, Source};
//!
//! let pipeline = Pipeline::new(InProcess::default(), Config::new());
//! let request = Request::new(
//!     Source::from_location("emote.png"),
//!     vec![RawCommand::from_shorthand("spin=fast")],
//! );
//! let gif = pipeline.process(request).await?;
//! # Ok(())
//! # }
//! ```

pub mod align;
pub mod codec;
pub mod color;
pub mod command;
pub mod config;
pub mod effect;
pub mod error;
pub mod flip;
#[cfg(not(target_arch = "wasm32"))]
pub mod gifsicle;
pub mod infinite;
pub mod pipeline;
pub mod rain;
pub mod rainbow;
pub mod resize;
pub mod rotate;
mod serde;
pub mod shake;
pub mod slide;
pub mod spin;
pub mod timing;
pub mod transform;
pub mod utils;
pub mod wiggle;

pub use codec::{Animation, MediaKind};
pub use command::{Commands, Param, RawCommand, Scale};
pub use config::Config;
pub use effect::{apply_effect, Effect, EffectOptions};
pub use error::{EmoteError, Result};
#[cfg(not(target_arch = "wasm32"))]
pub use gifsicle::Gifsicle;
pub use pipeline::{Pipeline, Request, Source};
pub use transform::{InProcess, Op, Transformer};

#[cfg(feature = "wasm")]
use wasm_bindgen::{prelude::wasm_bindgen, JsError, JsValue};

#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "initPanicHook")]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Runs `[name, param?]` commands on an image without gifsicle.
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "applyCommands")]
pub fn apply_commands(data: Vec<u8>, commands: JsValue) -> Result<Vec<u8>, JsError> {
    let commands: Vec<RawCommand> = serde_wasm_bindgen::from_value(commands)?;

    let config = Config::new();
    let pipeline = Pipeline::new(InProcess::new(config.encoder_speed), config);
    let request = Request::new(Source::Bytes(data), commands);

    Ok(pollster::block_on(pipeline.process(request))?)
}
