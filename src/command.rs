use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use crate::{
    effect::Effect,
    error::{EmoteError, Result},
    rain::RainKind,
    slide, spin,
    transform::Op,
};

/// One `[name, param?]` entry of a request, before validation.
#[derive(Clone, Debug, PartialEq)]
pub struct RawCommand {
    pub name: String,
    pub param: Option<Param>,
}

impl RawCommand {
    pub fn new(name: impl Into<String>, param: Option<Param>) -> Self {
        Self {
            name: name.into(),
            param,
        }
    }

    /// Parses the CLI shorthand `name` or `name=param`.
    pub fn from_shorthand(value: &str) -> Self {
        match value.split_once('=') {
            Some((name, param)) => Self::new(name, Some(Param::Text(param.to_owned()))),
            None => Self::new(value, None),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Param {
    Number(f64),
    Text(String),
    List(Vec<Param>),
}

impl Param {
    /// The scalar this parameter stands for; lists contribute their first element.
    pub fn scalar(&self) -> Option<&Param> {
        match self {
            Self::List(list) => list.first().and_then(Param::scalar),
            scalar => Some(scalar),
        }
    }

    pub fn text(&self) -> Option<String> {
        match self.scalar()? {
            Self::Number(number) => Some(number.to_string()),
            Self::Text(text) => Some(text.clone()),
            Self::List(_) => None,
        }
    }

    pub fn number(&self) -> Option<f64> {
        match self.scalar()? {
            Self::Number(number) => Some(*number),
            Self::Text(text) => text.trim().parse().ok(),
            Self::List(_) => None,
        }
    }
}

/// Centiseconds until the next step of an effect.
///
/// Numbers are accepted as well as names, but always land in
/// `MIN..=MAX` so an effect cycle stays a bounded number of frames.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Speed(pub u32);

impl Speed {
    pub const DEFAULT: Self = Self(8);
    pub const MIN: Self = Self(2);
    pub const MAX: Self = Self(16);

    pub fn from_param(param: Option<&Param>) -> Self {
        let Some(param) = param else {
            return Self::DEFAULT;
        };

        if let Some(Param::Number(number)) = param.scalar() {
            return Self((*number as u32).clamp(Self::MIN.0, Self::MAX.0));
        }

        match param.text().as_deref() {
            Some("fast") => Self(6),
            Some("faster") => Self(4),
            Some("hyper") => Self(2),
            _ => Self::DEFAULT,
        }
    }

    pub fn value(self) -> u32 {
        self.0.clamp(Self::MIN.0, Self::MAX.0)
    }
}

impl Default for Speed {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WiggleSize(pub u32);

impl WiggleSize {
    pub fn from_param(param: Option<&Param>) -> Self {
        match param.and_then(Param::text).as_deref() {
            Some("big") => Self(4),
            Some("bigger") => Self(6),
            Some("huge") => Self(10),
            _ => Self(2),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Scale {
    pub x: f32,
    pub y: f32,
}

impl Scale {
    pub const IDENTITY: Self = Self { x: 1.0, y: 1.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_identity(self) -> bool {
        self.x == 1.0 && self.y == 1.0
    }

    /// Enlarging must happen after the effects; shrinking is cheaper before them.
    pub fn is_upscale(self) -> bool {
        self.x > 1.0 || self.y > 1.0
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl FromStr for Scale {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |axis: &str| -> Result<f32, ()> {
            let value: f32 = axis.trim().parse().map_err(|_| ())?;
            if value.is_finite() && value > 0.0 {
                Ok(value)
            } else {
                Err(())
            }
        };

        match s.split_once('x') {
            None => {
                let scale = parse(s)?;
                Ok(Self::new(scale, scale))
            }
            Some((x, y)) => Ok(Self::new(parse(x)?, parse(y)?)),
        }
    }
}

impl Display for Scale {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.x == self.y {
            write!(f, "{}", self.x)
        } else {
            write!(f, "{}x{}", self.x, self.y)
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Rotation {
    Quarter,
    Half,
    ThreeQuarters,
}

impl Rotation {
    pub fn degrees(self) -> u32 {
        match self {
            Self::Quarter => 90,
            Self::Half => 180,
            Self::ThreeQuarters => 270,
        }
    }
}

impl TryFrom<u32> for Rotation {
    type Error = ();

    fn try_from(degrees: u32) -> Result<Self, Self::Error> {
        match degrees {
            90 => Ok(Self::Quarter),
            180 => Ok(Self::Half),
            270 => Ok(Self::ThreeQuarters),
            _ => Err(()),
        }
    }
}

/// A validated command.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Resize(Scale),
    Reverse,
    Rotate(Rotation),
    Flip,
    Flap,
    Speed { delay: u32 },
    Hyperspeed,
    Effect(Effect),
}

impl Command {
    /// Validates a raw command. Unknown names yield `None`.
    pub fn parse(raw: &RawCommand) -> Result<Option<Self>> {
        let param = raw.param.as_ref();
        let invalid = || {
            EmoteError::invalid_param(
                raw.name.as_str(),
                param.and_then(Param::text).unwrap_or_default(),
            )
        };

        let command = match raw.name.as_str() {
            "resize" => {
                let scale = param
                    .and_then(Param::text)
                    .and_then(|text| text.parse::<Scale>().ok())
                    .ok_or_else(invalid)?;
                Self::Resize(scale)
            }
            "reverse" => Self::Reverse,
            "rotate" => {
                let rotation = param
                    .and_then(Param::number)
                    .and_then(|degrees| Rotation::try_from(degrees as u32).ok())
                    .ok_or_else(invalid)?;
                Self::Rotate(rotation)
            }
            "flip" => Self::Flip,
            "flap" => Self::Flap,
            "speed" => {
                let delay = param
                    .and_then(Param::number)
                    .filter(|delay| delay.is_finite() && *delay >= 0.0)
                    .ok_or_else(invalid)?;
                // GIF delays are 16-bit
                Self::Speed {
                    delay: (delay.trunc() as u32).clamp(2, u16::MAX as u32),
                }
            }
            "hyperspeed" => Self::Hyperspeed,
            "wiggle" => Self::Effect(Effect::Wiggle {
                size: WiggleSize::from_param(param),
            }),
            "rain" => Self::Effect(Effect::Rain {
                kind: RainKind::from_param(param),
            }),
            "spin" | "spinrev" => Self::Effect(Effect::Spin {
                direction: if raw.name == "spinrev" {
                    spin::Direction::CounterClockwise
                } else {
                    spin::Direction::Clockwise
                },
                speed: Speed::from_param(param),
            }),
            "shake" => Self::Effect(Effect::Shake {
                speed: Speed::from_param(param),
            }),
            "rainbow" => Self::Effect(Effect::Rainbow {
                speed: Speed::from_param(param),
            }),
            "infinite" => Self::Effect(Effect::Infinite {
                speed: Speed::from_param(param),
            }),
            "slide" | "sliderev" => Self::Effect(Effect::Slide {
                direction: if raw.name == "sliderev" {
                    slide::Direction::Backwards
                } else {
                    slide::Direction::Forwards
                },
                speed: Speed::from_param(param),
            }),
            _ => return Ok(None),
        };

        Ok(Some(command))
    }
}

/// Commands sorted into the order they have to run in.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Commands {
    /// Must run before unoptimizing, chiefly shrinking.
    pub priority: Vec<Op>,
    /// Pixel effects, run one after another.
    pub special: Vec<Effect>,
    /// Handed to the transformer in one batch after the effects.
    pub normal: Vec<Op>,
    pub hyperspeed: bool,
}

impl Commands {
    pub fn parse(raw: &[RawCommand]) -> Result<Self> {
        let mut commands = Self::default();

        for entry in raw {
            let Some(command) = Command::parse(entry)? else {
                tracing::warn!(name = %entry.name, "ignoring unknown command");
                continue;
            };

            match command {
                Command::Resize(scale) if scale.is_upscale() => {
                    commands.normal.push(Op::Scale(scale))
                }
                Command::Resize(scale) => commands.priority.push(Op::Scale(scale)),
                Command::Reverse => commands.normal.push(Op::Reverse),
                Command::Rotate(rotation) => commands.normal.push(Op::Rotate(rotation)),
                Command::Flip => commands.normal.push(Op::FlipHorizontal),
                Command::Flap => commands.normal.push(Op::FlipVertical),
                Command::Speed { delay } => commands.normal.push(Op::Delay(delay)),
                Command::Hyperspeed => commands.hyperspeed = true,
                Command::Effect(effect) => commands.special.push(effect),
            }
        }

        tracing::info!(
            priority = commands.priority.len(),
            special = commands.special.len(),
            normal = commands.normal.len(),
            hyperspeed = commands.hyperspeed,
            "processed request commands"
        );

        Ok(commands)
    }

    pub fn has_normal_work(&self) -> bool {
        !self.normal.is_empty() || self.hyperspeed
    }

    /// Scale a still image is shrunk by before its first effect.
    pub fn still_size(&self) -> Scale {
        self.priority
            .iter()
            .rev()
            .find_map(|op| match op {
                Op::Scale(scale) => Some(*scale),
                _ => None,
            })
            .unwrap_or_default()
    }
}
