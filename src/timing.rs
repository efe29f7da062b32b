//! Shake cadence.
//!
//! A shake position should last a fixed amount of time, independent of how fast
//! the source GIF plays. Changing the output delay would change the playback
//! speed, so frames are duplicated up to a common time base instead and the
//! shake position is advanced every `interval` frames.

use rand::Rng;

use crate::utils::MIN_DELAY_CENTISECS;

pub const DEFAULT_MAX_FRAMES: usize = 800;

pub fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

/// Least common multiple. Any two `u32` values fit without overflow.
pub fn lcm(a: u64, b: u64) -> u64 {
    if a == 0 || b == 0 {
        return 0;
    }

    (a / gcd(a, b)).saturating_mul(b)
}

/// One of the four one-pixel crops a shaken frame cycles through.
///
/// The nibble reads `dx dy sx sy` from the high bit down and rotates left:
/// 0011 -> 0110 -> 1100 -> 1001 -> 0011.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ShakeOffset(u8);

impl ShakeOffset {
    pub const INITIAL: Self = Self(0b0011);

    pub fn next(self) -> Self {
        Self(((self.0 << 1) | (self.0 >> 3)) & 0b1111)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    /// Destination x/y and source x/y of the `(w-1)x(h-1)` crop.
    pub fn decode(self) -> (u32, u32, u32, u32) {
        let bit = |shift: u8| ((self.0 >> shift) & 1) as u32;
        (bit(3), bit(2), bit(1), bit(0))
    }

    /// The four positions in rotation order.
    pub fn cycle() -> [Self; 4] {
        let first = Self::INITIAL;
        let second = first.next();
        let third = second.next();
        [first, second, third, third.next()]
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShakePlan {
    /// Drop every other source frame before padding.
    pub halve: bool,
    /// Copies of each frame.
    pub pad: usize,
    /// Thin the padded frames to an even count, then to every other frame.
    pub thin: bool,
    /// Output delay of every frame.
    pub delay: u32,
    /// Accumulated steps needed before the shake position moves.
    pub interval: f64,
    /// Step added to the accumulator per frame.
    pub increment: f64,
}

impl ShakePlan {
    pub fn new(frame_count: usize, delay: u32, speed: u32, max_frames: usize) -> Self {
        let mut plan = Self {
            halve: false,
            pad: 1,
            thin: false,
            delay: delay.max(1),
            interval: 1.0,
            increment: 1.0,
        };

        let mut delay = u64::from(delay.max(1));
        let mut speed = u64::from(speed.max(MIN_DELAY_CENTISECS));
        if delay == speed {
            return plan;
        }

        // lcm <= delay * speed, so pad <= delay
        let pad = lcm(delay, speed) / speed;
        plan.pad = usize::try_from(pad).unwrap_or(usize::MAX);

        if frame_count.saturating_mul(plan.pad) > max_frames {
            plan.halve = true;
            delay *= 2;
            speed *= 2;
        }

        let padded_delay = delay / pad;
        if delay > speed {
            plan.interval = (speed / gcd(padded_delay, speed)) as f64;
            if padded_delay == 1 {
                plan.interval /= 2.0;
            }
        } else {
            plan.increment = gcd(padded_delay, speed) as f64 / speed as f64;
            if padded_delay == 1 {
                plan.increment /= 2.0;
            }
        }

        plan.delay = u32::try_from(padded_delay).unwrap_or(u32::MAX);
        if padded_delay == 1 {
            plan.thin = true;
            plan.delay = MIN_DELAY_CENTISECS;
        }

        plan.increment *= 4.0;
        plan
    }

    /// Applies the frame-count part of the plan.
    pub fn apply<T: Clone, R: Rng + ?Sized>(&self, frames: Vec<T>, rng: &mut R) -> Vec<T> {
        let frames = if self.halve {
            every_other(frames)
        } else {
            frames
        };

        let mut frames = if self.pad > 1 {
            frames
                .iter()
                .flat_map(|frame| std::iter::repeat(frame).take(self.pad))
                .cloned()
                .collect()
        } else {
            frames
        };

        if self.thin {
            if frames.len() % 2 != 0 {
                frames.remove(rng.gen_range(0..frames.len()));
            }
            frames = every_other(frames);
        }

        frames
    }

    /// Shake position of each of `frame_count` output frames.
    pub fn offsets(&self, frame_count: usize) -> Vec<ShakeOffset> {
        let mut offset = ShakeOffset::INITIAL;
        let mut state = 0.0;

        (0..frame_count)
            .map(|_| {
                state += self.increment;
                if state + 1e-9 >= self.interval {
                    state -= self.interval;
                    offset = offset.next();
                }
                offset
            })
            .collect()
    }
}

fn every_other<T>(frames: Vec<T>) -> Vec<T> {
    frames
        .into_iter()
        .enumerate()
        .filter(|(index, _)| index % 2 == 0)
        .map(|(_, frame)| frame)
        .collect()
}
