//! Need-state store — the persona's bounded body counters.
//!
//! Every counter is an integer in `[NEED_MIN, NEED_MAX]`. Mutations clamp,
//! they never reject: an increase past the ceiling yields the ceiling and a
//! decrease past the floor yields the floor.
//!
//! A [`NeedStore`] is a shared handle. Cloning it hands out another view of
//! the same counters, so every requester talking to one persona sees the same
//! state. Each mutation is a single clamp-and-set under the lock; concurrent
//! actions interleave per counter with last-write-wins semantics.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::NeedsConfig;
use crate::error::HowlError;

/// Lowest value any counter can hold.
pub const NEED_MIN: u8 = 0;
/// Highest value any counter can hold.
pub const NEED_MAX: u8 = 10;
/// Level every counter starts at unless configured otherwise.
pub const DEFAULT_BASELINE: u8 = 5;

/// One of the persona's need counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Need {
    /// How hungry the persona is.
    Hunger,
    /// How thirsty the persona is.
    Thirst,
    /// How urgently the persona needs to relieve itself.
    Bathroom,
    /// General happiness.
    Mood,
    /// How drunk the persona is.
    Intoxication,
    /// How ill the persona feels.
    Sickness,
}

impl Need {
    /// All counters, in display order.
    pub const ALL: [Need; 6] = [
        Need::Hunger,
        Need::Thirst,
        Need::Bathroom,
        Need::Mood,
        Need::Intoxication,
        Need::Sickness,
    ];

    /// Lowercase name used in configuration and diagnostics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hunger => "hunger",
            Self::Thirst => "thirst",
            Self::Bathroom => "bathroom",
            Self::Mood => "mood",
            Self::Intoxication => "intoxication",
            Self::Sickness => "sickness",
        }
    }
}

impl fmt::Display for Need {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Need {
    type Err = HowlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hunger" => Ok(Self::Hunger),
            "thirst" => Ok(Self::Thirst),
            "bathroom" => Ok(Self::Bathroom),
            "mood" => Ok(Self::Mood),
            "intoxication" | "alcohol" => Ok(Self::Intoxication),
            "sickness" => Ok(Self::Sickness),
            other => Err(HowlError::UnknownNeed(other.to_string())),
        }
    }
}

/// A point-in-time copy of every counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeedSnapshot {
    /// Hunger level.
    pub hunger: u8,
    /// Thirst level.
    pub thirst: u8,
    /// Bathroom urgency.
    pub bathroom: u8,
    /// Mood level.
    pub mood: u8,
    /// Intoxication level.
    pub intoxication: u8,
    /// Sickness level.
    pub sickness: u8,
}

impl NeedSnapshot {
    /// Every counter at the same level (clamped).
    #[must_use]
    pub fn uniform(level: u8) -> Self {
        let level = level.min(NEED_MAX);
        Self {
            hunger: level,
            thirst: level,
            bathroom: level,
            mood: level,
            intoxication: level,
            sickness: level,
        }
    }

    /// Read one counter.
    #[must_use]
    pub fn get(&self, need: Need) -> u8 {
        match need {
            Need::Hunger => self.hunger,
            Need::Thirst => self.thirst,
            Need::Bathroom => self.bathroom,
            Need::Mood => self.mood,
            Need::Intoxication => self.intoxication,
            Need::Sickness => self.sickness,
        }
    }

    fn slot(&mut self, need: Need) -> &mut u8 {
        match need {
            Need::Hunger => &mut self.hunger,
            Need::Thirst => &mut self.thirst,
            Need::Bathroom => &mut self.bathroom,
            Need::Mood => &mut self.mood,
            Need::Intoxication => &mut self.intoxication,
            Need::Sickness => &mut self.sickness,
        }
    }

    /// Copy with every counter forced into bounds.
    #[must_use]
    pub fn clamped(mut self) -> Self {
        for need in Need::ALL {
            let slot = self.slot(need);
            *slot = (*slot).min(NEED_MAX);
        }
        self
    }
}

impl Default for NeedSnapshot {
    fn default() -> Self {
        Self::uniform(DEFAULT_BASELINE)
    }
}

impl fmt::Display for NeedSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for need in Need::ALL {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{need} {}/{NEED_MAX}", self.get(need))?;
        }
        Ok(())
    }
}

/// Shared, thread-safe need counters for one persona instance.
pub struct NeedStore {
    inner: Arc<Mutex<NeedStoreInner>>,
}

struct NeedStoreInner {
    levels: NeedSnapshot,
    baseline: NeedSnapshot,
}

impl NeedStore {
    /// Create a store starting at `baseline`.
    #[must_use]
    pub fn new(baseline: NeedSnapshot) -> Self {
        let baseline = baseline.clamped();
        Self {
            inner: Arc::new(Mutex::new(NeedStoreInner {
                levels: baseline,
                baseline,
            })),
        }
    }

    /// Create a store from the `[needs]` configuration section.
    #[must_use]
    pub fn from_config(config: &NeedsConfig) -> Self {
        Self::new(config.baseline)
    }

    /// Add `amount` to a counter; returns the clamped new value.
    pub fn increase(&self, need: Need, amount: u32) -> u8 {
        self.apply(need, i64::from(amount))
    }

    /// Subtract `amount` from a counter; returns the clamped new value.
    pub fn decrease(&self, need: Need, amount: u32) -> u8 {
        self.apply(need, -i64::from(amount))
    }

    /// Increase by one step.
    pub fn increase_one(&self, need: Need) -> u8 {
        self.increase(need, 1)
    }

    /// Decrease by one step.
    pub fn decrease_one(&self, need: Need) -> u8 {
        self.decrease(need, 1)
    }

    /// Shift a counter by a signed delta; returns the clamped new value.
    pub fn apply(&self, need: Need, delta: i64) -> u8 {
        let mut inner = self.inner.lock();
        let slot = inner.levels.slot(need);
        let before = *slot;
        let after = (i64::from(before) + delta).clamp(i64::from(NEED_MIN), i64::from(NEED_MAX));
        // Bounded by NEED_MAX above, so the narrowing is lossless.
        *slot = u8::try_from(after).unwrap_or(NEED_MAX);
        trace!(need = %need, before, delta, after = *slot, "need mutated");
        *slot
    }

    /// Current value of one counter.
    #[must_use]
    pub fn get(&self, need: Need) -> u8 {
        self.inner.lock().levels.get(need)
    }

    /// Copy of every counter.
    #[must_use]
    pub fn snapshot(&self) -> NeedSnapshot {
        self.inner.lock().levels
    }

    /// Put every counter back to the baseline this store was created with.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.levels = inner.baseline;
    }
}

impl Default for NeedStore {
    fn default() -> Self {
        Self::new(NeedSnapshot::default())
    }
}

impl Clone for NeedStore {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl fmt::Display for NeedStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.snapshot(), f)
    }
}

impl fmt::Debug for NeedStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NeedStore").field(&self.snapshot()).finish()
    }
}
