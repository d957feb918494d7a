//! Per-game rulesets plugged into the shared generate/simulate pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::reconcile::Breakdown;
use crate::seed::RandomStream;
use crate::sim::{EngineFault, StepResult};
use crate::trace::{TickInput, TraceEvent};

pub mod drivehard;
pub mod rocketsol;
pub mod warp;

pub use drivehard::DriveHard;
pub use rocketsol::RocketSol;
pub use warp::Warp;

/// Identifies one of the supported mini-games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    RocketSol,
    DriveHard,
    Warp,
}

impl GameKind {
    pub const ALL: [Self; 3] = [Self::RocketSol, Self::DriveHard, Self::Warp];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::RocketSol => "rocketsol",
            Self::DriveHard => "drivehard",
            Self::Warp => "warp",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::RocketSol => "RocketSol",
            Self::DriveHard => "DriveHard",
            Self::Warp => "Warp",
        }
    }

    /// Tag used to derive this game's random stream from the seed key.
    #[must_use]
    pub const fn domain_tag(self) -> &'static [u8] {
        self.key().as_bytes()
    }

    /// Whether the game reports a per-category score breakdown.
    #[must_use]
    pub const fn has_breakdown(self) -> bool {
        !matches!(self, Self::RocketSol)
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for GameKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.key() == key)
            .ok_or_else(|| format!("unknown game `{s}`"))
    }
}

/// Generation, integration, collision and scoring rules for one game.
///
/// Every method is a pure function of its arguments; the pipeline owns all
/// state and drives ticks in order.
pub trait GameRules {
    const KIND: GameKind;

    type Course: Serialize + Clone + PartialEq + fmt::Debug + Send + Sync;
    type Event: TraceEvent + Send + Sync;
    type State: Clone + fmt::Debug;

    /// Build the course by drawing from this game's derived stream.
    fn generate(stream: &mut RandomStream) -> Self::Course;

    fn initial_state(course: &Self::Course) -> Self::State;

    /// Advance one tick.
    ///
    /// # Errors
    ///
    /// Returns [`EngineFault`] when checked arithmetic overflows.
    fn step(
        state: &mut Self::State,
        course: &Self::Course,
        input: TickInput<'_, Self::Event>,
        tick: u32,
    ) -> Result<StepResult, EngineFault>;

    /// Whole points earned so far.
    fn score(state: &Self::State) -> i64;

    /// Per-category points, for games that report them.
    fn breakdown(_state: &Self::State) -> Option<Breakdown> {
        None
    }
}
