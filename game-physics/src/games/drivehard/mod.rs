//! DriveHard: three-lane traffic dodging with coins and near-miss bonuses.
//!
//! Distances are milli-metres. A vehicle or coin is placed by its `track`
//! position; its z relative to the player is `distance - track`, so it
//! approaches from negative z and despawns behind the player.

mod generator;
mod physics;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DH_BASE_SPEED, DH_LANES, DH_MAX_SPEED, DH_MULT_DEFAULT, DH_MULT_HARD, DH_MULT_INSANE,
    DH_MULT_NIGHTMARE, DH_TIER_HARD, DH_TIER_INSANE, DH_TIER_MEDIUM, DH_TIER_NIGHTMARE,
    TICKS_PER_SEC,
};
use crate::games::{GameKind, GameRules};
use crate::numbers::MILLI;
use crate::reconcile::Breakdown;
use crate::seed::RandomStream;
use crate::sim::{EngineFault, StepResult};
use crate::trace::{TickInput, TraceEvent};

pub use physics::DriveHardState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleKind {
    Taxi,
    Bus,
    Truck,
    Sports,
    Van,
    Ambulance,
}

impl VehicleKind {
    pub const ALL: [Self; 6] = [
        Self::Taxi,
        Self::Bus,
        Self::Truck,
        Self::Sports,
        Self::Van,
        Self::Ambulance,
    ];

    /// Largest half-depth of any vehicle.
    pub const MAX_HALF_DEPTH: i64 = 2_000;

    /// Collision half-width and half-depth.
    #[must_use]
    pub const fn half_extents(self) -> (i64, i64) {
        match self {
            Self::Taxi => (750, 1_400),
            Self::Bus => (900, 2_000),
            Self::Truck => (750, 700),
            Self::Sports => (750, 1_500),
            Self::Van => (800, 1_500),
            Self::Ambulance => (800, 1_600),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub kind: VehicleKind,
    pub lane: u8,
    pub track: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub lane: u8,
    pub track: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveHardCourse {
    pub vehicles: Vec<Vehicle>,
    pub coins: Vec<Coin>,
    pub finish_distance: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DriveHardEvent {
    pub frame: u32,
    /// Requested lane, 0 (left) to 2 (right).
    pub lane: u8,
}

impl TraceEvent for DriveHardEvent {
    fn frame(&self) -> u32 {
        self.frame
    }

    fn check_bounds(&self) -> Result<(), String> {
        if usize::from(self.lane) < DH_LANES.len() {
            Ok(())
        } else {
            Err(format!("lane {} outside 0..=2", self.lane))
        }
    }
}

/// Difficulty tier selected by whole metres travelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Tier {
    Easy,
    Medium,
    Hard,
    Insane,
    Nightmare,
}

impl Tier {
    pub(crate) const fn at(distance: i64) -> Self {
        let metres = distance / MILLI;
        if metres >= DH_TIER_NIGHTMARE {
            Self::Nightmare
        } else if metres >= DH_TIER_INSANE {
            Self::Insane
        } else if metres >= DH_TIER_HARD {
            Self::Hard
        } else if metres >= DH_TIER_MEDIUM {
            Self::Medium
        } else {
            Self::Easy
        }
    }

    const fn speed_multiplier(self) -> i64 {
        match self {
            Self::Nightmare => DH_MULT_NIGHTMARE,
            Self::Insane => DH_MULT_INSANE,
            Self::Hard => DH_MULT_HARD,
            Self::Easy | Self::Medium => DH_MULT_DEFAULT,
        }
    }
}

/// Advance one tick of the speed timeline, returning `(distance, speed)`.
pub(crate) fn advance(distance: i64, speed: i64) -> (i64, i64) {
    let distance = distance + speed / TICKS_PER_SEC;
    let mult = Tier::at(distance).speed_multiplier();
    let speed = (speed + mult / TICKS_PER_SEC).min(DH_MAX_SPEED);
    (distance, speed)
}

pub(crate) const START_SPEED: i64 = DH_BASE_SPEED;

/// World x of a lane centre.
pub(crate) fn lane_x(lane: u8) -> Option<i64> {
    DH_LANES.get(usize::from(lane)).copied()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DriveHard;

impl GameRules for DriveHard {
    const KIND: GameKind = GameKind::DriveHard;

    type Course = DriveHardCourse;
    type Event = DriveHardEvent;
    type State = DriveHardState;

    fn generate(stream: &mut RandomStream) -> Self::Course {
        generator::generate(stream)
    }

    fn initial_state(course: &Self::Course) -> Self::State {
        DriveHardState::new(course)
    }

    fn step(
        state: &mut Self::State,
        course: &Self::Course,
        input: TickInput<'_, Self::Event>,
        tick: u32,
    ) -> Result<StepResult, EngineFault> {
        state.step(course, input, tick)
    }

    fn score(state: &Self::State) -> i64 {
        state.score()
    }

    fn breakdown(state: &Self::State) -> Option<Breakdown> {
        Some(state.breakdown())
    }
}
