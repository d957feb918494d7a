//! RocketSol: a side-scrolling rocket threading pipe and laser gaps.
//!
//! Coordinates are milli-pixels with y growing downward. Scroll speed ramps
//! with elapsed ticks only, so the course timeline is independent of play.

mod generator;
mod physics;

use serde::{Deserialize, Serialize};

use crate::constants::{RS_BASE_SPEED, RS_SPEED_GAIN, RS_SPEED_RAMP_TICKS};
use crate::games::{GameKind, GameRules};
use crate::numbers::{mul_div, u32_to_i64};
use crate::seed::RandomStream;
use crate::sim::{EngineFault, StepResult};
use crate::trace::{TickInput, TraceEvent};

pub use physics::RocketSolState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleKind {
    Pipe,
    Laser,
}

/// A vertical column with a passable gap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    /// World x of the left edge.
    pub x: i64,
    pub width: i64,
    /// Top of the gap.
    pub gap_y: i64,
    pub gap: i64,
}

/// A collectible that widens the gap of the obstacle it leads into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ring {
    pub x: i64,
    pub y: i64,
    /// Index of the linked obstacle.
    pub obstacle: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RocketSolCourse {
    pub obstacles: Vec<Obstacle>,
    pub rings: Vec<Ring>,
    pub finish_x: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RocketSolEvent {
    pub frame: u32,
    pub thrust: bool,
}

impl TraceEvent for RocketSolEvent {
    fn frame(&self) -> u32 {
        self.frame
    }

    fn check_bounds(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Scroll speed in milli-pixels per tick at `tick`.
pub(crate) fn scroll_speed(tick: u32) -> i64 {
    let ramp = u32_to_i64(tick).min(RS_SPEED_RAMP_TICKS);
    RS_BASE_SPEED + mul_div(ramp, RS_SPEED_GAIN, RS_SPEED_RAMP_TICKS)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RocketSol;

impl GameRules for RocketSol {
    const KIND: GameKind = GameKind::RocketSol;

    type Course = RocketSolCourse;
    type Event = RocketSolEvent;
    type State = RocketSolState;

    fn generate(stream: &mut RandomStream) -> Self::Course {
        generator::generate(stream)
    }

    fn initial_state(course: &Self::Course) -> Self::State {
        RocketSolState::new(course)
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
}
