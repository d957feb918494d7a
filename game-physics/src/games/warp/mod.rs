//! Warp: steer through slotted walls rushing down a tunnel.
//!
//! The arena is centred on the origin in milli-units. Walls sit at `track`
//! positions; a wall's z relative to the ship is `distance - track`.

mod generator;
mod physics;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::constants::{
    WARP_DIFFICULTY_SPAN, WARP_GAP_END, WARP_GAP_START, WARP_LOOKAHEAD_WALLS, WARP_SPACE_END,
    WARP_SPACE_START, WARP_V0, WARP_VMAX,
};
use crate::games::{GameKind, GameRules};
use crate::numbers::{MICRO, mul_div};
use crate::reconcile::Breakdown;
use crate::seed::RandomStream;
use crate::sim::{EngineFault, StepResult};
use crate::trace::{TickInput, TraceEvent};

pub use physics::WarpState;

/// Normalised touch coordinates span `[-INPUT_RANGE, INPUT_RANGE]`.
pub const INPUT_RANGE: i64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WallKind {
    HorizontalSlit,
    VerticalSlit,
    LShape,
    DualHorizontalSlit,
}

/// Axis-aligned solid box, by centre and full size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallPart {
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wall {
    pub kind: WallKind,
    pub track: i64,
    pub gap_x: i64,
    pub gap_y: i64,
    pub gap: i64,
    /// Whether a blocker box sits inside the gap.
    pub blocked: bool,
    pub parts: SmallVec<[WallPart; 4]>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarpCourse {
    pub walls: Vec<Wall>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WarpEvent {
    pub frame: u32,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i64>,
}

impl TraceEvent for WarpEvent {
    fn frame(&self) -> u32 {
        self.frame
    }

    fn check_bounds(&self) -> Result<(), String> {
        let range = -INPUT_RANGE..=INPUT_RANGE;
        for (name, value) in [("x", self.x), ("y", self.y)] {
            match value {
                Some(v) if !range.contains(&v) => {
                    return Err(format!("{name} {v} outside -1000..=1000"));
                }
                None if self.active => {
                    return Err(format!("{name} is required while touch is active"));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Sigmoid difficulty of wall `index` in millionths.
pub(crate) fn difficulty(index: i64) -> i64 {
    let near = index * index;
    let far = (WARP_DIFFICULTY_SPAN - index) * (WARP_DIFFICULTY_SPAN - index);
    mul_div(10 * near, MICRO, 10 * near + 10 * far + 49).min(MICRO)
}

/// Forward speed once `passed` walls have been cleared.
pub(crate) fn speed_for(passed: i64) -> i64 {
    let d = difficulty(passed + WARP_LOOKAHEAD_WALLS);
    WARP_V0 + mul_div(d, WARP_VMAX - WARP_V0, MICRO)
}

pub(crate) fn gap_for(d: i64) -> i64 {
    WARP_GAP_START - mul_div(d, WARP_GAP_START - WARP_GAP_END, MICRO)
}

pub(crate) fn spacing_for(d: i64) -> i64 {
    WARP_SPACE_START - mul_div(d, WARP_SPACE_START - WARP_SPACE_END, MICRO)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Warp;

impl GameRules for Warp {
    const KIND: GameKind = GameKind::Warp;

    type Course = WarpCourse;
    type Event = WarpEvent;
    type State = WarpState;

    fn generate(stream: &mut RandomStream) -> Self::Course {
        generator::generate(stream)
    }

    fn initial_state(_course: &Self::Course) -> Self::State {
        WarpState::new()
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_curve_is_sigmoid() {
        assert_eq!(difficulty(0), 0);
        assert_eq!(difficulty(35), 499_001);
        assert!(difficulty(60) > 950_000);
        assert_eq!(difficulty(70), 999_000);
        assert!(difficulty(10) < difficulty(20));
        assert_eq!(speed_for(0), WARP_V0 + mul_div(difficulty(16), 34_000, MICRO));
    }

    #[test]
    fn gap_and_spacing_shrink() {
        assert_eq!(gap_for(0), WARP_GAP_START);
        assert_eq!(gap_for(MICRO), WARP_GAP_END);
        assert_eq!(spacing_for(0), WARP_SPACE_START);
        assert_eq!(spacing_for(MICRO), WARP_SPACE_END);
    }

    #[test]
    fn active_touch_needs_coordinates() {
        let released = WarpEvent {
            frame: 1,
            active: false,
            x: None,
            y: None,
        };
        assert!(released.check_bounds().is_ok());
        let missing = WarpEvent {
            active: true,
            ..released.clone()
        };
        assert!(missing.check_bounds().is_err());
        let wild = WarpEvent {
            frame: 1,
            active: true,
            x: Some(1_001),
            y: Some(0),
        };
        assert!(wild.check_bounds().is_err());
    }
}
