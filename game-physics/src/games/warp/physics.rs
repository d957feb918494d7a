use super::{Wall, WarpCourse, WarpEvent, speed_for};
use crate::constants::{
    TICKS_PER_SEC, WARP_ARENA_H, WARP_ARENA_W, WARP_BOUNCE_DEN, WARP_BOUNCE_NUM, WARP_BOUND_PAD,
    WARP_COLLISION_WINDOW, WARP_COMBO_POINTS, WARP_DAMPING_PERCENT, WARP_HIT_R,
    WARP_PASS_DISTANCE, WARP_PLAYER_R, WARP_TARGET_PAD, WARP_TARGET_Y_BIAS, WARP_TOUCH_CLAMP,
    WARP_TOUCH_LERP, WARP_WALL_POINTS,
};
use crate::numbers::{mul_div, u32_to_i64, usize_to_i64, within_radius};
use crate::reconcile::Breakdown;
use crate::sim::{EngineFault, StepResult, checked_add};
use crate::trace::TickInput;

const BOUND_X: i64 = WARP_ARENA_W / 2 - WARP_PLAYER_R - WARP_BOUND_PAD;
const BOUND_Y: i64 = WARP_ARENA_H / 2 - WARP_PLAYER_R - WARP_BOUND_PAD;
const TARGET_X: i64 = WARP_ARENA_W / 2 - WARP_PLAYER_R - WARP_TARGET_PAD;
const TARGET_Y: i64 = WARP_ARENA_H / 2 - WARP_PLAYER_R - WARP_TARGET_PAD;

/// Mutable run state for one Warp replay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarpState {
    pub px: i64,
    pub py: i64,
    pub vx: i64,
    pub vy: i64,
    pub distance: i64,
    pub walls_passed: u32,
    pub combo: u32,
    pub wall_points: i64,
    pub combo_points: i64,
    touching: bool,
    target: (i64, i64),
    cursor: usize,
}

impl WarpState {
    pub(super) fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn score(&self) -> i64 {
        self.wall_points + self.combo_points
    }

    #[must_use]
    pub fn breakdown(&self) -> Breakdown {
        Breakdown::from([
            ("combo".to_string(), self.combo_points),
            ("walls".to_string(), self.wall_points),
        ])
    }

    pub(super) fn step(
        &mut self,
        course: &WarpCourse,
        input: TickInput<'_, WarpEvent>,
        tick: u32,
    ) -> Result<StepResult, EngineFault> {
        match input {
            TickInput::Event(event) => self.apply_touch(event),
            TickInput::Hold => {}
            TickInput::Neutral => self.touching = false,
        }
        self.integrate();

        let speed = speed_for(u32_to_i64(self.walls_passed));
        self.distance = checked_add(self.distance, speed / TICKS_PER_SEC, "distance", tick)?;

        let mut index = self.cursor;
        while let Some(wall) = course.walls.get(index) {
            let z = self.distance - wall.track;
            if z <= -WARP_COLLISION_WINDOW {
                break;
            }
            if z < WARP_COLLISION_WINDOW && self.touches(wall) {
                return Ok(StepResult::Crash);
            }
            if index == self.cursor && z > WARP_PASS_DISTANCE {
                self.pass_wall(tick)?;
            }
            index += 1;
        }

        if self.cursor >= course.walls.len() {
            Ok(StepResult::Finish)
        } else {
            Ok(StepResult::Continue)
        }
    }

    fn apply_touch(&mut self, event: &WarpEvent) {
        match (event.active, event.x, event.y) {
            (true, Some(nx), Some(ny)) => {
                self.touching = true;
                self.target = (
                    mul_div(nx, TARGET_X, 1_000),
                    mul_div(ny + WARP_TARGET_Y_BIAS, TARGET_Y, 1_000),
                );
            }
            _ => {
                self.touching = false;
                self.target = (self.px, self.py);
            }
        }
    }

    fn integrate(&mut self) {
        if self.touching {
            let clamp = |v: i64| v.clamp(-WARP_TOUCH_CLAMP, WARP_TOUCH_CLAMP);
            self.vx = clamp((self.target.0 - self.px) * WARP_TOUCH_LERP);
            self.vy = clamp((self.target.1 - self.py) * WARP_TOUCH_LERP);
        } else {
            self.vx = self.vx * WARP_DAMPING_PERCENT / 100;
            self.vy = self.vy * WARP_DAMPING_PERCENT / 100;
        }
        self.px += self.vx / TICKS_PER_SEC;
        self.py += self.vy / TICKS_PER_SEC;

        let bounce = |v: i64| v * WARP_BOUNCE_NUM / WARP_BOUNCE_DEN;
        if self.px < -BOUND_X {
            self.px = -BOUND_X;
            self.vx = bounce(self.vx);
        }
        if self.px > BOUND_X {
            self.px = BOUND_X;
            self.vx = bounce(self.vx);
        }
        if self.py < -BOUND_Y {
            self.py = -BOUND_Y;
            self.vy = bounce(self.vy);
        }
        if self.py > BOUND_Y {
            self.py = BOUND_Y;
            self.vy = bounce(self.vy);
        }
    }

    /// Circle-versus-box test using the closest point on each part.
    fn touches(&self, wall: &Wall) -> bool {
        wall.parts.iter().any(|part| {
            let cx = self.px - part.x;
            let cy = self.py - part.y;
            let nx = cx.clamp(-part.w / 2, part.w / 2);
            let ny = cy.clamp(-part.h / 2, part.h / 2);
            within_radius(cx - nx, cy - ny, WARP_HIT_R)
        })
    }

    fn pass_wall(&mut self, tick: u32) -> Result<(), EngineFault> {
        self.cursor += 1;
        self.walls_passed += 1;
        self.combo += 1;
        self.wall_points = checked_add(self.wall_points, WARP_WALL_POINTS, "walls", tick)?;
        let bonus = WARP_COMBO_POINTS * u32_to_i64(self.combo);
        self.combo_points = checked_add(self.combo_points, bonus, "combo", tick)?;
        Ok(())
    }

    /// Walls remaining ahead of the ship.
    #[must_use]
    pub fn walls_left(&self, course: &WarpCourse) -> i64 {
        usize_to_i64(course.walls.len().saturating_sub(self.cursor))
    }
}
