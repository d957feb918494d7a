use super::{RocketSolCourse, RocketSolEvent, scroll_speed};
use crate::constants::{
    RS_CEIL_Y, RS_DISTANCE_POINTS_DIVISOR, RS_GRAVITY, RS_GROUND_Y, RS_HIT_H, RS_HIT_OFFSET_X,
    RS_HIT_OFFSET_Y, RS_HIT_W, RS_MAX_VY, RS_MIN_VY, RS_PASS_POINTS, RS_PLAYER_MARGIN,
    RS_PLAYER_START_Y, RS_PLAYER_X, RS_RING_COLLECT_DIST, RS_RING_GAP_BOOST, RS_RING_POINTS,
    RS_THRUST,
};
use crate::numbers::{MILLI, milli, within_radius};
use crate::sim::{EngineFault, StepResult, checked_add};
use crate::trace::TickInput;

/// Mutable run state for one RocketSol replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RocketSolState {
    pub py: i64,
    pub vy: i64,
    pub scroll: i64,
    pub thrusting: bool,
    /// Score in milli-points.
    pub points: i64,
    pub obstacles_passed: u32,
    pub rings_collected: u32,
    obstacle_cursor: usize,
    ring_cursor: usize,
    passed: Vec<bool>,
    collected: Vec<bool>,
    gap_bonus: Vec<i64>,
}

impl RocketSolState {
    pub(super) fn new(course: &RocketSolCourse) -> Self {
        Self {
            py: RS_PLAYER_START_Y,
            vy: 0,
            scroll: 0,
            thrusting: false,
            points: 0,
            obstacles_passed: 0,
            rings_collected: 0,
            obstacle_cursor: 0,
            ring_cursor: 0,
            passed: vec![false; course.obstacles.len()],
            collected: vec![false; course.rings.len()],
            gap_bonus: vec![0; course.obstacles.len()],
        }
    }

    #[must_use]
    pub const fn score(&self) -> i64 {
        self.points / MILLI
    }

    pub(super) fn step(
        &mut self,
        course: &RocketSolCourse,
        input: TickInput<'_, RocketSolEvent>,
        tick: u32,
    ) -> Result<StepResult, EngineFault> {
        match input {
            TickInput::Event(event) => self.thrusting = event.thrust,
            TickInput::Hold => {}
            TickInput::Neutral => self.thrusting = false,
        }
        let spd = scroll_speed(tick);

        self.integrate();
        self.scroll = checked_add(self.scroll, spd, "scroll", tick)?;

        if self.resolve_obstacles(course, tick)? {
            return Ok(StepResult::Crash);
        }
        self.collect_rings(course, tick)?;
        self.points = checked_add(self.points, spd / RS_DISTANCE_POINTS_DIVISOR, "points", tick)?;

        if self.scroll + RS_PLAYER_X >= course.finish_x {
            Ok(StepResult::Finish)
        } else {
            Ok(StepResult::Continue)
        }
    }

    fn integrate(&mut self) {
        let accel = if self.thrusting { RS_THRUST } else { RS_GRAVITY };
        self.vy = (self.vy + accel).clamp(RS_MIN_VY, RS_MAX_VY);
        self.py += self.vy;

        let top = RS_CEIL_Y + RS_PLAYER_MARGIN;
        let bottom = RS_GROUND_Y - RS_PLAYER_MARGIN;
        if self.py < top {
            self.py = top;
            self.vy = self.vy.max(0);
        }
        if self.py > bottom {
            self.py = bottom;
            self.vy = self.vy.min(0);
        }
    }

    /// Returns `true` on collision.
    fn resolve_obstacles(&mut self, course: &RocketSolCourse, tick: u32) -> Result<bool, EngineFault> {
        let hit_left = RS_PLAYER_X + RS_HIT_OFFSET_X;
        let hit_right = hit_left + RS_HIT_W;
        let hit_top = self.py + RS_HIT_OFFSET_Y;
        let hit_bottom = hit_top + RS_HIT_H;

        let mut index = self.obstacle_cursor;
        while let Some(obstacle) = course.obstacles.get(index) {
            let x = obstacle.x - self.scroll;
            if x >= hit_right {
                break;
            }
            if self.passed.get(index).copied().unwrap_or(true) {
                index += 1;
                continue;
            }
            let overlaps = hit_left < x + obstacle.width;
            if overlaps {
                let bonus = self.gap_bonus.get(index).copied().unwrap_or(0);
                let gap_top = obstacle.gap_y;
                let gap_bottom = gap_top + obstacle.gap + bonus;
                if hit_top < gap_top || hit_bottom > gap_bottom {
                    return Ok(true);
                }
            }
            if x + obstacle.width < RS_PLAYER_X {
                if let Some(flag) = self.passed.get_mut(index) {
                    *flag = true;
                }
                self.obstacles_passed += 1;
                self.points = checked_add(self.points, milli(RS_PASS_POINTS), "points", tick)?;
            }
            index += 1;
        }

        while self.passed.get(self.obstacle_cursor).copied().unwrap_or(false) {
            self.obstacle_cursor += 1;
        }
        Ok(false)
    }

    fn collect_rings(&mut self, course: &RocketSolCourse, tick: u32) -> Result<(), EngineFault> {
        while let Some(ring) = course.rings.get(self.ring_cursor) {
            if ring.x - self.scroll - RS_PLAYER_X < -RS_RING_COLLECT_DIST {
                self.ring_cursor += 1;
            } else {
                break;
            }
        }

        let mut index = self.ring_cursor;
        while let Some(ring) = course.rings.get(index) {
            let dx = ring.x - self.scroll - RS_PLAYER_X;
            if dx > RS_RING_COLLECT_DIST {
                break;
            }
            let fresh = !self.collected.get(index).copied().unwrap_or(true);
            if fresh && within_radius(dx, ring.y - self.py, RS_RING_COLLECT_DIST) {
                if let Some(flag) = self.collected.get_mut(index) {
                    *flag = true;
                }
                if let Some(bonus) = self.gap_bonus.get_mut(ring.obstacle) {
                    *bonus += RS_RING_GAP_BOOST;
                }
                self.rings_collected += 1;
                self.points = checked_add(self.points, milli(RS_RING_POINTS), "points", tick)?;
            }
            index += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::rocketsol::{Obstacle, ObstacleKind, Ring};

    fn course(obstacles: Vec<Obstacle>, rings: Vec<Ring>, finish_x: i64) -> RocketSolCourse {
        RocketSolCourse {
            obstacles,
            rings,
            finish_x,
        }
    }

    fn run(state: &mut RocketSolState, course: &RocketSolCourse, ticks: u32) -> (u32, StepResult) {
        for tick in 1..=ticks {
            let result = state.step(course, TickInput::Neutral, tick).unwrap();
            if result != StepResult::Continue {
                return (tick, result);
            }
        }
        (ticks, StepResult::Continue)
    }

    #[test]
    fn gravity_pins_to_ground() {
        let empty = course(Vec::new(), Vec::new(), i64::MAX / 2);
        let mut state = RocketSolState::new(&empty);
        run(&mut state, &empty, 200);
        assert_eq!(state.py, RS_GROUND_Y - RS_PLAYER_MARGIN);
        assert_eq!(state.vy, 0);
    }

    #[test]
    fn thrust_pins_to_ceiling() {
        let empty = course(Vec::new(), Vec::new(), i64::MAX / 2);
        let mut state = RocketSolState::new(&empty);
        let up = RocketSolEvent {
            frame: 1,
            thrust: true,
        };
        state.step(&empty, TickInput::Event(&up), 1).unwrap();
        for tick in 2..200 {
            state.step(&empty, TickInput::Hold, tick).unwrap();
        }
        assert_eq!(state.py, RS_CEIL_Y + RS_PLAYER_MARGIN);
        assert!(state.thrusting);
    }

    #[test]
    fn wide_gap_is_passed_for_points() {
        let open = Obstacle {
            kind: ObstacleKind::Pipe,
            x: 1_500_000,
            width: 50_000,
            gap_y: 0,
            gap: 700_000,
        };
        let c = course(vec![open], Vec::new(), 3_000_000);
        let mut state = RocketSolState::new(&c);
        let (_, result) = run(&mut state, &c, 1000);
        assert_eq!(result, StepResult::Finish);
        assert_eq!(state.obstacles_passed, 1);
        assert!(state.points >= milli(RS_PASS_POINTS));
    }

    #[test]
    fn closed_gap_crashes_without_tick_accrual() {
        let wall = Obstacle {
            kind: ObstacleKind::Laser,
            x: 400_000,
            width: 50_000,
            gap_y: 0,
            gap: 10_000,
        };
        let c = course(vec![wall], Vec::new(), i64::MAX / 2);
        let mut state = RocketSolState::new(&c);
        let (tick, result) = run(&mut state, &c, 1000);
        assert_eq!(result, StepResult::Crash);
        let accrued: i64 = (1..tick).map(|t| scroll_speed(t) / RS_DISTANCE_POINTS_DIVISOR).sum();
        assert_eq!(state.points, accrued);
    }

    #[test]
    fn ring_widens_linked_gap() {
        let ring = Ring {
            x: 600_000,
            y: RS_GROUND_Y - RS_PLAYER_MARGIN,
            obstacle: 0,
        };
        let wall = Obstacle {
            kind: ObstacleKind::Pipe,
            x: 5_000_000,
            width: 50_000,
            gap_y: 500_000,
            gap: 80_000,
        };
        let c = course(vec![wall], vec![ring], i64::MAX / 2);
        let mut state = RocketSolState::new(&c);
        run(&mut state, &c, 300);
        assert_eq!(state.rings_collected, 1);
        assert_eq!(state.gap_bonus[0], RS_RING_GAP_BOOST);
    }
}
