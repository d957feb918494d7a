use std::collections::VecDeque;

use super::{DriveHardCourse, DriveHardEvent, START_SPEED, VehicleKind, advance, lane_x};
use crate::constants::{
    DH_COIN_POINTS, DH_COIN_RADIUS, DH_DESPAWN_DISTANCE, DH_LANE_SWITCH_STEP, DH_LANES,
    DH_NEAR_MISS_AHEAD, DH_NEAR_MISS_COOLDOWN, DH_NEAR_MISS_DIST, DH_NEAR_MISS_POINTS,
    DH_PLAYER_HALF_D, DH_PLAYER_HALF_W, DH_START_LANE,
};
use crate::numbers::{MICRO, MILLI, ease_in_out_quad, mul_div, within_radius};
use crate::reconcile::Breakdown;
use crate::sim::{EngineFault, StepResult, checked_add};
use crate::trace::TickInput;

/// Mutable run state for one DriveHard replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveHardState {
    /// Lane the car is in or switching into.
    pub lane: u8,
    pub x: i64,
    pub speed: i64,
    pub distance: i64,
    /// Distance credited to the score as of the last completed tick.
    pub scored_distance: i64,
    pub coins: i64,
    pub near_miss_points: i64,
    queued_lane: u8,
    pending: VecDeque<i8>,
    switch_progress: i64,
    switch_from: i64,
    switch_to: i64,
    near_miss_cooldown: u32,
    vehicle_cursor: usize,
    coin_cursor: usize,
    collected: Vec<bool>,
}

impl DriveHardState {
    pub(super) fn new(course: &DriveHardCourse) -> Self {
        let start_x = DH_LANES[DH_START_LANE];
        let start_lane = u8::try_from(DH_START_LANE).unwrap_or(1);
        Self {
            lane: start_lane,
            x: start_x,
            speed: START_SPEED,
            distance: 0,
            scored_distance: 0,
            coins: 0,
            near_miss_points: 0,
            queued_lane: start_lane,
            pending: VecDeque::new(),
            switch_progress: MICRO,
            switch_from: start_x,
            switch_to: start_x,
            near_miss_cooldown: 0,
            vehicle_cursor: 0,
            coin_cursor: 0,
            collected: vec![false; course.coins.len()],
        }
    }

    #[must_use]
    pub const fn score(&self) -> i64 {
        self.scored_distance / MILLI + self.coins * DH_COIN_POINTS + self.near_miss_points
    }

    #[must_use]
    pub fn breakdown(&self) -> Breakdown {
        Breakdown::from([
            ("coins".to_string(), self.coins * DH_COIN_POINTS),
            ("distance".to_string(), self.scored_distance / MILLI),
            ("near_miss".to_string(), self.near_miss_points),
        ])
    }

    pub(super) fn step(
        &mut self,
        course: &DriveHardCourse,
        input: TickInput<'_, DriveHardEvent>,
        tick: u32,
    ) -> Result<StepResult, EngineFault> {
        if let TickInput::Event(event) = input {
            self.queue_lane(event.lane);
        }
        self.steer();

        let (distance, speed) = advance(self.distance, self.speed);
        self.distance = distance;
        self.speed = speed;

        if self.resolve_traffic(course, tick)? {
            return Ok(StepResult::Crash);
        }
        self.collect_coins(course);
        self.scored_distance = self.distance;

        if self.distance >= course.finish_distance {
            Ok(StepResult::Finish)
        } else {
            Ok(StepResult::Continue)
        }
    }

    /// Queue unit moves from the last queued lane toward `target`.
    fn queue_lane(&mut self, target: u8) {
        while self.queued_lane != target {
            if self.queued_lane < target {
                self.pending.push_back(1);
                self.queued_lane += 1;
            } else {
                self.pending.push_back(-1);
                self.queued_lane -= 1;
            }
        }
    }

    fn steer(&mut self) {
        if self.switch_progress >= MICRO {
            if let Some(dir) = self.pending.pop_front() {
                let next = i16::from(self.lane) + i16::from(dir);
                let next_x = u8::try_from(next).ok().and_then(|lane| lane_x(lane).map(|x| (lane, x)));
                if let Some((lane, x)) = next_x {
                    self.lane = lane;
                    self.switch_from = self.x;
                    self.switch_to = x;
                    self.switch_progress = 0;
                }
            }
        }

        if self.switch_progress < MICRO {
            self.switch_progress += DH_LANE_SWITCH_STEP;
            if self.switch_progress >= MICRO {
                self.switch_progress = MICRO;
                self.x = self.switch_to;
            } else {
                let ease = ease_in_out_quad(self.switch_progress);
                self.x = self.switch_from + mul_div(self.switch_to - self.switch_from, ease, MICRO);
            }
        }
    }

    /// Returns `true` on collision.
    fn resolve_traffic(&mut self, course: &DriveHardCourse, tick: u32) -> Result<bool, EngineFault> {
        while let Some(vehicle) = course.vehicles.get(self.vehicle_cursor) {
            if self.distance - vehicle.track > DH_DESPAWN_DISTANCE {
                self.vehicle_cursor += 1;
            } else {
                break;
            }
        }

        let reach = DH_PLAYER_HALF_D + VehicleKind::MAX_HALF_DEPTH;
        let mut index = self.vehicle_cursor;
        while let Some(vehicle) = course.vehicles.get(index) {
            let z = self.distance - vehicle.track;
            if z <= -reach {
                break;
            }
            index += 1;
            let Some(vx) = lane_x(vehicle.lane) else {
                continue;
            };
            let (half_w, half_d) = vehicle.kind.half_extents();
            let dx = (vx - self.x).abs();
            let side = DH_PLAYER_HALF_W + half_w;
            if dx < side && z.abs() < DH_PLAYER_HALF_D + half_d {
                return Ok(true);
            }

            let alongside = z > -DH_PLAYER_HALF_D && z < DH_PLAYER_HALF_D + DH_NEAR_MISS_AHEAD;
            let lateral = dx - side;
            if alongside && lateral > 0 && lateral < DH_NEAR_MISS_DIST && self.near_miss_cooldown == 0 {
                self.near_miss_points =
                    checked_add(self.near_miss_points, DH_NEAR_MISS_POINTS, "near_miss", tick)?;
                self.near_miss_cooldown = DH_NEAR_MISS_COOLDOWN;
            }
        }

        self.near_miss_cooldown = self.near_miss_cooldown.saturating_sub(1);
        Ok(false)
    }

    fn collect_coins(&mut self, course: &DriveHardCourse) {
        while let Some(coin) = course.coins.get(self.coin_cursor) {
            if self.distance - coin.track > DH_DESPAWN_DISTANCE {
                self.coin_cursor += 1;
            } else {
                break;
            }
        }

        let mut index = self.coin_cursor;
        while let Some(coin) = course.coins.get(index) {
            let z = self.distance - coin.track;
            if z <= -DH_COIN_RADIUS {
                break;
            }
            let fresh = !self.collected.get(index).copied().unwrap_or(true);
            let near = lane_x(coin.lane).is_some_and(|cx| within_radius(cx - self.x, z, DH_COIN_RADIUS));
            if fresh && near {
                if let Some(flag) = self.collected.get_mut(index) {
                    *flag = true;
                }
                self.coins += 1;
            }
            index += 1;
        }
    }
}
