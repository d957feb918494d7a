use super::{Coin, DriveHardCourse, START_SPEED, Tier, Vehicle, VehicleKind, advance};
use crate::constants::{
    DH_CLEAR_LANE_WINDOW, DH_COIN_INTERVAL_EXTRA, DH_COIN_INTERVAL_MIN, DH_COIN_POOL,
    DH_COIN_SPACING, DH_DESPAWN_DISTANCE, DH_FINISH_DISTANCE, DH_FIRST_COIN_TICKS,
    DH_FIRST_SPAWN_TICKS, DH_MEDIUM_TRAIL_OFFSET, DH_OBSTACLE_POOL, DH_SPAWN_DISTANCE,
};
use crate::numbers::usize_to_u32;
use crate::seed::RandomStream;

/// Traffic pattern odds per mille, tried from the current tier downward.
const NIGHTMARE_ODDS: u32 = 550;
const NIGHTMARE_THIRD_ODDS: u32 = 400;
const INSANE_ODDS: u32 = 600;
const HARD_ODDS: u32 = 550;
const MEDIUM_ODDS: u32 = 450;

const COIN_GROUP_MIN: usize = 2;
const COIN_GROUP_EXTRA: u32 = 4;

/// `(min, extra)` ticks between traffic spawns.
const fn spawn_interval(tier: Tier) -> (i64, i64) {
    match tier {
        Tier::Nightmare => (34, 26),
        Tier::Insane => (43, 42),
        Tier::Hard => (54, 54),
        Tier::Medium => (70, 72),
        Tier::Easy => (96, 120),
    }
}

struct Spawner<'s> {
    stream: &'s mut RandomStream,
    vehicles: Vec<Vehicle>,
    coins: Vec<Coin>,
    /// Distance at the start of the current tick.
    distance: i64,
}

/// Replay the distance timeline, spawning traffic and coin groups ahead.
pub(super) fn generate(stream: &mut RandomStream) -> DriveHardCourse {
    let mut spawner = Spawner {
        stream,
        vehicles: Vec::new(),
        coins: Vec::new(),
        distance: 0,
    };
    let mut speed = START_SPEED;
    let mut spawn_timer = DH_FIRST_SPAWN_TICKS;
    let mut coin_timer = DH_FIRST_COIN_TICKS;

    while spawner.distance + DH_SPAWN_DISTANCE < DH_FINISH_DISTANCE {
        let before = spawner.distance;
        let (after, next_speed) = advance(before, speed);
        speed = next_speed;

        spawn_timer -= 1;
        if spawn_timer <= 0 {
            let tier = Tier::at(before);
            spawner.spawn_pattern(tier);
            let (min, extra) = spawn_interval(tier);
            spawn_timer = min + spawner.stream.next_in_range(0, extra);
        }

        coin_timer -= 1;
        if coin_timer <= 0 {
            spawner.spawn_coin_group();
            coin_timer = DH_COIN_INTERVAL_MIN + spawner.stream.next_in_range(0, DH_COIN_INTERVAL_EXTRA);
        }

        spawner.distance = after;
    }

    let Spawner {
        mut vehicles,
        mut coins,
        ..
    } = spawner;
    vehicles.sort_by_key(|v| v.track);
    coins.sort_by_key(|c| c.track);
    DriveHardCourse {
        vehicles,
        coins,
        finish_distance: DH_FINISH_DISTANCE,
    }
}

impl Spawner<'_> {
    fn spawn_pattern(&mut self, tier: Tier) {
        if tier >= Tier::Nightmare && self.stream.chance(NIGHTMARE_ODDS) {
            let mut lanes = [0u8, 1, 2];
            for i in (1..lanes.len()).rev() {
                let j = self.stream.next_below(usize_to_u32(i + 1)) as usize;
                lanes.swap(i, j);
            }
            self.spawn_vehicle(lanes[0], 0);
            let second = -(2_500 + self.stream.next_in_range(0, 3_000));
            self.spawn_vehicle(lanes[1], second);
            if self.stream.chance(NIGHTMARE_THIRD_ODDS) {
                let third = -(6_000 + self.stream.next_in_range(0, 3_000));
                self.spawn_vehicle(lanes[2], third);
            }
        } else if tier >= Tier::Insane && self.stream.chance(INSANE_ODDS) {
            let gap = self.draw_lane(3);
            for lane in (0..3).filter(|lane| *lane != gap) {
                self.spawn_vehicle(lane, 0);
            }
        } else if tier >= Tier::Hard && self.stream.chance(HARD_ODDS) {
            let start = self.draw_lane(2);
            self.spawn_vehicle(start, 0);
            self.spawn_vehicle(start + 1, 0);
        } else if tier >= Tier::Medium && self.stream.chance(MEDIUM_ODDS) {
            let first = self.draw_lane(3);
            let mut second = self.draw_lane(2);
            if second >= first {
                second += 1;
            }
            self.spawn_vehicle(first, 0);
            self.spawn_vehicle(second, -DH_MEDIUM_TRAIL_OFFSET);
        } else {
            let lane = self.draw_lane(3);
            self.spawn_vehicle(lane, 0);
        }
    }

    fn draw_lane(&mut self, choices: u32) -> u8 {
        u8::try_from(self.stream.next_below(choices)).unwrap_or(0)
    }

    /// Place a vehicle unless the pool is full. `offset` pushes it further ahead when negative.
    fn spawn_vehicle(&mut self, lane: u8, offset: i64) {
        let live = self
            .vehicles
            .iter()
            .filter(|v| self.distance - v.track <= DH_DESPAWN_DISTANCE)
            .count();
        if live >= DH_OBSTACLE_POOL {
            return;
        }
        let kind_index = self.stream.next_below(usize_to_u32(VehicleKind::ALL.len())) as usize;
        let kind = VehicleKind::ALL
            .get(kind_index)
            .copied()
            .unwrap_or(VehicleKind::Taxi);
        self.vehicles.push(Vehicle {
            kind,
            lane,
            track: self.distance + DH_SPAWN_DISTANCE - offset,
        });
    }

    fn spawn_coin_group(&mut self) {
        let clear: Vec<u8> = (0u8..3).filter(|lane| self.lane_is_clear(*lane)).collect();
        if clear.is_empty() {
            return;
        }
        let pick = self.stream.next_below(usize_to_u32(clear.len())) as usize;
        let Some(&lane) = clear.get(pick) else {
            return;
        };
        let count = COIN_GROUP_MIN + self.stream.next_below(COIN_GROUP_EXTRA) as usize;
        for i in 0..count {
            let live = self
                .coins
                .iter()
                .filter(|c| self.distance - c.track <= DH_DESPAWN_DISTANCE)
                .count();
            if live >= DH_COIN_POOL {
                break;
            }
            let step = i64::try_from(i).unwrap_or(0) * DH_COIN_SPACING;
            self.coins.push(Coin {
                lane,
                track: self.distance + DH_SPAWN_DISTANCE + step,
            });
        }
    }

    fn lane_is_clear(&self, lane: u8) -> bool {
        !self.vehicles.iter().any(|v| {
            let z = self.distance - v.track;
            v.lane == lane
                && z <= DH_DESPAWN_DISTANCE
                && (z + DH_SPAWN_DISTANCE).abs() < DH_CLEAR_LANE_WINDOW
        })
    }
}
