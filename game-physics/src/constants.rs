//! Tuning constants for the three games, expressed in milli-units.
//!
//! Values mirror the shipped clients. Time is counted in fixed 120 Hz ticks.

pub(crate) const TICKS_PER_SEC: i64 = 120;

// RocketSol (screen pixels, y grows downward)
pub(crate) const RS_GROUND_Y: i64 = 660_000;
pub(crate) const RS_CEIL_Y: i64 = 60_000;
pub(crate) const RS_PLAYER_X: i64 = 192_000;
pub(crate) const RS_PLAYER_START_Y: i64 = 360_000;
pub(crate) const RS_PLAYER_MARGIN: i64 = 30_000;
pub(crate) const RS_HIT_OFFSET_X: i64 = -12_000;
pub(crate) const RS_HIT_OFFSET_Y: i64 = -25_000;
pub(crate) const RS_HIT_W: i64 = 24_000;
pub(crate) const RS_HIT_H: i64 = 50_000;
pub(crate) const RS_GRAVITY: i64 = 400;
pub(crate) const RS_THRUST: i64 = -850;
pub(crate) const RS_MIN_VY: i64 = -10_000;
pub(crate) const RS_MAX_VY: i64 = 12_000;
pub(crate) const RS_BASE_SPEED: i64 = 10_000;
pub(crate) const RS_SPEED_GAIN: i64 = 20_000;
pub(crate) const RS_SPEED_RAMP_TICKS: i64 = 6_000;
pub(crate) const RS_SPAWN_X: i64 = 1_340_000;
pub(crate) const RS_FIRST_OBSTACLE_DIST: i64 = 500_000;
pub(crate) const RS_MIN_OBSTACLE_SPACING: i64 = 320_000;
pub(crate) const RS_OBSTACLE_SPACING: i64 = 500_000;
pub(crate) const RS_MIN_GAP: i64 = 160_000;
pub(crate) const RS_BASE_GAP: i64 = 240_000;
pub(crate) const RS_GAP_TOP_MARGIN: i64 = 100_000;
pub(crate) const RS_GAP_SLACK: i64 = 200_000;
pub(crate) const RS_MIN_WIDTH: i64 = 50_000;
pub(crate) const RS_MAX_WIDTH: i64 = 80_000;
pub(crate) const RS_PIPE_PER_MILLE: u32 = 700;
pub(crate) const RS_RING_TOP_MARGIN: i64 = 120_000;
pub(crate) const RS_RING_NEAR_OFFSET: i64 = 900_000;
pub(crate) const RS_RING_FAR_OFFSET: i64 = 600_000;
pub(crate) const RS_RING_JITTER: i64 = 100_000;
pub(crate) const RS_RING_COLLECT_DIST: i64 = 55_000;
pub(crate) const RS_RING_GAP_BOOST: i64 = 50_000;
pub(crate) const RS_OBSTACLE_COUNT: usize = 60;
pub(crate) const RS_FINISH_MARGIN: i64 = 400_000;
pub(crate) const RS_PASS_POINTS: i64 = 50;
pub(crate) const RS_RING_POINTS: i64 = 200;
/// Continuous points per tick are `spd / RS_DISTANCE_POINTS_DIVISOR` milli-points.
pub(crate) const RS_DISTANCE_POINTS_DIVISOR: i64 = 200;

// DriveHard (metres, z grows toward the camera)
pub(crate) const DH_LANES: [i64; 3] = [-3_200, 0, 3_200];
pub(crate) const DH_START_LANE: usize = 1;
pub(crate) const DH_BASE_SPEED: i64 = 24_000;
pub(crate) const DH_MAX_SPEED: i64 = 72_000;
/// Lane switch progress per tick on a `MICRO` scale (0.11 s switch).
pub(crate) const DH_LANE_SWITCH_STEP: i64 = 75_757;
pub(crate) const DH_SPAWN_DISTANCE: i64 = 90_000;
pub(crate) const DH_DESPAWN_DISTANCE: i64 = 15_000;
pub(crate) const DH_PLAYER_HALF_W: i64 = 650;
pub(crate) const DH_PLAYER_HALF_D: i64 = 1_300;
pub(crate) const DH_NEAR_MISS_DIST: i64 = 500;
pub(crate) const DH_NEAR_MISS_AHEAD: i64 = 1_000;
pub(crate) const DH_NEAR_MISS_POINTS: i64 = 25;
pub(crate) const DH_NEAR_MISS_COOLDOWN: u32 = 60;
pub(crate) const DH_COIN_RADIUS: i64 = 1_600;
pub(crate) const DH_COIN_POINTS: i64 = 50;
pub(crate) const DH_COIN_SPACING: i64 = 2_200;
pub(crate) const DH_CLEAR_LANE_WINDOW: i64 = 15_000;
pub(crate) const DH_OBSTACLE_POOL: usize = 12;
pub(crate) const DH_COIN_POOL: usize = 15;
pub(crate) const DH_FIRST_SPAWN_TICKS: i64 = 144;
pub(crate) const DH_FIRST_COIN_TICKS: i64 = 96;
pub(crate) const DH_COIN_INTERVAL_MIN: i64 = 144;
pub(crate) const DH_COIN_INTERVAL_EXTRA: i64 = 216;
pub(crate) const DH_FINISH_DISTANCE: i64 = 3_000_000;
pub(crate) const DH_TIER_MEDIUM: i64 = 200;
pub(crate) const DH_TIER_HARD: i64 = 550;
pub(crate) const DH_TIER_INSANE: i64 = 1_100;
pub(crate) const DH_TIER_NIGHTMARE: i64 = 2_000;
pub(crate) const DH_MULT_DEFAULT: i64 = 750;
pub(crate) const DH_MULT_HARD: i64 = 850;
pub(crate) const DH_MULT_INSANE: i64 = 1_050;
pub(crate) const DH_MULT_NIGHTMARE: i64 = 1_350;
pub(crate) const DH_MEDIUM_TRAIL_OFFSET: i64 = 4_500;

// Warp (arena units centred on the origin)
pub(crate) const WARP_ARENA_W: i64 = 9_000;
pub(crate) const WARP_ARENA_H: i64 = 6_000;
pub(crate) const WARP_PLAYER_R: i64 = 350;
pub(crate) const WARP_HIT_R: i64 = 240;
pub(crate) const WARP_V0: i64 = 18_000;
pub(crate) const WARP_VMAX: i64 = 52_000;
pub(crate) const WARP_TOUCH_LERP: i64 = 16;
pub(crate) const WARP_TOUCH_CLAMP: i64 = 38_000;
pub(crate) const WARP_DAMPING_PERCENT: i64 = 87;
pub(crate) const WARP_BOUNCE_NUM: i64 = -3;
pub(crate) const WARP_BOUNCE_DEN: i64 = 10;
pub(crate) const WARP_BOUND_PAD: i64 = 50;
pub(crate) const WARP_TARGET_PAD: i64 = 100;
pub(crate) const WARP_TARGET_Y_BIAS: i64 = 150;
pub(crate) const WARP_LOOKAHEAD_WALLS: i64 = 16;
pub(crate) const WARP_GAP_START: i64 = 4_400;
pub(crate) const WARP_GAP_END: i64 = 2_200;
pub(crate) const WARP_SPACE_START: i64 = 22_000;
pub(crate) const WARP_SPACE_END: i64 = 8_000;
pub(crate) const WARP_MAX_GAP_SHIFT: i64 = 5_500;
pub(crate) const WARP_GAP_EDGE: i64 = 300;
pub(crate) const WARP_FIRST_WALL: i64 = 15_000;
pub(crate) const WARP_DIFFICULTY_SPAN: i64 = 70;
pub(crate) const WARP_MIN_PART: i64 = 150;
pub(crate) const WARP_COLLISION_WINDOW: i64 = 600;
pub(crate) const WARP_PASS_DISTANCE: i64 = 1_000;
pub(crate) const WARP_WALL_POINTS: i64 = 10;
pub(crate) const WARP_COMBO_POINTS: i64 = 2;
pub(crate) const WARP_WALL_COUNT: usize = 100;
pub(crate) const WARP_BLOCKER_MIN_W: i64 = 600;
pub(crate) const WARP_BLOCKER_EXTRA_W: i64 = 800;
pub(crate) const WARP_BLOCKER_MIN_H: i64 = 500;
pub(crate) const WARP_BLOCKER_EXTRA_H: i64 = 600;
