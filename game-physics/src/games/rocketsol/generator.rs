use super::{Obstacle, ObstacleKind, Ring, RocketSolCourse, scroll_speed};
use crate::constants::{
    RS_BASE_GAP, RS_CEIL_Y, RS_FINISH_MARGIN, RS_FIRST_OBSTACLE_DIST, RS_GAP_SLACK,
    RS_GAP_TOP_MARGIN, RS_GROUND_Y, RS_MAX_WIDTH, RS_MIN_GAP, RS_MIN_OBSTACLE_SPACING,
    RS_MIN_WIDTH, RS_OBSTACLE_COUNT, RS_OBSTACLE_SPACING, RS_PIPE_PER_MILLE, RS_RING_FAR_OFFSET,
    RS_RING_JITTER, RS_RING_NEAR_OFFSET, RS_RING_TOP_MARGIN, RS_SPAWN_X,
};
use crate::seed::RandomStream;

/// Replay the scroll timeline and spawn obstacles with their ring pairs.
pub(super) fn generate(stream: &mut RandomStream) -> RocketSolCourse {
    let mut obstacles = Vec::with_capacity(RS_OBSTACLE_COUNT);
    let mut rings = Vec::with_capacity(RS_OBSTACLE_COUNT * 2);
    let mut tick: u32 = 0;
    let mut dist = 0i64;
    let mut scroll = 0i64;
    let mut next_spawn = RS_FIRST_OBSTACLE_DIST;

    while obstacles.len() < RS_OBSTACLE_COUNT {
        tick += 1;
        let spd = scroll_speed(tick);
        dist += spd / 10;
        if dist >= next_spawn {
            let index = obstacles.len();
            let obstacle = spawn_obstacle(stream, scroll + RS_SPAWN_X, spd);
            rings.push(spawn_ring(stream, obstacle.x - RS_RING_NEAR_OFFSET, index));
            rings.push(spawn_ring(stream, obstacle.x - RS_RING_FAR_OFFSET, index));
            obstacles.push(obstacle);
            next_spawn = dist + (RS_OBSTACLE_SPACING - spd * 8).max(RS_MIN_OBSTACLE_SPACING);
        }
        scroll += spd;
    }

    rings.sort_by_key(|ring| ring.x);
    let finish_x = obstacles
        .last()
        .map_or(RS_FINISH_MARGIN, |last| last.x + last.width + RS_FINISH_MARGIN);

    RocketSolCourse {
        obstacles,
        rings,
        finish_x,
    }
}

fn spawn_obstacle(stream: &mut RandomStream, x: i64, spd: i64) -> Obstacle {
    let gap = (RS_BASE_GAP - spd * 5).max(RS_MIN_GAP);
    let span = RS_GROUND_Y - RS_CEIL_Y;
    let gap_y = RS_CEIL_Y + RS_GAP_TOP_MARGIN + stream.next_in_range(0, span - gap - RS_GAP_SLACK);
    let width = stream.next_in_range(RS_MIN_WIDTH, RS_MAX_WIDTH);
    let kind = if stream.chance(RS_PIPE_PER_MILLE) {
        ObstacleKind::Pipe
    } else {
        ObstacleKind::Laser
    };
    Obstacle {
        kind,
        x,
        width,
        gap_y,
        gap,
    }
}

fn spawn_ring(stream: &mut RandomStream, anchor_x: i64, obstacle: usize) -> Ring {
    let span = RS_GROUND_Y - RS_CEIL_Y - 2 * RS_RING_TOP_MARGIN;
    let y = RS_CEIL_Y + RS_RING_TOP_MARGIN + stream.next_in_range(0, span);
    let x = anchor_x - stream.next_in_range(0, RS_RING_JITTER);
    Ring { x, y, obstacle }
}
