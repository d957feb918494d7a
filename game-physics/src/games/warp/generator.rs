use smallvec::SmallVec;

use super::{Wall, WallKind, WallPart, WarpCourse, difficulty, gap_for, spacing_for};
use crate::constants::{
    WARP_ARENA_H, WARP_ARENA_W, WARP_BLOCKER_EXTRA_H, WARP_BLOCKER_EXTRA_W, WARP_BLOCKER_MIN_H,
    WARP_BLOCKER_MIN_W, WARP_FIRST_WALL, WARP_GAP_EDGE, WARP_MAX_GAP_SHIFT, WARP_MIN_PART,
    WARP_WALL_COUNT,
};
use crate::numbers::{MICRO, usize_to_i64};
use crate::seed::RandomStream;

type Parts = SmallVec<[WallPart; 4]>;

/// Walls overhang the arena by half a unit on every side.
const SPAN_W: i64 = WARP_ARENA_W + 1_000;
const SPAN_H: i64 = WARP_ARENA_H + 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    Easy,
    Mid,
    Hard,
    Top,
}

impl Tier {
    const fn of(d: i64) -> Self {
        if d < MICRO * 15 / 100 {
            Self::Easy
        } else if d < MICRO * 40 / 100 {
            Self::Mid
        } else if d < MICRO * 65 / 100 {
            Self::Hard
        } else {
            Self::Top
        }
    }
}

/// Lay out every wall at consistent world spacing.
pub(super) fn generate(stream: &mut RandomStream) -> WarpCourse {
    let mut walls = Vec::with_capacity(WARP_WALL_COUNT);
    let mut track = WARP_FIRST_WALL;
    let mut prev = (0i64, 0i64);

    for index in 0..WARP_WALL_COUNT {
        let d = difficulty(usize_to_i64(index));
        let wall = build_wall(stream, track, d, prev);
        prev = (wall.gap_x, wall.gap_y);
        walls.push(wall);
        track += spacing_for(d);
    }

    WarpCourse { walls }
}

fn build_wall(stream: &mut RandomStream, track: i64, d: i64, prev: (i64, i64)) -> Wall {
    let gap = gap_for(d);
    let half_w = WARP_ARENA_W / 2 - gap / 2 - WARP_GAP_EDGE;
    let half_h = WARP_ARENA_H / 2 - gap / 2 - WARP_GAP_EDGE;
    let gap_x = stream
        .next_in_range(-half_w, half_w)
        .clamp(prev.0 - WARP_MAX_GAP_SHIFT, prev.0 + WARP_MAX_GAP_SHIFT)
        .clamp(-half_w, half_w);
    let gap_y = stream
        .next_in_range(-half_h, half_h)
        .clamp(prev.1 - WARP_MAX_GAP_SHIFT, prev.1 + WARP_MAX_GAP_SHIFT)
        .clamp(-half_h, half_h);
    let roll = stream.next_below(1000);

    let mut blocked = false;
    let (kind, parts) = match Tier::of(d) {
        Tier::Easy => {
            if roll < 500 {
                (WallKind::HorizontalSlit, horizontal_slit(gap_y, gap))
            } else {
                (WallKind::VerticalSlit, vertical_slit(gap_x, gap))
            }
        }
        Tier::Mid => {
            if roll < 350 {
                (WallKind::HorizontalSlit, horizontal_slit(gap_y, gap))
            } else if roll < 650 {
                (WallKind::VerticalSlit, vertical_slit(gap_x, gap))
            } else {
                (WallKind::LShape, l_shape(gap_x, gap_y, gap))
            }
        }
        Tier::Hard => {
            if roll < 300 {
                let mut parts = horizontal_slit(gap_y, gap);
                blocked = maybe_block(stream, &mut parts, 400, gap_x * 3 / 10, gap_y, gap);
                (WallKind::HorizontalSlit, parts)
            } else if roll < 550 {
                let mut parts = vertical_slit(gap_x, gap);
                blocked = maybe_block(stream, &mut parts, 400, gap_x, gap_y * 3 / 10, gap);
                (WallKind::VerticalSlit, parts)
            } else if roll < 800 {
                (WallKind::LShape, l_shape(gap_x, gap_y, gap))
            } else {
                let slit = gap * 55 / 100;
                let sep = gap * 80 / 100;
                (
                    WallKind::DualHorizontalSlit,
                    dual_horizontal_slit(gap_y - sep / 2, gap_y + sep / 2, slit),
                )
            }
        }
        Tier::Top => {
            if roll < 250 {
                let mut parts = horizontal_slit(gap_y, gap);
                blocked = maybe_block(stream, &mut parts, 600, gap_x * 4 / 10, gap_y, gap);
                (WallKind::HorizontalSlit, parts)
            } else if roll < 450 {
                let mut parts = vertical_slit(gap_x, gap);
                blocked = maybe_block(stream, &mut parts, 600, gap_x, gap_y * 4 / 10, gap);
                (WallKind::VerticalSlit, parts)
            } else if roll < 650 {
                (WallKind::LShape, l_shape(gap_x, gap_y, gap * 95 / 100))
            } else {
                let slit = gap / 2;
                let sep = gap * 70 / 100;
                let mut parts = dual_horizontal_slit(gap_y - sep / 2, gap_y + sep / 2, slit);
                blocked = maybe_block(stream, &mut parts, 500, gap_x * 2 / 10, gap_y, slit);
                (WallKind::DualHorizontalSlit, parts)
            }
        }
    };

    Wall {
        kind,
        track,
        gap_x,
        gap_y,
        gap,
        blocked,
        parts,
    }
}

fn push_part(parts: &mut Parts, x: i64, y: i64, w: i64, h: i64) {
    if w > WARP_MIN_PART && h > WARP_MIN_PART {
        parts.push(WallPart { x, y, w, h });
    }
}

fn horizontal_slit(gap_y: i64, gap: i64) -> Parts {
    let mut parts = Parts::new();
    let bottom = gap_y - gap / 2 + SPAN_H / 2;
    push_part(&mut parts, 0, -SPAN_H / 2 + bottom / 2, SPAN_W, bottom);
    let top = SPAN_H / 2 - (gap_y + gap / 2);
    push_part(&mut parts, 0, SPAN_H / 2 - top / 2, SPAN_W, top);
    parts
}

fn vertical_slit(gap_x: i64, gap: i64) -> Parts {
    let mut parts = Parts::new();
    let left = gap_x - gap / 2 + SPAN_W / 2;
    push_part(&mut parts, -SPAN_W / 2 + left / 2, 0, left, SPAN_H);
    let right = SPAN_W / 2 - (gap_x + gap / 2);
    push_part(&mut parts, SPAN_W / 2 - right / 2, 0, right, SPAN_H);
    parts
}

/// A full-width bar plus a side piece, leaving a corner opening toward the gap.
fn l_shape(gap_x: i64, gap_y: i64, size: i64) -> Parts {
    let mut parts = Parts::new();
    let bar_h = SPAN_H - size;
    let bar_y = if gap_y > 0 {
        -SPAN_H / 2 + bar_h / 2
    } else {
        SPAN_H / 2 - bar_h / 2
    };
    parts.push(WallPart {
        x: 0,
        y: bar_y,
        w: SPAN_W,
        h: bar_h,
    });
    let side_w = SPAN_W - size;
    let side_x = if gap_x > 0 {
        -SPAN_W / 2 + side_w / 2
    } else {
        SPAN_W / 2 - side_w / 2
    };
    let side_y = if gap_y > 0 {
        SPAN_H / 2 - size / 2
    } else {
        -SPAN_H / 2 + size / 2
    };
    parts.push(WallPart {
        x: side_x,
        y: side_y,
        w: side_w,
        h: size,
    });
    parts
}

fn dual_horizontal_slit(low: i64, high: i64, slit: i64) -> Parts {
    let mut parts = Parts::new();
    let bottom = low - slit / 2 + SPAN_H / 2;
    push_part(&mut parts, 0, -SPAN_H / 2 + bottom / 2, SPAN_W, bottom);
    let mid_bottom = low + slit / 2;
    let mid_top = high - slit / 2;
    push_part(
        &mut parts,
        0,
        (mid_bottom + mid_top) / 2,
        SPAN_W,
        mid_top - mid_bottom,
    );
    let top = SPAN_H / 2 - (high + slit / 2);
    push_part(&mut parts, 0, SPAN_H / 2 - top / 2, SPAN_W, top);
    parts
}

/// Drop a blocker box near the gap centre with probability `per_mille`.
fn maybe_block(
    stream: &mut RandomStream,
    parts: &mut Parts,
    per_mille: u32,
    x: i64,
    y: i64,
    gap: i64,
) -> bool {
    if !stream.chance(per_mille) {
        return false;
    }
    let w = WARP_BLOCKER_MIN_W + stream.next_in_range(0, WARP_BLOCKER_EXTRA_W);
    let h = WARP_BLOCKER_MIN_H + stream.next_in_range(0, WARP_BLOCKER_EXTRA_H);
    let jitter = gap * 15 / 100;
    let off_x = stream.next_in_range(-jitter, jitter);
    let off_y = stream.next_in_range(-jitter, jitter);
    parts.push(WallPart {
        x: x + off_x,
        y: y + off_y,
        w,
        h,
    });
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::expand;

    fn course_for(seed: &str) -> WarpCourse {
        generate(&mut expand(seed).unwrap().derive(b"warp"))
    }

    #[test]
    fn walls_are_spaced_by_difficulty() {
        let course = course_for("warp-1");
        assert_eq!(course.walls.len(), WARP_WALL_COUNT);
        assert_eq!(course.walls[0].track, WARP_FIRST_WALL);
        for (index, pair) in course.walls.windows(2).enumerate() {
            let d = difficulty(usize_to_i64(index));
            assert_eq!(pair[1].track - pair[0].track, spacing_for(d));
        }
    }

    #[test]
    fn gaps_stay_inside_arena_and_shift_limit() {
        let course = course_for("warp-2");
        let mut prev = (0, 0);
        for wall in &course.walls {
            let half_w = WARP_ARENA_W / 2 - wall.gap / 2 - WARP_GAP_EDGE;
            let half_h = WARP_ARENA_H / 2 - wall.gap / 2 - WARP_GAP_EDGE;
            assert!(wall.gap_x.abs() <= half_w);
            assert!(wall.gap_y.abs() <= half_h);
            assert!((wall.gap_x - prev.0).abs() <= WARP_MAX_GAP_SHIFT);
            assert!((wall.gap_y - prev.1).abs() <= WARP_MAX_GAP_SHIFT);
            assert!(!wall.parts.is_empty() && wall.parts.len() <= 4);
            prev = (wall.gap_x, wall.gap_y);
        }
    }

    #[test]
    fn early_walls_are_plain_slits() {
        let course = course_for("warp-3");
        for wall in course.walls.iter().take(20) {
            assert!(matches!(
                wall.kind,
                WallKind::HorizontalSlit | WallKind::VerticalSlit
            ));
            assert!(!wall.blocked);
        }
    }

    #[test]
    fn slit_leaves_gap_open() {
        let parts = horizontal_slit(0, 4_000);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].h, 1_500);
        assert_eq!(parts[0].y + parts[0].h / 2, -2_000);
        assert_eq!(parts[1].y - parts[1].h / 2, 2_000);
        assert!(horizontal_slit(3_400, 200).len() == 1);
    }
}
