use game_physics::games::drivehard::{DriveHardCourse, Vehicle, VehicleKind};
use game_physics::games::rocketsol::RocketSolCourse;
use game_physics::games::warp::{Wall, WallKind, WarpCourse};
use game_physics::{
    Breakdown, DriveHard, EndState, EngineConfig, GameRules, InputTrace, Outcome, ReasonCode,
    RocketSol, Verifier, VerifyRequest, Warp, reconcile, simulate,
};

const MAX_TICKS: u32 = 36_000;

fn course_text<R: GameRules>(verifier: &Verifier<R>, seed: &str) -> String {
    serde_json::to_string(&verifier.generate_obstacles(seed).unwrap()).unwrap()
}

fn open_wall(track: i64) -> Wall {
    Wall {
        kind: WallKind::HorizontalSlit,
        track,
        gap_x: 0,
        gap_y: 0,
        gap: 4_400,
        blocked: false,
        parts: Default::default(),
    }
}

#[test]
fn alpha_one_neutral_run_crashes_on_tick_562() {
    let verifier = Verifier::<RocketSol>::default();
    let run = verifier.replay("alpha-1", "[]").unwrap();
    assert_eq!(run.end_state, EndState::Crashed);
    assert_eq!(run.final_tick, 562);
    assert_eq!(run.score, 30);
    assert!(run.breakdown.is_none());

    let course = course_text(&verifier, "alpha-1");
    let request = VerifyRequest {
        seed: "alpha-1",
        inputs: "[]",
        claimed_score: run.score,
        course: &course,
        breakdown: None,
    };
    let verdict = verifier.verify(&request).unwrap();
    assert_eq!(verdict.outcome, Outcome::Accepted);
    assert_eq!(verdict.end_state, Some(EndState::Crashed));
}

#[test]
fn alpha_one_obstacles_sit_on_the_speed_timeline() {
    let course = Verifier::<RocketSol>::default()
        .generate_obstacles("alpha-1")
        .unwrap();
    let xs: Vec<i64> = course.obstacles.iter().take(6).map(|o| o.x).collect();
    assert_eq!(
        xs,
        [6_339_445, 10_420_403, 14_412_832, 18_330_443, 22_163_008, 25_935_625]
    );
}

#[test]
fn rocketsol_empty_courses_score_exactly() {
    for (finish_x, tick, k) in [(1_192_000, 99, 4), (20_192_000, 1_583, 99)] {
        let course = RocketSolCourse {
            obstacles: Vec::new(),
            rings: Vec::new(),
            finish_x,
        };
        let run = simulate::<RocketSol>(&course, &InputTrace::empty(), MAX_TICKS).unwrap();
        assert_eq!(run.end_state, EndState::FinishLine);
        assert_eq!(run.final_tick, tick);
        assert_eq!(run.score, k);

        assert!(reconcile(run.score, None, k, None).is_accepted());
        let greedy = reconcile(run.score, None, k + 1, None);
        assert_eq!(greedy.reason_code(), Some(ReasonCode::ScoreMismatch));
        assert_eq!(greedy.score, k);
    }
}

#[test]
fn drivehard_empty_roads_score_exactly() {
    for (finish_distance, tick, k) in [(50_000, 244, 50), (3_000_000, 7_381, 3_000)] {
        let course = DriveHardCourse {
            vehicles: Vec::new(),
            coins: Vec::new(),
            finish_distance,
        };
        let run = simulate::<DriveHard>(&course, &InputTrace::empty(), MAX_TICKS).unwrap();
        assert_eq!(run.end_state, EndState::FinishLine);
        assert_eq!(run.final_tick, tick);
        assert_eq!(run.score, k);

        let claimed = run.breakdown.clone().unwrap();
        assert_eq!(claimed["distance"], k);
        assert!(reconcile(run.score, run.breakdown.as_ref(), k, Some(&claimed)).is_accepted());
        let greedy = reconcile(run.score, run.breakdown.as_ref(), k + 1, Some(&claimed));
        assert_eq!(greedy.reason_code(), Some(ReasonCode::ScoreMismatch));
    }
}

#[test]
fn warp_three_open_walls_score_forty_two() {
    let course = WarpCourse {
        walls: vec![open_wall(5_000), open_wall(10_000), open_wall(15_000)],
    };
    let run = simulate::<Warp>(&course, &InputTrace::empty(), MAX_TICKS).unwrap();
    assert_eq!(run.end_state, EndState::FinishLine);
    assert_eq!(run.score, 42);

    let claimed = Breakdown::from([("combo".to_string(), 12), ("walls".to_string(), 30)]);
    assert!(reconcile(run.score, run.breakdown.as_ref(), 42, Some(&claimed)).is_accepted());
    let greedy = reconcile(run.score, run.breakdown.as_ref(), 43, Some(&claimed));
    assert_eq!(greedy.reason_code(), Some(ReasonCode::ScoreMismatch));
}

#[test]
fn lane_test_collision_ends_on_tick_forty() {
    let course = DriveHardCourse {
        vehicles: vec![Vehicle {
            kind: VehicleKind::Taxi,
            lane: 1,
            track: 10_719,
        }],
        coins: Vec::new(),
        finish_distance: 3_000_000,
    };
    let run = simulate::<DriveHard>(&course, &InputTrace::empty(), MAX_TICKS).unwrap();
    assert_eq!(run.end_state, EndState::Crashed);
    assert_eq!(run.final_tick, 40);
    assert_eq!(run.score, 7);
    assert_eq!(run.breakdown.unwrap()["distance"], 7);
}

#[test]
fn lane_test_breakdown_must_add_up() {
    let verifier = Verifier::<DriveHard>::default();
    let run = verifier.replay("lane-test", "[]").unwrap();
    let course = course_text(&verifier, "lane-test");
    let honest = run.breakdown.clone().unwrap();

    let mut inflated = honest.clone();
    *inflated.entry("distance".to_string()).or_default() += 1;
    let request = VerifyRequest {
        seed: "lane-test",
        inputs: "[]",
        claimed_score: run.score,
        course: &course,
        breakdown: Some(&inflated),
    };
    let verdict = verifier.verify(&request).unwrap();
    assert_eq!(verdict.outcome, Outcome::Rejected);
    assert_eq!(verdict.reason_code(), Some(ReasonCode::BreakdownMismatch));
    assert_eq!(
        verdict.reason.as_ref().and_then(|r| r.field.as_deref()),
        Some("sum")
    );

    let mut shuffled = honest.clone();
    *shuffled.entry("distance".to_string()).or_default() -= 1;
    *shuffled.entry("coins".to_string()).or_default() += 1;
    let verdict = verifier
        .verify(&VerifyRequest {
            breakdown: Some(&shuffled),
            ..request
        })
        .unwrap();
    assert_eq!(verdict.reason_code(), Some(ReasonCode::BreakdownMismatch));
    assert_eq!(
        verdict.reason.as_ref().and_then(|r| r.field.as_deref()),
        Some("coins")
    );

    let verdict = verifier
        .verify(&VerifyRequest {
            breakdown: Some(&honest),
            ..request
        })
        .unwrap();
    assert!(verdict.is_accepted(), "{verdict:?}");
    assert_eq!(verdict.breakdown, Some(honest));
}

#[test]
fn time_limit_ends_idle_runs() {
    let course = RocketSolCourse {
        obstacles: Vec::new(),
        rings: Vec::new(),
        finish_x: i64::MAX / 2,
    };
    let run = simulate::<RocketSol>(&course, &InputTrace::empty(), 600).unwrap();
    assert_eq!(run.end_state, EndState::TimeLimit);
    assert_eq!(run.final_tick, 600);

    let config = EngineConfig {
        max_ticks: 600,
        ..EngineConfig::default()
    };
    let run = Verifier::<Warp>::new(config).replay("idle", "[]").unwrap();
    assert!(run.final_tick <= 600);
}
