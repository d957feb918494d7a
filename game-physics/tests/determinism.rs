use std::sync::Arc;
use std::thread;

use game_physics::{
    DriveHard, EngineConfig, GameKind, RocketSol, TextRequest, Verifier, VerifyRequest, Warp,
    fingerprint, generate_course_text, verify_text,
};

const SEEDS: [&str; 5] = ["alpha-1", "lane-test", "warp-7", "🚀 unicode seed", "0"];

#[test]
fn generation_is_byte_identical() {
    let config = EngineConfig::default();
    for kind in GameKind::ALL {
        for seed in SEEDS {
            let first = generate_course_text(kind, seed, &config).unwrap();
            let second = generate_course_text(kind, seed, &config).unwrap();
            assert_eq!(first, second, "{kind} {seed}");
        }
    }
}

#[test]
fn distinct_seeds_and_games_give_distinct_courses() {
    let rocket = Verifier::<RocketSol>::default();
    let a = fingerprint(&rocket.generate_obstacles("seed-a").unwrap()).unwrap();
    let b = fingerprint(&rocket.generate_obstacles("seed-b").unwrap()).unwrap();
    assert_ne!(a, b);

    let config = EngineConfig::default();
    let texts: Vec<String> = GameKind::ALL
        .into_iter()
        .map(|kind| generate_course_text(kind, "shared", &config).unwrap())
        .collect();
    assert_ne!(texts[0], texts[1]);
    assert_ne!(texts[1], texts[2]);
}

#[test]
fn fingerprints_survive_a_text_round_trip() {
    let verifier = Verifier::<Warp>::default();
    let course = verifier.generate_obstacles("fp").unwrap();
    let text = serde_json::to_string(&course).unwrap();
    let parsed = serde_json::from_str(&text).unwrap();
    assert_eq!(course, parsed);
    assert_eq!(fingerprint(&course).unwrap(), fingerprint(&parsed).unwrap());
}

#[test]
fn verify_is_repeatable() {
    let verifier = Verifier::<DriveHard>::default();
    let course = serde_json::to_string(&verifier.generate_obstacles("repeat").unwrap()).unwrap();
    let inputs = r#"[{"frame": 30, "lane": 0}, {"frame": 200, "lane": 2}, {"frame": 420, "lane": 1}]"#;
    let request = VerifyRequest {
        seed: "repeat",
        inputs,
        claimed_score: 123,
        course: &course,
        breakdown: None,
    };
    let first = verifier.verify(&request).unwrap();
    for _ in 0..3 {
        assert_eq!(verifier.verify(&request).unwrap(), first);
    }
}

#[test]
fn verifies_agree_across_threads() {
    let config = EngineConfig::default();
    let jobs: Arc<Vec<(GameKind, String, String)>> = Arc::new(
        GameKind::ALL
            .into_iter()
            .flat_map(|kind| {
                let config = config.clone();
                SEEDS.into_iter().map(move |seed| {
                    let course = generate_course_text(kind, seed, &config).unwrap();
                    (kind, seed.to_string(), course)
                })
            })
            .collect(),
    );

    let run_all = |jobs: &[(GameKind, String, String)], config: &EngineConfig| -> Vec<String> {
        jobs.iter()
            .map(|(kind, seed, course)| {
                let request = TextRequest {
                    seed,
                    inputs: "[]",
                    claimed_score: 10,
                    course,
                    breakdown: None,
                };
                verify_text(*kind, &request, config).unwrap()
            })
            .collect()
    };

    let expected = run_all(&jobs, &config);
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let jobs = Arc::clone(&jobs);
            let config = config.clone();
            thread::spawn(move || run_all(&jobs, &config))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn verifiers_are_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Verifier<RocketSol>>();
    assert_send_sync::<Verifier<DriveHard>>();
    assert_send_sync::<Verifier<Warp>>();
    assert_send_sync::<game_physics::Verdict>();
}
