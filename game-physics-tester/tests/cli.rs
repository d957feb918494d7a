use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "game-physics-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_scenarios_writes_output() {
    let exe = env!("CARGO_BIN_EXE_game-physics-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-scenarios", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available scenarios"));
    assert!(content.contains("fuzz-replay"));
}

#[test]
fn cli_check_writes_json_report() {
    let exe = env!("CARGO_BIN_EXE_game-physics-tester");
    let output_path = temp_path("check");
    let status = Command::new(exe)
        .args([
            "--mode",
            "check",
            "--games",
            "rocketsol,warp",
            "--scenarios",
            "determinism,tamper",
            "--seeds",
            "cli-{1..2}",
            "--iterations",
            "1",
            "--report",
            "json",
            "--output",
        ])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    let report: serde_json::Value = serde_json::from_str(&content).expect("json report");
    assert_eq!(report["failed"], 0);
    assert_eq!(report["results"].as_array().map(Vec::len), Some(8));
}

#[test]
fn cli_verify_round_trips_a_generated_course() {
    let exe = env!("CARGO_BIN_EXE_game-physics-tester");
    let request_path = temp_path("request.json");
    let request = serde_json::json!({
        "game": "rocketsol",
        "seed": "alpha-1",
        "inputs": [],
        "claimed_score": 30,
    });
    std::fs::write(&request_path, request.to_string()).expect("write request");

    let output = Command::new(exe)
        .args(["--mode", "verify", "--request"])
        .arg(&request_path)
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let verdict: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("verdict on stdout");
    assert_eq!(verdict["outcome"], "accepted");
    assert_eq!(verdict["final_tick"], 562);
}

#[test]
fn cli_verify_fails_on_inflated_claim() {
    let exe = env!("CARGO_BIN_EXE_game-physics-tester");
    let request_path = temp_path("greedy.json");
    let request = serde_json::json!({
        "game": "rocketsol",
        "seed": "alpha-1",
        "inputs": "[]",
        "claimed_score": 9999,
    });
    std::fs::write(&request_path, request.to_string()).expect("write request");

    let output = Command::new(exe)
        .args(["--mode", "verify", "--request"])
        .arg(&request_path)
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("score_mismatch"));
}
