use anyhow::{Context, Result, bail, ensure};
use game_physics::boundary::replay;
use game_physics::{
    Breakdown, EngineConfig, GameKind, Outcome, ReasonCode, TextRequest, Verdict,
    generate_course_text, verify_text,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::{Value, json};

/// Longest gap between fuzzed events, in ticks.
const FUZZ_MAX_GAP: u32 = 40;
const FUZZ_EVENTS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    Determinism,
    NeutralReplay,
    Tamper,
    OversizedTrace,
    FuzzReplay,
}

impl Scenario {
    pub const ALL: [Self; 5] = [
        Self::Determinism,
        Self::NeutralReplay,
        Self::Tamper,
        Self::OversizedTrace,
        Self::FuzzReplay,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            Self::Determinism => "determinism",
            Self::NeutralReplay => "neutral-replay",
            Self::Tamper => "tamper",
            Self::OversizedTrace => "oversized-trace",
            Self::FuzzReplay => "fuzz-replay",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Determinism => "Course text and verdicts repeat byte for byte",
            Self::NeutralReplay => "An all-neutral run verifies at its simulated score only",
            Self::Tamper => "A single mutated course field is rejected",
            Self::OversizedTrace => "Traces past the tick ceiling are malformed",
            Self::FuzzReplay => "Random traces replay deterministically and verify",
        }
    }

    /// Run one iteration of this scenario for a game and seed.
    pub fn run(self, kind: GameKind, seed: &str, iteration: usize, config: &EngineConfig) -> Result<()> {
        let ctx = Ctx { kind, seed, config };
        match self {
            Self::Determinism => ctx.determinism(),
            Self::NeutralReplay => ctx.neutral_replay(),
            Self::Tamper => ctx.tamper(iteration),
            Self::OversizedTrace => ctx.oversized_trace(),
            Self::FuzzReplay => ctx.fuzz_replay(iteration),
        }
    }
}

pub fn parse_scenarios(tokens: &[String]) -> Result<Vec<Scenario>> {
    if tokens.is_empty() || tokens.iter().any(|t| t.eq_ignore_ascii_case("all")) {
        return Ok(Scenario::ALL.to_vec());
    }
    tokens
        .iter()
        .map(|token| {
            Scenario::ALL
                .into_iter()
                .find(|s| s.key().eq_ignore_ascii_case(token))
                .with_context(|| format!("unknown scenario `{token}`"))
        })
        .collect()
}

struct Ctx<'a> {
    kind: GameKind,
    seed: &'a str,
    config: &'a EngineConfig,
}

impl Ctx<'_> {
    fn course(&self) -> Result<String> {
        generate_course_text(self.kind, self.seed, self.config)
            .with_context(|| format!("generating {} course for `{}`", self.kind, self.seed))
    }

    fn verify(&self, inputs: &str, claimed_score: i64, course: &str, breakdown: Option<&str>) -> Result<Verdict> {
        let request = TextRequest {
            seed: self.seed,
            inputs,
            claimed_score,
            course,
            breakdown,
        };
        let text = verify_text(self.kind, &request, self.config).context("verifying run")?;
        serde_json::from_str(&text).context("decoding verdict")
    }

    /// Claim the simulated score, with a breakdown where the game has one.
    fn honest_claim(&self, inputs: &str, course: &str) -> Result<Verdict> {
        let run = replay(self.kind, self.seed, inputs, self.config).context("replaying trace")?;
        let breakdown = run
            .breakdown
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        self.verify(inputs, run.score, course, breakdown.as_deref())
    }

    fn determinism(&self) -> Result<()> {
        let first = self.course()?;
        let second = self.course()?;
        ensure!(first == second, "course text differs between generations");

        let a = self.verify("[]", 0, &first, None)?;
        let b = self.verify("[]", 0, &second, None)?;
        ensure!(a == b, "verdicts differ: {a:?} vs {b:?}");
        Ok(())
    }

    /// An empty trace that covers every tick, so no short-trace policy applies.
    fn idle_trace(&self) -> String {
        json!({ "ticks": self.config.max_ticks, "events": [] }).to_string()
    }

    fn neutral_replay(&self) -> Result<()> {
        let course = self.course()?;
        let idle = self.idle_trace();
        let verdict = self.honest_claim(&idle, &course)?;
        ensure!(
            verdict.outcome == Outcome::Accepted,
            "honest claim not accepted: {:?}",
            verdict.reason
        );
        ensure!(
            self.kind.has_breakdown() == verdict.breakdown.is_some(),
            "breakdown presence does not match game"
        );

        let greedy = self.verify(&idle, verdict.score + 1, &course, None)?;
        ensure!(
            greedy.reason_code() == Some(ReasonCode::ScoreMismatch),
            "inflated claim gave {:?}",
            greedy.reason
        );

        if let Some(honest) = &verdict.breakdown {
            let mut padded: Breakdown = honest.clone();
            padded.insert("bonus".to_string(), 0);
            let padded = serde_json::to_string(&padded)?;
            let verdict = self.verify(&idle, verdict.score, &course, Some(&padded))?;
            ensure!(
                verdict.reason_code() == Some(ReasonCode::BreakdownMismatch),
                "extra category gave {:?}",
                verdict.reason
            );
        }
        Ok(())
    }

    fn tamper(&self, iteration: usize) -> Result<()> {
        let honest: Value = serde_json::from_str(&self.course()?)?;
        let mut leaves = Vec::new();
        collect_leaves(&honest, &mut String::new(), &mut leaves);
        ensure!(!leaves.is_empty(), "course has no fields");

        let mut rng = self.rng(iteration)?;
        let pointer = &leaves[rng.gen_range(0..leaves.len())];
        let mut tampered = honest.clone();
        let Some(leaf) = tampered.pointer_mut(pointer) else {
            bail!("pointer {pointer} vanished");
        };
        *leaf = mutate(leaf);

        let verdict = self.verify("[]", 0, &tampered.to_string(), None)?;
        ensure!(
            verdict.reason_code() == Some(ReasonCode::CourseMismatch),
            "tampered {pointer} gave {:?}",
            verdict.reason
        );
        let field = verdict.reason.and_then(|r| r.field);
        ensure!(
            field.as_deref() == Some(pointer.as_str()),
            "mismatch reported at {field:?}, tampered {pointer}"
        );
        Ok(())
    }

    fn oversized_trace(&self) -> Result<()> {
        let course = self.course()?;
        let past = self.config.max_ticks.saturating_add(1);
        let inputs = json!({ "ticks": past, "events": [] }).to_string();
        let verdict = self.verify(&inputs, 0, &course, None)?;
        ensure!(
            verdict.outcome == Outcome::Malformed
                && verdict.reason_code() == Some(ReasonCode::MalformedInput),
            "oversized trace gave {:?}",
            verdict.reason
        );
        ensure!(verdict.score == 0, "malformed verdict carried a score");
        Ok(())
    }

    fn fuzz_replay(&self, iteration: usize) -> Result<()> {
        let course = self.course()?;
        let mut rng = self.rng(iteration)?;
        let inputs = fuzz_trace(self.kind, &mut rng, self.config.max_ticks);

        let first = replay(self.kind, self.seed, &inputs, self.config)?;
        let second = replay(self.kind, self.seed, &inputs, self.config)?;
        ensure!(first == second, "replays diverged");

        let verdict = self.honest_claim(&inputs, &course)?;
        ensure!(
            verdict.is_accepted(),
            "fuzzed run not accepted: {:?}",
            verdict.reason
        );
        ensure!(
            verdict.final_tick == Some(first.final_tick),
            "verdict tick {:?} differs from replay tick {}",
            verdict.final_tick,
            first.final_tick
        );
        Ok(())
    }

    fn rng(&self, iteration: usize) -> Result<ChaCha8Rng> {
        let key = game_physics::fingerprint(&(self.kind, self.seed, iteration))?;
        Ok(ChaCha8Rng::seed_from_u64(key))
    }
}

fn collect_leaves(value: &Value, path: &mut String, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let mark = path.len();
                path.push('/');
                path.push_str(&key.replace('~', "~0").replace('/', "~1"));
                collect_leaves(child, path, out);
                path.truncate(mark);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                let mark = path.len();
                path.push('/');
                path.push_str(&index.to_string());
                collect_leaves(child, path, out);
                path.truncate(mark);
            }
        }
        _ => out.push(path.clone()),
    }
}

fn mutate(leaf: &Value) -> Value {
    match leaf {
        Value::Bool(flag) => Value::Bool(!flag),
        Value::Number(n) => n
            .as_i64()
            .and_then(|n| n.checked_add(1))
            .map_or(Value::from(0), Value::from),
        Value::String(s) => Value::String(format!("{s}?")),
        _ => Value::from(1),
    }
}

/// Build a random but well-formed trace for a game covering `max_ticks`.
pub fn fuzz_trace(kind: GameKind, rng: &mut impl Rng, max_ticks: u32) -> String {
    let mut events = Vec::with_capacity(FUZZ_EVENTS);
    let mut frame = 0u32;
    for _ in 0..FUZZ_EVENTS {
        frame = frame.saturating_add(rng.gen_range(1..=FUZZ_MAX_GAP));
        if frame > max_ticks {
            break;
        }
        let event = match kind {
            GameKind::RocketSol => json!({ "frame": frame, "thrust": rng.gen_bool(0.5) }),
            GameKind::DriveHard => json!({ "frame": frame, "lane": rng.gen_range(0..3u8) }),
            GameKind::Warp if rng.gen_bool(0.8) => json!({
                "frame": frame,
                "active": true,
                "x": rng.gen_range(-1000..=1000i64),
                "y": rng.gen_range(-1000..=1000i64),
            }),
            GameKind::Warp => json!({ "frame": frame, "active": false }),
        };
        events.push(event);
    }
    json!({ "ticks": max_ticks, "events": events }).to_string()
}
