//! Verification pipeline: seed check, course integrity, decode, simulate, reconcile.

use std::marker::PhantomData;

use log::debug;
use thiserror::Error;

use crate::config::{EngineConfig, ShortTracePolicy};
use crate::course::check_integrity;
use crate::games::GameRules;
use crate::reconcile::{Breakdown, Reason, ReasonCode, Verdict, reconcile};
use crate::seed::{SeedError, expand_with_limit};
use crate::sim::{EngineFault, SimOutcome, simulate};
use crate::trace::{InputTrace, MalformedInput, TraceLimits, decode};

/// One claimed run submitted for verification.
#[derive(Debug, Clone, Copy)]
pub struct VerifyRequest<'a> {
    pub seed: &'a str,
    /// Raw input trace text.
    pub inputs: &'a str,
    pub claimed_score: i64,
    /// Course text the client played.
    pub course: &'a str,
    pub breakdown: Option<&'a Breakdown>,
}

/// Failure to replay a trace outside the verdict pipeline.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error(transparent)]
    Seed(#[from] SeedError),
    #[error(transparent)]
    Malformed(#[from] MalformedInput),
    #[error(transparent)]
    Engine(#[from] EngineFault),
}

/// Pipeline for one game, parameterised by its rules.
#[derive(Debug, Clone)]
pub struct Verifier<R> {
    config: EngineConfig,
    rules: PhantomData<fn() -> R>,
}

impl<R: GameRules> Default for Verifier<R> {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl<R: GameRules> Verifier<R> {
    #[must_use]
    pub const fn new(config: EngineConfig) -> Self {
        Self {
            config,
            rules: PhantomData,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Regenerate the course for a seed.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError`] when the seed is empty or too long.
    pub fn generate_obstacles(&self, seed: &str) -> Result<R::Course, SeedError> {
        let root = expand_with_limit(seed, self.config.max_seed_len)?;
        let mut stream = root.derive(R::KIND.domain_tag());
        let course = R::generate(&mut stream);
        debug!(
            "{} course generated with {} draws",
            R::KIND,
            stream.draws()
        );
        Ok(course)
    }

    /// Decode a trace under this verifier's limits.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedInput`] when the trace fails structural checks.
    pub fn decode(&self, inputs: &str) -> Result<InputTrace<R::Event>, MalformedInput> {
        decode(inputs, &TraceLimits::from(&self.config))
    }

    /// Run a trace to completion without reconciling a claim.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError`] for a bad seed, a malformed trace or an engine fault.
    pub fn replay(&self, seed: &str, inputs: &str) -> Result<SimOutcome, ReplayError> {
        let course = self.generate_obstacles(seed)?;
        let trace = self.decode(inputs)?;
        Ok(simulate::<R>(&course, &trace, self.config.max_ticks)?)
    }

    /// Produce a verdict for a claimed run.
    ///
    /// Client mistakes and cheating surface as verdicts; only internal
    /// faults are returned as errors.
    ///
    /// # Errors
    ///
    /// Returns [`EngineFault`] on arithmetic overflow or a broken invariant.
    pub fn verify(&self, request: &VerifyRequest<'_>) -> Result<Verdict, EngineFault> {
        let kind = R::KIND;

        let course = match self.generate_obstacles(request.seed) {
            Ok(course) => course,
            Err(err) => {
                debug!("{kind} verify: invalid seed ({err})");
                return Ok(Verdict::malformed(
                    Reason::new(ReasonCode::InvalidSeed).with_detail(err.to_string()),
                ));
            }
        };

        let expected = serde_json::to_value(&course)
            .map_err(|err| EngineFault::invariant(format!("course encoding failed: {err}")))?;
        if let Err(mismatch) = check_integrity(&expected, request.course) {
            debug!("{kind} verify: {mismatch}");
            return Ok(Verdict::rejected_early(
                Reason::new(ReasonCode::CourseMismatch)
                    .with_field(mismatch.path)
                    .with_detail(mismatch.detail),
            ));
        }

        let trace = match self.decode(request.inputs) {
            Ok(trace) => trace,
            Err(err) => {
                debug!("{kind} verify: {err}");
                return Ok(Verdict::malformed(
                    Reason::new(ReasonCode::MalformedInput)
                        .with_tick(err.tick)
                        .with_detail(err.reason),
                ));
            }
        };
        debug!(
            "{kind} verify: decoded {} events over {} ticks",
            trace.len(),
            trace.extent()
        );

        let run = simulate::<R>(&course, &trace, self.config.max_ticks)?;
        debug!(
            "{kind} verify: {} at tick {} scoring {}",
            run.end_state.label(),
            run.final_tick,
            run.score
        );

        if self.config.short_trace == ShortTracePolicy::Reject && run.outlived_trace() {
            return Ok(Verdict::rejected_run(
                &run,
                Reason::new(ReasonCode::TraceTruncated)
                    .with_tick(Some(run.trace_extent))
                    .with_detail(format!(
                        "trace ends at tick {}, run ended at tick {}",
                        run.trace_extent, run.final_tick
                    )),
            ));
        }

        let verdict = reconcile(
            run.score,
            run.breakdown.as_ref(),
            request.claimed_score,
            request.breakdown,
        )
        .with_run(&run);
        debug!(
            "{kind} verdict: {} (claimed {}, simulated {})",
            verdict.outcome, request.claimed_score, run.score
        );
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::{DriveHard, RocketSol, Warp};
    use crate::reconcile::Outcome;

    fn course_text<R: GameRules>(verifier: &Verifier<R>, seed: &str) -> String {
        serde_json::to_string(&verifier.generate_obstacles(seed).unwrap()).unwrap()
    }

    #[test]
    fn neutral_rocketsol_run_is_accepted_at_simulated_score() {
        let verifier = Verifier::<RocketSol>::default();
        let course = course_text(&verifier, "alpha-1");
        let request = VerifyRequest {
            seed: "alpha-1",
            inputs: "[]",
            claimed_score: 30,
            course: &course,
            breakdown: None,
        };
        let verdict = verifier.verify(&request).unwrap();
        assert!(verdict.is_accepted(), "{verdict:?}");
        assert_eq!(verdict.final_tick, Some(562));

        let greedy = VerifyRequest {
            claimed_score: 31,
            ..request
        };
        let verdict = verifier.verify(&greedy).unwrap();
        assert_eq!(verdict.reason_code(), Some(ReasonCode::ScoreMismatch));
        assert_eq!(verdict.score, 30);
    }

    #[test]
    fn stages_short_circuit_in_order() {
        let verifier = Verifier::<Warp>::default();
        let course = course_text(&verifier, "w");

        let bad_seed = VerifyRequest {
            seed: "",
            inputs: "not even json",
            claimed_score: 0,
            course: "also not json",
            breakdown: None,
        };
        let verdict = verifier.verify(&bad_seed).unwrap();
        assert_eq!(verdict.outcome, Outcome::Malformed);
        assert_eq!(verdict.reason_code(), Some(ReasonCode::InvalidSeed));

        let bad_course = VerifyRequest {
            seed: "w",
            ..bad_seed
        };
        let verdict = verifier.verify(&bad_course).unwrap();
        assert_eq!(verdict.reason_code(), Some(ReasonCode::CourseMismatch));

        let bad_trace = VerifyRequest {
            course: &course,
            ..bad_course
        };
        let verdict = verifier.verify(&bad_trace).unwrap();
        assert_eq!(verdict.outcome, Outcome::Malformed);
        assert_eq!(verdict.reason_code(), Some(ReasonCode::MalformedInput));
        assert_eq!(verdict.score, 0);
    }

    #[test]
    fn reject_policy_flags_runs_past_the_trace() {
        let config = EngineConfig {
            short_trace: ShortTracePolicy::Reject,
            ..EngineConfig::default()
        };
        let verifier = Verifier::<DriveHard>::new(config);
        let course = course_text(&verifier, "lane-test");
        let outcome = verifier.replay("lane-test", "[]").unwrap();
        let request = VerifyRequest {
            seed: "lane-test",
            inputs: r#"{"ticks": 10, "events": []}"#,
            claimed_score: outcome.score,
            course: &course,
            breakdown: None,
        };
        let verdict = verifier.verify(&request).unwrap();
        assert_eq!(verdict.reason_code(), Some(ReasonCode::TraceTruncated));
        assert_eq!(verdict.score, outcome.score);
    }

    #[test]
    fn replay_surfaces_errors() {
        let verifier = Verifier::<RocketSol>::default();
        assert!(matches!(verifier.replay("", "[]"), Err(ReplayError::Seed(_))));
        assert!(matches!(
            verifier.replay("s", "{}"),
            Err(ReplayError::Malformed(_))
        ));
        let outcome = verifier.replay("s", "[]").unwrap();
        assert_eq!(outcome.final_tick, 562);
        assert_eq!(outcome.score, 30);
    }
}
