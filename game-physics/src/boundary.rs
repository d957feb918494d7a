//! JSON text in, JSON text out: the shape every embedding host sees.

use std::fmt;

use serde_json::{Value, json};
use thiserror::Error;

use crate::config::EngineConfig;
use crate::games::{DriveHard, GameKind, GameRules, RocketSol, Warp};
use crate::reconcile::Breakdown;
use crate::seed::SeedError;
use crate::sim::{EngineFault, SimOutcome};
use crate::verify::{ReplayError, Verifier, VerifyRequest};

/// Faults that prevent a well-formed response from being produced.
#[derive(Debug, Error)]
pub enum BoundaryError {
    #[error("invalid seed: {0}")]
    InvalidSeed(#[from] SeedError),
    #[error("breakdown must be a JSON object of integers: {0}")]
    Breakdown(String),
    #[error("engine fault: {0}")]
    Engine(#[from] EngineFault),
    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("{param} is not valid UTF-8")]
    InvalidUtf8 { param: &'static str },
    #[error("{param} must not be null")]
    NullPointer { param: &'static str },
}

/// Text form of a verification request.
#[derive(Debug, Clone, Copy)]
pub struct TextRequest<'a> {
    pub seed: &'a str,
    pub inputs: &'a str,
    pub claimed_score: i64,
    pub course: &'a str,
    pub breakdown: Option<&'a str>,
}

/// Generate a course and encode it as JSON.
///
/// # Errors
///
/// Returns [`BoundaryError`] for an invalid seed or an encoding failure.
pub fn generate_course_text(kind: GameKind, seed: &str, config: &EngineConfig) -> Result<String, BoundaryError> {
    match kind {
        GameKind::RocketSol => generate_with::<RocketSol>(seed, config),
        GameKind::DriveHard => generate_with::<DriveHard>(seed, config),
        GameKind::Warp => generate_with::<Warp>(seed, config),
    }
}

fn generate_with<R: GameRules>(seed: &str, config: &EngineConfig) -> Result<String, BoundaryError> {
    let course = Verifier::<R>::new(config.clone()).generate_obstacles(seed)?;
    Ok(serde_json::to_string(&course)?)
}

/// Verify a claimed run and encode the verdict as JSON.
///
/// # Errors
///
/// Returns [`BoundaryError`] when the breakdown text is not an object of
/// integers, the engine faults, or the verdict cannot be encoded.
pub fn verify_text(kind: GameKind, request: &TextRequest<'_>, config: &EngineConfig) -> Result<String, BoundaryError> {
    let breakdown = parse_breakdown(request.breakdown)?;
    let request = VerifyRequest {
        seed: request.seed,
        inputs: request.inputs,
        claimed_score: request.claimed_score,
        course: request.course,
        breakdown: breakdown.as_ref(),
    };
    let verdict = match kind {
        GameKind::RocketSol => Verifier::<RocketSol>::new(config.clone()).verify(&request)?,
        GameKind::DriveHard => Verifier::<DriveHard>::new(config.clone()).verify(&request)?,
        GameKind::Warp => Verifier::<Warp>::new(config.clone()).verify(&request)?,
    };
    Ok(serde_json::to_string(&verdict)?)
}

/// Replay a trace for any game without reconciling a claim.
///
/// # Errors
///
/// Returns [`ReplayError`] for a bad seed, a malformed trace or an engine fault.
pub fn replay(kind: GameKind, seed: &str, inputs: &str, config: &EngineConfig) -> Result<SimOutcome, ReplayError> {
    match kind {
        GameKind::RocketSol => Verifier::<RocketSol>::new(config.clone()).replay(seed, inputs),
        GameKind::DriveHard => Verifier::<DriveHard>::new(config.clone()).replay(seed, inputs),
        GameKind::Warp => Verifier::<Warp>::new(config.clone()).replay(seed, inputs),
    }
}

/// Parse claimed breakdown text. Empty text, `null` and `{}` claim nothing.
///
/// # Errors
///
/// Returns [`BoundaryError::Breakdown`] for anything but an object of integers.
pub fn parse_breakdown(text: Option<&str>) -> Result<Option<Breakdown>, BoundaryError> {
    let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    let value: Value =
        serde_json::from_str(text).map_err(|err| BoundaryError::Breakdown(err.to_string()))?;
    match value {
        Value::Null => Ok(None),
        Value::Object(map) if map.is_empty() => Ok(None),
        Value::Object(map) => map
            .into_iter()
            .map(|(name, points)| match points.as_i64() {
                Some(points) => Ok((name, points)),
                None => Err(BoundaryError::Breakdown(format!(
                    "category `{name}` is not an integer"
                ))),
            })
            .collect::<Result<Breakdown, _>>()
            .map(Some),
        other => Err(BoundaryError::Breakdown(format!("found {other}"))),
    }
}

/// Encode an error as `{"error": "..."}`.
#[must_use]
pub fn error_text(err: &dyn fmt::Display) -> String {
    json!({ "error": err.to_string() }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakdown_text_forms() {
        assert_eq!(parse_breakdown(None).unwrap(), None);
        assert_eq!(parse_breakdown(Some("  ")).unwrap(), None);
        assert_eq!(parse_breakdown(Some("null")).unwrap(), None);
        assert_eq!(parse_breakdown(Some("{}")).unwrap(), None);
        let parsed = parse_breakdown(Some(r#"{"walls": 30, "combo": 12}"#))
            .unwrap()
            .unwrap();
        assert_eq!(parsed["walls"], 30);
        assert!(parse_breakdown(Some("[1,2]")).is_err());
        assert!(parse_breakdown(Some(r#"{"walls": "30"}"#)).is_err());
        assert!(parse_breakdown(Some(r#"{"walls": 1.5}"#)).is_err());
        assert!(parse_breakdown(Some("{")).is_err());
    }

    #[test]
    fn course_text_round_trips_into_verify() {
        let config = EngineConfig::default();
        for kind in GameKind::ALL {
            let course = generate_course_text(kind, "round-trip", &config).unwrap();
            let outcome = replay(kind, "round-trip", "[]", &config).unwrap();
            let request = TextRequest {
                seed: "round-trip",
                inputs: "[]",
                claimed_score: outcome.score,
                course: &course,
                breakdown: None,
            };
            let verdict: Value = serde_json::from_str(&verify_text(kind, &request, &config).unwrap()).unwrap();
            assert_eq!(verdict["outcome"], "accepted", "{kind}: {verdict}");
        }
    }

    #[test]
    fn invalid_seed_is_a_boundary_error_for_generation() {
        let err = generate_course_text(GameKind::Warp, "", &EngineConfig::default()).unwrap_err();
        assert!(matches!(err, BoundaryError::InvalidSeed(SeedError::Empty)));
        let text = error_text(&err);
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["error"], "invalid seed: seed must not be empty");
    }

    #[test]
    fn bad_breakdown_faults_before_verifying() {
        let request = TextRequest {
            seed: "s",
            inputs: "[]",
            claimed_score: 0,
            course: "[]",
            breakdown: Some("7"),
        };
        assert!(matches!(
            verify_text(GameKind::DriveHard, &request, &EngineConfig::default()),
            Err(BoundaryError::Breakdown(_))
        ));
    }
}
