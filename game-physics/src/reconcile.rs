//! Exact comparison of simulated and claimed scores.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sim::{EndState, SimOutcome};

/// Points per scoring category, keyed by category name.
pub type Breakdown = BTreeMap<String, i64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Accepted,
    Rejected,
    Malformed,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Malformed => "malformed",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    InvalidSeed,
    MalformedInput,
    CourseMismatch,
    ScoreMismatch,
    BreakdownMismatch,
    TraceTruncated,
}

/// Why a verdict is not an acceptance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reason {
    pub code: ReasonCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tick: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Reason {
    #[must_use]
    pub const fn new(code: ReasonCode) -> Self {
        Self {
            code,
            field: None,
            tick: None,
            detail: None,
        }
    }

    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    #[must_use]
    pub const fn with_tick(mut self, tick: Option<u32>) -> Self {
        self.tick = tick;
        self
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Final answer for one verification request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub outcome: Outcome,
    pub score: i64,
    #[serde(default)]
    pub breakdown: Option<Breakdown>,
    #[serde(default)]
    pub reason: Option<Reason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_state: Option<EndState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_tick: Option<u32>,
}

impl Verdict {
    /// A verdict reached before any simulation ran.
    #[must_use]
    pub const fn malformed(reason: Reason) -> Self {
        Self {
            outcome: Outcome::Malformed,
            score: 0,
            breakdown: None,
            reason: Some(reason),
            end_state: None,
            final_tick: None,
        }
    }

    /// A rejection reached before any simulation ran.
    #[must_use]
    pub const fn rejected_early(reason: Reason) -> Self {
        Self {
            outcome: Outcome::Rejected,
            score: 0,
            breakdown: None,
            reason: Some(reason),
            end_state: None,
            final_tick: None,
        }
    }

    /// A rejection carrying the simulated run.
    #[must_use]
    pub fn rejected_run(run: &SimOutcome, reason: Reason) -> Self {
        Self {
            outcome: Outcome::Rejected,
            score: run.score,
            breakdown: run.breakdown.clone(),
            reason: Some(reason),
            end_state: Some(run.end_state),
            final_tick: Some(run.final_tick),
        }
    }

    /// Attach the terminal state of the run that produced this verdict.
    #[must_use]
    pub const fn with_run(mut self, run: &SimOutcome) -> Self {
        self.end_state = Some(run.end_state);
        self.final_tick = Some(run.final_tick);
        self
    }

    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.outcome == Outcome::Accepted
    }

    #[must_use]
    pub fn reason_code(&self) -> Option<ReasonCode> {
        self.reason.as_ref().map(|r| r.code)
    }
}

/// Compare a simulated score against a claim.
///
/// Breakdowns are compared only when both sides supply one. The claimed
/// categories must sum to the claimed total before they are compared
/// category by category in name order.
#[must_use]
pub fn reconcile(
    simulated_score: i64,
    simulated_breakdown: Option<&Breakdown>,
    claimed_score: i64,
    claimed_breakdown: Option<&Breakdown>,
) -> Verdict {
    let reject = |reason: Reason| Verdict {
        outcome: Outcome::Rejected,
        score: simulated_score,
        breakdown: simulated_breakdown.cloned(),
        reason: Some(reason),
        end_state: None,
        final_tick: None,
    };

    if simulated_score != claimed_score {
        return reject(
            Reason::new(ReasonCode::ScoreMismatch)
                .with_field("total")
                .with_detail(format!("simulated {simulated_score}, claimed {claimed_score}")),
        );
    }

    if let (Some(simulated), Some(claimed)) = (simulated_breakdown, claimed_breakdown) {
        let claimed_sum = claimed
            .values()
            .try_fold(0i64, |acc, v| acc.checked_add(*v));
        if claimed_sum != Some(claimed_score) {
            let shown = claimed_sum.map_or_else(|| "overflow".to_string(), |s| s.to_string());
            return reject(
                Reason::new(ReasonCode::BreakdownMismatch)
                    .with_field("sum")
                    .with_detail(format!("categories sum to {shown}, claimed {claimed_score}")),
            );
        }
        if let Some(category) = first_category_mismatch(simulated, claimed) {
            let detail = format!(
                "simulated {}, claimed {}",
                show(simulated.get(category)),
                show(claimed.get(category))
            );
            return reject(
                Reason::new(ReasonCode::BreakdownMismatch)
                    .with_field(category)
                    .with_detail(detail),
            );
        }
    }

    Verdict {
        outcome: Outcome::Accepted,
        score: simulated_score,
        breakdown: simulated_breakdown.cloned(),
        reason: None,
        end_state: None,
        final_tick: None,
    }
}

fn first_category_mismatch<'a>(simulated: &'a Breakdown, claimed: &'a Breakdown) -> Option<&'a str> {
    let mut names: Vec<&str> = simulated
        .keys()
        .chain(claimed.keys())
        .map(String::as_str)
        .collect();
    names.sort_unstable();
    names.dedup();
    names
        .into_iter()
        .find(|name| simulated.get(*name) != claimed.get(*name))
}

fn show(value: Option<&i64>) -> String {
    value.map_or_else(|| "nothing".to_string(), ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breakdown(pairs: &[(&str, i64)]) -> Breakdown {
        pairs.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
    }

    #[test]
    fn exact_total_is_accepted() {
        let verdict = reconcile(30, None, 30, None);
        assert!(verdict.is_accepted());
        assert_eq!(verdict.reason, None);
    }

    #[test]
    fn off_by_one_is_rejected_with_simulated_score() {
        let verdict = reconcile(30, None, 31, None);
        assert_eq!(verdict.outcome, Outcome::Rejected);
        assert_eq!(verdict.score, 30);
        let reason = verdict.reason.unwrap();
        assert_eq!(reason.code, ReasonCode::ScoreMismatch);
        assert_eq!(reason.field.as_deref(), Some("total"));
    }

    #[test]
    fn claimed_categories_must_sum_to_total() {
        let sim = breakdown(&[("coins", 50), ("distance", 40), ("near_miss", 0)]);
        let claim = breakdown(&[("coins", 60), ("distance", 40), ("near_miss", 0)]);
        let verdict = reconcile(90, Some(&sim), 90, Some(&claim));
        assert_eq!(verdict.reason_code(), Some(ReasonCode::BreakdownMismatch));
        assert_eq!(verdict.reason.unwrap().field.as_deref(), Some("sum"));
    }

    #[test]
    fn first_differing_category_is_named() {
        let sim = breakdown(&[("coins", 50), ("distance", 40), ("near_miss", 0)]);
        let claim = breakdown(&[("coins", 25), ("distance", 40), ("near_miss", 25)]);
        let verdict = reconcile(90, Some(&sim), 90, Some(&claim));
        assert_eq!(verdict.reason.unwrap().field.as_deref(), Some("coins"));

        let missing = breakdown(&[("coins", 50), ("distance", 40)]);
        let verdict = reconcile(90, Some(&sim), 90, Some(&missing));
        assert_eq!(verdict.reason.unwrap().field.as_deref(), Some("near_miss"));

        let extra = breakdown(&[("bonus", 0), ("coins", 50), ("distance", 40)]);
        let verdict = reconcile(90, Some(&sim), 90, Some(&extra));
        assert_eq!(verdict.reason.unwrap().field.as_deref(), Some("bonus"));
    }

    #[test]
    fn breakdown_ignored_without_both_sides() {
        let sim = breakdown(&[("walls", 30), ("combo", 12)]);
        assert!(reconcile(42, Some(&sim), 42, None).is_accepted());
        let claim = breakdown(&[("walls", 1)]);
        assert!(reconcile(42, None, 42, Some(&claim)).is_accepted());
    }

    #[test]
    fn verdict_json_shape() {
        let verdict = reconcile(7, None, 8, None);
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["outcome"], "rejected");
        assert_eq!(json["reason"]["code"], "score_mismatch");
        assert!(json.get("end_state").is_none());
        let accepted = serde_json::to_value(reconcile(7, None, 7, None)).unwrap();
        assert!(accepted["reason"].is_null());
    }
}
