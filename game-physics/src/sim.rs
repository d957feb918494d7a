//! Fixed-timestep simulation driver shared by every game.

use log::{trace, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::games::GameRules;
use crate::reconcile::Breakdown;
use crate::trace::{InputTrace, TickInput};

/// Result of advancing a game by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    Continue,
    Crash,
    Finish,
}

/// Terminal state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndState {
    Crashed,
    FinishLine,
    TimeLimit,
}

impl EndState {
    #[must_use]
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::FinishLine | Self::TimeLimit)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Crashed => "crashed",
            Self::FinishLine => "finish_line",
            Self::TimeLimit => "time_limit",
        }
    }
}

/// Phase of a simulation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Running,
    Ended(EndState),
}

/// Internal failure while simulating. Never caused by client input alone.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineFault {
    #[error("arithmetic overflow in {context} at tick {tick}")]
    Overflow { context: &'static str, tick: u32 },
    #[error("invariant violated: {detail}")]
    Invariant { detail: String },
}

impl EngineFault {
    pub(crate) fn invariant(detail: impl Into<String>) -> Self {
        Self::Invariant {
            detail: detail.into(),
        }
    }
}

/// Add with overflow reported as an [`EngineFault`].
///
/// # Errors
///
/// Returns [`EngineFault::Overflow`] when the sum does not fit in `i64`.
pub fn checked_add(lhs: i64, rhs: i64, context: &'static str, tick: u32) -> Result<i64, EngineFault> {
    lhs.checked_add(rhs)
        .ok_or(EngineFault::Overflow { context, tick })
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimOutcome {
    pub end_state: EndState,
    pub final_tick: u32,
    pub score: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<Breakdown>,
    /// Last tick covered by the input trace.
    pub trace_extent: u32,
}

impl SimOutcome {
    /// Whether the run needed neutral input past the end of the trace.
    #[must_use]
    pub const fn outlived_trace(&self) -> bool {
        self.final_tick > self.trace_extent
    }
}

/// A single run of one game over one course.
#[derive(Debug, Clone)]
pub struct Simulation<'c, R: GameRules> {
    course: &'c R::Course,
    state: R::State,
    tick: u32,
    max_ticks: u32,
    phase: Phase,
}

impl<'c, R: GameRules> Simulation<'c, R> {
    #[must_use]
    pub fn new(course: &'c R::Course, max_ticks: u32) -> Self {
        Self {
            course,
            state: R::initial_state(course),
            tick: 0,
            max_ticks,
            phase: Phase::Running,
        }
    }

    /// Advance one tick. Calls after the run has ended are no-ops.
    ///
    /// # Errors
    ///
    /// Propagates [`EngineFault`] from the game rules.
    pub fn step(&mut self, input: TickInput<'_, R::Event>) -> Result<Phase, EngineFault> {
        if self.phase != Phase::Running {
            return Ok(self.phase);
        }
        let tick = self
            .tick
            .checked_add(1)
            .ok_or(EngineFault::Overflow { context: "tick", tick: self.tick })?;
        self.tick = tick;
        let result = R::step(&mut self.state, self.course, input, tick)?;
        self.phase = match result {
            StepResult::Crash => Phase::Ended(EndState::Crashed),
            StepResult::Finish => Phase::Ended(EndState::FinishLine),
            StepResult::Continue if tick >= self.max_ticks => Phase::Ended(EndState::TimeLimit),
            StepResult::Continue => Phase::Running,
        };
        if let Phase::Ended(end) = self.phase {
            trace!("{} ended {} at tick {tick}", R::KIND, end.label());
        }
        Ok(self.phase)
    }

    #[must_use]
    pub const fn tick(&self) -> u32 {
        self.tick
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub const fn state(&self) -> &R::State {
        &self.state
    }

    #[must_use]
    pub fn score(&self) -> i64 {
        R::score(&self.state)
    }

    #[must_use]
    pub fn breakdown(&self) -> Option<Breakdown> {
        R::breakdown(&self.state)
    }
}

/// Run a trace to a terminal state, feeding neutral input past its end.
///
/// # Errors
///
/// Returns [`EngineFault`] on arithmetic overflow or a zero tick ceiling.
pub fn simulate<R: GameRules>(
    course: &R::Course,
    trace: &InputTrace<R::Event>,
    max_ticks: u32,
) -> Result<SimOutcome, EngineFault> {
    if max_ticks == 0 {
        return Err(EngineFault::invariant("max_ticks must be at least 1"));
    }
    let mut sim = Simulation::<R>::new(course, max_ticks);
    let mut cursor = trace.cursor();
    loop {
        let input = cursor.input_for(sim.tick().saturating_add(1));
        let phase = sim.step(input).inspect_err(|fault| {
            warn!("{} simulation fault: {fault}", R::KIND);
        })?;
        if let Phase::Ended(end_state) = phase {
            return Ok(SimOutcome {
                end_state,
                final_tick: sim.tick(),
                score: sim.score(),
                breakdown: sim.breakdown(),
                trace_extent: trace.extent(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::rocketsol::{RocketSol, RocketSolCourse};

    fn empty_course(finish_x: i64) -> RocketSolCourse {
        RocketSolCourse {
            obstacles: Vec::new(),
            rings: Vec::new(),
            finish_x,
        }
    }

    #[test]
    fn time_limit_caps_long_runs() {
        let course = empty_course(i64::MAX / 4);
        let outcome = simulate::<RocketSol>(&course, &InputTrace::empty(), 50).unwrap();
        assert_eq!(outcome.end_state, EndState::TimeLimit);
        assert_eq!(outcome.final_tick, 50);
        assert!(outcome.outlived_trace());
    }

    #[test]
    fn steps_after_end_are_ignored() {
        let course = empty_course(1);
        let mut sim = Simulation::<RocketSol>::new(&course, 10);
        assert_eq!(
            sim.step(TickInput::Neutral).unwrap(),
            Phase::Ended(EndState::FinishLine)
        );
        assert_eq!(
            sim.step(TickInput::Neutral).unwrap(),
            Phase::Ended(EndState::FinishLine)
        );
        assert_eq!(sim.tick(), 1);
    }

    #[test]
    fn zero_tick_ceiling_is_a_fault() {
        let course = empty_course(1);
        assert!(matches!(
            simulate::<RocketSol>(&course, &InputTrace::empty(), 0),
            Err(EngineFault::Invariant { .. })
        ));
    }

    #[test]
    fn checked_add_reports_context() {
        assert_eq!(checked_add(1, 2, "points", 3), Ok(3));
        assert_eq!(
            checked_add(i64::MAX, 1, "points", 9),
            Err(EngineFault::Overflow {
                context: "points",
                tick: 9
            })
        );
    }
}
