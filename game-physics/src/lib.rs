//! Game Physics Verification Engine
//!
//! Deterministic course generation and replay verification for the RocketSol,
//! DriveHard and Warp mini-games. A seed expands into a course; a claimed input
//! trace is replayed against that course in integer fixed-point physics and the
//! resulting score is reconciled exactly against the client's claim.
//!
//! Every operation is a pure computation over call-local state, so verifiers
//! may be shared freely across threads.

pub mod boundary;
pub mod config;
mod constants;
pub mod course;
pub mod ffi;
pub mod games;
pub mod numbers;
pub mod reconcile;
pub mod seed;
pub mod sim;
pub mod trace;
pub mod verify;

// Re-export commonly used types
pub use boundary::{BoundaryError, TextRequest, error_text, generate_course_text, verify_text};
pub use config::{ConfigError, EngineConfig, ShortTracePolicy};
pub use course::{CourseMismatch, check_integrity, fingerprint};
pub use games::drivehard::{DriveHardCourse, DriveHardEvent, DriveHardState};
pub use games::rocketsol::{RocketSolCourse, RocketSolEvent, RocketSolState};
pub use games::warp::{WarpCourse, WarpEvent, WarpState};
pub use games::{DriveHard, GameKind, GameRules, RocketSol, Warp};
pub use reconcile::{Breakdown, Outcome, Reason, ReasonCode, Verdict, reconcile};
pub use seed::{RandomStream, SeedError};
pub use sim::{EndState, EngineFault, Phase, SimOutcome, Simulation, simulate};
pub use trace::{InputTrace, MalformedInput, TickInput, TraceEvent, TraceLimits};
pub use verify::{ReplayError, Verifier, VerifyRequest};
