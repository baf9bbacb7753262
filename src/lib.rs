//! Math Runner - timed arithmetic practice in the terminal.
//!
//! The library holds the problem generator, the session state machine and
//! the stats/persistence collaborators. The binary only wires them to a TUI.

pub mod build_info;
pub mod coach;
pub mod config;
pub mod constants;
pub mod game_loop;
pub mod input;
pub mod persistence;
pub mod problem;
pub mod runner;
pub mod session;
pub mod stats;
pub mod store;
pub mod ui;

pub use config::GameConfig;
pub use game_loop::GameLoop;
pub use problem::{generate_problem, Operation, Problem, ProblemSource, RandomProblems};
pub use session::{EndReason, GameSession, SessionEvent, SessionPhase, Transition, Verdict};
pub use stats::{Dashboard, PlayerProfile, SessionSummary};
pub use store::{MemoryRecorder, ProfileStore, StatsRecorder, StoreError};
