//! Solve statistics subsystem.
//!
//! # Data Flow
//! ```text
//! tracked handles
//!     → leaderboard.rs (chunks of 3, pause between chunks)
//!         → solve_counter.rs (one user.status call per handle)
//!             → ResilientClient
//!         → failures become None for that handle only
//!     → Leaderboard (recent ranking, all-time ranking, missing handles)
//! ```
//!
//! # Design Decisions
//! - Stats are derived on every request, never persisted
//! - Distinctness is per (contest, problem index), not per submission
//! - One remote failure degrades coverage, not correctness

pub mod leaderboard;
pub mod solve_counter;

pub use leaderboard::{build_leaderboard, compute_batch, BatchPolicy, Leaderboard};
pub use solve_counter::{tally, SolveCounter, SolveStat};
