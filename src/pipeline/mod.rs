//! Long-running entry points.
//!
//! - `PurgeJob`: Daily removal of expired releases
//! - `run_session`: Line-based chat loop fed by `spawn_line_reader`

pub mod purge;
pub mod session;

pub use purge::PurgeJob;
pub use session::{run_session, spawn_line_reader};
