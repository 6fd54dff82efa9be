// src/engine/mod.rs

//! Orchestration engine.
//!
//! [`Orchestrator::start`] performs the startup sequence: initial archive
//! extraction, then one OS watcher plus one [`WatchLoop`](crate::watch::WatchLoop)
//! per configured watch mode. Everything it launches is owned by the
//! returned [`WatchSession`], which is also the shutdown path.

pub mod runtime;
pub mod session;

pub use runtime::Orchestrator;
pub use session::WatchSession;

/// How a successful [`Orchestrator::start`] ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// Init mode: archives were extracted and nothing is being watched.
    InitCompleted,
    /// Watch loops are running until the session is shut down.
    Watching(WatchSession),
}
