#![warn(missing_docs)]
//! Profsweep Core - Resumable Sweep Engine
//!
//! This crate provides the batch-execution engine:
//! - Recursive, suffix-filtered corpus discovery with stable identifiers
//! - An append-only CSV result ledger that doubles as resume state
//! - Collision-safe profiler artifact naming
//! - Blocking subprocess execution with outcome classification
//! - The sequential orchestrator tying the pieces together
//!
//! The engine does no terminal I/O of its own; progress is surfaced
//! through the [`SweepObserver`] trait and everything else goes through
//! `tracing`.

mod corpus;
mod exec;
mod ledger;
mod naming;
mod orchestrator;

pub use corpus::{discover, Corpus, CorpusError, WorkItem};
pub use exec::{run_item, ExecOutcome, ItemStatus, ProfilerConfig};
pub use ledger::{Ledger, LedgerError, LedgerRecord, ResumeState};
pub use naming::NamingTable;
pub use orchestrator::{
    ItemDisposition, ItemResult, NullObserver, Orchestrator, RunOutcome, RunSummary, SetupError,
    SweepConfig, SweepObserver,
};
