//! subaudit - submission reconciliation engine
//!
//! Audits contest submissions against the three traces a submission attempt
//! leaves behind: the local file store, the local event log and the remote
//! mirror of that log. For each contestant the traces are merged per
//! submission key, cross-checked, and turned into corrective import
//! instructions where a solution never reached the server.
//!
//! Pipeline: [`scanner`] → [`ledger`] → [`checker`] → [`resolver`], driven
//! per contestant by [`orchestrator`].

pub mod checker;
pub mod config;
pub mod error;
pub mod ledger;
pub mod orchestrator;
pub mod resolver;
pub mod scanner;

pub use crate::checker::{Anomaly, ConsistencyChecker};
pub use crate::config::AuditConfig;
pub use crate::error::{AuditError, Result};
pub use crate::ledger::{Ledger, Observation, Submission};
pub use crate::orchestrator::{run_audit, ContestantOrchestrator, ContestantReport, RunSummary};
pub use crate::resolver::{Action, ActionResolver, ImportInstruction, Resolution};
