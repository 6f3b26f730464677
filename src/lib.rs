//! namescout - a concurrent username availability scanner.
//!
//! Candidates are drawn from a generation pattern or a file, admitted at most
//! once through the dedup gate, probed against the availability oracle with
//! retries, and tallied. Available names are appended to the valid log and
//! pushed to a webhook best-effort.

pub mod config;
pub mod dedup;
pub mod engine;
pub mod generate;
pub mod metrics;
pub mod notify;
pub mod oracle;
pub mod prober;
pub mod retry;
pub mod sink;
pub mod source;
pub mod types;
