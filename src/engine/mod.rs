//! Run orchestration: transport setup, the worker pool, and shutdown.
//!
//! A run wires the shared pieces together (metrics, dedup gate, valid log,
//! notification publisher, status line) and spawns one probing worker per
//! transport. Generated runs loop until the shutdown token cancels; list runs
//! end when the shared queue drains. Either way the engine then winds down
//! the publisher and status tasks before returning.
//!
//! # Worker isolation
//!
//! Each worker is its own tokio task. A worker that dies takes only its own
//! throughput with it; the join loop logs the failure and the run continues
//! on the remaining workers.

pub mod queue;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::dedup::DedupGate;
use crate::generate::Pattern;
use crate::metrics::{Metrics, status_line_loop};
use crate::notify::{self, HttpWebhook, NotifierHandle};
use crate::oracle::{HttpOracle, OracleClient, REQUEST_TIMEOUT};
use crate::prober::Prober;
use crate::retry::PublishBackoff;
use crate::sink::ValidLog;
use crate::source::CandidateSource;

use queue::JobQueue;

/// Default size of the worker pool.
pub const DEFAULT_WORKERS: usize = 10;

/// Errors that can abort a run before any probing starts.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to build HTTP transport: {0}")]
    Transport(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Everything a run needs besides its candidate source.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of probing workers.
    pub workers: usize,
    /// Webhook target for available candidates, if notification is enabled.
    pub webhook: Option<String>,
    /// Proxy URLs assigned to workers round-robin; empty means every worker
    /// shares one direct transport.
    pub proxies: Vec<String>,
    /// Path of the append-only valid log.
    pub valid_log: PathBuf,
    /// Oracle endpoint queried by every worker.
    pub oracle_url: String,
}

/// Runs the engine to completion.
///
/// Returns once the source is exhausted (list runs) or the shutdown token is
/// cancelled (generated runs), with the publisher and status tasks joined.
pub async fn run(
    config: EngineConfig,
    source: CandidateSource,
    shutdown: CancellationToken,
) -> Result<()> {
    info!(workers = config.workers, %source, "starting run");

    let metrics = Arc::new(Metrics::new());
    let dedup = Arc::new(DedupGate::new());
    let log = ValidLog::new(&config.valid_log);

    let (notifier, publisher) = notify::spawn(
        HttpWebhook::new(direct_client()?),
        config.webhook.clone(),
        PublishBackoff::DEFAULT,
    );
    let status = tokio::spawn(status_line_loop(Arc::clone(&metrics), shutdown.clone()));

    let transports = worker_transports(&config.proxies, config.workers)?;

    let mut workers = Vec::with_capacity(config.workers);
    match source {
        CandidateSource::Generated(pattern) => {
            for transport in transports {
                let prober = build_prober(&config, transport, &metrics, &log, &notifier);
                let dedup = Arc::clone(&dedup);
                let shutdown = shutdown.clone();
                workers.push(tokio::spawn(probe_generated(
                    prober, pattern, dedup, shutdown,
                )));
            }
        }
        CandidateSource::List(candidates) => {
            let jobs = Arc::new(JobQueue::new(candidates));
            for transport in transports {
                let prober = build_prober(&config, transport, &metrics, &log, &notifier);
                let jobs = Arc::clone(&jobs);
                let dedup = Arc::clone(&dedup);
                let shutdown = shutdown.clone();
                workers.push(tokio::spawn(probe_listed(prober, jobs, dedup, shutdown)));
            }
        }
    }

    for (id, worker) in workers.into_iter().enumerate() {
        if let Err(err) = worker.await {
            error!(worker = id, error = %err, "worker task failed");
        }
    }

    // A finite run reaches here with the token still live; cancel it so the
    // status task stops ticking.
    shutdown.cancel();
    drop(notifier);
    if let Err(err) = publisher.await {
        error!(error = %err, "publisher task failed");
    }
    if let Err(err) = status.await {
        error!(error = %err, "status task failed");
    }

    let snap = metrics.snapshot();
    info!(
        checked = snap.checked,
        valid = snap.valid,
        taken = snap.taken,
        censored = snap.censored,
        "run finished"
    );
    Ok(())
}

fn build_prober(
    config: &EngineConfig,
    transport: reqwest::Client,
    metrics: &Arc<Metrics>,
    log: &ValidLog,
    notifier: &NotifierHandle,
) -> Prober<HttpOracle> {
    let oracle = HttpOracle::new(transport).with_endpoint(&config.oracle_url);
    Prober::new(oracle, Arc::clone(metrics), log.clone(), notifier.clone())
}

/// Worker loop for a generated source: draw, admit, probe, repeat until
/// shutdown. Duplicate draws are skipped without touching the counters.
async fn probe_generated<O: OracleClient>(
    prober: Prober<O>,
    pattern: Pattern,
    dedup: Arc<DedupGate>,
    shutdown: CancellationToken,
) {
    while !shutdown.is_cancelled() {
        let candidate = pattern.generate(&mut rand::thread_rng());
        if !dedup.admit(&candidate) {
            // The reject path has no other await point; once a small
            // pattern space is exhausted the loop would otherwise spin
            // without ever letting the scheduler run anything else.
            tokio::task::yield_now().await;
            continue;
        }
        prober.probe(&candidate).await;
    }
}

/// Worker loop for a list source: drain the shared queue until it is empty
/// or shutdown cancels mid-run.
async fn probe_listed<O: OracleClient>(
    prober: Prober<O>,
    jobs: Arc<JobQueue>,
    dedup: Arc<DedupGate>,
    shutdown: CancellationToken,
) {
    while !shutdown.is_cancelled() {
        let Some(candidate) = jobs.pop() else {
            break;
        };
        if !dedup.admit(&candidate) {
            continue;
        }
        prober.probe(&candidate).await;
    }
}

/// Builds one transport per worker.
///
/// With proxies configured, worker `i` is bound to proxy `i % proxies.len()`
/// for its whole lifetime. A proxy URL that cannot be turned into a transport
/// degrades that worker to the direct transport instead of failing the run.
fn worker_transports(proxies: &[String], workers: usize) -> Result<Vec<reqwest::Client>> {
    let direct = direct_client()?;
    if proxies.is_empty() {
        return Ok(vec![direct; workers]);
    }

    Ok((0..workers)
        .map(|i| {
            let proxy_url = &proxies[i % proxies.len()];
            match proxied_client(proxy_url) {
                Ok(client) => client,
                Err(err) => {
                    warn!(proxy = %proxy_url, error = %err, "failed to build proxied transport, worker falls back to direct");
                    direct.clone()
                }
            }
        })
        .collect())
}

fn direct_client() -> std::result::Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()
}

fn proxied_client(proxy_url: &str) -> std::result::Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .proxy(reqwest::Proxy::all(proxy_url)?)
        .build()
}
