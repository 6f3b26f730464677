//! Best-effort webhook notification for available candidates.
//!
//! Positive probe results are enqueued onto the publisher's channel; the
//! publisher task spawns one delivery per message so a slow webhook never
//! stalls the workers or other deliveries. Delivery makes at most
//! [`MAX_ATTEMPTS`] attempts and then abandons the message silently: no
//! counter, no persisted record, just a debug-level trace event.
//!
//! The HTTP side sits behind the [`WebhookTransport`] trait so tests can
//! script status sequences (429 with `Retry-After`, repeated 500s, transport
//! failures) without a network.

use std::future::Future;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::retry::{AttemptFailure, PublishBackoff};
use crate::types::Candidate;

/// Maximum delivery attempts per message.
pub const MAX_ATTEMPTS: u32 = 5;

/// Capacity of the publisher's inbound queue. A full queue drops the
/// notification rather than blocking the probing worker.
pub const QUEUE_DEPTH: usize = 1024;

/// Transport-level failure before any HTTP response was received.
#[derive(Debug, Error)]
#[error("webhook transport error: {0}")]
pub struct WebhookError(pub String);

impl From<reqwest::Error> for WebhookError {
    fn from(err: reqwest::Error) -> Self {
        WebhookError(err.to_string())
    }
}

/// The observable part of a webhook HTTP response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebhookReply {
    pub status: u16,
    /// Parsed integer `Retry-After` seconds, when the header was present
    /// and parseable.
    pub retry_after: Option<u64>,
}

/// Posts one JSON payload to a webhook target.
///
/// One attempt per call; the retry policy lives in [`deliver`].
pub trait WebhookTransport {
    fn post(
        &self,
        target: &str,
        body: &serde_json::Value,
    ) -> impl Future<Output = Result<WebhookReply, WebhookError>> + Send;
}

/// Production webhook transport over `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct HttpWebhook {
    client: reqwest::Client,
}

impl HttpWebhook {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl WebhookTransport for HttpWebhook {
    async fn post(&self, target: &str, body: &serde_json::Value) -> Result<WebhookReply, WebhookError> {
        let response = self.client.post(target).json(body).send().await?;
        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse().ok());
        Ok(WebhookReply {
            status,
            retry_after,
        })
    }
}

/// Renders the webhook message body for an available candidate.
pub fn render_message(candidate: &Candidate) -> serde_json::Value {
    serde_json::json!({ "content": format!("Claimable! `{candidate}`") })
}

/// Delivers one notification with the retried, policy-driven schedule.
///
/// Per attempt: 200/204 ends delivery; 429 waits the signaled `Retry-After`
/// (or a fixed fallback); any other status or a transport failure waits a
/// randomized interval. After [`MAX_ATTEMPTS`] failures the message is
/// dropped without signaling anyone.
pub async fn deliver<T: WebhookTransport>(
    transport: &T,
    target: &str,
    candidate: &Candidate,
    backoff: &PublishBackoff,
) {
    let body = render_message(candidate);

    for attempt in 1..=MAX_ATTEMPTS {
        let failure = match transport.post(target, &body).await {
            Ok(reply) if reply.status == 200 || reply.status == 204 => {
                trace!(%candidate, attempt, "webhook delivered");
                return;
            }
            Ok(reply) if reply.status == 429 => AttemptFailure::RateLimited {
                retry_after: reply.retry_after,
            },
            Ok(reply) => AttemptFailure::Status(reply.status),
            Err(err) => {
                trace!(%candidate, attempt, error = %err, "webhook attempt failed");
                AttemptFailure::Transport
            }
        };

        if attempt == MAX_ATTEMPTS {
            break;
        }

        let delay = backoff.delay_for(failure, &mut rand::thread_rng());
        tokio::time::sleep(delay).await;
    }

    debug!(%candidate, attempts = MAX_ATTEMPTS, "webhook delivery abandoned");
}

/// Sending side of the publisher queue, cloned into every prober.
///
/// `notify` is fire-and-forget: a full or closed queue drops the message,
/// and a handle constructed with [`NotifierHandle::disabled`] (no webhook
/// configured for the run) drops everything.
#[derive(Debug, Clone)]
pub struct NotifierHandle {
    tx: Option<mpsc::Sender<Candidate>>,
}

impl NotifierHandle {
    /// A handle that silently discards all notifications.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Creates a handle plus the receiving end of its queue.
    pub fn channel(depth: usize) -> (Self, mpsc::Receiver<Candidate>) {
        let (tx, rx) = mpsc::channel(depth);
        (Self { tx: Some(tx) }, rx)
    }

    /// Enqueues a candidate for notification, best-effort.
    pub fn notify(&self, candidate: Candidate) {
        let Some(tx) = &self.tx else {
            trace!(%candidate, "no webhook configured, dropping notification");
            return;
        };
        if let Err(err) = tx.try_send(candidate) {
            debug!(error = %err, "notification queue unavailable, dropping");
        }
    }
}

/// Spawns the publisher task.
///
/// Returns the handle probers enqueue onto and the task's join handle. The
/// task exits once every handle clone has been dropped and the queue is
/// drained; in-flight deliveries are detached and finish on their own
/// (or die with the process — delivery is not guaranteed).
pub fn spawn<T>(
    transport: T,
    target: Option<String>,
    backoff: PublishBackoff,
) -> (NotifierHandle, JoinHandle<()>)
where
    T: WebhookTransport + Clone + Send + Sync + 'static,
{
    let Some(target) = target else {
        let task = tokio::spawn(async {});
        return (NotifierHandle::disabled(), task);
    };

    let (handle, mut rx) = NotifierHandle::channel(QUEUE_DEPTH);
    let task = tokio::spawn(async move {
        while let Some(candidate) = rx.recv().await {
            let transport = transport.clone();
            let target = target.clone();
            tokio::spawn(async move {
                deliver(&transport, &target, &candidate, &backoff).await;
            });
        }
    });
    (handle, task)
}
