//! Background estimation worker.
//!
//! Swap estimation is pure and CPU bound, so it runs on the blocking pool:
//! - Jobs reach a long-lived dispatcher task over a bounded channel
//! - Each job runs on its own blocking thread against a cloned market snapshot
//! - Callers stop waiting after a timeout; in-flight work is left to finish

use runesx_routing::config::RoutingConfig;
use runesx_routing::error::EstimateError;
use runesx_routing::estimator::{EstimateRequest, MarketSnapshot, SwapEstimate, estimate_swap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

/// Configuration for the estimation worker.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Jobs that may queue before submitters wait.
    pub queue_capacity: usize,
    /// How long a caller waits for a result.
    pub request_timeout: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 64,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl WorkerConfig {
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// One estimate to run.
pub struct EstimateJob {
    pub request: EstimateRequest,
    pub snapshot: MarketSnapshot,
    /// Where the result goes. Dropped unanswered if the job panics.
    pub reply: oneshot::Sender<Result<SwapEstimate, EstimateError>>,
}

/// Handle to the estimation worker. Cloning shares the same worker.
#[derive(Clone)]
pub struct EstimationWorker {
    jobs: mpsc::Sender<EstimateJob>,
    config: WorkerConfig,
}

impl EstimationWorker {
    /// Starts the worker on the current runtime.
    pub fn spawn(routing: RoutingConfig, config: WorkerConfig) -> Self {
        let (jobs, rx) = mpsc::channel(config.queue_capacity.max(1));
        tokio::spawn(run_worker(Arc::new(routing), rx));
        info!(
            queue_capacity = config.queue_capacity,
            timeout = ?config.request_timeout,
            "Estimation worker started"
        );
        Self { jobs, config }
    }

    /// Wraps an existing job channel; whoever owns the receiver does the work.
    pub fn from_sender(jobs: mpsc::Sender<EstimateJob>, config: WorkerConfig) -> Self {
        Self { jobs, config }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Runs one estimate and waits for the result.
    pub async fn estimate(
        &self,
        request: EstimateRequest,
        snapshot: MarketSnapshot,
    ) -> Result<SwapEstimate, EstimateError> {
        let (reply, result) = oneshot::channel();
        let job = EstimateJob {
            request,
            snapshot,
            reply,
        };
        self.jobs
            .send(job)
            .await
            .map_err(|_| EstimateError::WorkerUnavailable)?;

        let timeout = self.config.request_timeout;
        match tokio::time::timeout(timeout, result).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => {
                error!("Estimation worker dropped the job");
                Err(EstimateError::WorkerUnavailable)
            }
            Err(_) => {
                error!(timeout = ?timeout, "Estimation timed out");
                Err(EstimateError::Timeout(timeout))
            }
        }
    }
}

async fn run_worker(routing: Arc<RoutingConfig>, mut jobs: mpsc::Receiver<EstimateJob>) {
    while let Some(job) = jobs.recv().await {
        let routing = Arc::clone(&routing);
        tokio::spawn(async move {
            let EstimateJob {
                request,
                snapshot,
                reply,
            } = job;
            let computed =
                tokio::task::spawn_blocking(move || estimate_swap(&routing, &snapshot, &request))
                    .await;
            match computed {
                Ok(outcome) => {
                    if reply.send(outcome).is_err() {
                        debug!("Estimate finished after the caller stopped waiting");
                    }
                }
                Err(e) => error!(error = %e, "Estimation task failed"),
            }
        });
    }
    debug!("Estimation worker stopped");
}
