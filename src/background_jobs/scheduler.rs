use super::context::JobContext;
use super::job::{BackgroundJob, JobError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Upper bound on how long the loop sleeps when no job is registered.
const IDLE_CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// Re-check period for a job that is still running past its due time.
const BUSY_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// How long shutdown waits for a cancelled job to return.
const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(30);

/// Manages background job scheduling and execution.
pub struct JobScheduler {
    jobs: HashMap<String, Arc<dyn BackgroundJob>>,

    /// Next due time per job. A job is due immediately after registration.
    next_runs: HashMap<String, Instant>,

    /// Currently running jobs with their task handles.
    running_handles: HashMap<String, JoinHandle<()>>,

    /// Cancellation tokens for each running job.
    job_cancel_tokens: HashMap<String, CancellationToken>,

    /// Token to signal scheduler shutdown.
    shutdown_token: CancellationToken,
}

impl JobScheduler {
    pub fn new(shutdown_token: CancellationToken) -> Self {
        Self {
            jobs: HashMap::new(),
            next_runs: HashMap::new(),
            running_handles: HashMap::new(),
            job_cancel_tokens: HashMap::new(),
            shutdown_token,
        }
    }

    /// Register a job with the scheduler.
    pub fn register_job(&mut self, job: Arc<dyn BackgroundJob>) {
        let job_id = job.id().to_string();
        info!(
            "Registering job: {} ({}) every {:?} - {}",
            job_id,
            job.name(),
            job.interval(),
            job.description()
        );
        self.next_runs.insert(job_id.clone(), Instant::now());
        self.jobs.insert(job_id, job);
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_job_running(&self, job_id: &str) -> bool {
        self.running_handles
            .get(job_id)
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Runs the scheduler loop on its own task.
    pub fn spawn(mut self) -> SchedulerHandle {
        let shutdown_token = self.shutdown_token.clone();
        let join = tokio::spawn(async move { self.run().await });
        SchedulerHandle {
            shutdown_token,
            join,
        }
    }

    /// Main scheduler loop. Returns once the shutdown token is cancelled and
    /// running jobs have stopped.
    pub async fn run(&mut self) {
        info!(
            "Starting job scheduler with {} registered jobs",
            self.job_count()
        );

        loop {
            self.cleanup_completed_jobs();

            let sleep_duration = self.time_until_next_scheduled_job();
            debug!(
                "Scheduler sleeping for {:?} until next scheduled job",
                sleep_duration
            );

            tokio::select! {
                _ = tokio::time::sleep(sleep_duration) => {
                    self.run_due_jobs();
                }
                _ = self.shutdown_token.cancelled() => {
                    info!("Scheduler received shutdown signal");
                    self.shutdown().await;
                    break;
                }
            }
        }

        info!("Job scheduler stopped");
    }

    fn time_until_next_scheduled_job(&self) -> Duration {
        let now = Instant::now();
        self.next_runs
            .iter()
            .map(|(job_id, next_run)| {
                let remaining = next_run.saturating_duration_since(now);
                if remaining.is_zero() && self.is_job_running(job_id) {
                    BUSY_POLL_INTERVAL
                } else {
                    remaining
                }
            })
            .min()
            .unwrap_or(IDLE_CHECK_INTERVAL)
            .min(IDLE_CHECK_INTERVAL)
    }

    fn run_due_jobs(&mut self) {
        let now = Instant::now();
        let due: Vec<String> = self
            .next_runs
            .iter()
            .filter(|(job_id, next_run)| **next_run <= now && !self.is_job_running(job_id))
            .map(|(job_id, _)| job_id.clone())
            .collect();

        for job_id in due {
            self.spawn_job(&job_id);
        }
    }

    fn spawn_job(&mut self, job_id: &str) {
        let job = match self.jobs.get(job_id) {
            Some(job) => Arc::clone(job),
            None => {
                error!("Attempted to spawn unknown job: {}", job_id);
                return;
            }
        };

        // Schedule the next run from the start of this one.
        self.next_runs
            .insert(job_id.to_string(), Instant::now() + job.interval());

        let cancel_token = self.shutdown_token.child_token();
        self.job_cancel_tokens
            .insert(job_id.to_string(), cancel_token.clone());
        let ctx = JobContext::new(cancel_token);

        debug!("Starting job: {}", job_id);
        let job_id_owned = job_id.to_string();
        let handle = tokio::spawn(async move {
            let start_time = Instant::now();
            let result = job.execute(&ctx).await;
            let elapsed = start_time.elapsed();

            match result {
                Ok(()) => debug!("Job {} completed in {:?}", job_id_owned, elapsed),
                Err(JobError::Cancelled) => {
                    info!("Job {} was cancelled after {:?}", job_id_owned, elapsed)
                }
                Err(e) => warn!("Job {} failed after {:?}: {}", job_id_owned, elapsed, e),
            }
        });

        self.running_handles.insert(job_id.to_string(), handle);
    }

    fn cleanup_completed_jobs(&mut self) {
        let completed: Vec<String> = self
            .running_handles
            .iter()
            .filter(|(_, handle)| handle.is_finished())
            .map(|(job_id, _)| job_id.clone())
            .collect();

        for job_id in completed {
            self.running_handles.remove(&job_id);
            self.job_cancel_tokens.remove(&job_id);
        }
    }

    /// Cancels running jobs and waits for them to return.
    async fn shutdown(&mut self) {
        info!("Shutting down scheduler...");

        for (job_id, token) in &self.job_cancel_tokens {
            debug!("Cancelling job: {}", job_id);
            token.cancel();
        }

        for (job_id, handle) in self.running_handles.drain() {
            match tokio::time::timeout(SHUTDOWN_GRACE_PERIOD, handle).await {
                Ok(Err(e)) => error!("Job {} panicked during shutdown: {}", job_id, e),
                Err(_) => warn!("Job {} did not stop within {:?}", job_id, SHUTDOWN_GRACE_PERIOD),
                Ok(Ok(())) => {}
            }
        }

        self.job_cancel_tokens.clear();
        info!("Scheduler shutdown complete");
    }
}

/// Handle to a scheduler running on its own task.
pub struct SchedulerHandle {
    shutdown_token: CancellationToken,
    join: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Signals shutdown and waits for the scheduler loop to finish.
    pub async fn shutdown(self) {
        self.shutdown_token.cancel();
        if let Err(e) = self.join.await {
            error!("Job scheduler task failed: {}", e);
        }
    }
}
