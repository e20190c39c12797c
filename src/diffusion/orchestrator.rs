// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Submit → poll → resolve state machine for upstream generation tasks
//!
//! States: `Submitted → Polling → {Completed, Failed, TimedOut}`.
//! The loop waits a fixed interval before every status fetch and gives up
//! after a fixed number of attempts (2 s × 30 = 60 s ceiling). It blocks the
//! calling task for its whole duration and cannot be cancelled; an abandoned
//! caller leaves the upstream task running.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use super::client::{GenerationJob, GenerationService, TaskStatus};
use super::errors::GenerationError;

/// Maximum number of status fetches per task
pub const MAX_POLL_ATTEMPTS: u32 = 30;

/// Wait before each status fetch
pub const POLL_INTERVAL: Duration = Duration::from_millis(2000);

const GENERIC_FAILURE: &str = "Generation failed";

/// Sleep seam so the polling cadence can be driven instantly in tests
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Orchestrator state
#[derive(Debug, Clone, PartialEq)]
pub enum PollState {
    Submitted,
    Polling {
        task_id: String,
        attempts: u32,
    },
    Completed {
        task_id: String,
        image_url: String,
        attempts: u32,
    },
    /// `task_id` is `None` when submission never produced a task
    Failed {
        task_id: Option<String>,
        reason: String,
    },
    TimedOut {
        task_id: String,
        attempts: u32,
    },
}

impl PollState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PollState::Completed { .. } | PollState::Failed { .. } | PollState::TimedOut { .. }
        )
    }

    /// State after a submit call returned `job`
    pub fn submitted(job: &GenerationJob) -> PollState {
        if job.id.trim().is_empty() {
            return PollState::Failed {
                task_id: None,
                reason: "no task id".to_string(),
            };
        }
        PollState::Polling {
            task_id: job.id.clone(),
            attempts: 0,
        }
    }

    /// Fold one observed task status into the state.
    ///
    /// `completed` without results is treated as not done yet. Terminal
    /// states and `Submitted` are returned unchanged.
    pub fn observe(self, job: &GenerationJob, max_attempts: u32) -> PollState {
        let (task_id, attempts) = match self {
            PollState::Polling { task_id, attempts } => (task_id, attempts + 1),
            other => return other,
        };

        match job.status {
            TaskStatus::Completed if !job.results.is_empty() => PollState::Completed {
                task_id,
                image_url: job.results[0].clone(),
                attempts,
            },
            TaskStatus::Failed => PollState::Failed {
                task_id: Some(task_id),
                reason: job
                    .error
                    .clone()
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| GENERIC_FAILURE.to_string()),
            },
            _ if attempts >= max_attempts => PollState::TimedOut { task_id, attempts },
            _ => PollState::Polling { task_id, attempts },
        }
    }

    /// Convert a terminal state into the pipeline result
    pub fn into_result(self) -> Result<CompletedTask, GenerationError> {
        match self {
            PollState::Completed {
                task_id,
                image_url,
                attempts,
            } => Ok(CompletedTask {
                task_id,
                image_url,
                attempts,
            }),
            PollState::Failed {
                task_id: None,
                reason,
            } => Err(GenerationError::UpstreamProtocol(reason)),
            PollState::Failed {
                task_id: Some(task_id),
                reason,
            } => Err(GenerationError::UpstreamJobFailure {
                task_id,
                message: reason,
            }),
            PollState::TimedOut { task_id, attempts } => {
                Err(GenerationError::Timeout { task_id, attempts })
            }
            PollState::Submitted | PollState::Polling { .. } => Err(
                GenerationError::UpstreamProtocol("task did not reach a terminal state".to_string()),
            ),
        }
    }
}

/// A task that finished with at least one asset
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedTask {
    pub task_id: String,
    pub image_url: String,
    /// Status fetches it took to observe completion
    pub attempts: u32,
}

/// Drives one upstream task from submission to a terminal state
pub struct PollingOrchestrator {
    service: Arc<dyn GenerationService>,
    sleeper: Arc<dyn Sleeper>,
}

impl PollingOrchestrator {
    pub fn new(service: Arc<dyn GenerationService>) -> Self {
        Self::with_sleeper(service, Arc::new(TokioSleeper))
    }

    pub fn with_sleeper(service: Arc<dyn GenerationService>, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { service, sleeper }
    }

    /// Submit `prompt` and poll until completion, failure or timeout.
    ///
    /// Transport errors from either call are returned as-is and not retried.
    pub async fn run(&self, prompt: &str, size: &str) -> Result<CompletedTask, GenerationError> {
        let mut state = match self.service.submit(prompt, size).await {
            Ok(job) => PollState::submitted(&job),
            Err(GenerationError::UpstreamProtocol(reason)) => PollState::Failed {
                task_id: None,
                reason,
            },
            Err(e) => {
                error!("Generation submit failed: {}", e);
                return Err(e);
            }
        };

        if let PollState::Polling { task_id, .. } = &state {
            info!("Generation task started: {}", task_id);
        }

        while let PollState::Polling { task_id, attempts } = &state {
            let task_id = task_id.clone();
            let attempt = attempts + 1;

            self.sleeper.sleep(POLL_INTERVAL).await;
            let job = self.service.fetch_status(&task_id).await.map_err(|e| {
                error!("Polling task {} failed on attempt {}: {}", task_id, attempt, e);
                e
            })?;
            debug!(
                "Polling task {}: {:?} (Attempt {}/{})",
                task_id, job.status, attempt, MAX_POLL_ATTEMPTS
            );

            state = state.observe(&job, MAX_POLL_ATTEMPTS);
        }

        match &state {
            PollState::Completed {
                task_id, image_url, ..
            } => info!("Task {} completed. Original URL: {}", task_id, image_url),
            PollState::Failed { task_id, reason } => {
                error!("Task {:?} failed: {}", task_id, reason)
            }
            PollState::TimedOut { task_id, attempts } => {
                error!("Task {} timed out after {} attempts", task_id, attempts)
            }
            _ => {}
        }

        state.into_result()
    }
}
