//! The task scheduler (`spec.md` §4.7): a single long-running background
//! worker that, once per tick, scans cards that graduated into `review`
//! today and generates follow-up exercises for them.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use srs_domain::{Clock, Task, TaskType};
use srs_engine::SrsStore;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::generator::ContentGenerator;

/// Tunables for the task scheduler.
#[derive(Debug, Clone)]
pub struct TaskSchedulerConfig {
    /// How often the loop wakes up to scan for newly-graduated cards.
    pub tick_period: StdDuration,
    /// Per-user cap on tasks generated per calendar day.
    pub max_tasks_per_day: u32,
    /// Task types to weight equally when choosing what to generate.
    /// Per-user overrides of this subset are a user-preferences concern
    /// not modeled in the current data model; every user gets this set.
    pub task_types: Vec<TaskType>,
}

impl Default for TaskSchedulerConfig {
    fn default() -> Self {
        Self {
            tick_period: StdDuration::from_secs(60),
            max_tasks_per_day: 10,
            task_types: TaskType::ALL.to_vec(),
        }
    }
}

/// Outcome of one tick, returned for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub candidates_seen: usize,
    pub tasks_generated: usize,
    pub generator_failures: usize,
    pub skipped_over_quota: usize,
}

/// Background worker driving task generation. Runs as one task per
/// process; the source's multi-worker concern (an advisory per-card
/// lease) is unnecessary at this scale and is left as a note for anyone
/// scaling this out, not implemented.
pub struct TaskScheduler {
    store: Arc<dyn SrsStore>,
    clock: Arc<dyn Clock>,
    generator: Arc<dyn ContentGenerator>,
    config: TaskSchedulerConfig,
}

impl TaskScheduler {
    #[must_use]
    pub fn new(
        store: Arc<dyn SrsStore>,
        clock: Arc<dyn Clock>,
        generator: Arc<dyn ContentGenerator>,
        config: TaskSchedulerConfig,
    ) -> Self {
        Self {
            store,
            clock,
            generator,
            config,
        }
    }

    /// Runs the loop until `shutdown` is triggered, then completes the
    /// in-flight tick and returns.
    pub async fn run(&self, shutdown: CancellationToken) {
        let mut interval = tokio::time::interval(self.config.tick_period);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("task scheduler shutting down");
                    return;
                }
                _ = interval.tick() => {
                    let report = self.tick().await;
                    info!(
                        candidates = report.candidates_seen,
                        generated = report.tasks_generated,
                        failures = report.generator_failures,
                        skipped = report.skipped_over_quota,
                        "task scheduler tick complete"
                    );
                }
            }
        }
    }

    /// Runs exactly one scan-and-generate pass.
    pub async fn tick(&self) -> TickReport {
        let now = self.clock.now();
        let today_start = self.clock.today_start();
        let today_end = self.clock.today_end();

        let candidates = match self
            .store
            .list_cards_graduated_for_task_gen(today_start, today_end, now)
            .await
        {
            Ok(cards) => cards,
            Err(err) => {
                warn!(error = %err, "failed to list graduation candidates");
                return TickReport::default();
            }
        };

        let mut report = TickReport {
            candidates_seen: candidates.len(),
            ..TickReport::default()
        };

        for card in candidates {
            let already_today = match self
                .store
                .count_tasks_created_today(card.user_id, today_start, today_end)
                .await
            {
                Ok(count) => count,
                Err(err) => {
                    warn!(error = %err, card_id = %card.id, "failed to count today's tasks");
                    continue;
                }
            };
            if already_today >= self.config.max_tasks_per_day as usize {
                report.skipped_over_quota += 1;
                continue;
            }

            let task_type = choose_task_type(&self.config.task_types, card.id.to_string().as_bytes());
            match self.generator.generate(&card, task_type).await {
                Ok((content, answer)) => {
                    let task = Task::new(task_type, content, answer, card.id, card.user_id, now);
                    if let Err(err) = self.store.insert_task(task).await {
                        warn!(error = %err, card_id = %card.id, "failed to persist generated task");
                    } else {
                        report.tasks_generated += 1;
                    }
                }
                Err(err) => {
                    warn!(error = %err, card_id = %card.id, "content generator failed, retrying next tick");
                    report.generator_failures += 1;
                }
            }
        }

        report
    }
}

/// Deterministic weighted choice among the configured task types, seeded
/// by the card id so the same card prefers the same type across retried
/// ticks rather than thrashing between generator calls.
fn choose_task_type(types: &[TaskType], seed: &[u8]) -> TaskType {
    let fallback = TaskType::VocabRecall;
    if types.is_empty() {
        return fallback;
    }
    let sum: u32 = seed.iter().map(|b| *b as u32).sum();
    types[(sum as usize) % types.len()]
}

/// Suggested per-user task_types weighting when the configured subset is
/// narrower than all three; exposed for callers assembling
/// [`TaskSchedulerConfig`] from user preferences once those exist.
#[must_use]
pub fn default_task_type_weights() -> Vec<(TaskType, f64)> {
    TaskType::ALL.iter().map(|t| (*t, 1.0 / 3.0)).collect()
}
