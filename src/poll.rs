// Watching a batch until the service reports it `completed`.
//
// The loop is a fixed schedule: sleep, fetch the batch list, look for our
// batch, report what we saw. It stops on the terminal status or when the
// attempt budget is spent. Sleeping and HTTP both go through traits so the
// whole loop can be driven from tests without a clock or a network.

use crate::api::BatchApi;
use crate::config::PollSchedule;
use crate::error::ApiError;
use crate::model::{Batch, BatchId};
use anyhow::Result;
use std::time::Duration;

/// Something that can block for a while.
pub trait Sleeper {
    fn sleep(&mut self, duration: Duration);
}

/// What happened on one attempt; handed to the caller as it happens.
#[derive(Debug)]
pub enum PollEvent<'a> {
    /// The batch was found. `elapsed` is `attempt × interval`.
    Snapshot { elapsed: Duration, batch: &'a Batch },
    /// The list came back but our batch was not in it.
    NotFound { attempt: u32, batch_id: &'a BatchId },
    /// The list endpoint answered with a non-2xx status.
    Rejected { attempt: u32, status: u16 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Completed { attempts: u32, batch: Batch },
    /// Budget spent without seeing `completed`.
    Exhausted {
        attempts: u32,
        last_seen: Option<Batch>,
    },
}

impl PollOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, PollOutcome::Completed { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            PollOutcome::Completed { attempts, .. } | PollOutcome::Exhausted { attempts, .. } => {
                *attempts
            }
        }
    }
}

/// Poll until `batch_id` reaches the terminal status or `schedule.attempts`
/// checks have been made.
///
/// Transport and decoding failures abort the loop; a non-2xx status from the
/// list endpoint is reported through `on_event` and the next attempt runs.
pub fn poll_until_complete<A, S, F>(
    api: &A,
    sleeper: &mut S,
    batch_id: &BatchId,
    schedule: PollSchedule,
    mut on_event: F,
) -> Result<PollOutcome>
where
    A: BatchApi + ?Sized,
    S: Sleeper + ?Sized,
    F: FnMut(PollEvent<'_>),
{
    let mut last_seen = None;

    for attempt in 0..schedule.attempts {
        sleeper.sleep(schedule.interval);
        tracing::debug!(attempt, %batch_id, "checking batch status");

        let batches = match api.list_batches() {
            Ok(batches) => batches,
            Err(err) => {
                let status = err.downcast_ref::<ApiError>().and_then(ApiError::status);
                match status {
                    Some(status) => {
                        on_event(PollEvent::Rejected { attempt, status });
                        continue;
                    }
                    None => return Err(err),
                }
            }
        };

        let Some(batch) = batches.into_iter().find(|b| &b.id == batch_id) else {
            on_event(PollEvent::NotFound { attempt, batch_id });
            continue;
        };

        on_event(PollEvent::Snapshot {
            elapsed: schedule.interval * attempt,
            batch: &batch,
        });

        if batch.is_completed() {
            tracing::info!(%batch_id, attempts = attempt + 1, "batch completed");
            return Ok(PollOutcome::Completed {
                attempts: attempt + 1,
                batch,
            });
        }
        last_seen = Some(batch);
    }

    tracing::warn!(%batch_id, attempts = schedule.attempts, "polling budget exhausted");
    Ok(PollOutcome::Exhausted {
        attempts: schedule.attempts,
        last_seen,
    })
}
