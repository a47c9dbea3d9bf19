//! In-process scrape queue.
//!
//! Member ids are pushed onto an unbounded channel; a single dispatcher task
//! drains it and spawns one task per job, with a semaphore bounding how many
//! run at once. Jobs for distinct members run concurrently. A job task that
//! dies leaves its member marked `failed` rather than stuck in `processing`.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::{Id, JoinError, JoinHandle, JoinSet};

use super::runner::ScrapeJob;
use crate::Error;

/// Handle used to trigger scrapes. Cheap to clone.
#[derive(Clone, Debug)]
pub struct ScrapeQueue {
    tx: mpsc::UnboundedSender<i64>,
}

impl ScrapeQueue {
    /// Start the dispatcher on the current tokio runtime.
    ///
    /// The dispatcher exits once every `ScrapeQueue` handle has been dropped
    /// and the jobs already received have been spawned.
    pub fn start(job: ScrapeJob, max_concurrent: usize) -> (Self, JoinHandle<()>) {
        let (queue, mut rx) = Self::channel();
        let permits = Arc::new(Semaphore::new(max_concurrent.max(1)));

        let dispatcher = tokio::spawn(async move {
            let mut running = JoinSet::new();
            let mut owners = HashMap::new();

            while let Some(member_id) = rx.recv().await {
                let Ok(permit) = permits.clone().acquire_owned().await else {
                    break;
                };
                let worker = job.clone();

                let handle = running.spawn(async move {
                    let _permit = permit;
                    let outcome = worker.perform(member_id).await;
                    tracing::debug!(member_id, ?outcome, "scrape job finished");
                });
                owners.insert(handle.id(), member_id);

                while let Some(joined) = running.try_join_next_with_id() {
                    reap(&job, &mut owners, joined).await;
                }
            }

            while let Some(joined) = running.join_next_with_id().await {
                reap(&job, &mut owners, joined).await;
            }
            tracing::debug!("scrape queue closed");
        });

        (queue, dispatcher)
    }

    /// A queue without a dispatcher; the caller receives the enqueued ids.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<i64>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Schedule a scrape for `member_id`.
    ///
    /// Callers must have persisted the member with status `pending` first,
    /// so readers never observe the state from before the trigger.
    pub fn enqueue(&self, member_id: i64) -> Result<(), Error> {
        self.tx.send(member_id).map_err(|_| Error::QueueClosed(member_id))?;
        tracing::debug!(member_id, "scrape job enqueued");
        Ok(())
    }
}

async fn reap(job: &ScrapeJob, owners: &mut HashMap<Id, i64>, joined: Result<(Id, ()), JoinError>) {
    match joined {
        Ok((id, ())) => {
            owners.remove(&id);
        }
        Err(e) => {
            if let Some(member_id) = owners.remove(&e.id()) {
                job.abandon(member_id, &e.to_string()).await;
            }
        }
    }
}
