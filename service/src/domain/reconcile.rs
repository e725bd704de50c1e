use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use futures::future::join_all;
use serde_json::Value;

use curtain_common::domain::{Boundary, ContentId, extract_boundaries, parse_forest};

use crate::domain::{BoundaryJob, CachePurger, JobStore, OneShotScheduler, PolicyStore};

/// Keeps the scheduled purge jobs of every content item aligned with the
/// schedules its saved tree currently carries.
///
/// Invoked from the host's save and delete hooks. Per content item the
/// cancel/schedule/persist sequence runs under a mutex, so two overlapping
/// saves cannot orphan jobs even if the host fails to serialize them.
pub struct Reconciler<J, S, Po, Pu> {
    jobs: J,
    scheduler: S,
    policy: Po,
    purger: Option<Pu>,
    reference: Tz,
    locks: Mutex<HashMap<ContentId, Arc<tokio::sync::Mutex<()>>>>,
}

impl<J, S, Po, Pu> Reconciler<J, S, Po, Pu>
where
    J: JobStore,
    S: OneShotScheduler,
    Po: PolicyStore,
    Pu: CachePurger,
{
    pub fn new(jobs: J, scheduler: S, policy: Po, purger: Option<Pu>, reference: Tz) -> Self {
        Self {
            jobs,
            scheduler,
            policy,
            purger,
            reference,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Recomputes this content item's purge jobs from its freshly saved tree.
    ///
    /// Cancels everything previously recorded, schedules one job per future
    /// boundary, persists the new list. When purge scheduling is disabled or
    /// no purge collaborator is configured, the tree is not even parsed: the
    /// item is treated as having no schedule, and stale jobs are dropped.
    pub async fn reconcile(
        &self,
        content_id: &ContentId,
        tree: &Value,
        now: DateTime<Utc>,
    ) -> Result<Vec<Boundary>, anyhow::Error> {
        let _guard = self.content_guard(content_id).await;

        let policy = self.policy.load().await?;
        let scheduling_active = policy.purge_scheduling_enabled && self.purger.is_some();

        let candidates = if scheduling_active {
            extract_boundaries(&parse_forest(tree), now, self.reference)
        } else {
            Vec::new()
        };

        self.cancel_recorded(content_id).await?;

        for boundary in &candidates {
            let job = BoundaryJob {
                content_id: content_id.clone(),
                boundary: *boundary,
            };
            if self.scheduler.is_scheduled(&job).await {
                continue;
            }
            self.scheduler.schedule_at(job).await?;
        }

        self.jobs.replace(content_id, &candidates).await?;

        tracing::debug!(
            content_id = %content_id,
            jobs = candidates.len(),
            active = scheduling_active,
            "reconciled purge jobs"
        );
        Ok(candidates)
    }

    /// Delete/deactivate hook: drops every job this content item still has.
    pub async fn remove_content(&self, content_id: &ContentId) -> Result<usize, anyhow::Error> {
        let _guard = self.content_guard(content_id).await;

        let cancelled = self.cancel_recorded(content_id).await?;
        self.jobs.clear(content_id).await?;

        tracing::debug!(content_id = %content_id, cancelled, "removed content jobs");
        Ok(cancelled)
    }

    /// Re-arms every persisted job after a restart. Jobs whose instant has
    /// already passed fire immediately, like the missed one-shot events of
    /// the host scheduler this replaces.
    pub async fn restore(&self) -> Result<usize, anyhow::Error> {
        let mut armed = 0;
        for job in self.jobs.load_all().await? {
            if self.scheduler.is_scheduled(&job).await {
                continue;
            }
            self.scheduler.schedule_at(job).await?;
            armed += 1;
        }

        tracing::info!(armed, "restored scheduled purge jobs");
        Ok(armed)
    }

    /// Cancels every recorded job for one content item; cancelling a job the
    /// scheduler no longer knows is a no-op, not an error.
    async fn cancel_recorded(&self, content_id: &ContentId) -> Result<usize, anyhow::Error> {
        let recorded: Vec<BoundaryJob> = self
            .jobs
            .load(content_id)
            .await?
            .into_iter()
            .map(|boundary| BoundaryJob {
                content_id: content_id.clone(),
                boundary,
            })
            .collect();

        let results = join_all(recorded.iter().map(|job| self.scheduler.cancel(job))).await;
        for (job, result) in recorded.iter().zip(results) {
            if let Err(error) = result {
                tracing::warn!(
                    content_id = %job.content_id,
                    kind = job.boundary.kind.as_str(),
                    error = %error,
                    "failed to cancel scheduled purge job"
                );
            }
        }

        Ok(recorded.len())
    }

    async fn content_guard(&self, content_id: &ContentId) -> tokio::sync::OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().expect("content lock table poisoned");
            locks.entry(content_id.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }
}
