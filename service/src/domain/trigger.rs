use crate::domain::{BoundaryHandler, BoundaryJob, CachePurger, JobStore, PolicyStore};

/// Runs when a scheduled boundary's instant elapses: purge the page cache,
/// then drop the job's own bookkeeping entry.
///
/// Configuration may have changed since the job was scheduled, so the
/// enable flag and the purge collaborator are both re-checked at fire time.
/// The purge is fire-and-forget; a failed purge is logged and self-heals at
/// the next boundary or the next explicit purge. Bookkeeping always runs,
/// and firing twice for one triple simply finds nothing left to remove.
pub struct PurgeTrigger<J, Po, Pu> {
    jobs: J,
    policy: Po,
    purger: Option<Pu>,
}

impl<J, Po, Pu> PurgeTrigger<J, Po, Pu>
where
    J: JobStore,
    Po: PolicyStore,
    Pu: CachePurger,
{
    pub fn new(jobs: J, policy: Po, purger: Option<Pu>) -> Self {
        Self {
            jobs,
            policy,
            purger,
        }
    }

    async fn purge_if_still_enabled(&self, job: &BoundaryJob) {
        let enabled = match self.policy.load().await {
            Ok(policy) => policy.purge_scheduling_enabled,
            Err(error) => {
                tracing::warn!(error = %error, "could not load policy at fire time, skipping purge");
                false
            }
        };
        if !enabled {
            tracing::debug!(content_id = %job.content_id, "purge scheduling disabled, skipping purge");
            return;
        }

        let Some(purger) = &self.purger else {
            tracing::debug!(content_id = %job.content_id, "no purge collaborator configured");
            return;
        };

        match purger.purge_all().await {
            Ok(()) => tracing::info!(
                content_id = %job.content_id,
                kind = job.boundary.kind.as_str(),
                fires_at = %job.boundary.fires_at,
                "purged page cache at schedule boundary"
            ),
            Err(error) => tracing::warn!(
                content_id = %job.content_id,
                error = %error,
                "cache purge failed"
            ),
        }
    }
}

impl<J, Po, Pu> BoundaryHandler for PurgeTrigger<J, Po, Pu>
where
    J: JobStore,
    Po: PolicyStore,
    Pu: CachePurger,
{
    async fn boundary_elapsed(&self, job: BoundaryJob) {
        self.purge_if_still_enabled(&job).await;

        match self.jobs.remove(&job.content_id, job.boundary).await {
            Ok(true) => {}
            Ok(false) => tracing::debug!(
                content_id = %job.content_id,
                kind = job.boundary.kind.as_str(),
                "job entry was already removed"
            ),
            Err(error) => tracing::warn!(
                content_id = %job.content_id,
                error = %error,
                "failed to remove fired job entry"
            ),
        }
    }
}
