//! In-memory port implementations for reconciler and trigger tests.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::Mutex;

use curtain_common::domain::{Boundary, ContentId, VisibilityPolicy};

use crate::domain::{BoundaryJob, CachePurger, JobStore, OneShotScheduler, PolicyStore};

#[derive(Clone, Default)]
pub struct InMemoryJobStore {
    records: Arc<Mutex<HashMap<ContentId, Vec<Boundary>>>>,
}

impl InMemoryJobStore {
    pub async fn recorded(&self, content_id: &ContentId) -> Vec<Boundary> {
        self.records
            .lock()
            .await
            .get(content_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn has_record(&self, content_id: &ContentId) -> bool {
        self.records.lock().await.contains_key(content_id)
    }

    pub async fn seed(&self, content_id: &ContentId, jobs: Vec<Boundary>) {
        self.records.lock().await.insert(content_id.clone(), jobs);
    }
}

impl JobStore for InMemoryJobStore {
    async fn load(&self, content_id: &ContentId) -> Result<Vec<Boundary>, anyhow::Error> {
        Ok(self.recorded(content_id).await)
    }

    async fn replace(&self, content_id: &ContentId, jobs: &[Boundary]) -> Result<(), anyhow::Error> {
        let mut records = self.records.lock().await;
        if jobs.is_empty() {
            records.remove(content_id);
        } else {
            records.insert(content_id.clone(), jobs.to_vec());
        }
        Ok(())
    }

    async fn remove(&self, content_id: &ContentId, boundary: Boundary) -> Result<bool, anyhow::Error> {
        let mut records = self.records.lock().await;
        let Some(jobs) = records.get_mut(content_id) else {
            return Ok(false);
        };
        let Some(position) = jobs.iter().position(|job| *job == boundary) else {
            return Ok(false);
        };
        jobs.remove(position);
        if jobs.is_empty() {
            records.remove(content_id);
        }
        Ok(true)
    }

    async fn clear(&self, content_id: &ContentId) -> Result<(), anyhow::Error> {
        self.records.lock().await.remove(content_id);
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<BoundaryJob>, anyhow::Error> {
        let records = self.records.lock().await;
        Ok(records
            .iter()
            .flat_map(|(content_id, jobs)| {
                jobs.iter().map(|boundary| BoundaryJob {
                    content_id: content_id.clone(),
                    boundary: *boundary,
                })
            })
            .collect())
    }
}

/// Records every scheduler call without any timers behind it.
#[derive(Clone, Default)]
pub struct RecordingScheduler {
    pending: Arc<Mutex<HashSet<BoundaryJob>>>,
    schedule_calls: Arc<Mutex<usize>>,
    cancel_calls: Arc<Mutex<usize>>,
}

impl RecordingScheduler {
    pub async fn pending_contains(&self, job: &BoundaryJob) -> bool {
        self.pending.lock().await.contains(job)
    }

    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }

    pub async fn call_counts(&self) -> (usize, usize) {
        (
            *self.schedule_calls.lock().await,
            *self.cancel_calls.lock().await,
        )
    }

    /// Simulates the timer elapsing: the scheduler forgets the job.
    pub async fn fire(&self, job: &BoundaryJob) {
        self.pending.lock().await.remove(job);
    }
}

impl OneShotScheduler for RecordingScheduler {
    async fn schedule_at(&self, job: BoundaryJob) -> Result<(), anyhow::Error> {
        *self.schedule_calls.lock().await += 1;
        self.pending.lock().await.insert(job);
        Ok(())
    }

    async fn cancel(&self, job: &BoundaryJob) -> Result<(), anyhow::Error> {
        *self.cancel_calls.lock().await += 1;
        self.pending.lock().await.remove(job);
        Ok(())
    }

    async fn is_scheduled(&self, job: &BoundaryJob) -> bool {
        self.pending_contains(job).await
    }
}

#[derive(Clone, Default)]
pub struct InMemoryPolicyStore {
    policy: Arc<Mutex<VisibilityPolicy>>,
}

impl InMemoryPolicyStore {
    pub async fn set(&self, policy: VisibilityPolicy) {
        *self.policy.lock().await = policy;
    }
}

impl PolicyStore for InMemoryPolicyStore {
    async fn load(&self) -> Result<VisibilityPolicy, anyhow::Error> {
        Ok(self.policy.lock().await.clone())
    }

    async fn store(&self, policy: &VisibilityPolicy) -> Result<(), anyhow::Error> {
        self.set(policy.clone()).await;
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct CountingPurger {
    purges: Arc<Mutex<usize>>,
}

impl CountingPurger {
    pub async fn purge_count(&self) -> usize {
        *self.purges.lock().await
    }
}

impl CachePurger for CountingPurger {
    async fn purge_all(&self) -> Result<(), anyhow::Error> {
        *self.purges.lock().await += 1;
        Ok(())
    }
}

/// A purger whose collaborator is down; every purge fails.
#[derive(Clone, Default)]
pub struct FailingPurger;

impl CachePurger for FailingPurger {
    async fn purge_all(&self) -> Result<(), anyhow::Error> {
        Err(anyhow::anyhow!("purge endpoint unavailable"))
    }
}
