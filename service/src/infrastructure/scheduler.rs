use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;

use crate::domain::{BoundaryHandler, BoundaryJob, OneShotScheduler};

/// In-process one-shot scheduler backed by tokio timers.
///
/// One spawned task per pending job sleeps until the job's instant, removes
/// its own pending entry, and only then drives the handler. Cancellation and
/// firing race for that one map entry; whichever side removes it wins, so a
/// fired handler is never aborted and a cancelled job never fires.
pub struct TokioScheduler<H> {
    handler: Arc<H>,
    pending: Arc<Mutex<HashMap<BoundaryJob, JoinHandle<()>>>>,
}

impl<H> Clone for TokioScheduler<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            pending: Arc::clone(&self.pending),
        }
    }
}

impl<H: BoundaryHandler> TokioScheduler<H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler: Arc::new(handler),
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<H: BoundaryHandler> OneShotScheduler for TokioScheduler<H> {
    async fn schedule_at(&self, job: BoundaryJob) -> Result<(), anyhow::Error> {
        let mut pending = self.pending.lock().expect("pending job table poisoned");
        if pending.contains_key(&job) {
            return Ok(());
        }

        // Past-due instants get a zero delay and fire immediately.
        let delay = (job.boundary.fires_at - Utc::now())
            .to_std()
            .unwrap_or(Duration::ZERO);

        let handler = Arc::clone(&self.handler);
        let table = Arc::clone(&self.pending);
        let key = job.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let still_pending = table
                .lock()
                .expect("pending job table poisoned")
                .remove(&key)
                .is_some();
            if still_pending {
                tokio::spawn(async move { handler.boundary_elapsed(key).await });
            }
        });

        pending.insert(job, task);
        Ok(())
    }

    async fn cancel(&self, job: &BoundaryJob) -> Result<(), anyhow::Error> {
        let removed = self
            .pending
            .lock()
            .expect("pending job table poisoned")
            .remove(job);
        if let Some(task) = removed {
            task.abort();
        }
        Ok(())
    }

    async fn is_scheduled(&self, job: &BoundaryJob) -> bool {
        self.pending
            .lock()
            .expect("pending job table poisoned")
            .contains_key(job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use curtain_common::domain::{Boundary, BoundaryKind, ContentId};
    use curtain_common::test_utils::instant;

    #[derive(Default)]
    struct CountingHandler {
        fired: AtomicUsize,
    }

    impl BoundaryHandler for Arc<CountingHandler> {
        async fn boundary_elapsed(&self, _job: BoundaryJob) {
            self.fired.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn job(fires_at: &str) -> BoundaryJob {
        BoundaryJob {
            content_id: ContentId::try_new("page-1").unwrap(),
            boundary: Boundary {
                kind: BoundaryKind::Start,
                fires_at: instant(fires_at),
            },
        }
    }

    async fn wait_for_fires(handler: &CountingHandler, expected: usize) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while handler.fired.load(Ordering::SeqCst) < expected {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("handler did not fire in time");
    }

    #[tokio::test]
    async fn test_past_due_job_fires_immediately_and_forgets_itself() {
        let handler = Arc::new(CountingHandler::default());
        let scheduler = TokioScheduler::new(Arc::clone(&handler));
        let job = job("2020-01-01T00:00:00Z");

        scheduler.schedule_at(job.clone()).await.unwrap();
        wait_for_fires(&handler, 1).await;

        assert!(!scheduler.is_scheduled(&job).await);
    }

    #[tokio::test]
    async fn test_duplicate_schedule_is_a_no_op() {
        let handler = Arc::new(CountingHandler::default());
        let scheduler = TokioScheduler::new(Arc::clone(&handler));
        let job = job("2020-01-01T00:00:00Z");

        scheduler.schedule_at(job.clone()).await.unwrap();
        scheduler.schedule_at(job.clone()).await.unwrap();
        wait_for_fires(&handler, 1).await;

        // settle: a duplicate firing would land promptly after the first
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(handler.fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_job_never_fires() {
        let handler = Arc::new(CountingHandler::default());
        let scheduler = TokioScheduler::new(Arc::clone(&handler));
        let job = job("2999-01-01T00:00:00Z");

        scheduler.schedule_at(job.clone()).await.unwrap();
        assert!(scheduler.is_scheduled(&job).await);

        scheduler.cancel(&job).await.unwrap();
        assert!(!scheduler.is_scheduled(&job).await);
        assert_eq!(handler.fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancel_of_unknown_job_is_a_no_op() {
        let handler = Arc::new(CountingHandler::default());
        let scheduler = TokioScheduler::new(Arc::clone(&handler));

        scheduler.cancel(&job("2999-01-01T00:00:00Z")).await.unwrap();
    }

    #[tokio::test]
    async fn test_elapsed_boundary_purges_and_prunes_its_record() {
        use crate::domain::PurgeTrigger;
        use crate::domain::fakes::{CountingPurger, InMemoryJobStore, InMemoryPolicyStore};

        let store = InMemoryJobStore::default();
        let purger = CountingPurger::default();
        let scheduler = TokioScheduler::new(PurgeTrigger::new(
            store.clone(),
            InMemoryPolicyStore::default(),
            Some(purger.clone()),
        ));

        let job = job("2020-01-01T00:00:00Z");
        store
            .seed(&job.content_id, vec![job.boundary])
            .await;

        scheduler.schedule_at(job.clone()).await.unwrap();

        tokio::time::timeout(Duration::from_secs(2), async {
            while purger.purge_count().await < 1 {
                tokio::task::yield_now().await;
            }
            while store.has_record(&job.content_id).await {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("boundary did not purge and prune in time");

        assert!(!scheduler.is_scheduled(&job).await);
    }
}
