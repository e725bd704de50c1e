use chrono_tz::Tz;
use curtain_common::domain::{Boundary, ContentId, VisibilityPolicy};

pub mod reconcile;
pub mod trigger;

#[cfg(test)]
pub mod fakes;

pub use reconcile::Reconciler;
pub use trigger::PurgeTrigger;

/// One scheduled purge: the exact `(content, kind, fires_at)` triple the
/// one-shot scheduler and the job store both key on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoundaryJob {
    pub content_id: ContentId,
    pub boundary: Boundary,
}

/// Persisted per-content purge-job lists.
///
/// A content item with no record has no jobs; an empty list is never stored.
pub trait JobStore: Send + Sync + 'static {
    /// All recorded jobs for one content item, empty when none.
    fn load(
        &self,
        content_id: &ContentId,
    ) -> impl Future<Output = Result<Vec<Boundary>, anyhow::Error>> + Send;

    /// Replaces the record wholesale; an empty list clears it.
    fn replace(
        &self,
        content_id: &ContentId,
        jobs: &[Boundary],
    ) -> impl Future<Output = Result<(), anyhow::Error>> + Send;

    /// Removes exactly one entry. Returns false when it was already gone.
    fn remove(
        &self,
        content_id: &ContentId,
        boundary: Boundary,
    ) -> impl Future<Output = Result<bool, anyhow::Error>> + Send;

    /// Drops the whole record for one content item.
    fn clear(&self, content_id: &ContentId) -> impl Future<Output = Result<(), anyhow::Error>> + Send;

    /// Every recorded job across all content, for startup re-arming.
    fn load_all(&self) -> impl Future<Output = Result<Vec<BoundaryJob>, anyhow::Error>> + Send;
}

/// The external one-shot scheduler: fires each accepted job at or after its
/// instant, exactly once.
pub trait OneShotScheduler: Send + Sync + 'static {
    /// Accepts a job; scheduling a triple that is already pending is a no-op.
    fn schedule_at(&self, job: BoundaryJob) -> impl Future<Output = Result<(), anyhow::Error>> + Send;

    /// Cancels a pending job; unknown or already-fired triples are a no-op.
    fn cancel(&self, job: &BoundaryJob) -> impl Future<Output = Result<(), anyhow::Error>> + Send;

    fn is_scheduled(&self, job: &BoundaryJob) -> impl Future<Output = bool> + Send;
}

/// The host's cache-purge collaborator. Absence (the feature degrades to
/// cancel-only) is modeled as `Option<impl CachePurger>` at the call sites.
pub trait CachePurger: Send + Sync + 'static {
    fn purge_all(&self) -> impl Future<Output = Result<(), anyhow::Error>> + Send;
}

/// Reads and writes the process-wide visibility policy.
pub trait PolicyStore: Send + Sync + 'static {
    /// The stored policy, or the permissive default when never configured.
    fn load(&self) -> impl Future<Output = Result<VisibilityPolicy, anyhow::Error>> + Send;

    fn store(
        &self,
        policy: &VisibilityPolicy,
    ) -> impl Future<Output = Result<(), anyhow::Error>> + Send;
}

/// Callback the scheduler drives when a job's instant elapses.
pub trait BoundaryHandler: Send + Sync + 'static {
    fn boundary_elapsed(&self, job: BoundaryJob) -> impl Future<Output = ()> + Send;
}

/// The global application state shared between all request handlers.
pub trait AppState: Clone + Send + Sync + 'static {
    type J: JobStore;
    type S: OneShotScheduler;
    type Po: PolicyStore;
    type Pu: CachePurger;

    fn reconciler(&self) -> &Reconciler<Self::J, Self::S, Self::Po, Self::Pu>;
    fn policy_store(&self) -> &Self::Po;
    fn reference_timezone(&self) -> Tz;
}
