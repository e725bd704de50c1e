use std::sync::Arc;

use chrono_tz::Tz;

use crate::domain::{AppState, Reconciler, PurgeTrigger};
use crate::infrastructure::persistence::{PostgresJobStore, PostgresPolicyStore};
use crate::infrastructure::purge::PgNotifyPurger;
use crate::infrastructure::scheduler::TokioScheduler;

pub mod http;
pub mod persistence;
pub mod purge;
pub mod scheduler;
pub mod settings;

pub type Trigger = PurgeTrigger<PostgresJobStore, PostgresPolicyStore, PgNotifyPurger>;
pub type Scheduler = TokioScheduler<Trigger>;
pub type AppReconciler =
    Reconciler<PostgresJobStore, Scheduler, PostgresPolicyStore, PgNotifyPurger>;

#[derive(Clone)]
pub struct AppStateImpl {
    reconciler: Arc<AppReconciler>,
    policy_store: PostgresPolicyStore,
    reference_timezone: Tz,
}

impl AppStateImpl {
    pub fn new(
        reconciler: Arc<AppReconciler>,
        policy_store: PostgresPolicyStore,
        reference_timezone: Tz,
    ) -> Self {
        Self {
            reconciler,
            policy_store,
            reference_timezone,
        }
    }
}

impl AppState for AppStateImpl {
    type J = PostgresJobStore;
    type S = Scheduler;
    type Po = PostgresPolicyStore;
    type Pu = PgNotifyPurger;

    fn reconciler(&self) -> &AppReconciler {
        &self.reconciler
    }

    fn policy_store(&self) -> &Self::Po {
        &self.policy_store
    }

    fn reference_timezone(&self) -> Tz {
        self.reference_timezone
    }
}
