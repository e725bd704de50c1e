use std::collections::HashSet;

use anyhow::Context;
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::postgres::PgRow;
use sqlx::types::Json;

use curtain_common::database::Database;
use curtain_common::domain::{Boundary, BoundaryKind, ContentId, RoleId, VisibilityPolicy};
use curtain_common::{
    CONTENT_ID_COLUMN, FIRES_AT_COLUMN, JOBS_TABLE_NAME, KIND_COLUMN, POLICY_TABLE_NAME,
};

use crate::domain::{BoundaryJob, JobStore, PolicyStore};

/// Purge-job records, one row per `(content_id, kind, fires_at)` triple.
///
/// Row-per-job storage means an emptied job list leaves no row behind; the
/// "no empty record" rule needs no special casing.
#[derive(Clone, Copy)]
pub struct PostgresJobStore {
    database: &'static Database,
}

impl PostgresJobStore {
    pub fn new(database: &'static Database) -> Self {
        Self { database }
    }
}

fn row_into_boundary(row: &PgRow) -> Result<Option<Boundary>, anyhow::Error> {
    let kind_name: String = row.try_get(KIND_COLUMN).context("kind column")?;
    let fires_at: DateTime<Utc> = row.try_get(FIRES_AT_COLUMN).context("fires_at column")?;

    let Some(kind) = BoundaryKind::from_name(&kind_name) else {
        tracing::warn!(kind = %kind_name, "skipping job row with unknown boundary kind");
        return Ok(None);
    };
    Ok(Some(Boundary { kind, fires_at }))
}

impl JobStore for PostgresJobStore {
    async fn load(&self, content_id: &ContentId) -> Result<Vec<Boundary>, anyhow::Error> {
        let sql = format!(
            "SELECT {KIND_COLUMN}, {FIRES_AT_COLUMN} FROM {JOBS_TABLE_NAME} \
             WHERE {CONTENT_ID_COLUMN} = $1 ORDER BY {FIRES_AT_COLUMN}, {KIND_COLUMN}"
        );
        let rows = sqlx::query(&sql)
            .bind(content_id.as_ref())
            .fetch_all(self.database.database_pool())
            .await
            .context("failed to load purge jobs")?;

        let mut jobs = Vec::with_capacity(rows.len());
        for row in &rows {
            if let Some(boundary) = row_into_boundary(row)? {
                jobs.push(boundary);
            }
        }
        Ok(jobs)
    }

    async fn replace(&self, content_id: &ContentId, jobs: &[Boundary]) -> Result<(), anyhow::Error> {
        let mut transaction = self
            .database
            .database_pool()
            .begin()
            .await
            .context("failed to start job replace transaction")?;

        let delete_sql =
            format!("DELETE FROM {JOBS_TABLE_NAME} WHERE {CONTENT_ID_COLUMN} = $1");
        sqlx::query(&delete_sql)
            .bind(content_id.as_ref())
            .execute(&mut *transaction)
            .await
            .context("failed to delete previous purge jobs")?;

        let insert_sql = format!(
            "INSERT INTO {JOBS_TABLE_NAME} ({CONTENT_ID_COLUMN}, {KIND_COLUMN}, {FIRES_AT_COLUMN}) \
             VALUES ($1, $2, $3) ON CONFLICT DO NOTHING"
        );
        for job in jobs {
            sqlx::query(&insert_sql)
                .bind(content_id.as_ref())
                .bind(job.kind.as_str())
                .bind(job.fires_at)
                .execute(&mut *transaction)
                .await
                .context("failed to insert purge job")?;
        }

        transaction
            .commit()
            .await
            .context("failed to commit job replace transaction")
    }

    async fn remove(&self, content_id: &ContentId, boundary: Boundary) -> Result<bool, anyhow::Error> {
        let sql = format!(
            "DELETE FROM {JOBS_TABLE_NAME} WHERE {CONTENT_ID_COLUMN} = $1 \
             AND {KIND_COLUMN} = $2 AND {FIRES_AT_COLUMN} = $3"
        );
        let result = sqlx::query(&sql)
            .bind(content_id.as_ref())
            .bind(boundary.kind.as_str())
            .bind(boundary.fires_at)
            .execute(self.database.database_pool())
            .await
            .context("failed to remove purge job")?;

        Ok(result.rows_affected() > 0)
    }

    async fn clear(&self, content_id: &ContentId) -> Result<(), anyhow::Error> {
        let sql = format!("DELETE FROM {JOBS_TABLE_NAME} WHERE {CONTENT_ID_COLUMN} = $1");
        sqlx::query(&sql)
            .bind(content_id.as_ref())
            .execute(self.database.database_pool())
            .await
            .context("failed to clear purge jobs")?;
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<BoundaryJob>, anyhow::Error> {
        let sql = format!(
            "SELECT {CONTENT_ID_COLUMN}, {KIND_COLUMN}, {FIRES_AT_COLUMN} FROM {JOBS_TABLE_NAME}"
        );
        let rows = sqlx::query(&sql)
            .fetch_all(self.database.database_pool())
            .await
            .context("failed to load all purge jobs")?;

        let mut jobs = Vec::with_capacity(rows.len());
        for row in &rows {
            let raw_id: String = row.try_get(CONTENT_ID_COLUMN).context("content_id column")?;
            let content_id = match ContentId::try_new(&raw_id) {
                Ok(content_id) => content_id,
                Err(error) => {
                    tracing::warn!(content_id = %raw_id, error = %error, "skipping job row with bad content id");
                    continue;
                }
            };
            if let Some(boundary) = row_into_boundary(row)? {
                jobs.push(BoundaryJob {
                    content_id,
                    boundary,
                });
            }
        }
        Ok(jobs)
    }
}

/// The single-row visibility policy record. An absent row is the permissive
/// default: no role restriction, purge scheduling on.
#[derive(Clone, Copy)]
pub struct PostgresPolicyStore {
    database: &'static Database,
}

impl PostgresPolicyStore {
    pub fn new(database: &'static Database) -> Self {
        Self { database }
    }
}

impl PolicyStore for PostgresPolicyStore {
    async fn load(&self) -> Result<VisibilityPolicy, anyhow::Error> {
        let sql = format!(
            "SELECT allowed_bypass_roles, purge_scheduling_enabled FROM {POLICY_TABLE_NAME} WHERE id"
        );
        let row = sqlx::query(&sql)
            .fetch_optional(self.database.database_pool())
            .await
            .context("failed to load visibility policy")?;

        let Some(row) = row else {
            return Ok(VisibilityPolicy::default());
        };

        let allowed: Option<Json<HashSet<RoleId>>> = row
            .try_get("allowed_bypass_roles")
            .context("allowed_bypass_roles column")?;
        let enabled: bool = row
            .try_get("purge_scheduling_enabled")
            .context("purge_scheduling_enabled column")?;

        Ok(VisibilityPolicy {
            allowed_bypass_roles: allowed.map(|Json(roles)| roles),
            purge_scheduling_enabled: enabled,
        })
    }

    async fn store(&self, policy: &VisibilityPolicy) -> Result<(), anyhow::Error> {
        let sql = format!(
            "INSERT INTO {POLICY_TABLE_NAME} (id, allowed_bypass_roles, purge_scheduling_enabled) \
             VALUES (TRUE, $1, $2) \
             ON CONFLICT (id) DO UPDATE \
             SET allowed_bypass_roles = EXCLUDED.allowed_bypass_roles, \
                 purge_scheduling_enabled = EXCLUDED.purge_scheduling_enabled"
        );
        sqlx::query(&sql)
            .bind(policy.allowed_bypass_roles.clone().map(Json))
            .bind(policy.purge_scheduling_enabled)
            .execute(self.database.database_pool())
            .await
            .context("failed to store visibility policy")?;
        Ok(())
    }
}
