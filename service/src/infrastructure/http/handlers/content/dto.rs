use chrono::{DateTime, Utc};
use serde::Serialize;

use curtain_common::domain::{Boundary, BoundaryKind};

#[derive(Debug, Clone, Serialize)]
pub struct JobListResponse {
    data: Vec<JobResponse>,
    meta: MetadataResponse,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetadataResponse {
    total: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    kind: BoundaryKind,
    fires_at: DateTime<Utc>,
}

impl JobListResponse {
    pub fn new(jobs: Vec<Boundary>) -> Self {
        let data: Vec<JobResponse> = jobs
            .into_iter()
            .map(|job| JobResponse {
                kind: job.kind,
                fires_at: job.fires_at,
            })
            .collect();
        let meta = MetadataResponse { total: data.len() };
        Self { data, meta }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RemovedResponse {
    pub cancelled: usize,
}
