pub mod domain;

pub mod database;
pub mod test_utils;

// Persisted purge-job field/kind names, shared by the service and migration crates

pub const JOBS_TABLE_NAME: &'static str = "purge_jobs";
pub const POLICY_TABLE_NAME: &'static str = "visibility_policy";

pub const CONTENT_ID_COLUMN: &'static str = "content_id";
pub const KIND_COLUMN: &'static str = "kind";
pub const FIRES_AT_COLUMN: &'static str = "fires_at";

pub const START_KIND_NAME: &'static str = "start";
pub const END_KIND_NAME: &'static str = "end";

// expose domain module

pub use domain::*;
