//! Runwatch engine: HTTP boundary and effect execution for the monitor core.
mod cache;
mod client;
mod runtime;
mod types;

pub use cache::SnapshotCache;
pub use client::{ClientSettings, JobClient, ReqwestJobClient};
pub use runtime::{MonitorHandle, MonitorRuntime};
pub use types::{CreateRunRequest, CreatedRun, FetchError, PublishError, PublishResponse};
