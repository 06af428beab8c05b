//! Job records and the builders that enrich them

pub mod builders;
pub mod details;
pub mod record;

pub use builders::{build_running_job_from_online, build_running_job_from_pipeline};
pub use details::{DetailSource, InstanceView, RunningJobWithDetails};
pub use record::BlockchainJobRecord;
