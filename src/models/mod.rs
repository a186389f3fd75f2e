pub mod job;
pub mod role;

pub use job::{JobPosting, JobSourceKind, RankedJob, SourceOutcome};
pub use role::RoleProfile;
