pub mod job;
pub mod loaders;
pub mod report;

pub use job::{plan_jobs, Job, JobOutcome, JobPlan};
pub use loaders::{discover_inputs, is_presentation_file};
pub use report::{BatchReport, JobFailure};
