pub mod applications;
pub mod exec;
pub mod jobs;
pub mod probes;
