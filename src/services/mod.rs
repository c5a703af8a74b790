pub mod cohort;
pub mod email;
pub mod grading;
pub mod ordering;
pub mod progress;
pub mod sequencing;
