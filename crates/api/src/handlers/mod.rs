pub mod course;
pub mod enrollment;
pub mod learner;
pub mod progress;
