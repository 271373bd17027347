pub mod optimization;
pub mod resume;

pub use resume::{EducationEntry, ExperienceEntry, MatchScore, ResumeHeader, StructuredResume};
