pub mod analysis;
pub mod generated;
pub mod uploaded;

pub use analysis::{RawAnalysis, RawCategoryScores, ResumeAnalysis};
pub use generated::{GeneratedDraft, GeneratedPatch, GeneratedResume, GeneratedSummary};
pub use uploaded::{UploadedDetail, UploadedDraft, UploadedPatch, UploadedResume, UploadedSummary};
