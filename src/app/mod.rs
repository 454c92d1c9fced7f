pub mod insights;
pub mod platform_link_use_case;
pub mod ports;
pub mod submission_use_case;

pub use insights::InsightsReport;
pub use platform_link_use_case::PlatformLinkUseCase;
pub use submission_use_case::{SubmissionStage, SubmissionUseCase};
