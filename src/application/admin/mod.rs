//! Application services for the administrative surface.

pub mod posts;
pub mod submissions;

pub use posts::AdminPostService;
pub use submissions::{SubmissionGuard, SubmissionRefused, SubmissionTicket};
