pub mod fund;
pub mod project;

pub use fund::{Fund, Support};
pub use project::{ProjectRecord, ProjectSubmission};
