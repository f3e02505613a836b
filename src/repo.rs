mod submissions;

pub use submissions::{EmailSubmission, InsertError, SubmissionRepo};
