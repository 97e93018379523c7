mod requests;

pub use requests::{CommentRequest, ListRequest, SaveRequest, ViewOutcome};
