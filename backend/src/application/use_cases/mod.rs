pub mod comments;
pub mod listing;
pub mod pages;

pub use comments::AddComment;
pub use listing::ListPages;
pub use pages::{EditPage, SavePage, ViewPage};
