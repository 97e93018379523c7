pub mod dto;
pub mod repositories;
pub mod use_cases;

pub use dto::{CommentRequest, ListRequest, SaveRequest, ViewOutcome};
pub use repositories::{PageRepository, RepositoryError, RepositoryResult, TitleMatch};
pub use use_cases::{AddComment, EditPage, ListPages, SavePage, ViewPage};
