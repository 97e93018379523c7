mod page_repository;

pub use page_repository::{PageRepository, RepositoryError, RepositoryResult, TitleMatch};
