use crate::application::{
    dto::ListRequest,
    repositories::{PageRepository, RepositoryResult},
};
use crate::domain::aggregates::Page;
use tracing::debug;

/// Use case for the page list, optionally narrowed by a title search
///
/// Failures are returned as errors, never as an empty list.
pub struct ListPages<'a, R: PageRepository> {
    repository: &'a R,
}

impl<'a, R: PageRepository> ListPages<'a, R> {
    pub fn new(repository: &'a R) -> Self {
        Self { repository }
    }

    pub fn execute(&self, request: ListRequest) -> RepositoryResult<Vec<Page>> {
        match request.search_term.as_deref() {
            Some(term) => {
                debug!("Searching pages for '{}'", term);
                self.repository.search(term)
            }
            None => self.repository.list_all(),
        }
    }
}
