use crate::application::{
    dto::{SaveRequest, ViewOutcome},
    repositories::{PageRepository, RepositoryResult},
};
use crate::domain::{aggregates::Page, value_objects::PageTitle};
use tracing::info;

/// Use case for viewing a page by title
///
/// A title nobody has written yet is not an error: the outcome tells the
/// caller to open the editor instead.
pub struct ViewPage<'a, R: PageRepository> {
    repository: &'a R,
}

impl<'a, R: PageRepository> ViewPage<'a, R> {
    pub fn new(repository: &'a R) -> Self {
        Self { repository }
    }

    pub fn execute(&self, title: &str) -> RepositoryResult<ViewOutcome> {
        let title = PageTitle::parse(title)?;
        match self.repository.load(title.as_str()) {
            Ok(page) => Ok(ViewOutcome::Show(page)),
            Err(e) if e.is_not_found() => Ok(ViewOutcome::RedirectToEdit(title)),
            Err(e) => Err(e),
        }
    }
}

/// Use case for opening the editor on a title
pub struct EditPage<'a, R: PageRepository> {
    repository: &'a R,
}

impl<'a, R: PageRepository> EditPage<'a, R> {
    pub fn new(repository: &'a R) -> Self {
        Self { repository }
    }

    /// The stored page, or a blank unsaved page carrying the title
    pub fn execute(&self, title: &str) -> RepositoryResult<Page> {
        let title = PageTitle::parse(title)?;
        match self.repository.load(title.as_str()) {
            Err(e) if e.is_not_found() => Ok(Page::new(title.into_inner(), "")),
            other => other,
        }
    }
}

/// Use case for saving an edit form
///
/// The presence of an identifier in the request is what makes this an update.
pub struct SavePage<'a, R: PageRepository> {
    repository: &'a R,
}

impl<'a, R: PageRepository> SavePage<'a, R> {
    pub fn new(repository: &'a R) -> Self {
        Self { repository }
    }

    /// Save the page and return it as stored
    pub fn execute(&self, request: SaveRequest) -> RepositoryResult<Page> {
        let title = PageTitle::parse(request.title.as_str())?;
        let existing_id = request.existing_id()?;

        let mut page = match existing_id {
            Some(id) => Page::with_id(id, title.into_inner(), request.body),
            None => Page::new(title.into_inner(), request.body),
        };
        self.repository.save(&mut page, existing_id.is_some())?;

        info!(
            "Saved page '{}' ({})",
            page.title(),
            if existing_id.is_some() { "updated" } else { "created" }
        );
        Ok(page)
    }
}
