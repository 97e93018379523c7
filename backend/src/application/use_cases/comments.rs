use crate::application::{
    dto::CommentRequest,
    repositories::{PageRepository, RepositoryResult},
};
use crate::domain::{entities::Comment, value_objects::ObjectId, DomainError, Entity};
use chrono::Utc;
use tracing::info;

/// Use case for commenting on a page or replying to a comment
///
/// The comment is added by the repository in one atomic step, so comments
/// posted at the same time are all kept.
pub struct AddComment<'a, R: PageRepository> {
    repository: &'a R,
}

impl<'a, R: PageRepository> AddComment<'a, R> {
    pub fn new(repository: &'a R) -> Self {
        Self { repository }
    }

    /// Add the comment and return it with its new identifier
    pub fn execute(&self, request: CommentRequest) -> RepositoryResult<Comment> {
        if request.body.trim().is_empty() {
            return Err(DomainError::InvalidValue("Comment body cannot be empty".to_string()).into());
        }

        let page = self.repository.load(&request.page_title)?;
        let parent = request
            .reply_to
            .as_deref()
            .map(ObjectId::parse)
            .transpose()?;
        let comment = Comment::new(request.body, Utc::now());

        self.repository
            .add_comment(page.id(), parent.as_ref(), comment.clone())?;

        info!(
            "Added comment {} to page '{}'",
            comment.comment_id(),
            page.title()
        );
        Ok(comment)
    }
}
