/// Domain aggregates
use super::base::{AggregateRoot, DomainError, DomainResult, Entity};
use super::entities::{Comment, CommentIter};
use super::value_objects::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A Page is an aggregate root that represents one wiki page.
/// It owns a tree of comments which is always stored and loaded with the page.
///
/// `id` and `last_update` are assigned by the repository. A page built by a
/// caller starts with the nil id and the Unix epoch as its last update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    #[serde(rename = "_id")]
    id: ObjectId,
    title: String,
    body: String,
    #[serde(rename = "lastUpdate")]
    last_update: DateTime<Utc>,
    #[serde(default)]
    comments: Vec<Comment>,
}

impl Page {
    /// Create a new, not yet persisted page
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Page {
            id: ObjectId::nil(),
            title: title.into(),
            body: body.into(),
            last_update: DateTime::<Utc>::default(),
            comments: Vec::new(),
        }
    }

    /// Create a page that refers to an already stored document
    pub fn with_id(id: ObjectId, title: impl Into<String>, body: impl Into<String>) -> Self {
        Page {
            id,
            ..Page::new(title, body)
        }
    }

    /// Get the page title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Update the page title
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    pub fn last_update(&self) -> DateTime<Utc> {
        self.last_update
    }

    /// Top-level comments, in insertion order
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Append a top-level comment
    pub fn add_comment(&mut self, comment: Comment) {
        self.comments.push(comment);
    }

    /// Swap in a whole comment tree
    pub fn replace_comments(&mut self, comments: Vec<Comment>) {
        self.comments = comments;
    }

    /// Attach `comment` as the last reply of the comment identified by `parent_id`
    pub fn reply_to(&mut self, parent_id: &ObjectId, comment: Comment) -> DomainResult<()> {
        let parent = self
            .comments
            .iter_mut()
            .find_map(|c| c.find_mut(parent_id))
            .ok_or_else(|| DomainError::NotFound(format!("Comment {} not found", parent_id)))?;
        parent.reply(comment);
        Ok(())
    }

    /// Find a comment anywhere in the page's tree
    pub fn find_comment(&self, id: &ObjectId) -> Option<&Comment> {
        self.comments.iter().find_map(|c| c.find(id))
    }

    /// Every comment on the page, depth-first
    pub fn all_comments(&self) -> CommentIter<'_> {
        CommentIter::over(&self.comments)
    }

    /// Total number of comments at every level
    pub fn comment_count(&self) -> usize {
        self.comments.iter().map(Comment::count).sum()
    }

    /// Set the identifier. Only repository implementations call this.
    pub fn assign_id(&mut self, id: ObjectId) {
        self.id = id;
    }

    /// Set the last update time. Only repository implementations call this.
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.last_update = at;
    }
}

impl Entity for Page {
    type Id = ObjectId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for Page {
    fn is_persisted(&self) -> bool {
        !self.id.is_nil()
    }
}
