use crate::domain::{aggregates::Page, value_objects::ObjectId, value_objects::PageTitle, DomainResult};

/// A page save as submitted by an edit form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    /// Title taken from the request path
    pub title: String,
    pub body: String,
    /// Identifier echoed back by the edit form; absent or blank for a new page
    pub id: Option<String>,
}

impl SaveRequest {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// The identifier of the page being edited, if the form carried one
    pub fn existing_id(&self) -> DomainResult<Option<ObjectId>> {
        match self.id.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => ObjectId::parse(raw).map(Some),
        }
    }
}

/// Parameters for listing pages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRequest {
    /// Title fragment to search for; `None` lists everything
    pub search_term: Option<String>,
}

impl ListRequest {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search_term: Some(term.into()),
        }
    }
}

/// A new comment on a page, or a reply to one of its comments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRequest {
    pub page_title: String,
    pub body: String,
    /// Identifier of the comment being replied to; `None` comments on the page
    pub reply_to: Option<String>,
}

impl CommentRequest {
    pub fn new(page_title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            page_title: page_title.into(),
            body: body.into(),
            reply_to: None,
        }
    }

    pub fn replying_to(mut self, comment_id: impl Into<String>) -> Self {
        self.reply_to = Some(comment_id.into());
        self
    }
}

/// What viewing a title leads to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewOutcome {
    /// The page exists
    Show(Page),
    /// No page has this title yet; send the client to the editor
    RedirectToEdit(PageTitle),
}
