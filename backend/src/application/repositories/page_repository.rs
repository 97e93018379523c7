use crate::domain::{aggregates::Page, entities::Comment, value_objects::ObjectId, DomainError};
use std::str::FromStr;
use thiserror::Error;

/// Errors surfaced by a page repository.
///
/// Every failure reaches the immediate caller; repositories never retry.
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// The store could not be reached when the handle was established
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// A read or write against a live store did not complete
    #[error("Storage failure: {0}")]
    Failure(String),

    /// No page matched
    #[error("Page not found: {0}")]
    NotFound(String),

    /// The request was rejected before it reached the store
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}

impl RepositoryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound(_))
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// How `search` matches a fragment against page titles.
/// Both modes ignore case and treat the empty fragment as matching every title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TitleMatch {
    /// The title starts with the fragment
    #[default]
    Prefix,
    /// The fragment appears anywhere in the title
    Substring,
}

impl TitleMatch {
    pub fn matches(&self, title: &str, fragment: &str) -> bool {
        let title = title.to_lowercase();
        let fragment = fragment.to_lowercase();
        match self {
            TitleMatch::Prefix => title.starts_with(&fragment),
            TitleMatch::Substring => title.contains(&fragment),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TitleMatch::Prefix => "prefix",
            TitleMatch::Substring => "substring",
        }
    }
}

impl FromStr for TitleMatch {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prefix" => Ok(TitleMatch::Prefix),
            "substring" => Ok(TitleMatch::Substring),
            other => Err(DomainError::InvalidValue(format!(
                "Unknown title match mode '{}', expected 'prefix' or 'substring'",
                other
            ))),
        }
    }
}

/// Repository trait for managing Page aggregates.
///
/// The repository owns identifier and timestamp assignment; callers own the
/// title and body. Listing operations return pages ordered by last update,
/// newest first, with ties broken by creation order, newest first.
///
/// Implementations must be safe to share between request-handling threads.
pub trait PageRepository: Send + Sync {
    /// Saves a page.
    ///
    /// With `is_existing_page == false` the page gets a fresh identifier and is
    /// inserted together with its comment tree. With `true`, the title, body
    /// and last update of the document whose id equals `page.id()` are
    /// overwritten; an id that matches nothing is not an error. The flag alone
    /// picks the branch.
    ///
    /// On success `page` carries the stored id and last update time.
    fn save(&self, page: &mut Page, is_existing_page: bool) -> RepositoryResult<()>;

    /// Saves a page, choosing insert or update by looking the id up first.
    fn upsert(&self, page: &mut Page) -> RepositoryResult<()>;

    /// Replaces the stored comment tree of an existing page.
    ///
    /// Returns `NotFound` if no document has the page's id.
    fn save_comments(&self, page: &Page) -> RepositoryResult<()>;

    /// Adds one comment to the stored page, at the root or as the last reply
    /// of `parent`, without disturbing comments written concurrently.
    ///
    /// Returns `NotFound` if no document has `page_id` and
    /// `Domain(NotFound)` if `parent` is not in the page's tree.
    fn add_comment(
        &self,
        page_id: &ObjectId,
        parent: Option<&ObjectId>,
        comment: Comment,
    ) -> RepositoryResult<()>;

    /// Loads the page with exactly this title.
    ///
    /// If several pages share the title, the first one created wins.
    fn load(&self, title: &str) -> RepositoryResult<Page>;

    /// Finds a page by its identifier.
    fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Page>>;

    /// Returns pages whose title matches `title_fragment`, ignoring case.
    fn search(&self, title_fragment: &str) -> RepositoryResult<Vec<Page>>;

    /// Returns every page.
    fn list_all(&self) -> RepositoryResult<Vec<Page>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_match_ignores_case() {
        let mode = TitleMatch::Prefix;
        assert!(mode.matches("Intro", "in"));
        assert!(mode.matches("INDEX", "inD"));
        assert!(!mode.matches("Main", "in"));
        assert!(!mode.matches("apple", "in"));
    }

    #[test]
    fn test_substring_match_ignores_case() {
        let mode = TitleMatch::Substring;
        assert!(mode.matches("Main", "IN"));
        assert!(mode.matches("intro", "tr"));
        assert!(!mode.matches("apple", "in"));
    }

    #[test]
    fn test_unicode_case_folding() {
        assert!(TitleMatch::Prefix.matches("\u{c9}cole", "\u{e9}co"));
    }

    #[test]
    fn test_empty_fragment_matches_everything() {
        assert!(TitleMatch::Prefix.matches("anything", ""));
        assert!(TitleMatch::Substring.matches("", ""));
    }

    #[test]
    fn test_parse_title_match() {
        assert_eq!("prefix".parse::<TitleMatch>().unwrap(), TitleMatch::Prefix);
        assert_eq!(" Substring ".parse::<TitleMatch>().unwrap(), TitleMatch::Substring);
        assert!("regex".parse::<TitleMatch>().is_err());
        for mode in [TitleMatch::Prefix, TitleMatch::Substring] {
            assert_eq!(mode.as_str().parse::<TitleMatch>().unwrap(), mode);
        }
    }

    #[test]
    fn test_not_found_predicate() {
        assert!(RepositoryError::NotFound("intro".into()).is_not_found());
        assert!(!RepositoryError::Failure("disk".into()).is_not_found());
    }
}
