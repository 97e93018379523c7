use super::database::Database;
use crate::application::repositories::{
    PageRepository, RepositoryError, RepositoryResult, TitleMatch,
};
use crate::domain::aggregates::Page;
use crate::domain::base::{DomainError, Entity};
use crate::domain::entities::Comment;
use crate::domain::value_objects::ObjectId;
use crate::infrastructure::clock::Clock;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Listing order shared by `search` and `list_all`
const ORDER_NEWEST_FIRST: &str = "ORDER BY last_update DESC, seq DESC";

/// SQLite-based implementation of the PageRepository trait.
///
/// Pages are stored as JSON documents in the `wikipages` table; see
/// [`super::initialize_database`] for the layout. Documents are decoded and
/// edited in Rust, never with SQLite's JSON functions, so comment trees of
/// any depth round-trip.
pub struct SqlitePageRepository {
    database: Arc<Database>,
    clock: Arc<dyn Clock>,
    title_match: TitleMatch,
}

impl SqlitePageRepository {
    /// Create a new SQLite repository on top of an established store handle
    pub fn new(database: Arc<Database>) -> Self {
        SqlitePageRepository {
            clock: database.clock(),
            database,
            title_match: TitleMatch::default(),
        }
    }

    /// Create a new in-memory SQLite repository (useful for testing)
    pub fn new_in_memory() -> RepositoryResult<Self> {
        Ok(Self::new(Arc::new(Database::open_in_memory()?)))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_title_match(mut self, title_match: TitleMatch) -> Self {
        self.title_match = title_match;
        self
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.database
    }

    /// Give the page a fresh identifier and insert it with its comment tree
    fn insert_page(&self, page: &mut Page) -> RepositoryResult<()> {
        // The id stays on the caller's page even if the insert fails
        page.assign_id(ObjectId::generate());
        let id = page.id().to_hex();

        // Stamp under the connection lock so write order and time order agree
        self.database.with_connection(|conn| {
            let now = self.clock.now();
            page.touch(now);
            conn.execute(
                "INSERT INTO wikipages (id, title, last_update, document)
                 VALUES (?1, ?2, ?3, ?4)",
                params![id, page.title(), sort_key(now)?, encode(page)?],
            )?;
            Ok(())
        })?;

        debug!("Inserted page '{}' as {}", page.title(), id);
        Ok(())
    }

    /// Overwrite title, body and last update of the document with `page`'s id
    fn update_page(&self, page: &mut Page) -> RepositoryResult<()> {
        let id = require_id(page, "update")?;

        let stored = self.database.with_connection(|conn| {
            modify_document(conn, &id, |stored| {
                stored.set_title(page.title());
                stored.set_body(page.body());
                stored.touch(self.clock.now());
                Ok(())
            })
        })?;

        // No existence check up front, so an unknown id only shows up here
        match stored {
            Some(stored) => {
                page.touch(stored.last_update());
                debug!("Updated page '{}' ({})", page.title(), id);
            }
            None => warn!("Update of page '{}' matched no document with id {}", page.title(), id),
        }
        Ok(())
    }
}

/// Read, edit and write back one document inside a write transaction.
///
/// Returns the stored page after the edit, or `None` when no document has
/// this id. An error from `edit` rolls the transaction back.
fn modify_document(
    conn: &mut Connection,
    id: &str,
    edit: impl FnOnce(&mut Page) -> RepositoryResult<()>,
) -> RepositoryResult<Option<Page>> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let document: Option<String> = tx
        .query_row(
            "SELECT document FROM wikipages WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )
        .optional()?;
    let Some(document) = document else {
        return Ok(None);
    };

    let mut page = decode(&document)?;
    edit(&mut page)?;
    tx.execute(
        "UPDATE wikipages SET title = ?2, last_update = ?3, document = ?4 WHERE id = ?1",
        params![id, page.title(), sort_key(page.last_update())?, encode(&page)?],
    )?;
    tx.commit()?;
    Ok(Some(page))
}

fn require_id(page: &Page, action: &str) -> RepositoryResult<String> {
    if page.id().is_nil() {
        return Err(DomainError::InvalidOperation(format!(
            "Page '{}' has no identifier to {}",
            page.title(),
            action
        ))
        .into());
    }
    Ok(page.id().to_hex())
}

/// Column value used to order pages by last update
fn sort_key(at: DateTime<Utc>) -> RepositoryResult<i64> {
    at.timestamp_nanos_opt().ok_or_else(|| {
        RepositoryError::Failure(format!("Timestamp {} is outside the storable range", at))
    })
}

fn encode(page: &Page) -> RepositoryResult<String> {
    Ok(serde_json::to_string(page)?)
}

/// Decode a stored document. Comment trees nest without limit, so the
/// parser's recursion guard is off and the stack grows on demand instead.
fn decode(document: &str) -> RepositoryResult<Page> {
    let mut deserializer = serde_json::Deserializer::from_str(document);
    deserializer.disable_recursion_limit();
    let page = Page::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
    deserializer.end()?;
    Ok(page)
}

fn query_documents(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> RepositoryResult<Vec<Page>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut pages = Vec::new();
    while let Some(row) = rows.next()? {
        let document: String = row.get(0)?;
        pages.push(decode(&document)?);
    }
    Ok(pages)
}

impl PageRepository for SqlitePageRepository {
    fn save(&self, page: &mut Page, is_existing_page: bool) -> RepositoryResult<()> {
        if is_existing_page {
            self.update_page(page)
        } else {
            self.insert_page(page)
        }
    }

    fn upsert(&self, page: &mut Page) -> RepositoryResult<()> {
        let exists = !page.id().is_nil() && self.find_by_id(page.id())?.is_some();
        debug!("Upsert of page '{}' resolved to {}", page.title(), if exists { "update" } else { "insert" });
        self.save(page, exists)
    }

    fn save_comments(&self, page: &Page) -> RepositoryResult<()> {
        let id = require_id(page, "attach comments to")?;

        let stored = self.database.with_connection(|conn| {
            modify_document(conn, &id, |stored| {
                stored.replace_comments(page.comments().to_vec());
                Ok(())
            })
        })?;

        if stored.is_none() {
            return Err(RepositoryError::NotFound(format!("page with id {}", id)));
        }
        debug!("Stored {} comments on page {}", page.comment_count(), id);
        Ok(())
    }

    fn add_comment(
        &self,
        page_id: &ObjectId,
        parent: Option<&ObjectId>,
        comment: Comment,
    ) -> RepositoryResult<()> {
        if page_id.is_nil() {
            return Err(DomainError::InvalidOperation(
                "Cannot comment on a page that has no identifier".to_string(),
            )
            .into());
        }
        let id = page_id.to_hex();

        let stored = self.database.with_connection(|conn| {
            modify_document(conn, &id, |stored| {
                match parent {
                    Some(parent) => stored.reply_to(parent, comment)?,
                    None => stored.add_comment(comment),
                }
                Ok(())
            })
        })?;

        match stored {
            Some(stored) => {
                debug!("Page {} now has {} comments", id, stored.comment_count());
                Ok(())
            }
            None => Err(RepositoryError::NotFound(format!("page with id {}", id))),
        }
    }

    fn load(&self, title: &str) -> RepositoryResult<Page> {
        let document = self.database.with_connection(|conn| {
            Ok(conn
                .query_row(
                    "SELECT document FROM wikipages WHERE title = ?1 ORDER BY seq ASC LIMIT 1",
                    params![title],
                    |row| row.get::<_, String>(0),
                )
                .optional()?)
        })?;

        match document {
            Some(document) => decode(&document),
            None => Err(RepositoryError::NotFound(title.to_string())),
        }
    }

    fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Page>> {
        let hex = id.to_hex();
        let document = self.database.with_connection(|conn| {
            Ok(conn
                .query_row(
                    "SELECT document FROM wikipages WHERE id = ?1",
                    params![hex],
                    |row| row.get::<_, String>(0),
                )
                .optional()?)
        })?;

        document.as_deref().map(decode).transpose()
    }

    fn search(&self, title_fragment: &str) -> RepositoryResult<Vec<Page>> {
        let sql = format!(
            "SELECT document FROM wikipages WHERE wiki_title_match(title, ?1, ?2) {}",
            ORDER_NEWEST_FIRST
        );
        let pages = self.database.with_connection(|conn| {
            query_documents(conn, &sql, params![title_fragment, self.title_match.as_str()])
        })?;

        debug!("Search for '{}' matched {} pages", title_fragment, pages.len());
        Ok(pages)
    }

    fn list_all(&self) -> RepositoryResult<Vec<Page>> {
        let sql = format!("SELECT document FROM wikipages {}", ORDER_NEWEST_FIRST);
        self.database
            .with_connection(|conn| query_documents(conn, &sql, []))
    }
}
