use crate::application::repositories::TitleMatch;
use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, Error, Result};

/// Register the SQL functions the page queries use.
///
/// `wiki_title_match(title, fragment, mode)` applies [`TitleMatch`] inside
/// the store, so `search` only reads the documents of matching pages.
/// Functions belong to a connection and must be registered on each one.
pub fn register_functions(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        "wiki_title_match",
        3,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let title = ctx.get::<String>(0)?;
            let fragment = ctx.get::<String>(1)?;
            let mode = ctx
                .get::<String>(2)?
                .parse::<TitleMatch>()
                .map_err(|e| Error::UserFunctionError(Box::new(e)))?;
            Ok(mode.matches(&title, &fragment))
        },
    )
}
