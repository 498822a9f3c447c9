//! List rows and share tokens

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

use super::{new_id, now_timestamp};
use crate::types::BoggaError;

/// Colour given to lists created without one
pub const DEFAULT_LIST_COLOR: &str = "#6366f1";

/// List row from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListRow {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub color: String,
    pub share_token: Option<String>,
    pub created_at: String,
}

impl ListRow {
    fn from_row(row: &Row) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            owner_id: row.get("owner_id")?,
            title: row.get("title")?,
            color: row.get("color")?,
            share_token: row.get("share_token")?,
            created_at: row.get("created_at")?,
        })
    }
}

/// List with task counts (deleted tasks excluded)
#[derive(Debug, Clone, Serialize)]
pub struct ListSummary {
    #[serde(flatten)]
    pub list: ListRow,
    pub open_count: i64,
    pub total_count: i64,
}

/// What a share link holder may see of a list
#[derive(Debug, Clone, Serialize)]
pub struct SharedListView {
    pub id: String,
    pub title: String,
    pub color: String,
}

impl From<&ListRow> for SharedListView {
    fn from(list: &ListRow) -> Self {
        Self {
            id: list.id.clone(),
            title: list.title.clone(),
            color: list.color.clone(),
        }
    }
}

/// Lists owned by a user, newest first
pub fn list_lists_for_owner(
    conn: &Connection,
    owner_id: &str,
) -> Result<Vec<ListSummary>, BoggaError> {
    let mut stmt = conn.prepare(
        r#"
        SELECT l.*,
            COUNT(CASE WHEN t.status = 'open' THEN 1 END) AS open_count,
            COUNT(t.id) AS total_count
        FROM lists l
        LEFT JOIN tasks t ON t.list_id = l.id AND t.status <> 'deleted'
        WHERE l.owner_id = ?
        GROUP BY l.id
        ORDER BY l.created_at DESC, l.rowid DESC
        "#,
    )?;

    let rows = stmt.query_map(params![owner_id], |row| {
        Ok(ListSummary {
            list: ListRow::from_row(row)?,
            open_count: row.get("open_count")?,
            total_count: row.get("total_count")?,
        })
    })?;

    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Create a list for an owner
pub fn create_list(
    conn: &Connection,
    owner_id: &str,
    title: &str,
    color: &str,
) -> Result<ListRow, BoggaError> {
    let list = ListRow {
        id: new_id(),
        owner_id: owner_id.to_string(),
        title: title.to_string(),
        color: color.to_string(),
        share_token: None,
        created_at: now_timestamp(),
    };
    conn.execute(
        "INSERT INTO lists (id, owner_id, title, color, created_at) VALUES (?, ?, ?, ?, ?)",
        params![list.id, list.owner_id, list.title, list.color, list.created_at],
    )?;
    Ok(list)
}

/// Get a list only if it belongs to `owner_id`
pub fn get_owned_list(
    conn: &Connection,
    list_id: &str,
    owner_id: &str,
) -> Result<Option<ListRow>, BoggaError> {
    conn.query_row(
        "SELECT * FROM lists WHERE id = ? AND owner_id = ?",
        params![list_id, owner_id],
        ListRow::from_row,
    )
    .optional()
    .map_err(Into::into)
}

/// Delete an owned list; its tasks go with it
pub fn delete_list(conn: &Connection, list_id: &str, owner_id: &str) -> Result<bool, BoggaError> {
    let changes = conn.execute(
        "DELETE FROM lists WHERE id = ? AND owner_id = ?",
        params![list_id, owner_id],
    )?;
    Ok(changes > 0)
}

/// Replace (or clear) the share token of an owned list
pub fn set_share_token(
    conn: &Connection,
    list_id: &str,
    owner_id: &str,
    token: Option<&str>,
) -> Result<bool, BoggaError> {
    let changes = conn.execute(
        "UPDATE lists SET share_token = ? WHERE id = ? AND owner_id = ?",
        params![token, list_id, owner_id],
    )?;
    Ok(changes > 0)
}

/// Resolve a share token to its list
pub fn find_list_by_share_token(
    conn: &Connection,
    token: &str,
) -> Result<Option<ListRow>, BoggaError> {
    conn.query_row(
        "SELECT * FROM lists WHERE share_token = ?",
        params![token],
        ListRow::from_row,
    )
    .optional()
    .map_err(Into::into)
}
