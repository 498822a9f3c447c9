//! User rows

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

use super::{new_id, now_timestamp};
use crate::types::BoggaError;

/// The deployment user
#[derive(Debug, Clone, Serialize)]
pub struct UserRow {
    pub id: String,
    #[serde(skip_serializing)]
    pub pin_hash: String,
    pub display_name: String,
    pub created_at: String,
}

impl UserRow {
    fn from_row(row: &Row) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            pin_hash: row.get("pin_hash")?,
            display_name: row.get("display_name")?,
            created_at: row.get("created_at")?,
        })
    }
}

/// Whether setup has already happened
pub fn has_any_user(conn: &Connection) -> Result<bool, BoggaError> {
    let found: Option<String> = conn
        .query_row("SELECT id FROM users LIMIT 1", [], |row| row.get(0))
        .optional()?;
    Ok(found.is_some())
}

/// Insert the deployment user
pub fn create_user(
    conn: &Connection,
    pin_hash: &str,
    display_name: &str,
) -> Result<UserRow, BoggaError> {
    let user = UserRow {
        id: new_id(),
        pin_hash: pin_hash.to_string(),
        display_name: display_name.to_string(),
        created_at: now_timestamp(),
    };
    conn.execute(
        "INSERT INTO users (id, pin_hash, display_name, created_at) VALUES (?, ?, ?, ?)",
        params![user.id, user.pin_hash, user.display_name, user.created_at],
    )?;
    Ok(user)
}

/// Look up the user whose PIN digest matches
pub fn find_user_by_pin_hash(
    conn: &Connection,
    pin_hash: &str,
) -> Result<Option<UserRow>, BoggaError> {
    conn.query_row(
        "SELECT * FROM users WHERE pin_hash = ? LIMIT 1",
        params![pin_hash],
        UserRow::from_row,
    )
    .optional()
    .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::TaskDb;

    #[test]
    fn test_create_and_find() {
        let db = TaskDb::open_in_memory().unwrap();
        db.with_conn(|conn| {
            assert!(!has_any_user(conn)?);

            let user = create_user(conn, "digest", "Bogga")?;
            assert!(has_any_user(conn)?);

            let found = find_user_by_pin_hash(conn, "digest")?.unwrap();
            assert_eq!(found.id, user.id);
            assert_eq!(found.display_name, "Bogga");

            assert!(find_user_by_pin_hash(conn, "other")?.is_none());
            Ok(())
        })
        .unwrap();
    }
}
