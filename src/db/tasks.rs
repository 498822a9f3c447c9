//! Task rows, recurrence rows and lifecycle writes

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, Value, ValueRef};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, ToSql};
use serde::Serialize;

use super::{new_id, now_timestamp};
use crate::lifecycle::{NewTask, RecurrenceRule, TaskChanges, TaskStatus};
use crate::types::BoggaError;

impl ToSql for TaskStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TaskStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// Task row joined with its recurrence rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskRow {
    pub id: String,
    pub list_id: String,
    pub title: String,
    pub deadline: Option<String>,
    pub tag: Option<String>,
    pub status: TaskStatus,
    pub recurrence: Option<RecurrenceRule>,
    pub created_at: String,
}

impl TaskRow {
    fn from_row(row: &Row) -> Result<Self, rusqlite::Error> {
        let rule: Option<String> = row.get("rule")?;
        Ok(Self {
            id: row.get("id")?,
            list_id: row.get("list_id")?,
            title: row.get("title")?,
            deadline: row.get("deadline")?,
            tag: row.get("tag")?,
            status: row.get("status")?,
            recurrence: rule.as_deref().and_then(RecurrenceRule::from_stored),
            created_at: row.get("created_at")?,
        })
    }
}

const SELECT_TASK: &str = r#"
    SELECT t.id, t.list_id, t.title, t.deadline, t.tag, t.status, t.created_at, r.rule
    FROM tasks t
    LEFT JOIN task_recurrence r ON r.task_id = t.id
"#;

/// Which slice of a list to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskView {
    /// Open and done tasks
    Active,
    /// Soft-deleted tasks only
    Trash,
}

impl TaskView {
    fn filter(self) -> &'static str {
        match self {
            Self::Active => "t.status <> 'deleted'",
            Self::Trash => "t.status = 'deleted'",
        }
    }
}

/// Tasks of a list; dated tasks first by deadline, then newest first
pub fn list_tasks(
    conn: &Connection,
    list_id: &str,
    view: TaskView,
) -> Result<Vec<TaskRow>, BoggaError> {
    let sql = format!(
        "{} WHERE t.list_id = ? AND {} \
         ORDER BY t.deadline IS NULL, t.deadline ASC, t.created_at DESC, t.rowid DESC",
        SELECT_TASK,
        view.filter()
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![list_id], TaskRow::from_row)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Get a task only if its list belongs to `owner_id`
pub fn get_owned_task(
    conn: &Connection,
    task_id: &str,
    owner_id: &str,
) -> Result<Option<TaskRow>, BoggaError> {
    let sql = format!(
        "{} JOIN lists l ON l.id = t.list_id WHERE t.id = ? AND l.owner_id = ?",
        SELECT_TASK
    );
    conn.query_row(&sql, params![task_id, owner_id], TaskRow::from_row)
        .optional()
        .map_err(Into::into)
}

/// Insert an open task and its recurrence row
pub fn insert_task(conn: &Connection, task: &NewTask) -> Result<TaskRow, BoggaError> {
    let row = TaskRow {
        id: new_id(),
        list_id: task.list_id.clone(),
        title: task.title.clone(),
        deadline: task.deadline.clone(),
        tag: task.tag.clone(),
        status: TaskStatus::Open,
        recurrence: task.recurrence,
        created_at: now_timestamp(),
    };

    conn.execute(
        "INSERT INTO tasks (id, list_id, title, deadline, tag, status, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
        params![
            row.id,
            row.list_id,
            row.title,
            row.deadline,
            row.tag,
            row.status,
            row.created_at
        ],
    )?;
    set_recurrence(conn, &row.id, row.recurrence)?;

    Ok(row)
}

/// Write the column changes of a patch. Recurrence is handled by
/// [`set_recurrence`].
pub fn apply_changes(
    conn: &Connection,
    task_id: &str,
    changes: &TaskChanges,
) -> Result<(), BoggaError> {
    let mut sets: Vec<&str> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(title) = &changes.title {
        sets.push("title = ?");
        values.push(Value::Text(title.clone()));
    }
    if let Some(deadline) = &changes.deadline {
        sets.push("deadline = ?");
        values.push(optional_text(deadline));
    }
    if let Some(tag) = &changes.tag {
        sets.push("tag = ?");
        values.push(optional_text(tag));
    }
    if let Some(status) = changes.status {
        sets.push("status = ?");
        values.push(Value::Text(status.as_str().to_string()));
    }

    if sets.is_empty() {
        return Ok(());
    }

    values.push(Value::Text(task_id.to_string()));
    let sql = format!("UPDATE tasks SET {} WHERE id = ?", sets.join(", "));
    conn.execute(&sql, params_from_iter(values))?;
    Ok(())
}

fn optional_text(value: &Option<String>) -> Value {
    match value {
        Some(text) => Value::Text(text.clone()),
        None => Value::Null,
    }
}

/// Replace or remove the recurrence rule of a task
pub fn set_recurrence(
    conn: &Connection,
    task_id: &str,
    rule: Option<RecurrenceRule>,
) -> Result<(), BoggaError> {
    match rule {
        Some(rule) => conn.execute(
            "INSERT INTO task_recurrence (task_id, rule) VALUES (?, ?) \
             ON CONFLICT(task_id) DO UPDATE SET rule = excluded.rule",
            params![task_id, rule.as_str()],
        )?,
        None => conn.execute(
            "DELETE FROM task_recurrence WHERE task_id = ?",
            params![task_id],
        )?,
    };
    Ok(())
}

/// Mark a task deleted. Returns false if it already was.
pub fn soft_delete(conn: &Connection, task_id: &str) -> Result<bool, BoggaError> {
    let changes = conn.execute(
        "UPDATE tasks SET status = 'deleted' WHERE id = ? AND status <> 'deleted'",
        params![task_id],
    )?;
    Ok(changes > 0)
}

/// Bring a deleted task back as open. Returns false if it was not deleted.
pub fn restore_task(conn: &Connection, task_id: &str) -> Result<bool, BoggaError> {
    let changes = conn.execute(
        "UPDATE tasks SET status = 'open' WHERE id = ? AND status = 'deleted'",
        params![task_id],
    )?;
    Ok(changes > 0)
}

/// Hard-delete a deleted task; the recurrence row cascades. Returns false if
/// the task was not deleted.
pub fn purge_task(conn: &Connection, task_id: &str) -> Result<bool, BoggaError> {
    let changes = conn.execute(
        "DELETE FROM tasks WHERE id = ? AND status = 'deleted'",
        params![task_id],
    )?;
    Ok(changes > 0)
}
