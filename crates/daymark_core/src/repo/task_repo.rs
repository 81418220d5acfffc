//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide owner-scoped CRUD and ranked listing over `tasks` storage.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths must call `Task::validate()` before SQL mutations.
//! - Every statement filters by owner; a task under another owner is
//!   indistinguishable from an absent one.
//! - A task row and its checklist rows change inside one transaction.

use crate::model::task::{Priority, Step, Task, TaskId};
use crate::model::user::UserId;
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    owner,
    name,
    priority,
    completed,
    is_today,
    created_at,
    completed_at
FROM tasks";

/// Ranked ordering shared by every listing: priority descending, then
/// creation time ascending, then uuid as a deterministic final tiebreak.
const RANKED_ORDER_SQL: &str = " ORDER BY
    CASE priority WHEN 'high' THEN 3 WHEN 'medium' THEN 2 ELSE 1 END DESC,
    created_at ASC,
    uuid ASC";

/// Which slice of the active tasks a listing should return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskScope {
    /// Every uncompleted task regardless of scheduling flag.
    #[default]
    All,
    /// Only tasks flagged for today.
    Today,
    /// Only tasks deferred past today.
    Later,
}

/// Query options for ranked task listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskListQuery {
    pub scope: TaskScope,
    pub limit: Option<u32>,
}

/// Repository interface for owner-scoped task persistence.
pub trait TaskRepository {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId>;
    fn get_task(&self, owner: UserId, id: TaskId) -> RepoResult<Option<Task>>;
    /// Lists uncompleted tasks for the owner in ranked order.
    fn list_active(&self, owner: UserId, query: &TaskListQuery) -> RepoResult<Vec<Task>>;
    /// Persists every mutable field of an existing task, replacing its
    /// checklist wholesale in the same transaction.
    fn save_task(&self, task: &Task) -> RepoResult<()>;
    fn delete_task(&self, owner: UserId, id: TaskId) -> RepoResult<()>;
    /// Counts uncompleted tasks flagged for today.
    fn count_active_today(&self, owner: UserId) -> RepoResult<u64>;
    /// Counts today-flagged tasks completed at or after `since_ms`.
    fn count_completed_since(&self, owner: UserId, since_ms: i64) -> RepoResult<u64>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn load_steps(&self, task_uuid: TaskId) -> RepoResult<Vec<Step>> {
        let mut stmt = self.conn.prepare(
            "SELECT text, completed, position FROM steps
             WHERE task_uuid = ?1 ORDER BY position ASC;",
        )?;
        let mut rows = stmt.query(params![task_uuid.to_string()])?;
        let mut steps = Vec::new();
        while let Some(row) = rows.next()? {
            steps.push(Step {
                text: row.get("text")?,
                completed: row.get::<_, i64>("completed")? != 0,
                position: row.get("position")?,
            });
        }
        Ok(steps)
    }

    fn insert_steps(&self, task: &Task) -> RepoResult<()> {
        let mut stmt = self.conn.prepare(
            "INSERT INTO steps (task_uuid, position, text, completed)
             VALUES (?1, ?2, ?3, ?4);",
        )?;
        for step in &task.steps {
            stmt.execute(params![
                task.uuid.to_string(),
                step.position,
                step.text.as_str(),
                bool_to_int(step.completed),
            ])?;
        }
        Ok(())
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        self.conn.execute(
            "INSERT INTO tasks (
                uuid,
                owner,
                name,
                priority,
                completed,
                is_today,
                created_at,
                completed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                task.uuid.to_string(),
                task.owner.to_string(),
                task.name.as_str(),
                priority_to_db(task.priority),
                bool_to_int(task.completed),
                bool_to_int(task.is_today),
                task.created_at,
                task.completed_at,
            ],
        )?;
        self.insert_steps(task)?;
        tx.commit()?;

        Ok(task.uuid)
    }

    fn get_task(&self, owner: UserId, id: TaskId) -> RepoResult<Option<Task>> {
        let found = self
            .conn
            .query_row(
                &format!("{TASK_SELECT_SQL} WHERE uuid = ?1 AND owner = ?2;"),
                params![id.to_string(), owner.to_string()],
                parse_task_row,
            )
            .optional()?;

        let Some(mut task) = found.transpose()? else {
            return Ok(None);
        };
        task.steps = self.load_steps(task.uuid)?;
        Ok(Some(task))
    }

    fn list_active(&self, owner: UserId, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        let mut sql = format!("{TASK_SELECT_SQL} WHERE owner = ?1 AND completed = 0");
        match query.scope {
            TaskScope::All => {}
            TaskScope::Today => sql.push_str(" AND is_today = 1"),
            TaskScope::Later => sql.push_str(" AND is_today = 0"),
        }
        sql.push_str(RANKED_ORDER_SQL);
        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        sql.push(';');

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params![owner.to_string()])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)??);
        }
        for task in &mut tasks {
            task.steps = self.load_steps(task.uuid)?;
        }
        Ok(tasks)
    }

    fn save_task(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                name = ?1,
                priority = ?2,
                completed = ?3,
                is_today = ?4,
                completed_at = ?5
             WHERE uuid = ?6 AND owner = ?7;",
            params![
                task.name.as_str(),
                priority_to_db(task.priority),
                bool_to_int(task.completed),
                bool_to_int(task.is_today),
                task.completed_at,
                task.uuid.to_string(),
                task.owner.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(task.uuid));
        }

        self.conn.execute(
            "DELETE FROM steps WHERE task_uuid = ?1;",
            params![task.uuid.to_string()],
        )?;
        self.insert_steps(task)?;
        tx.commit()?;

        Ok(())
    }

    fn delete_task(&self, owner: UserId, id: TaskId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM tasks WHERE uuid = ?1 AND owner = ?2;",
            params![id.to_string(), owner.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn count_active_today(&self, owner: UserId) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM tasks
             WHERE owner = ?1 AND completed = 0 AND is_today = 1;",
            params![owner.to_string()],
            |row| row.get(0),
        )?;
        to_count(count)
    }

    fn count_completed_since(&self, owner: UserId, since_ms: i64) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM tasks
             WHERE owner = ?1 AND completed = 1 AND is_today = 1
               AND completed_at IS NOT NULL AND completed_at >= ?2;",
            params![owner.to_string(), since_ms],
            |row| row.get(0),
        )?;
        to_count(count)
    }
}

fn parse_task_row(row: &Row<'_>) -> rusqlite::Result<RepoResult<Task>> {
    Ok(try_parse_task_row(row))
}

fn try_parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let uuid = parse_uuid_column(row, "uuid")?;
    let owner = parse_uuid_column(row, "owner")?;

    let priority_text: String = row.get("priority")?;
    let priority = parse_priority(&priority_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid priority `{priority_text}` in tasks.priority"))
    })?;

    Ok(Task {
        uuid,
        owner,
        name: row.get("name")?,
        priority,
        steps: Vec::new(),
        completed: row.get::<_, i64>("completed")? != 0,
        is_today: row.get::<_, i64>("is_today")? != 0,
        created_at: row.get("created_at")?,
        completed_at: row.get("completed_at")?,
    })
}

fn parse_uuid_column(row: &Row<'_>, column: &str) -> RepoResult<Uuid> {
    let text: String = row.get(column)?;
    Uuid::parse_str(&text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{text}` in tasks.{column}"))
    })
}

fn priority_to_db(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "low",
        Priority::Medium => "medium",
        Priority::High => "high",
    }
}

fn parse_priority(value: &str) -> Option<Priority> {
    match value {
        "low" => Some(Priority::Low),
        "medium" => Some(Priority::Medium),
        "high" => Some(Priority::High),
        _ => None,
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn to_count(count: i64) -> RepoResult<u64> {
    u64::try_from(count).map_err(|_| RepoError::InvalidData("negative count".to_string()))
}
