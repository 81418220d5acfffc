//! Task ranking engine and owner-scoped task use-cases.
//!
//! # Responsibility
//! - Turn view modes into ranked, capped listings.
//! - Apply partial updates and completion toggles without breaking the
//!   `completed`/`completed_at` pairing.
//!
//! # Invariants
//! - Every entry point takes the owner id; nothing here reads ambient state.
//! - The today view never returns more than [`TODAY_VIEW_LIMIT`] tasks.
//! - `completed_at` changes only together with `completed`.

use crate::model::task::{NewTask, Task, TaskId, TaskPatch};
use crate::model::user::UserId;
use crate::repo::task_repo::{TaskListQuery, TaskRepository, TaskScope};
use crate::service::{now_ms, ServiceError, ServiceResult};
use chrono::{DateTime, Local, NaiveTime, TimeZone};
use log::info;
use serde::Serialize;

/// Hard cap on the today view. Presentation layers may show fewer, but the
/// engine contract is "at most five, correctly prioritized".
pub const TODAY_VIEW_LIMIT: u32 = 5;

/// Progress counters for the today view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    /// Uncompleted tasks flagged for today.
    pub total: u64,
    /// Today-flagged tasks completed since local midnight.
    #[serde(rename = "completed")]
    pub completed_today: u64,
}

/// Use-case service for owner-scoped task reads and writes.
pub struct TaskService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Ranked today view: active today-flagged tasks, priority descending,
    /// earlier-created first on ties, capped at five.
    pub fn list_today(&self, owner: UserId) -> ServiceResult<Vec<Task>> {
        let query = TaskListQuery {
            scope: TaskScope::Today,
            limit: Some(TODAY_VIEW_LIMIT),
        };
        Ok(self.repo.list_active(owner, &query)?)
    }

    /// Ranked listing of every active task in the given scope, uncapped.
    pub fn list_all(&self, owner: UserId, scope: TaskScope) -> ServiceResult<Vec<Task>> {
        let query = TaskListQuery { scope, limit: None };
        Ok(self.repo.list_active(owner, &query)?)
    }

    /// Progress counters. The day boundary is the server's local midnight;
    /// per-user timezones are out of scope.
    pub fn stats(&self, owner: UserId) -> ServiceResult<TaskStats> {
        let since_ms = start_of_local_day_ms(Local::now());
        Ok(TaskStats {
            total: self.repo.count_active_today(owner)?,
            completed_today: self.repo.count_completed_since(owner, since_ms)?,
        })
    }

    /// Creates a task with defaulted fields and returns the persisted record.
    ///
    /// # Errors
    /// - `Validation` when the trimmed name or any step text is empty.
    pub fn create_task(&self, owner: UserId, new_task: NewTask) -> ServiceResult<Task> {
        let mut task = Task::new(owner, new_task.name.trim(), now_ms());
        if let Some(priority) = new_task.priority {
            task.priority = priority;
        }
        if let Some(steps) = new_task.steps {
            task.replace_steps(steps);
        }
        if let Some(is_today) = new_task.is_today {
            task.is_today = is_today;
        }

        self.repo.create_task(&task)?;
        info!("event=task_create module=task status=ok");
        Ok(task)
    }

    /// Applies a partial update; absent fields are untouched.
    ///
    /// When `completed` is present, `completed_at` is recomputed in the same
    /// store transaction.
    pub fn update_task(
        &self,
        owner: UserId,
        id: TaskId,
        patch: TaskPatch,
    ) -> ServiceResult<Task> {
        let mut task = self.get_owned(owner, id)?;

        if let Some(name) = patch.name {
            task.name = name.trim().to_string();
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(steps) = patch.steps {
            task.replace_steps(steps);
        }
        if let Some(is_today) = patch.is_today {
            task.is_today = is_today;
        }
        if let Some(completed) = patch.completed {
            task.set_completed(completed, now_ms());
        }

        self.repo.save_task(&task)?;
        info!("event=task_update module=task status=ok");
        Ok(task)
    }

    /// Flips completion and recomputes the completion timestamp.
    pub fn toggle_completion(&self, owner: UserId, id: TaskId) -> ServiceResult<Task> {
        let mut task = self.get_owned(owner, id)?;
        task.set_completed(!task.completed, now_ms());
        self.repo.save_task(&task)?;
        info!("event=task_toggle module=task status=ok");
        Ok(task)
    }

    /// Deletes a task. Deleting an absent (or foreign) task fails with
    /// `NotFound`, including the second delete of the same id.
    pub fn delete_task(&self, owner: UserId, id: TaskId) -> ServiceResult<()> {
        self.repo.delete_task(owner, id)?;
        info!("event=task_delete module=task status=ok");
        Ok(())
    }

    fn get_owned(&self, owner: UserId, id: TaskId) -> ServiceResult<Task> {
        self.repo
            .get_task(owner, id)?
            .ok_or(ServiceError::NotFound)
    }
}

/// Local midnight for the day containing `now`, as epoch milliseconds.
///
/// Falls back to `now` itself in the degenerate case where local midnight
/// does not exist (DST gap), which only shortens the counted window.
fn start_of_local_day_ms(now: DateTime<Local>) -> i64 {
    let midnight = now.date_naive().and_time(NaiveTime::MIN);
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| now.timestamp_millis())
}
