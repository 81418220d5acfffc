use daymark_core::db::open_db_in_memory;
use daymark_core::{
    hash_password, NewTask, SqliteTaskRepository, SqliteUserRepository, TaskId, TaskService,
    User, UserId, UserRepository,
};
use rusqlite::{params, Connection};

fn create_user(conn: &Connection, email: &str) -> UserId {
    let repo = SqliteUserRepository::new(conn);
    let user = User::new(email, hash_password("secret1"));
    repo.create_user(&user).unwrap()
}

fn service(conn: &Connection) -> TaskService<SqliteTaskRepository<'_>> {
    TaskService::new(SqliteTaskRepository::new(conn))
}

fn create_task(conn: &Connection, owner: UserId, name: &str, is_today: bool) -> TaskId {
    let mut new_task = NewTask::named(name);
    new_task.is_today = Some(is_today);
    service(conn).create_task(owner, new_task).unwrap().uuid
}

/// Backdates a completed task's timestamp, bypassing the service on purpose.
fn set_completed_at(conn: &Connection, id: TaskId, completed_at: i64) {
    conn.execute(
        "UPDATE tasks SET completed_at = ?1 WHERE uuid = ?2;",
        params![completed_at, id.to_string()],
    )
    .unwrap();
}

#[test]
fn total_counts_only_active_today_tasks() {
    let conn = open_db_in_memory().unwrap();
    let owner = create_user(&conn, "a@b.com");
    let tasks = service(&conn);

    create_task(&conn, owner, "today one", true);
    create_task(&conn, owner, "today two", true);
    create_task(&conn, owner, "deferred", false);
    let done = create_task(&conn, owner, "done", true);
    tasks.toggle_completion(owner, done).unwrap();

    let stats = tasks.stats(owner).unwrap();
    assert_eq!(stats.total, 2);
}

#[test]
fn completed_today_counts_completions_since_local_midnight() {
    let conn = open_db_in_memory().unwrap();
    let owner = create_user(&conn, "a@b.com");
    let tasks = service(&conn);

    let fresh = create_task(&conn, owner, "finished now", true);
    tasks.toggle_completion(owner, fresh).unwrap();

    let stale = create_task(&conn, owner, "finished long ago", true);
    tasks.toggle_completion(owner, stale).unwrap();
    // Two days back is before local midnight in every timezone.
    let two_days_ago = chrono::Utc::now().timestamp_millis() - 2 * 24 * 60 * 60 * 1000;
    set_completed_at(&conn, stale, two_days_ago);

    let stats = tasks.stats(owner).unwrap();
    assert_eq!(stats.completed_today, 1);
}

#[test]
fn completed_later_tasks_do_not_count() {
    let conn = open_db_in_memory().unwrap();
    let owner = create_user(&conn, "a@b.com");
    let tasks = service(&conn);

    let deferred = create_task(&conn, owner, "deferred", false);
    tasks.toggle_completion(owner, deferred).unwrap();

    let stats = tasks.stats(owner).unwrap();
    assert_eq!(stats.completed_today, 0);
    assert_eq!(stats.total, 0);
}

#[test]
fn stats_are_owner_scoped() {
    let conn = open_db_in_memory().unwrap();
    let owner = create_user(&conn, "a@b.com");
    let stranger = create_user(&conn, "c@d.com");
    let tasks = service(&conn);

    create_task(&conn, owner, "mine", true);
    create_task(&conn, stranger, "theirs one", true);
    let done = create_task(&conn, stranger, "theirs two", true);
    tasks.toggle_completion(stranger, done).unwrap();

    let stats = tasks.stats(owner).unwrap();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.completed_today, 0);
}

#[test]
fn stats_serialize_with_external_field_names() {
    let conn = open_db_in_memory().unwrap();
    let owner = create_user(&conn, "a@b.com");

    let stats = service(&conn).stats(owner).unwrap();
    let value = serde_json::to_value(stats).unwrap();
    assert_eq!(value["total"], 0);
    assert_eq!(value["completed"], 0);
}
