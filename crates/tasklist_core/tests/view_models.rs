use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::time::Duration;
use tasklist_core::fixtures::make_seed;
use tasklist_core::{
    DiskStore, ListRepository, NewTask, Task, TaskCategory, TaskList, TaskListViewModel,
    TaskPriority, TaskViewModel,
};
use uuid::Uuid;

const DELAY: Duration = Duration::from_secs(10);

fn setup(seed: Vec<TaskList>) -> (Arc<ListRepository>, TaskListViewModel, TaskViewModel) {
    let repo = Arc::new(ListRepository::in_memory(seed));
    let lists = TaskListViewModel::new(Arc::clone(&repo));
    let tasks = TaskViewModel::with_auto_remove_delay(Arc::clone(&repo), Some(DELAY));
    (repo, lists, tasks)
}

async fn only_task(lists: &TaskListViewModel, name: &str) -> Task {
    lists.load().await;
    let list = lists.list(name).expect("list should exist");
    assert_eq!(list.len(), 1, "expected exactly one task in {name}");
    list.tasks[0].clone()
}

#[tokio::test]
async fn list_vm_load_and_ensure_list() {
    let (_, lists, _) = setup(make_seed());

    lists.load().await;
    assert_eq!(lists.lists().len(), 3);

    assert!(lists.ensure_list("  Errands ").await);
    assert!(lists.list("Errands").is_some());
    assert_eq!(lists.last_error(), None);
}

#[tokio::test]
async fn list_vm_records_errors_and_try_ensure_returns_them() {
    let (_, lists, _) = setup(vec![TaskList::new("Work")]);

    let message = lists.try_ensure_list("work").await;
    assert_eq!(
        message.as_deref(),
        Some("A list named \"work\" already exists.")
    );
    assert_eq!(lists.last_error(), message);

    assert!(!lists.rename_list("Missing", "Other").await);
    assert_eq!(
        lists.last_error().as_deref(),
        Some("List not found: Missing")
    );

    lists.clear_error();
    assert_eq!(lists.last_error(), None);
}

#[tokio::test]
async fn list_vm_delete_and_rename_refresh_snapshot() {
    let (_, lists, _) = setup(make_seed());
    lists.load().await;

    assert!(lists.delete_list("Shopping").await);
    assert!(lists.list("Shopping").is_none());

    assert!(lists.rename_list("Inbox", "Personal").await);
    let names: Vec<String> = lists.lists().into_iter().map(|list| list.name).collect();
    assert_eq!(names, vec!["Personal".to_string(), "Today".to_string()]);
}

#[tokio::test]
async fn list_vm_trims_names_like_ensure_list_stores_them() {
    let (_, lists, _) = setup(vec![]);
    assert!(lists.ensure_list("  Errands ").await);

    assert!(lists.rename_list("  Errands ", " Chores  ").await);
    assert!(lists.list("Chores").is_some());

    assert!(lists.delete_list(" Chores ").await);
    assert!(lists.lists().is_empty());
    assert_eq!(lists.last_error(), None);
}

#[tokio::test]
async fn list_vm_subscribers_see_updates() {
    let (_, lists, _) = setup(vec![]);
    let mut receiver = lists.subscribe();

    lists.ensure_list("Inbox").await;

    assert!(receiver.has_changed().unwrap());
    let state = receiver.borrow_and_update().clone();
    assert_eq!(state.lists.len(), 1);
    assert_eq!(state.last_error, None);
}

#[tokio::test]
async fn task_vm_add_rename_remove() {
    let (_, lists, tasks) = setup(vec![TaskList::new("Errands")]);

    let id = tasks
        .add_task(
            "Errands",
            NewTask::titled("Pick up parcel")
                .category(TaskCategory::Personal)
                .priority(TaskPriority::Medium),
        )
        .await
        .expect("add should succeed");
    let task = only_task(&lists, "Errands").await;
    assert_eq!(task.id(), id);
    assert_eq!(task.title(), "Pick up parcel");

    assert!(tasks.rename("Errands", &task, "Pick up package").await);
    let renamed = only_task(&lists, "Errands").await;
    assert_eq!(renamed.title(), "Pick up package");

    assert!(tasks.remove("Errands", id).await);
    lists.load().await;
    assert!(lists.list("Errands").unwrap().is_empty());
    assert_eq!(tasks.last_error(), None);
}

#[tokio::test]
async fn task_vm_surfaces_validation_and_repository_errors() {
    let (_, lists, tasks) = setup(vec![TaskList::new("Inbox")]);

    assert!(tasks.add_task("Inbox", NewTask::titled("   ")).await.is_none());
    assert_eq!(tasks.last_error().as_deref(), Some("Title cannot be empty."));

    assert!(tasks
        .add_task("Nowhere", NewTask::titled("lost"))
        .await
        .is_none());
    assert_eq!(
        tasks.last_error().as_deref(),
        Some("List not found: Nowhere")
    );

    let created_at = Utc::now() - ChronoDuration::hours(1);
    let id = tasks
        .add_task("Inbox", NewTask::titled("plan").created_at(created_at))
        .await
        .unwrap();
    let task = only_task(&lists, "Inbox").await;
    assert_eq!(task.id(), id);

    assert!(!tasks
        .reschedule("Inbox", &task, Some(created_at - ChronoDuration::days(1)))
        .await);
    assert!(tasks
        .last_error()
        .unwrap()
        .starts_with("Due date cannot be earlier than creation date"));
    assert_eq!(only_task(&lists, "Inbox").await.due_at(), None);

    let ghost = Task::new("ghost").unwrap();
    assert!(!tasks.rename("Inbox", &ghost, "still ghost").await);
    assert_eq!(
        tasks.last_error(),
        Some(format!("Task not found: {}", ghost.id()))
    );

    tasks.clear_error();
    assert_eq!(tasks.last_error(), None);
}

#[tokio::test]
async fn task_vm_edits_round_trip_through_repository() {
    let (_, lists, tasks) = setup(vec![TaskList::new("Inbox")]);
    tasks
        .add_task("Inbox", NewTask::titled("read paper"))
        .await
        .unwrap();
    let task = only_task(&lists, "Inbox").await;

    assert!(tasks.set_priority("Inbox", &task, TaskPriority::Critical).await);
    let task = only_task(&lists, "Inbox").await;
    assert!(tasks.set_category("Inbox", &task, TaskCategory::Study).await);
    let task = only_task(&lists, "Inbox").await;
    assert!(tasks
        .update_detail("Inbox", &task, Some("section 3".to_string()))
        .await);
    let task = only_task(&lists, "Inbox").await;
    let due = Utc::now() + ChronoDuration::days(2);
    assert!(tasks.reschedule("Inbox", &task, Some(due)).await);
    let task = only_task(&lists, "Inbox").await;
    assert!(tasks.mark_in_progress("Inbox", &task).await);

    let stored = only_task(&lists, "Inbox").await;
    assert_eq!(stored.priority(), TaskPriority::Critical);
    assert_eq!(stored.category(), TaskCategory::Study);
    assert_eq!(stored.detail(), Some("section 3"));
    assert_eq!(stored.due_at(), Some(due));
    assert!(stored.is_in_progress());
}

#[tokio::test(start_paused = true)]
async fn completed_task_is_removed_after_delay() {
    let (_, lists, tasks) = setup(vec![TaskList::new("Test")]);
    tasks
        .add_task("Test", NewTask::titled("Test Task"))
        .await
        .unwrap();
    let task = only_task(&lists, "Test").await;

    assert!(tasks.mark_completed("Test", &task).await);
    let completed = only_task(&lists, "Test").await;
    assert!(completed.is_completed());
    assert!(completed.completed_at().is_some());
    assert!(tasks.has_pending_removal(task.id()));

    tokio::time::sleep(DELAY - Duration::from_secs(1)).await;
    assert!(only_task(&lists, "Test").await.is_completed());

    tokio::time::sleep(Duration::from_secs(2)).await;
    lists.load().await;
    assert!(lists.list("Test").unwrap().is_empty());
    assert!(!tasks.has_pending_removal(task.id()));
    assert_eq!(tasks.pending_removals(), 0);
}

#[tokio::test(start_paused = true)]
async fn marking_incomplete_cancels_pending_removal() {
    let (_, lists, tasks) = setup(vec![TaskList::new("Test")]);
    tasks
        .add_task("Test", NewTask::titled("Keep me"))
        .await
        .unwrap();
    let task = only_task(&lists, "Test").await;

    assert!(tasks.mark_completed("Test", &task).await);
    let completed = only_task(&lists, "Test").await;
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert!(tasks.mark_incomplete("Test", &completed).await);
    assert!(!tasks.has_pending_removal(task.id()));

    tokio::time::sleep(DELAY * 2).await;
    let survivor = only_task(&lists, "Test").await;
    assert!(!survivor.is_completed());
    assert_eq!(survivor.completed_at(), None);
}

#[tokio::test(start_paused = true)]
async fn recompleting_restarts_the_timer() {
    let (_, lists, tasks) = setup(vec![TaskList::new("Test")]);
    tasks
        .add_task("Test", NewTask::titled("Flip flop"))
        .await
        .unwrap();
    let task = only_task(&lists, "Test").await;

    assert!(tasks.toggle_completion("Test", &task).await);
    tokio::time::sleep(Duration::from_secs(6)).await;

    let completed = only_task(&lists, "Test").await;
    assert!(tasks.toggle_completion("Test", &completed).await);
    let reopened = only_task(&lists, "Test").await;
    assert!(!reopened.is_completed());
    assert!(tasks.toggle_completion("Test", &reopened).await);
    assert_eq!(tasks.pending_removals(), 1);

    // restarted timer fires at t=16s
    tokio::time::sleep(Duration::from_secs(6)).await;
    assert_eq!(only_task(&lists, "Test").await.title(), "Flip flop");

    tokio::time::sleep(Duration::from_secs(5)).await;
    lists.load().await;
    assert!(lists.list("Test").unwrap().is_empty());
    assert_eq!(tasks.pending_removals(), 0);
}

#[tokio::test(start_paused = true)]
async fn manual_remove_cancels_pending_removal() {
    let (_, lists, tasks) = setup(vec![TaskList::new("Test")]);
    let id = tasks
        .add_task("Test", NewTask::titled("Gone early"))
        .await
        .unwrap();
    let task = only_task(&lists, "Test").await;
    assert!(tasks.mark_completed("Test", &task).await);

    assert!(tasks.remove("Test", id).await);
    assert!(!tasks.has_pending_removal(id));
    assert!(tasks.remove("Test", Uuid::new_v4()).await);
}

#[tokio::test(start_paused = true)]
async fn auto_removal_failure_is_published_as_last_error() {
    let (repo, lists, tasks) = setup(vec![TaskList::new("Test")]);
    tasks
        .add_task("Test", NewTask::titled("Doomed list"))
        .await
        .unwrap();
    let task = only_task(&lists, "Test").await;
    let mut errors = tasks.subscribe_errors();

    assert!(tasks.mark_completed("Test", &task).await);
    repo.delete_list("Test").await.unwrap();

    tokio::time::sleep(DELAY + Duration::from_secs(1)).await;
    assert!(errors.has_changed().unwrap());
    assert_eq!(
        errors.borrow_and_update().as_deref(),
        Some("List not found: Test")
    );
    assert_eq!(tasks.pending_removals(), 0);
}

#[tokio::test]
async fn disabled_auto_removal_keeps_completed_tasks() {
    let repo = Arc::new(ListRepository::in_memory(vec![TaskList::new("Test")]));
    let lists = TaskListViewModel::new(Arc::clone(&repo));
    let tasks = TaskViewModel::with_auto_remove_delay(Arc::clone(&repo), None);
    tasks
        .add_task("Test", NewTask::titled("Stay"))
        .await
        .unwrap();
    let task = only_task(&lists, "Test").await;

    assert!(tasks.mark_completed("Test", &task).await);
    assert_eq!(tasks.pending_removals(), 0);
    assert!(only_task(&lists, "Test").await.is_completed());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn timer_skips_task_reopened_outside_the_view_model() {
    let repo = Arc::new(ListRepository::in_memory(vec![TaskList::new("Test")]));
    let tasks = TaskViewModel::with_auto_remove_delay(
        Arc::clone(&repo),
        Some(Duration::from_millis(50)),
    );
    let id = tasks
        .add_task("Test", NewTask::titled("Reopened elsewhere"))
        .await
        .unwrap();
    let task = repo.find_task(id, "Test").await.unwrap().unwrap();
    assert!(tasks.mark_completed("Test", &task).await);

    let mut reopened = repo.find_task(id, "Test").await.unwrap().unwrap();
    reopened.mark_incomplete();
    repo.update_task(reopened, "Test").await.unwrap();

    tokio::time::sleep(Duration::from_millis(300)).await;
    let survivor = repo.find_task(id, "Test").await.unwrap();
    assert!(survivor.is_some_and(|task| !task.is_completed()));
    assert_eq!(tasks.pending_removals(), 0);
    assert_eq!(tasks.last_error(), None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_complete_and_reopen_leave_consistent_state() {
    let dir = tempfile::tempdir().unwrap();
    let filler: Vec<Task> = (0..2_000)
        .map(|index| Task::new(format!("filler {index}")).unwrap())
        .collect();
    let store = DiskStore::new("race.json", dir.path());
    let repo = Arc::new(ListRepository::open(
        store,
        vec![TaskList::with_tasks("Test", filler)],
    ));
    let delay = Duration::from_millis(200);
    let tasks = Arc::new(TaskViewModel::with_auto_remove_delay(
        Arc::clone(&repo),
        Some(delay),
    ));

    let mut ids = Vec::new();
    for round in 0..6 {
        let id = tasks
            .add_task("Test", NewTask::titled(format!("racer {round}")))
            .await
            .unwrap();
        let task = repo.find_task(id, "Test").await.unwrap().unwrap();

        let completer = {
            let tasks = Arc::clone(&tasks);
            let task = task.clone();
            tokio::spawn(async move { tasks.mark_completed("Test", &task).await })
        };
        if round % 2 == 0 {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        let reopener = {
            let tasks = Arc::clone(&tasks);
            tokio::spawn(async move { tasks.mark_incomplete("Test", &task).await })
        };
        assert!(completer.await.unwrap());
        assert!(reopener.await.unwrap());

        let stored = repo.find_task(id, "Test").await.unwrap().unwrap();
        assert_eq!(tasks.has_pending_removal(id), stored.is_completed());
        ids.push((id, stored.is_completed()));
    }

    tokio::time::sleep(delay * 3).await;
    for (id, completed) in ids {
        let stored = repo.find_task(id, "Test").await.unwrap();
        if completed {
            assert!(stored.is_none(), "completed task {id} should be removed");
        } else {
            let stored = stored.expect("reopened task must survive its timer");
            assert!(!stored.is_completed());
        }
    }
    assert_eq!(tasks.pending_removals(), 0);
}
