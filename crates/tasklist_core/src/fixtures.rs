//! First-run seed data.

use crate::model::task::{NewTask, Task, TaskCategory, TaskPriority, TaskValidationError};
use crate::model::task_list::TaskList;
use log::warn;

/// Seed collection: "Today", "Inbox" and "Shopping" with one task each.
pub fn make_seed() -> Vec<TaskList> {
    let mut today = TaskList::new("Today");
    let mut inbox = TaskList::new("Inbox");
    let mut shopping = TaskList::new("Shopping");

    let seeded = (|| -> Result<(), TaskValidationError> {
        let mut email = Task::create(
            NewTask::titled("Email supplier")
                .category(TaskCategory::Work)
                .priority(TaskPriority::High),
        )?;
        email.mark_in_progress();
        today.add(email);
        inbox.add(Task::create(
            NewTask::titled("Study POP principles")
                .category(TaskCategory::Study)
                .priority(TaskPriority::Medium),
        )?);
        shopping.add(Task::create(
            NewTask::titled("Buy milk")
                .category(TaskCategory::Shopping)
                .priority(TaskPriority::Low),
        )?);
        Ok(())
    })();
    if let Err(err) = seeded {
        warn!("event=seed_build module=fixtures status=error error={err}");
    }

    vec![today, inbox, shopping]
}
