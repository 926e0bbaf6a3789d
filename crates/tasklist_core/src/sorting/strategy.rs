//! Sectioning and sort strategy.

use crate::model::task::Task;
use chrono::{DateTime, FixedOffset, Local, NaiveDate, Utc};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// Urgency bucket of an open task.
///
/// Declaration order is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskSection {
    Overdue,
    Today,
    Upcoming,
    NoDue,
}

impl TaskSection {
    pub const ALL: [TaskSection; 4] = [Self::Overdue, Self::Today, Self::Upcoming, Self::NoDue];

    pub fn label(self) -> &'static str {
        match self {
            Self::Overdue => "Overdue",
            Self::Today => "Today",
            Self::Upcoming => "Upcoming",
            Self::NoDue => "No Due Date",
        }
    }
}

impl Display for TaskSection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One non-empty urgency section with its sorted tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionGroup {
    pub section: TaskSection,
    pub tasks: Vec<Task>,
}

/// Full display projection of one list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionedTasks {
    /// Open tasks grouped in `TaskSection` order; empty sections omitted.
    pub sections: Vec<SectionGroup>,
    /// Completed tasks, most recently completed first.
    pub completed: Vec<Task>,
}

impl SectionedTasks {
    pub fn section(&self, section: TaskSection) -> Option<&SectionGroup> {
        self.sections.iter().find(|group| group.section == section)
    }
}

/// Strategy seam for sectioning and ordering tasks.
pub trait SortingStrategy {
    fn section(&self, task: &Task, reference: DateTime<Utc>) -> TaskSection;
    fn sort(&self, tasks: &[Task], reference: DateTime<Utc>) -> Vec<Task>;

    /// Completed tasks only, most recently completed first.
    ///
    /// Falls back to `updated_at` when `completed_at` is missing.
    fn sort_completed(&self, tasks: &[Task]) -> Vec<Task> {
        let mut completed: Vec<Task> = tasks
            .iter()
            .filter(|task| task.is_completed())
            .cloned()
            .collect();
        completed.sort_by(|left, right| completion_key(right).cmp(&completion_key(left)));
        completed
    }

    /// Groups open tasks by section and splits out completed ones.
    fn build_sections(&self, tasks: &[Task], reference: DateTime<Utc>) -> SectionedTasks {
        let open: Vec<Task> = tasks
            .iter()
            .filter(|task| !task.is_completed())
            .cloned()
            .collect();
        let ordered = self.sort(&open, reference);

        let sections = TaskSection::ALL
            .iter()
            .filter_map(|&section| {
                let members: Vec<Task> = ordered
                    .iter()
                    .filter(|task| self.section(task, reference) == section)
                    .cloned()
                    .collect();
                (!members.is_empty()).then_some(SectionGroup {
                    section,
                    tasks: members,
                })
            })
            .collect();

        SectionedTasks {
            sections,
            completed: self.sort_completed(tasks),
        }
    }
}

/// Default strategy: priority desc, due asc (no due last), created asc.
///
/// Calendar days are evaluated in the local timezone unless a fixed offset
/// is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSorting {
    offset: Option<FixedOffset>,
}

impl DefaultSorting {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluates "same calendar day" in a fixed UTC offset.
    pub fn with_offset(offset: FixedOffset) -> Self {
        Self {
            offset: Some(offset),
        }
    }

    fn calendar_day(&self, instant: DateTime<Utc>) -> NaiveDate {
        match self.offset {
            Some(offset) => instant.with_timezone(&offset).date_naive(),
            None => instant.with_timezone(&Local).date_naive(),
        }
    }
}

impl SortingStrategy for DefaultSorting {
    fn section(&self, task: &Task, reference: DateTime<Utc>) -> TaskSection {
        let Some(due_at) = task.due_at() else {
            return TaskSection::NoDue;
        };
        // Overdue wins over same-day: a task due earlier today is overdue.
        if due_at < reference {
            return TaskSection::Overdue;
        }
        if self.calendar_day(due_at) == self.calendar_day(reference) {
            return TaskSection::Today;
        }
        TaskSection::Upcoming
    }

    fn sort(&self, tasks: &[Task], _reference: DateTime<Utc>) -> Vec<Task> {
        let mut ordered = tasks.to_vec();
        ordered.sort_by(compare_for_display);
        ordered
    }
}

/// Total display order shared by every section.
pub fn compare_for_display(left: &Task, right: &Task) -> Ordering {
    right
        .priority()
        .cmp(&left.priority())
        .then_with(|| match (left.due_at(), right.due_at()) {
            (Some(left_due), Some(right_due)) => left_due.cmp(&right_due),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| left.created_at().cmp(&right.created_at()))
}

fn completion_key(task: &Task) -> DateTime<Utc> {
    task.completed_at().unwrap_or_else(|| task.updated_at())
}
