use chrono::NaiveDate;
use serde::Serialize;

use super::client::Client;
use super::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Today,
    Overdue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderTask {
    /// Position in the owning client's task list.
    pub position: usize,
    pub task: Task,
    pub urgency: Urgency,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientReminders {
    pub code: String,
    pub name: String,
    pub tasks: Vec<ReminderTask>,
}

/// Incomplete tasks due today or already overdue, grouped by client in
/// directory order. Clients with nothing to surface are left out.
pub fn daily_reminders(clients: &[Client], today: NaiveDate) -> Vec<ClientReminders> {
    clients
        .iter()
        .filter_map(|client| {
            let tasks: Vec<ReminderTask> = client
                .tasks
                .iter()
                .enumerate()
                .filter(|(_, t)| !t.completed)
                .filter_map(|(position, t)| {
                    let urgency = if t.is_overdue(today) {
                        Urgency::Overdue
                    } else if t.is_due_today(today) {
                        Urgency::Today
                    } else {
                        return None;
                    };
                    Some(ReminderTask {
                        position,
                        task: t.clone(),
                        urgency,
                    })
                })
                .collect();

            if tasks.is_empty() {
                None
            } else {
                Some(ClientReminders {
                    code: client.code.clone(),
                    name: client.name.clone(),
                    tasks,
                })
            }
        })
        .collect()
}

/// A client's tasks split into three disjoint buckets, each in list order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskSummary {
    pub overdue: Vec<Task>,
    pub pending: Vec<Task>,
    pub completed: Vec<Task>,
}

impl TaskSummary {
    pub fn build(tasks: &[Task], today: NaiveDate) -> Self {
        let mut summary = Self::default();
        for task in tasks {
            if task.completed {
                summary.completed.push(task.clone());
            } else if task.is_overdue(today) {
                summary.overdue.push(task.clone());
            } else {
                summary.pending.push(task.clone());
            }
        }
        summary
    }

    pub fn total_count(&self) -> usize {
        self.overdue.len() + self.pending.len() + self.completed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_tasks() -> Vec<Task> {
        let mut done = Task::new("Archived").due(day(2024, 6, 1));
        done.completed = true;
        vec![
            Task::new("Late invoice").due(day(2024, 6, 10)),
            Task::new("Call today").due(day(2024, 6, 15)),
            Task::new("Next week").due(day(2024, 6, 22)),
            Task::new("Someday"),
            done,
        ]
    }

    #[test]
    fn reminders_pick_today_and_overdue_only() {
        let mut acme = Client::new("A1", "Acme");
        acme.tasks = sample_tasks();
        let mut quiet = Client::new("B2", "Quiet");
        quiet.tasks = vec![Task::new("Later").due(day(2024, 7, 1))];
        let empty = Client::new("C3", "Empty");

        let reminders = daily_reminders(&[acme, quiet, empty], day(2024, 6, 15));
        assert_eq!(reminders.len(), 1);
        let r = &reminders[0];
        assert_eq!(r.code, "A1");
        assert_eq!(r.tasks.len(), 2);
        assert_eq!(r.tasks[0].task.description, "Late invoice");
        assert_eq!(r.tasks[0].urgency, Urgency::Overdue);
        assert_eq!(r.tasks[0].position, 0);
        assert_eq!(r.tasks[1].task.description, "Call today");
        assert_eq!(r.tasks[1].urgency, Urgency::Today);
        assert_eq!(r.tasks[1].position, 1);
    }

    #[test]
    fn completed_task_due_today_is_not_a_reminder() {
        let mut client = Client::new("A1", "Acme");
        let mut t = Task::new("Done already").due(day(2024, 6, 15));
        t.completed = true;
        client.tasks.push(t);
        assert!(daily_reminders(&[client], day(2024, 6, 15)).is_empty());
    }

    #[test]
    fn summary_partitions_every_task_once() {
        let tasks = sample_tasks();
        let summary = TaskSummary::build(&tasks, day(2024, 6, 15));
        assert_eq!(summary.total_count(), tasks.len());
        assert_eq!(summary.overdue.len(), 1);
        assert_eq!(summary.pending.len(), 3);
        assert_eq!(summary.completed.len(), 1);

        let pending: Vec<&str> = summary.pending.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(pending, vec!["Call today", "Next week", "Someday"]);

        for task in &tasks {
            let hits = [&summary.overdue, &summary.pending, &summary.completed]
                .iter()
                .filter(|bucket| bucket.contains(task))
                .count();
            assert_eq!(hits, 1, "{} should be in exactly one bucket", task.description);
        }
    }

    #[test]
    fn summary_of_empty_list() {
        let summary = TaskSummary::build(&[], day(2024, 6, 15));
        assert_eq!(summary.total_count(), 0);
    }
}
