//! Presentation step: turns session state into render-ready values and text.

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use std::fmt::Write as _;

use crate::core::client::Client;
use crate::core::countdown::Countdown;
use crate::core::date::{format_display, TIME_FORMAT};
use crate::core::reminder::{ClientReminders, TaskSummary, Urgency};
use crate::core::task::{Task, TaskStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskRow {
    pub position: usize,
    pub description: String,
    pub completed: bool,
    pub status: TaskStatus,
    pub label: &'static str,
    pub class: &'static str,
    pub due_date: Option<NaiveDate>,
    pub due_time: Option<NaiveTime>,
}

impl TaskRow {
    pub fn new(position: usize, task: &Task, today: NaiveDate) -> Self {
        let status = task.status(today);
        Self {
            position,
            description: task.description.clone(),
            completed: task.completed,
            status,
            label: status.label(),
            class: status.css_class(),
            due_date: task.due_date,
            due_time: task.due_time,
        }
    }

    /// One display line, positions shown 1-based.
    pub fn line(&self) -> String {
        let check = if self.completed { "x" } else { " " };
        let mut out = format!(
            "{:>3}. [{}] {} ({})",
            self.position + 1,
            check,
            self.description,
            self.label
        );
        if let Some(due) = self.due_date {
            let _ = write!(out, "  Due: {}", format_display(due));
            if let Some(time) = self.due_time {
                let _ = write!(out, " {}", time.format(TIME_FORMAT));
            }
        }
        out
    }
}

pub fn task_rows(tasks: &[Task], today: NaiveDate) -> Vec<TaskRow> {
    tasks
        .iter()
        .enumerate()
        .map(|(i, t)| TaskRow::new(i, t, today))
        .collect()
}

pub fn client_header(client: Option<&Client>) -> String {
    match client {
        Some(c) => format!("Loaded client: {} - {}", c.code, c.name),
        None => "Ready for a new record. Fill in the code.".to_string(),
    }
}

/// Full record view: header, start date, plans, extra fields.
pub fn client_details(client: &Client) -> String {
    let mut out = client_header(Some(client));
    out.push('\n');
    if let Some(start) = client.start_date {
        let _ = writeln!(out, "  Start date: {}", format_display(start));
    }
    if !client.plans.is_empty() {
        let plans: Vec<&str> = client.plans.iter().map(String::as_str).collect();
        let _ = writeln!(out, "  Plans: {}", plans.join(", "));
    }
    for key in client.fields.keys() {
        let value = client.field_text(key).unwrap_or_default();
        let _ = writeln!(out, "  {}: {}", key, value);
    }
    out
}

pub fn countdown_text(countdown: &Countdown) -> String {
    match countdown {
        Countdown::NoStartDate => "No start date".to_string(),
        Countdown::Remaining { days, target } => {
            let unit = if *days == 1 { "day" } else { "days" };
            format!("{} {} remaining until {}", days, unit, format_display(*target))
        }
        Countdown::DueToday { .. } => "Deadline is today".to_string(),
        Countdown::Exceeded { days, .. } => {
            let unit = if *days == 1 { "day" } else { "days" };
            format!("Deadline exceeded by {} {}", days, unit)
        }
    }
}

pub fn reminders_text(reminders: &[ClientReminders]) -> String {
    if reminders.is_empty() {
        return "No pending actions due today or overdue.\n".to_string();
    }
    let mut out = String::new();
    for group in reminders {
        let _ = writeln!(out, "Client: {} - {}", group.code, group.name);
        for r in &group.tasks {
            let status = match r.urgency {
                Urgency::Overdue => "OVERDUE",
                Urgency::Today => "TODAY",
            };
            let due = r
                .task
                .due_date
                .map(format_display)
                .unwrap_or_else(|| "no due date".to_string());
            let _ = writeln!(out, "  - {} ({}) - Due: {}", r.task.description, status, due);
        }
    }
    out
}

pub fn summary_text(summary: &TaskSummary) -> String {
    let mut out = String::new();
    let buckets = [
        ("Overdue", &summary.overdue),
        ("Pending", &summary.pending),
        ("Completed", &summary.completed),
    ];
    for (title, tasks) in buckets {
        let _ = writeln!(out, "{} ({})", title, tasks.len());
        for task in tasks.iter() {
            match task.due_date {
                Some(due) => {
                    let _ = writeln!(out, "  - {}  Due: {}", task.description, format_display(due));
                }
                None => {
                    let _ = writeln!(out, "  - {}", task.description);
                }
            }
        }
    }
    out
}
