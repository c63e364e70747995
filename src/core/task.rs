use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::date::{optional_date, optional_time};

/// Display status of a task, recomputed on every render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Completed,
    Overdue,
    Pending,
}

impl TaskStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Completed => "done/archived",
            Self::Overdue => "OVERDUE",
            Self::Pending => "to do",
        }
    }

    /// Style class handed to the presentation layer.
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Completed => "completed-task",
            Self::Overdue => "overdue-task",
            Self::Pending => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "concluida", default)]
    pub completed: bool,
    #[serde(rename = "due_date", default, with = "optional_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(rename = "due_time", default, with = "optional_time")]
    pub due_time: Option<NaiveTime>,
}

impl Task {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            completed: false,
            due_date: None,
            due_time: None,
        }
    }

    pub fn due(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    pub fn toggle(&mut self) {
        self.completed = !self.completed;
    }

    /// An incomplete task whose due date is strictly before `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        if self.completed {
            return false;
        }
        self.due_date.is_some_and(|due| due < today)
    }

    pub fn is_due_today(&self, today: NaiveDate) -> bool {
        self.due_date == Some(today)
    }

    pub fn status(&self, today: NaiveDate) -> TaskStatus {
        if self.completed {
            TaskStatus::Completed
        } else if self.is_overdue(today) {
            TaskStatus::Overdue
        } else {
            TaskStatus::Pending
        }
    }
}
