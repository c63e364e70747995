pub mod client;
pub mod countdown;
pub mod date;
pub mod reminder;
pub mod task;

pub use client::{Client, ClientForm};
pub use countdown::Countdown;
pub use reminder::{ClientReminders, ReminderTask, TaskSummary, Urgency};
pub use task::{Task, TaskStatus};
