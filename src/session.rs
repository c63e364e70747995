use chrono::{NaiveDate, NaiveTime};

use crate::config::AppConfig;
use crate::core::client::{Client, ClientForm};
use crate::core::countdown::Countdown;
use crate::core::reminder::{self, ClientReminders, TaskSummary};
use crate::core::task::Task;
use crate::directory::{Directory, SaveOutcome};
use crate::store::{ClientStore, KeyValueStore};
use crate::view::{self, TaskRow};
use crate::{Error, Result};

/// Yes/no prompt supplied by the surrounding environment.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(Client),
    Declined,
    NothingLoaded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskChange {
    Added { position: usize },
    Toggled { position: usize, completed: bool },
    Deleted { position: usize, task: Task },
    /// Blank description or a position outside the list.
    Ignored,
    Declined,
}

/// Owns the loaded directory, its backing store and the selected client.
///
/// The selection is a code resolved against the directory on each use, so a
/// record removed underneath it simply reads as "nothing selected".
pub struct Session<S> {
    config: AppConfig,
    store: ClientStore<S>,
    directory: Directory,
    selected: Option<String>,
}

impl<S: KeyValueStore> Session<S> {
    /// Load the whole collection once from the store.
    pub fn open(config: AppConfig, backend: S) -> Self {
        let store = ClientStore::new(backend, config.storage_key.clone());
        let directory = Directory::new(store.load_all());
        log::info!("Loaded {} clients", directory.len());
        Self {
            config,
            store,
            directory,
            selected: None,
        }
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn store(&self) -> &ClientStore<S> {
        &self.store
    }

    pub fn selected_client(&self) -> Option<&Client> {
        self.selected
            .as_deref()
            .and_then(|code| self.directory.find_by_code(code))
    }

    pub fn select(&mut self, code: &str) -> Option<&Client> {
        let found = self.directory.find_by_code(code).map(|c| c.code.clone());
        self.selected = found;
        self.selected_client()
    }

    /// Select the best match for `query`; a miss resets to the blank new-record state.
    pub fn search_and_select(&mut self, query: &str) -> Option<&Client> {
        let found = self.directory.search(query).map(|c| c.code.clone());
        if found.is_none() {
            log::debug!("No client matches '{}'", query);
        }
        self.selected = found;
        self.selected_client()
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    /// Validate and store the form, then select the saved record.
    pub fn save_form(&mut self, form: &ClientForm) -> Result<SaveOutcome> {
        form.validate(&self.config)?;
        let snapshot = self.directory.clone();
        let outcome = self.directory.upsert(form)?;
        self.commit(snapshot)?;

        let code = form.code.trim().to_string();
        match outcome {
            SaveOutcome::Created => log::info!("Created client {}", code),
            SaveOutcome::Updated => log::info!("Updated client {}", code),
        }
        self.selected = Some(code);
        Ok(outcome)
    }

    pub fn delete_selected(&mut self, confirm: &mut impl Confirm) -> Result<DeleteOutcome> {
        let selected = self.selected_client().map(|c| {
            let prompt = format!("Delete client {} - {} and all of its tasks?", c.code, c.name);
            (c.code.clone(), prompt)
        });
        let Some((code, prompt)) = selected else {
            self.selected = None;
            return Ok(DeleteOutcome::NothingLoaded);
        };
        if !confirm.confirm(&prompt) {
            return Ok(DeleteOutcome::Declined);
        }

        let snapshot = self.directory.clone();
        let Some(removed) = self.directory.remove(&code) else {
            return Ok(DeleteOutcome::NothingLoaded);
        };
        self.commit(snapshot)?;
        self.selected = None;
        log::info!("Deleted client {}", removed.code);
        Ok(DeleteOutcome::Deleted(removed))
    }

    fn active_client_mut(&mut self) -> Result<&mut Client> {
        let code = self.selected.as_deref().ok_or(Error::NoActiveClient)?;
        self.directory
            .find_by_code_mut(code)
            .ok_or(Error::NoActiveClient)
    }

    /// Append a task to the selected client. A blank description is ignored.
    pub fn add_task(
        &mut self,
        description: &str,
        due_date: Option<NaiveDate>,
        due_time: Option<NaiveTime>,
    ) -> Result<TaskChange> {
        let snapshot = self.directory.clone();
        let client = self.active_client_mut()?;
        let description = description.trim();
        if description.is_empty() {
            return Ok(TaskChange::Ignored);
        }
        client.tasks.push(Task {
            description: description.to_string(),
            completed: false,
            due_date,
            due_time,
        });
        let position = client.tasks.len() - 1;
        self.commit(snapshot)?;
        Ok(TaskChange::Added { position })
    }

    /// Flip the completion flag at `position` and persist.
    pub fn toggle_task(&mut self, position: usize) -> Result<TaskChange> {
        let snapshot = self.directory.clone();
        let client = self.active_client_mut()?;
        let Some(task) = client.tasks.get_mut(position) else {
            return Ok(TaskChange::Ignored);
        };
        task.toggle();
        let completed = task.completed;
        self.commit(snapshot)?;
        Ok(TaskChange::Toggled { position, completed })
    }

    /// Remove the task at `position`; later tasks shift down by one.
    pub fn delete_task(&mut self, position: usize, confirm: &mut impl Confirm) -> Result<TaskChange> {
        let snapshot = self.directory.clone();
        let client = self.active_client_mut()?;
        let Some(task) = client.tasks.get(position) else {
            return Ok(TaskChange::Ignored);
        };
        if !confirm.confirm(&format!("Delete task \"{}\"?", task.description)) {
            return Ok(TaskChange::Declined);
        }
        let task = client.tasks.remove(position);
        self.commit(snapshot)?;
        Ok(TaskChange::Deleted { position, task })
    }

    /// Render-ready rows for the selected client's task list.
    pub fn task_rows(&self, today: NaiveDate) -> Vec<TaskRow> {
        self.selected_client()
            .map(|c| view::task_rows(&c.tasks, today))
            .unwrap_or_default()
    }

    pub fn daily_reminders(&self, today: NaiveDate) -> Vec<ClientReminders> {
        reminder::daily_reminders(self.directory.clients(), today)
    }

    pub fn task_summary(&self, code: &str, today: NaiveDate) -> Option<TaskSummary> {
        self.directory
            .find_by_code(code)
            .map(|c| TaskSummary::build(&c.tasks, today))
    }

    /// Countdown for the selected client, or "no start date" when nothing is loaded.
    pub fn countdown(&self, today: NaiveDate) -> Countdown {
        let start = self.selected_client().and_then(|c| c.start_date);
        Countdown::compute(start, today, self.config.deadline_days)
    }

    /// Persist the directory; on failure roll back to `snapshot`.
    fn commit(&mut self, snapshot: Directory) -> Result<()> {
        if let Err(e) = self.store.save_all(self.directory.clients()) {
            self.directory = snapshot;
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::task::TaskStatus;
    use crate::store::MemoryStore;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn yes(_: &str) -> bool {
        true
    }

    fn no(_: &str) -> bool {
        false
    }

    fn session() -> Session<MemoryStore> {
        let mut s = Session::open(AppConfig::default(), MemoryStore::new());
        s.save_form(&ClientForm::new("A1", "Acme").plan("basico")).unwrap();
        s
    }

    /// Backend whose writes always fail.
    struct ReadOnly;

    impl KeyValueStore for ReadOnly {
        fn get(&self, _: &str) -> Result<Option<String>> {
            Ok(None)
        }
        fn set(&self, _: &str, _: &str) -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into())
        }
    }

    #[test]
    fn save_selects_and_persists() {
        let s = session();
        assert_eq!(s.selected_client().map(|c| c.code.as_str()), Some("A1"));
        assert_eq!(s.store().load_all().len(), 1);
    }

    #[test]
    fn save_rejects_missing_fields_without_change() {
        let mut s = session();
        let err = s.save_form(&ClientForm::new("B2", " ")).unwrap_err();
        assert!(matches!(err, Error::MissingField("nome-cliente")));
        assert_eq!(s.directory().len(), 1);
    }

    #[test]
    fn failed_write_rolls_back() {
        let mut s = Session::open(AppConfig::default(), ReadOnly);
        assert!(s.save_form(&ClientForm::new("A1", "Acme")).is_err());
        assert!(s.directory().is_empty());
        assert!(s.selected_client().is_none());
    }

    #[test]
    fn tasks_need_an_active_client() {
        let mut s = session();
        s.clear();
        assert!(matches!(s.add_task("Call", None, None), Err(Error::NoActiveClient)));
        assert!(matches!(s.toggle_task(0), Err(Error::NoActiveClient)));
    }

    #[test]
    fn blank_description_is_ignored() {
        let mut s = session();
        assert_eq!(s.add_task("   ", None, None).unwrap(), TaskChange::Ignored);
        assert!(s.selected_client().unwrap().tasks.is_empty());
    }

    #[test]
    fn add_toggle_and_persist() {
        let mut s = session();
        assert_eq!(
            s.add_task(" Send invoice ", Some(day(2024, 6, 14)), None).unwrap(),
            TaskChange::Added { position: 0 }
        );
        assert_eq!(
            s.toggle_task(0).unwrap(),
            TaskChange::Toggled { position: 0, completed: true }
        );
        assert_eq!(s.toggle_task(5).unwrap(), TaskChange::Ignored);

        let stored = s.store().load_all();
        assert_eq!(stored[0].tasks[0].description, "Send invoice");
        assert!(stored[0].tasks[0].completed);

        let rows = s.task_rows(day(2024, 6, 15));
        assert_eq!(rows[0].status, TaskStatus::Completed);
    }

    #[test]
    fn deleting_a_task_shifts_later_positions() {
        let mut s = session();
        for name in ["first", "second", "third"] {
            s.add_task(name, None, None).unwrap();
        }
        assert_eq!(s.delete_task(1, &mut no).unwrap(), TaskChange::Declined);
        assert_eq!(s.selected_client().unwrap().tasks.len(), 3);

        let change = s.delete_task(1, &mut yes).unwrap();
        assert!(matches!(change, TaskChange::Deleted { position: 1, ref task } if task.description == "second"));

        let tasks = &s.selected_client().unwrap().tasks;
        assert_eq!(tasks[0].description, "first");
        assert_eq!(tasks[1].description, "third");
        assert_eq!(s.store().load_all()[0].tasks.len(), 2);
    }

    #[test]
    fn resave_keeps_tasks_and_replaces_plans() {
        let mut s = session();
        s.add_task("Kickoff", None, None).unwrap();
        let outcome = s
            .save_form(&ClientForm::new("A1", "Acme Ltd").plan("avancado"))
            .unwrap();
        assert_eq!(outcome, SaveOutcome::Updated);

        let client = s.selected_client().unwrap();
        assert_eq!(client.name, "Acme Ltd");
        assert_eq!(client.tasks.len(), 1);
        assert!(client.plans.contains("avancado"));
        assert!(!client.plans.contains("basico"));
    }

    #[test]
    fn resave_without_start_date_keeps_it() {
        let mut s = session();
        let start = Some(day(2024, 1, 1));
        s.save_form(&ClientForm::new("A1", "Acme").plan("basico").start(start))
            .unwrap();

        s.save_form(&ClientForm::new("A1", "Acme Ltd")).unwrap();
        assert_eq!(s.selected_client().unwrap().start_date, start);
        assert_eq!(s.store().load_all()[0].start_date, start);
        assert_eq!(
            s.countdown(day(2024, 1, 1)),
            Countdown::Remaining { days: 30, target: day(2024, 1, 31) }
        );

        s.save_form(&ClientForm::new("A1", "Acme Ltd").start(None)).unwrap();
        assert_eq!(s.countdown(day(2024, 1, 1)), Countdown::NoStartDate);
    }

    #[test]
    fn delete_client_flow() {
        let mut s = session();
        assert_eq!(s.delete_selected(&mut no).unwrap(), DeleteOutcome::Declined);
        assert_eq!(s.directory().len(), 1);

        assert!(matches!(s.delete_selected(&mut yes).unwrap(), DeleteOutcome::Deleted(c) if c.code == "A1"));
        assert!(s.directory().is_empty());
        assert!(s.store().load_all().is_empty());
        assert_eq!(s.delete_selected(&mut yes).unwrap(), DeleteOutcome::NothingLoaded);
    }

    #[test]
    fn search_miss_clears_selection() {
        let mut s = session();
        assert!(s.search_and_select("acm").is_some());
        s.clear();
        assert_eq!(s.select("a1").map(|c| c.name.as_str()), Some("Acme"));
        assert!(s.search_and_select("zzz").is_none());
        assert!(s.selected_client().is_none());
        assert_eq!(s.countdown(day(2024, 1, 1)), Countdown::NoStartDate);
    }

    #[test]
    fn reopening_reads_what_was_saved() {
        let mut s = session();
        s.add_task("Persist me", Some(day(2024, 6, 15)), NaiveTime::from_hms_opt(9, 0, 0))
            .unwrap();
        let raw = s.store().backend().get("allClientCards").unwrap().unwrap();

        let backend = MemoryStore::new();
        backend.set("allClientCards", &raw).unwrap();
        let reopened = Session::open(AppConfig::default(), backend);
        assert_eq!(reopened.directory(), s.directory());

        let reminders = reopened.daily_reminders(day(2024, 6, 15));
        assert_eq!(reminders.len(), 1);
        let summary = reopened.task_summary("a1", day(2024, 6, 16)).unwrap();
        assert_eq!(summary.overdue.len(), 1);
    }
}
