use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use super::date::optional_date;
use super::task::Task;
use crate::config::AppConfig;
use crate::{Error, Result};

/// One tracked customer. Extension attributes not modelled as fields are kept
/// verbatim in `fields`, whatever their JSON type, so records written by other
/// tools survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "nome-cliente")]
    pub name: String,
    #[serde(rename = "data-inicio", default, with = "optional_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(rename = "planos", default)]
    pub plans: BTreeSet<String>,
    #[serde(rename = "tarefas", default)]
    pub tasks: Vec<Task>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl Client {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            start_date: None,
            plans: BTreeSet::new(),
            tasks: Vec::new(),
            fields: BTreeMap::new(),
        }
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.code.to_lowercase() == code.to_lowercase()
    }

    /// Apply a form submission to an existing record. Plans are replaced,
    /// extension fields and an unsubmitted start date are kept, tasks are left alone.
    pub fn merge_form(&mut self, form: &ClientForm) {
        self.code = form.code.trim().to_string();
        self.name = form.name.trim().to_string();
        if let Some(start) = form.start_date {
            self.start_date = start;
        }
        self.plans = form.plans.clone();
        for (key, value) in &form.fields {
            self.fields.insert(key.clone(), Value::String(value.clone()));
        }
    }

    /// An extension field rendered as text; non-string values keep their JSON form.
    pub fn field_text(&self, key: &str) -> Option<String> {
        self.fields.get(key).map(value_text)
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl From<&ClientForm> for Client {
    fn from(form: &ClientForm) -> Self {
        let mut client = Client::new(form.code.trim(), form.name.trim());
        client.merge_form(form);
        client
    }
}

/// Current values of the client form, as supplied by the input collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientForm {
    pub code: String,
    pub name: String,
    /// `None` leaves a stored start date alone; `Some(None)` clears it.
    pub start_date: Option<Option<NaiveDate>>,
    pub plans: BTreeSet<String>,
    pub fields: BTreeMap<String, String>,
}

impl ClientForm {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn start(mut self, date: Option<NaiveDate>) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn plan(mut self, plan: impl Into<String>) -> Self {
        self.plans.insert(plan.into());
        self
    }

    /// Populate a form from a stored record, the inverse of a save.
    pub fn from_client(client: &Client) -> Self {
        Self {
            code: client.code.clone(),
            name: client.name.clone(),
            start_date: Some(client.start_date),
            plans: client.plans.clone(),
            fields: client
                .fields
                .iter()
                .map(|(k, v)| (k.clone(), value_text(v)))
                .collect(),
        }
    }

    /// Check mandatory fields and reject fields or plans the config does not know.
    pub fn validate(&self, config: &AppConfig) -> Result<()> {
        if self.code.trim().is_empty() {
            return Err(Error::MissingField("codigo"));
        }
        if self.name.trim().is_empty() {
            return Err(Error::MissingField("nome-cliente"));
        }
        if let Some(key) = self.fields.keys().find(|k| !config.is_known_field(k)) {
            return Err(Error::UnknownField(key.clone()));
        }
        if let Some(plan) = self.plans.iter().find(|p| !config.is_known_plan(p)) {
            return Err(Error::UnknownField(format!("plan:{}", plan)));
        }
        Ok(())
    }
}
