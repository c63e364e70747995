use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the persistence slot used by the reference data files.
pub const DEFAULT_STORAGE_KEY: &str = "allClientCards";

pub const DEFAULT_DEADLINE_DAYS: i64 = 30;

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join("clientcard")
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_fields() -> Vec<String> {
    vec![
        "email".into(),
        "telefone".into(),
        "responsavel".into(),
        "observacoes".into(),
    ]
}

fn default_plans() -> Vec<String> {
    vec!["basico".into(), "intermediario".into(), "avancado".into()]
}

fn default_deadline_days() -> i64 {
    DEFAULT_DEADLINE_DAYS
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_directory: PathBuf,
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Extra form fields a client record may carry besides code, name and start date.
    #[serde(default = "default_fields")]
    pub fields: Vec<String>,
    /// Plan identifiers offered for selection.
    #[serde(default = "default_plans")]
    pub plans: Vec<String>,
    #[serde(default = "default_deadline_days")]
    pub deadline_days: i64,
    #[serde(default)]
    pub debug_logging: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_directory: default_data_dir(),
            storage_key: default_storage_key(),
            fields: default_fields(),
            plans: default_plans(),
            deadline_days: default_deadline_days(),
            debug_logging: false,
        }
    }
}

impl AppConfig {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("clientcard")
            .join("config.json")
    }

    /// Read the config file, falling back to defaults when it is missing or unreadable.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                log::warn!("Ignoring malformed config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn is_known_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f == name)
    }

    pub fn is_known_plan(&self, plan: &str) -> bool {
        self.plans.iter().any(|p| p == plan)
    }

    /// Ensure the data directory exists.
    pub fn ensure_data_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_directory)
    }
}
