// Per-user configuration (`~/.shippo_it.yaml`) and the parcel template
// registry shipped with the program.

use crate::api::DEFAULT_API_URL;
use crate::error::ConfigError;
use crate::models::{Address, ParcelTemplate};
use crate::prompt::Prompter;
use anyhow::Result;
use log::{debug, info};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = ".shippo_it.yaml";
pub const TEMPLATES_FILE_NAME: &str = "parcel_templates.yaml";

const BUNDLED_TEMPLATES: &str = include_str!("../parcel_templates.yaml");

/// Settings loaded from the config file.
#[derive(Debug, Clone)]
pub struct Config {
    pub path: PathBuf,
    /// Named API keys, e.g. `test` and `live`.
    pub api_keys: BTreeMap<String, String>,
    /// Sender address as written in the file, not yet validated.
    pub from: Address,
    pub api_url: Option<String>,
}

impl Config {
    /// `$SHIPPO_IT_CONFIG` if set, otherwise `~/.shippo_it.yaml`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        if let Ok(path) = std::env::var("SHIPPO_IT_CONFIG") {
            return Ok(PathBuf::from(path));
        }
        let home = dirs::home_dir().ok_or(ConfigError::NoHome)?;
        Ok(home.join(CONFIG_FILE_NAME))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(path, &text)?;
        info!(
            "loaded {} API key(s) from {}",
            config.api_keys.len(),
            path.display()
        );
        Ok(config)
    }

    pub fn parse(path: &Path, text: &str) -> Result<Self, ConfigError> {
        let doc: Value = serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let api_keys = doc
            .get("api_key")
            .cloned()
            .and_then(|keys| serde_yaml::from_value::<BTreeMap<String, String>>(keys).ok())
            .filter(|keys| !keys.is_empty())
            .ok_or_else(|| ConfigError::MissingApiKeys {
                path: path.to_path_buf(),
            })?;

        let missing_sender = |reason: String| ConfigError::MissingSender {
            path: path.to_path_buf(),
            reason,
        };
        let from_value = doc
            .get("from")
            .cloned()
            .ok_or_else(|| missing_sender("no 'from' section".into()))?;
        let from: Address = serde_yaml::from_value(from_value)
            .map_err(|err| missing_sender(err.to_string()))?;
        let missing = from.missing_fields();
        if !missing.is_empty() {
            return Err(missing_sender(format!("missing {}", missing.join(", "))));
        }

        let api_url = doc
            .get("api_url")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Config {
            path: path.to_path_buf(),
            api_keys,
            from,
            api_url,
        })
    }

    /// `$SHIPPO_API_URL`, then `api_url` from the file, then the hosted API.
    pub fn api_url(&self) -> String {
        std::env::var("SHIPPO_API_URL")
            .ok()
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    /// Pick the API key to use. A single key is used without asking.
    pub fn choose_api_key(&self, prompter: &dyn Prompter) -> Result<String> {
        let names: Vec<String> = self.api_keys.keys().cloned().collect();
        let index = if names.len() == 1 {
            0
        } else {
            prompter.select("Which API key should we use?", &names, 0)?
        };
        let name = names
            .get(index)
            .ok_or_else(|| anyhow::anyhow!("No API key #{} in {}", index, self.path.display()))?;
        debug!("using API key '{}'", name);
        self.api_keys
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("No API key named '{}'", name))
    }
}

/// Named parcel shapes, keyed and listed by name.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, ParcelTemplate>,
}

impl TemplateRegistry {
    pub fn from_yaml(path: &Path, text: &str) -> Result<Self, ConfigError> {
        let templates = serde_yaml::from_str(text).map_err(|err| ConfigError::Templates {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        Ok(TemplateRegistry { templates })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|err| ConfigError::Templates {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        Self::from_yaml(path, &text)
    }

    /// The registry next to the executable if there is one, otherwise the
    /// copy compiled into the binary.
    pub fn load_default() -> Result<Self, ConfigError> {
        let beside_exe = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(TEMPLATES_FILE_NAME)))
            .filter(|path| path.is_file());
        match beside_exe {
            Some(path) => {
                debug!("loading parcel templates from {}", path.display());
                Self::load(&path)
            }
            None => Self::from_yaml(Path::new(TEMPLATES_FILE_NAME), BUNDLED_TEMPLATES),
        }
    }

    pub fn from_templates(templates: impl IntoIterator<Item = (String, ParcelTemplate)>) -> Self {
        TemplateRegistry {
            templates: templates.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParcelTemplate)> {
        self.templates.iter()
    }

    pub fn get(&self, name: &str) -> Option<&ParcelTemplate> {
        self.templates.get(name)
    }
}
