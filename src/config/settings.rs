use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::ExportError;
use crate::models::row::HEADERS;

/// Search results are capped at one page of this size.
pub const MAX_RESULTS_CAP: u32 = 500;

const ENV_PREFIX: &str = "JIRA_EXPORT";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub jira: JiraConfig,
    pub fields: FieldsConfig,
    pub sla: SlaConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JiraConfig {
    pub url: String,
    #[serde(default)]
    pub email: String,
    pub jql: String,
    pub max_results: u32,
    pub timeout_secs: u64,
    pub auth_method: AuthMethod,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthMethod {
    /// Jira Cloud: basic auth with email + API token
    ApiToken { token: String },
    /// Jira Data Center/Server: bearer token
    PersonalAccessToken { token: String },
}

impl AuthMethod {
    pub fn token(&self) -> &str {
        match self {
            AuthMethod::ApiToken { token } | AuthMethod::PersonalAccessToken { token } => token,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AuthMethod::ApiToken { .. } => "API Token",
            AuthMethod::PersonalAccessToken { .. } => "Personal Access Token",
        }
    }
}

/// Deployment-specific custom field ids.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FieldsConfig {
    pub sprint: String,
    pub bug_source: String,
}

/// Upper bound on `sla.threshold_days`; keeps day arithmetic in range.
pub const MAX_THRESHOLD_DAYS: i64 = 3650;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SlaConfig {
    pub threshold_days: i64,
    pub done_status: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportConfig {
    pub output_path: PathBuf,
    pub sheet_name: String,
    pub excluded_columns: Vec<String>,
    pub style_index_column: bool,
}

impl Default for FieldsConfig {
    fn default() -> Self {
        Self {
            sprint: "customfield_10018".to_string(),
            bug_source: "customfield_11504".to_string(),
        }
    }
}

impl Default for SlaConfig {
    fn default() -> Self {
        Self {
            threshold_days: 5,
            done_status: "Done".to_string(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("Jira_Data_Extractor.xlsx"),
            sheet_name: "Jira Issues".to_string(),
            excluded_columns: Vec::new(),
            style_index_column: true,
        }
    }
}

impl Settings {
    /// Loads defaults, then the TOML file (if any), then `JIRA_EXPORT__*` env vars.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        let env_key = format!("{}__JIRA__", ENV_PREFIX);
        let has_env = std::env::vars_os().any(|(k, _)| k.to_string_lossy().starts_with(&env_key));
        if !config_path.exists() && !has_env {
            return Err(ExportError::ConfigNotFound.into());
        }

        let fields = FieldsConfig::default();
        let sla = SlaConfig::default();
        let export = ExportConfig::default();

        let raw = ::config::Config::builder()
            .set_default("jira.jql", "project=DEV")?
            .set_default("jira.max_results", MAX_RESULTS_CAP as i64)?
            .set_default("jira.timeout_secs", 60_i64)?
            .set_default("fields.sprint", fields.sprint)?
            .set_default("fields.bug_source", fields.bug_source)?
            .set_default("sla.threshold_days", sla.threshold_days)?
            .set_default("sla.done_status", sla.done_status)?
            .set_default("export.output_path", export.output_path.display().to_string())?
            .set_default("export.sheet_name", export.sheet_name)?
            .set_default("export.excluded_columns", Vec::<String>::new())?
            .set_default("export.style_index_column", export.style_index_column)?
            .add_source(
                ::config::File::from(config_path.as_path())
                    .format(::config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("export.excluded_columns")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read config file")?;

        let mut settings: Settings = raw
            .try_deserialize()
            .map_err(|e| ExportError::ConfigInvalid(e.to_string()))?;

        settings.normalize();
        settings.validate()?;

        Ok(settings)
    }

    fn normalize(&mut self) {
        if self.jira.max_results > MAX_RESULTS_CAP {
            log::warn!(
                "max_results {} exceeds the single-page cap, using {}",
                self.jira.max_results,
                MAX_RESULTS_CAP
            );
            self.jira.max_results = MAX_RESULTS_CAP;
        }
        if self.jira.max_results == 0 {
            self.jira.max_results = 1;
        }
        self.jira.url = self.jira.url.trim_end_matches('/').to_string();
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| -> anyhow::Error { ExportError::ConfigInvalid(msg).into() };

        if self.jira.url.trim().is_empty() {
            return Err(invalid("jira.url cannot be empty".to_string()));
        }
        if self.jira.auth_method.token().is_empty() {
            return Err(invalid("jira.auth_method.token cannot be empty".to_string()));
        }
        if matches!(self.jira.auth_method, AuthMethod::ApiToken { .. }) && self.jira.email.is_empty() {
            return Err(invalid("jira.email is required for API token authentication".to_string()));
        }
        if !(0..=MAX_THRESHOLD_DAYS).contains(&self.sla.threshold_days) {
            return Err(invalid(format!(
                "sla.threshold_days must be between 0 and {}, got {}",
                MAX_THRESHOLD_DAYS, self.sla.threshold_days
            )));
        }
        if let Some(unknown) = self
            .export
            .excluded_columns
            .iter()
            .find(|c| !HEADERS.contains(&c.as_str()))
        {
            return Err(invalid(format!(
                "export.excluded_columns: unknown column '{}'",
                unknown
            )));
        }

        Ok(())
    }

    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create config directory")?;
            }
        }

        let config_str = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(&config_path, config_str)
            .context("Failed to write config file")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&config_path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&config_path, perms)?;
        }

        Ok(config_path)
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn config_dir() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .context("HOME environment variable not set")?;
        Ok(PathBuf::from(home).join(".jira-sla-export"))
    }
}
