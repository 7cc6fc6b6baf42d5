use colored::*;
use std::fmt;

#[derive(Debug)]
pub enum ExportError {
    // Configuration errors
    ConfigNotFound,
    ConfigInvalid(String),

    // Jira errors
    JiraAuthFailed(u16),
    JiraApiError(u16, String),

    // Network errors
    NetworkError(String),

    // Spreadsheet errors
    ExportFailed(String),

    // Generic error
    Other(String),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Configuration errors
            ExportError::ConfigNotFound => {
                write!(f, "{}\n", "Configuration not found".red().bold())?;
                write!(f, "   {}\n\n", "Run 'jira-sla-export init' to set up your configuration".dimmed())?;
                write!(f, "   {}", "jira-sla-export init".green())
            }
            ExportError::ConfigInvalid(msg) => {
                write!(f, "{}\n", "Invalid configuration".red().bold())?;
                write!(f, "   {}\n\n", msg.dimmed())?;
                write!(f, "   To fix:\n")?;
                write!(f, "   1. Check your config file: ~/.jira-sla-export/config.toml\n")?;
                write!(f, "   2. Or reinitialize: {}", "jira-sla-export init".green())
            }

            // Jira errors
            ExportError::JiraAuthFailed(status) => {
                write!(f, "{}\n", format!("Jira authentication failed ({})", status).red().bold())?;
                write!(f, "   {}\n\n", "Your API token may have expired or is invalid".dimmed())?;
                write!(f, "   To fix:\n")?;
                write!(f, "   1. Generate new token: {}\n", "https://id.atlassian.com/manage-profile/security/api-tokens".cyan())?;
                write!(f, "   2. Update config: {}\n", "jira-sla-export init".green())?;
                write!(f, "   3. Or set {} for a single run", "JIRA_EXPORT__JIRA__AUTH_METHOD__TOKEN".yellow())
            }
            ExportError::JiraApiError(status, body) => {
                write!(f, "{}\n", format!("Error {}", status).red().bold())?;
                write!(f, "   {}\n\n", body.dimmed())?;
                write!(f, "   No spreadsheet was written. Check the JQL filter and try again")
            }

            // Network errors
            ExportError::NetworkError(msg) => {
                write!(f, "{}\n", "Network error".red().bold())?;
                write!(f, "   {}\n\n", msg.dimmed())?;
                write!(f, "   To fix:\n")?;
                write!(f, "   1. Check your internet connection\n")?;
                write!(f, "   2. Verify you can reach the Jira host\n")?;
                write!(f, "   3. Raise jira.timeout_secs if the search is slow")
            }

            // Spreadsheet errors
            ExportError::ExportFailed(msg) => {
                write!(f, "{}\n", "Failed to write spreadsheet".red().bold())?;
                write!(f, "   {}\n\n", msg.dimmed())?;
                write!(f, "   To fix:\n")?;
                write!(f, "   1. Close the file if it is open in another program\n")?;
                write!(f, "   2. Check you can write to the output directory")
            }

            // Generic
            ExportError::Other(msg) => {
                write!(f, "{}\n", "Error".red().bold())?;
                write!(f, "   {}", msg.dimmed())
            }
        }
    }
}

impl std::error::Error for ExportError {}

impl From<rust_xlsxwriter::XlsxError> for ExportError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        ExportError::ExportFailed(err.to_string())
    }
}

impl From<reqwest::Error> for ExportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            ExportError::NetworkError(err.to_string())
        } else if let Some(status) = err.status() {
            if status == 401 || status == 403 {
                ExportError::JiraAuthFailed(status.as_u16())
            } else {
                ExportError::JiraApiError(status.as_u16(), err.to_string())
            }
        } else {
            ExportError::Other(err.to_string())
        }
    }
}

/// Why a single issue's custom field could not be extracted.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractError {
    UnexpectedShape { field: String, found: &'static str },
    NotANumber { field: String, value: String },
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::UnexpectedShape { field, found } => {
                write!(f, "field '{}' has unexpected shape ({})", field, found)
            }
            ExtractError::NotANumber { field, value } => {
                write!(f, "field '{}' is not a number: {}", field, value)
            }
        }
    }
}

impl std::error::Error for ExtractError {}
