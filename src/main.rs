use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Duration;

mod api;
mod config;
mod errors;
mod export;
mod models;
mod transform;

use crate::config::settings::Settings;

#[derive(Parser)]
#[command(name = "jira-sla-export")]
#[command(version = "0.1.0")]
#[command(about = "Export Jira issues with SLA durations to a spreadsheet", long_about = None)]
struct Cli {
    /// for debugging purposes
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: ~/.jira-sla-export/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch issues and write the spreadsheet
    Export {
        /// JQL filter (e.g., "project = DEV AND status != Closed")
        #[arg(long)]
        jql: Option<String>,

        /// Maximum number of issues (capped at 500)
        #[arg(long)]
        max_results: Option<u32>,

        /// Output .xlsx path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Column to leave out (repeatable, e.g. --exclude Link)
        #[arg(long = "exclude")]
        exclude: Vec<String>,
    },

    /// Store Jira credentials
    Init,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Display current configuration (with masked secrets)
    Show,

    /// Validate configuration by running a one-issue search
    Validate,

    /// Get the path to the config file
    Path,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config_path = cli.config.as_deref();

    let result = match cli.command {
        Commands::Export {
            jql,
            max_results,
            output,
            exclude,
        } => handle_export(config_path, jql, max_results, output, exclude).await,

        Commands::Init => handle_init(config_path).await,

        Commands::Config { action } => handle_config(config_path, action).await,
    };

    if let Err(e) = result {
        eprintln!("\n{}", e);
        std::process::exit(1);
    }
}

fn jira_client(settings: &Settings) -> anyhow::Result<api::jira::JiraClient> {
    api::jira::JiraClient::new(
        settings.jira.url.clone(),
        settings.jira.email.clone(),
        settings.jira.auth_method.clone(),
        Duration::from_secs(settings.jira.timeout_secs),
    )
}

async fn handle_export(
    config_path: Option<&Path>,
    jql: Option<String>,
    max_results: Option<u32>,
    output: Option<PathBuf>,
    exclude: Vec<String>,
) -> anyhow::Result<()> {
    let mut settings = Settings::load(config_path)?;

    if let Some(jql) = jql {
        settings.jira.jql = jql;
    }
    if let Some(max) = max_results {
        settings.jira.max_results = max.clamp(1, crate::config::settings::MAX_RESULTS_CAP);
    }
    if let Some(output) = output {
        settings.export.output_path = output;
    }
    settings.export.excluded_columns.extend(exclude);
    settings.validate()?;

    println!("{}", "Fetching issues...".cyan().bold());
    println!("  {} {}", "JQL:".dimmed(), settings.jira.jql.bright_white());

    let jira = jira_client(&settings)?;
    let issues = jira
        .search(&settings.jira.jql, settings.jira.max_results)
        .await?;

    println!("  {} issues received", issues.len().to_string().bright_white());

    let (rows, summary) = transform::issues_to_rows(&issues, &settings);

    let output_path = &settings.export.output_path;
    let written = export::xlsx::write_workbook(&rows, &settings.export, output_path)?;

    println!();
    println!(
        "{}",
        format!("Data exported successfully to {}!", output_path.display())
            .green()
            .bold()
    );
    println!();
    println!("  {} {}", "Rows:".bold(), written.to_string().bright_white());
    println!("  {} {}", "In time:".bold(), summary.in_time.to_string().green());
    println!("  {} {}", "Within SLA:".bold(), summary.within_sla.to_string().green());
    println!("  {} {}", "Over SLA:".bold(), summary.over_sla.to_string().red());
    if summary.undated > 0 {
        println!("  {} {}", "Undated:".bold(), summary.undated.to_string().yellow());
    }

    Ok(())
}

async fn handle_init(config_path: Option<&Path>) -> anyhow::Result<()> {
    use crate::config::settings::*;

    println!("{}", "Jira SLA Export Setup".cyan().bold());
    println!();
    println!(
        "{}",
        "This will store your credentials in ~/.jira-sla-export/config.toml".dimmed()
    );
    println!(
        "{}",
        "The file will be created with read-only permissions (600)".dimmed()
    );
    println!();

    println!("{}", "Jira Configuration".bold());
    let jira_url = prompt("Jira URL (e.g., https://jira.<company>.com)")?;
    let jira_email = prompt("Jira email")?;
    println!();

    println!("{}", "Select authentication method:".bold());
    println!("{}", "  1. Personal Access Token (for Jira Data Center/Server)".dimmed());
    println!("{}", "  2. API Token (for Jira Cloud)".dimmed());
    let auth_choice = prompt_with_default("Choice (1/2)", "2")?;

    let auth_method = if auth_choice == "1" {
        let token = prompt_password("Personal Access Token")?;
        AuthMethod::PersonalAccessToken { token }
    } else {
        println!();
        println!("{}", "To create a Jira API token:".dimmed());
        println!("{}", "  1. Go to https://id.atlassian.com/manage-profile/security/api-tokens".dimmed());
        println!("{}", "  2. Click 'Create API token'".dimmed());
        println!("{}", "  3. Copy and paste it here".dimmed());
        println!();
        let token = prompt_password("Jira API token")?;
        AuthMethod::ApiToken { token }
    };

    println!();
    println!("{}", "=== Export ===".bold());
    let jql = prompt_with_default("JQL filter", "project=DEV")?;
    let output_path = prompt_with_default("Output file", "Jira_Data_Extractor.xlsx")?;

    let mut settings = Settings {
        jira: JiraConfig {
            url: jira_url.trim_end_matches('/').to_string(),
            email: jira_email,
            jql,
            max_results: MAX_RESULTS_CAP,
            timeout_secs: 60,
            auth_method,
        },
        fields: FieldsConfig::default(),
        sla: SlaConfig::default(),
        export: ExportConfig::default(),
    };
    settings.export.output_path = PathBuf::from(output_path);

    settings
        .validate()
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    println!();
    print!("{}", "  Testing Jira connection... ".dimmed());
    std::io::Write::flush(&mut std::io::stdout())?;

    let jira = jira_client(&settings)?;
    match jira.search(&settings.jira.jql, 1).await {
        Ok(_) => println!("{}", "✓".green().bold()),
        Err(e) => {
            println!("{}", "✗".red().bold());
            return Err(anyhow::anyhow!(
                "{}",
                errors::ExportError::ConfigInvalid(format!("Jira connection failed: {}", e))
            ));
        }
    }

    let saved_to = settings.save(config_path)?;

    println!();
    println!("{}", "Configuration saved!".green().bold());
    println!("  Location: {}", saved_to.display().to_string().bright_white());
    println!();
    println!("{}", "Keep your API tokens secure!".yellow());

    Ok(())
}

fn prompt(message: &str) -> anyhow::Result<String> {
    let value: String = dialoguer::Input::new()
        .with_prompt(message)
        .interact_text()?;
    Ok(value.trim().to_string())
}

fn prompt_password(message: &str) -> anyhow::Result<String> {
    let value = dialoguer::Password::new()
        .with_prompt(message)
        .interact()?;
    Ok(value.trim().to_string())
}

fn prompt_with_default(message: &str, default: &str) -> anyhow::Result<String> {
    let value: String = dialoguer::Input::new()
        .with_prompt(message)
        .default(default.to_string())
        .interact_text()?;
    Ok(value.trim().to_string())
}

fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        return "***".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}***{}", head, tail)
}

async fn handle_config(config_path: Option<&Path>, action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let settings = Settings::load(config_path)?;

            println!("{}", "Current Configuration".cyan().bold());
            println!();

            println!("{}", "[jira]".bold());
            println!("  {} {}", "url:".dimmed(), settings.jira.url.bright_white());
            println!("  {} {}", "email:".dimmed(), settings.jira.email.bright_white());
            println!("  {} {}", "auth_method:".dimmed(), settings.jira.auth_method.label().bright_white());
            println!("  {} {}", "token:".dimmed(), mask_token(settings.jira.auth_method.token()).yellow());
            println!("  {} {}", "jql:".dimmed(), settings.jira.jql.bright_white());
            println!("  {} {}", "max_results:".dimmed(), settings.jira.max_results.to_string().bright_white());

            println!();
            println!("{}", "[fields]".bold());
            println!("  {} {}", "sprint:".dimmed(), settings.fields.sprint.bright_white());
            println!("  {} {}", "bug_source:".dimmed(), settings.fields.bug_source.bright_white());

            println!();
            println!("{}", "[sla]".bold());
            println!("  {} {}", "threshold_days:".dimmed(), settings.sla.threshold_days.to_string().bright_white());
            println!("  {} {}", "done_status:".dimmed(), settings.sla.done_status.bright_white());

            println!();
            println!("{}", "[export]".bold());
            println!("  {} {}", "output_path:".dimmed(), settings.export.output_path.display().to_string().bright_white());
            println!("  {} {}", "sheet_name:".dimmed(), settings.export.sheet_name.bright_white());
            if !settings.export.excluded_columns.is_empty() {
                println!(
                    "  {} {}",
                    "excluded_columns:".dimmed(),
                    settings.export.excluded_columns.join(", ").bright_white()
                );
            }

            Ok(())
        }

        ConfigAction::Validate => {
            println!("{}", "Validating configuration...".cyan().bold());
            println!();

            let settings = Settings::load(config_path)?;

            print!("{}", "  Testing Jira connection... ".dimmed());
            std::io::Write::flush(&mut std::io::stdout())?;

            let jira = jira_client(&settings)?;
            match jira.search(&settings.jira.jql, 1).await {
                Ok(_) => {
                    println!("{}", "✓".green().bold());
                }
                Err(e) => {
                    println!("{}", "✗".red().bold());
                    println!();
                    println!("{}", format!("  Jira connection failed: {}", e).red());
                    return Err(anyhow::anyhow!("Jira validation failed"));
                }
            }

            println!();
            println!("{}", "✓ All validations passed!".green().bold());

            Ok(())
        }

        ConfigAction::Path => {
            let path = match config_path {
                Some(p) => p.to_path_buf(),
                None => Settings::config_path()?,
            };
            println!("{}", path.display());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_export_args_parse() {
        let cli = Cli::try_parse_from([
            "jira-sla-export",
            "export",
            "--jql",
            "project = OPS",
            "--max-results",
            "50",
            "--exclude",
            "Link",
            "--exclude",
            "labels",
        ])
        .unwrap();

        match cli.command {
            Commands::Export {
                jql,
                max_results,
                output,
                exclude,
            } => {
                assert_eq!(jql.as_deref(), Some("project = OPS"));
                assert_eq!(max_results, Some(50));
                assert!(output.is_none());
                assert_eq!(exclude, vec!["Link", "labels"]);
            }
            _ => panic!("expected export command"),
        }
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("abcd1234efgh"), "abcd***efgh");
        assert_eq!(mask_token("short"), "***");
    }

    #[test]
    fn test_mask_token_keeps_multibyte_chars_whole() {
        assert_eq!(mask_token("äöüß-token-ñéíó"), "äöüß***ñéíó");
        assert_eq!(mask_token("ééééééé"), "***");
    }
}
