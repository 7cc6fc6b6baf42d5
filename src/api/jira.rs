use crate::config::settings::AuthMethod;
use crate::errors::ExportError;
use crate::models::issue::{Issue, SearchResponse};
use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

pub struct JiraClient {
    client: Client,
    base_url: String,
    email: String,
    auth_method: AuthMethod,
}

impl JiraClient {
    pub fn new(base_url: String, email: String, auth_method: AuthMethod, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            email,
            auth_method,
        })
    }

    pub fn search_url(&self, jql: &str, max_results: u32) -> String {
        format!(
            "{}/rest/api/2/search?jql={}&maxResults={}",
            self.base_url,
            urlencoding::encode(jql),
            max_results
        )
    }

    /// Single bounded search page. 401/403 are auth failures; any other non-2xx
    /// status is an error carrying the body.
    pub async fn search(&self, jql: &str, max_results: u32) -> Result<Vec<Issue>> {
        let url = self.search_url(jql, max_results);
        log::debug!("GET {}", url);

        let request = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json");

        let request = match &self.auth_method {
            AuthMethod::ApiToken { token } => request.basic_auth(&self.email, Some(token)),
            AuthMethod::PersonalAccessToken { token } => request.bearer_auth(token),
        };

        let response = request.send().await.map_err(ExportError::from)?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ExportError::JiraAuthFailed(status.as_u16()).into());
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ExportError::JiraApiError(status.as_u16(), text).into());
        }

        let page = response
            .json::<SearchResponse>()
            .await
            .context("Failed to parse Jira search response")?;

        if let Some(total) = page.total {
            if total > page.issues.len() as u64 {
                log::info!(
                    "Search matched {} issues, exporting the first {}",
                    total,
                    page.issues.len()
                );
            }
        }

        Ok(page.issues)
    }
}
