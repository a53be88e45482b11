//! MediaWiki action API client
//!
//! Session handshake: login token, `action=login`, then a CSRF token that is
//! cached for every later edit. Cookies from the login response are kept by
//! the reqwest cookie store. Without credentials the client edits anonymously
//! with the anonymous CSRF token.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::WikiStore;
use crate::utils::{SyndicationError, SyndicationResult};

pub struct MediaWikiClient {
    client: reqwest::Client,
    api_url: String,
    credentials: Option<(String, String)>,
    csrf_token: Mutex<Option<String>>,
}

fn pointer_str<'a>(value: &'a Value, path: &str) -> SyndicationResult<&'a str> {
    value
        .pointer(path)
        .and_then(Value::as_str)
        .ok_or_else(|| SyndicationError::InvalidResponse(format!("missing {path} in wiki response")))
}

/// Surface an API-level `{"error": {...}}` as a fetch failure
fn check_api_error(value: &Value) -> SyndicationResult<()> {
    match value.get("error") {
        Some(error) => Err(SyndicationError::UpstreamFetch(format!(
            "wiki API error {}: {}",
            error.get("code").and_then(Value::as_str).unwrap_or("unknown"),
            error.get("info").and_then(Value::as_str).unwrap_or("no details"),
        ))),
        None => Ok(()),
    }
}

/// Page content out of a `prop=revisions`, `formatversion=2` response
pub(crate) fn page_content(value: &Value) -> Option<String> {
    let page = value.pointer("/query/pages/0")?;
    if page.get("missing").is_some() {
        return None;
    }
    page.pointer("/revisions/0/slots/main/content")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Page titles out of a `generator=categorymembers`, `formatversion=2` response
pub(crate) fn member_titles(value: &Value) -> Vec<String> {
    value
        .pointer("/query/pages")
        .and_then(Value::as_array)
        .map(|pages| {
            pages
                .iter()
                .filter_map(|page| page.get("title").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

impl MediaWikiClient {
    /// `client` should have its cookie store enabled
    pub fn new(
        client: reqwest::Client,
        api_url: impl Into<String>,
        credentials: Option<(String, String)>,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            credentials,
            csrf_token: Mutex::new(None),
        }
    }

    async fn get_json(&self, params: &[(&str, &str)]) -> SyndicationResult<Value> {
        let response = self.client.get(&self.api_url).query(params).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SyndicationError::UpstreamFetch(format!("wiki API returned HTTP {status}")));
        }
        let value: Value = response.json().await?;
        check_api_error(&value)?;
        Ok(value)
    }

    async fn post_json(&self, form: &[(&str, &str)]) -> SyndicationResult<Value> {
        let response = self.client.post(&self.api_url).form(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SyndicationError::UpstreamFetch(format!("wiki API returned HTTP {status}")));
        }
        let value: Value = response.json().await?;
        check_api_error(&value)?;
        Ok(value)
    }

    async fn log_in(&self, username: &str, password: &str) -> SyndicationResult<()> {
        let tokens = self
            .get_json(&[("action", "query"), ("meta", "tokens"), ("type", "login"), ("format", "json")])
            .await?;
        let login_token = pointer_str(&tokens, "/query/tokens/logintoken")?;

        let login = self
            .post_json(&[
                ("action", "login"),
                ("lgname", username),
                ("lgpassword", password),
                ("lgtoken", login_token),
                ("format", "json"),
            ])
            .await?;

        match pointer_str(&login, "/login/result")? {
            "Success" => {
                info!("Logged in to wiki as {}", username);
                Ok(())
            }
            other => Err(SyndicationError::UpstreamFetch(format!("wiki login failed: {other}"))),
        }
    }

    /// CSRF token for edits, logging in on first use
    async fn csrf_token(&self) -> SyndicationResult<String> {
        let mut cached = self.csrf_token.lock().await;
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }

        if let Some((username, password)) = &self.credentials {
            self.log_in(username, password).await?;
        }

        let tokens = self
            .get_json(&[("action", "query"), ("meta", "tokens"), ("format", "json")])
            .await?;
        let token = pointer_str(&tokens, "/query/tokens/csrftoken")?.to_string();
        *cached = Some(token.clone());
        Ok(token)
    }
}

#[async_trait]
impl WikiStore for MediaWikiClient {
    async fn fetch_page(&self, title: &str) -> SyndicationResult<Option<String>> {
        debug!("Fetching wiki page {}", title);
        let value = self
            .get_json(&[
                ("action", "query"),
                ("prop", "revisions"),
                ("titles", title),
                ("rvslots", "*"),
                ("rvprop", "content"),
                ("formatversion", "2"),
                ("format", "json"),
            ])
            .await?;
        Ok(page_content(&value))
    }

    async fn submit_edit(&self, title: &str, wikitext: &str, summary: &str) -> SyndicationResult<()> {
        let token = self.csrf_token().await?;
        let value = self
            .post_json(&[
                ("action", "edit"),
                ("title", title),
                ("text", wikitext),
                ("summary", summary),
                ("token", token.as_str()),
                ("format", "json"),
            ])
            .await?;

        match pointer_str(&value, "/edit/result")? {
            "Success" => {
                info!("Saved wiki page {}", title);
                Ok(())
            }
            other => Err(SyndicationError::UpstreamFetch(format!(
                "edit of {title} was not saved: {other}"
            ))),
        }
    }

    async fn members_of(&self, category: &str) -> SyndicationResult<Vec<String>> {
        let category_title = format!("Category:{category}");
        let value = self
            .get_json(&[
                ("action", "query"),
                ("generator", "categorymembers"),
                ("gcmtype", "page"),
                ("gcmlimit", "max"),
                ("gcmtitle", category_title.as_str()),
                ("formatversion", "2"),
                ("format", "json"),
            ])
            .await?;
        Ok(member_titles(&value))
    }

    async fn users(&self) -> SyndicationResult<Vec<String>> {
        let value = self
            .get_json(&[("action", "query"), ("list", "allusers"), ("aulimit", "max"), ("format", "json")])
            .await?;
        Ok(value
            .pointer("/query/allusers")
            .and_then(Value::as_array)
            .map(|users| {
                users
                    .iter()
                    .filter_map(|user| user.get("name").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_page_content_or_nothing() {
        let present = json!({"query": {"pages": [{"title": "T", "revisions": [
            {"slots": {"main": {"content": "== Reviews =="}}}
        ]}]}});
        assert_eq!(page_content(&present).as_deref(), Some("== Reviews =="));

        let missing = json!({"query": {"pages": [{"title": "T", "missing": true}]}});
        assert_eq!(page_content(&missing), None);
    }

    #[test]
    fn empty_categories_have_no_members() {
        assert!(member_titles(&json!({"batchcomplete": true})).is_empty());
        let members = json!({"query": {"pages": [{"title": "Joe's Cafe"}, {"title": "Kith"}]}});
        assert_eq!(member_titles(&members), vec!["Joe's Cafe", "Kith"]);
    }

    #[test]
    fn api_errors_are_upstream_failures() {
        let error = json!({"error": {"code": "badtoken", "info": "Invalid CSRF token."}});
        match check_api_error(&error) {
            Err(SyndicationError::UpstreamFetch(message)) => assert!(message.contains("badtoken")),
            other => panic!("expected upstream failure, got {other:?}"),
        }
    }
}
