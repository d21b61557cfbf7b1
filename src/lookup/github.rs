use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::Deserialize;
use url::Url;

use super::{CommitLookup, CommitSummary, LookupFailure};
use crate::error::{Error, Result};
use crate::repo::RepositoryRef;

/// One element of the `GET /repos/{owner}/{repo}/commits` response.
/// Only the fields the board shows are decoded.
#[derive(Debug, Deserialize)]
struct CommitPayload {
    sha: String,
    html_url: String,
    commit: CommitDetails,
    /// Null when the commit email is not linked to an account.
    author: Option<AccountPayload>,
}

#[derive(Debug, Deserialize)]
struct CommitDetails {
    author: SignaturePayload,
    message: String,
}

#[derive(Debug, Deserialize)]
struct SignaturePayload {
    name: String,
    date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct AccountPayload {
    html_url: String,
}

impl From<CommitPayload> for CommitSummary {
    fn from(payload: CommitPayload) -> Self {
        CommitSummary {
            sha: payload.sha,
            author_name: payload.commit.author.name,
            author_date: payload.commit.author.date,
            message: payload.commit.message,
            commit_url: payload.html_url,
            author_profile_url: payload.author.map(|a| a.html_url),
        }
    }
}

/// Unauthenticated client for the GitHub REST commits endpoint.
pub struct GithubClient {
    client: reqwest::Client,
    api_base_url: Url,
}

impl GithubClient {
    /// Create a client against `api_base_url` (e.g. `https://api.github.com`).
    ///
    /// With `timeout` unset a hung request is waited on indefinitely.
    pub fn new(api_base_url: Url, user_agent: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));

        let mut builder = reqwest::Client::builder()
            .user_agent(user_agent.to_string())
            .default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            api_base_url,
        })
    }

    /// `<base>/repos/<owner>/<name>/commits`, with owner and name encoded as
    /// single path segments.
    pub fn commits_url(&self, repo: &RepositoryRef) -> Result<Url> {
        let mut url = self.api_base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::MalformedRepositoryString(repo.canonical_string()))?
            .pop_if_empty()
            .extend(["repos", repo.owner(), repo.name(), "commits"]);
        Ok(url)
    }
}

/// Decode a commits response body, newest first as served.
///
/// Only the newest commit must decode. Older entries the board never shows are
/// skipped when malformed instead of failing the whole lookup.
fn decode_commits(body: &[u8]) -> Result<Vec<CommitSummary>, serde_json::Error> {
    let entries: Vec<serde_json::Value> = serde_json::from_slice(body)?;
    let mut entries = entries.into_iter();

    let newest = match entries.next() {
        Some(entry) => serde_json::from_value::<CommitPayload>(entry)?,
        None => return Ok(Vec::new()),
    };

    let mut commits = vec![CommitSummary::from(newest)];
    for entry in entries {
        match serde_json::from_value::<CommitPayload>(entry) {
            Ok(payload) => commits.push(payload.into()),
            Err(e) => tracing::debug!("skipping unreadable older commit: {}", e),
        }
    }
    Ok(commits)
}

#[async_trait(?Send)]
impl CommitLookup for GithubClient {
    async fn fetch_commits(&self, repo: &RepositoryRef) -> Result<Vec<CommitSummary>, LookupFailure> {
        let url = self
            .commits_url(repo)
            .map_err(|e| LookupFailure::NetworkError(e.to_string()))?;
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LookupFailure::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupFailure::HttpError {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| LookupFailure::NetworkError(e.to_string()))?;

        decode_commits(&body)
            .map_err(|e| LookupFailure::NetworkError(format!("unreadable commits response: {}", e)))
    }
}
