//! Commit history lookups.

mod github;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::repo::RepositoryRef;

pub use github::GithubClient;

/// The newest commit of a repository, as shown on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    pub sha: String,
    pub author_name: String,
    pub author_date: DateTime<Utc>,
    pub message: String,
    pub commit_url: String,
    /// `None` when the commit author has no linked account.
    pub author_profile_url: Option<String>,
}

/// Why a repository's lookup produced nothing to render.
///
/// All variants are handled identically by the orchestrator; they are kept
/// apart for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupFailure {
    /// The request never produced a usable response.
    NetworkError(String),
    /// The service answered with a non-success status.
    HttpError { status: u16 },
    /// The history exists but holds no commits.
    EmptyHistory,
}

impl fmt::Display for LookupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupFailure::NetworkError(msg) => write!(f, "network error: {}", msg),
            LookupFailure::HttpError { status } => write!(f, "HTTP status {}", status),
            LookupFailure::EmptyHistory => write!(f, "no commits"),
        }
    }
}

impl std::error::Error for LookupFailure {}

/// Result of one repository's lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Success(CommitSummary),
    Failure(LookupFailure),
}

impl From<Result<CommitSummary, LookupFailure>> for FetchOutcome {
    fn from(result: Result<CommitSummary, LookupFailure>) -> Self {
        match result {
            Ok(commit) => FetchOutcome::Success(commit),
            Err(failure) => FetchOutcome::Failure(failure),
        }
    }
}

/// Source of commit history for a repository.
///
/// Implementations never retry on their own.
#[async_trait(?Send)]
pub trait CommitLookup {
    /// Commit history, newest first. May be empty.
    async fn fetch_commits(&self, repo: &RepositoryRef) -> Result<Vec<CommitSummary>, LookupFailure>;

    /// The newest commit, with an empty history reported as
    /// [`LookupFailure::EmptyHistory`].
    async fn fetch_latest(&self, repo: &RepositoryRef) -> Result<CommitSummary, LookupFailure> {
        self.fetch_commits(repo)
            .await?
            .into_iter()
            .next()
            .ok_or(LookupFailure::EmptyHistory)
    }
}
