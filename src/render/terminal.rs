use chrono::{DateTime, Utc};

use super::{short_sha, subject, Element, Renderer};
use crate::lookup::CommitSummary;
use crate::repo::RepositoryRef;
use crate::store::{StyleMode, ViewConfig};
use crate::timeago::time_ago;

/// Plain-text lines for a terminal.
pub struct TerminalRenderer {
    now: DateTime<Utc>,
}

impl TerminalRenderer {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Renderer for TerminalRenderer {
    fn render(&self, repo: &RepositoryRef, commit: &CommitSummary, style: StyleMode) -> Element {
        let ago = time_ago(commit.author_date, self.now);
        let markup = match style {
            StyleMode::Full => format!(
                "{repo}  {ago} ({date})\n  {sha}  {author}\n  {subject}\n  {url}",
                date = commit.author_date.format("%Y-%m-%d %H:%M UTC"),
                sha = commit.sha,
                author = commit.author_name,
                subject = subject(&commit.message),
                url = commit.commit_url,
            ),
            StyleMode::Small => format!("{repo}  {ago}  {}", short_sha(&commit.sha)),
            StyleMode::Text => format!("{repo} - {ago}"),
        };
        Element {
            key: repo.key(),
            markup,
        }
    }

    fn compose(&self, view: &ViewConfig, elements: &[Element]) -> String {
        if view.collapsed {
            let plural = if elements.len() == 1 { "y" } else { "ies" };
            return format!("[{} repositor{} collapsed]", elements.len(), plural);
        }
        let separator = match view.style {
            StyleMode::Full => "\n\n",
            StyleMode::Small | StyleMode::Text => "\n",
        };
        elements
            .iter()
            .map(|e| e.markup.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }
}
