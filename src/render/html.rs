use chrono::{DateTime, Utc};
use url::Url;

use super::{short_sha, Element, Renderer};
use crate::lookup::CommitSummary;
use crate::repo::RepositoryRef;
use crate::store::{StyleMode, ViewConfig};
use crate::timeago::time_ago;

/// HTML card markup for the three styles.
///
/// Remove buttons carry `data-remove-key` instead of inline handlers; the host
/// page wires a single delegated listener to that attribute.
pub struct HtmlRenderer {
    web_base_url: Url,
    now: DateTime<Utc>,
}

impl HtmlRenderer {
    pub fn new(web_base_url: Url, now: DateTime<Utc>) -> Self {
        Self { web_base_url, now }
    }

    fn repo_url(&self, repo: &RepositoryRef) -> String {
        let mut url = self.web_base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend([repo.owner(), repo.name()]);
        }
        url.to_string()
    }

    fn render_full(&self, repo: &RepositoryRef, commit: &CommitSummary, key: &str) -> String {
        let author = match &commit.author_profile_url {
            Some(profile) => format!(
                r#"<a href="{url}" target="_blank">{name}</a>"#,
                url = escape(profile),
                name = escape(&commit.author_name),
            ),
            None => escape(&commit.author_name),
        };

        let mut out = format!(r#"<div id="{key}" class="repo-widget">"#, key = escape(key));
        out.push_str(&self.title(repo, key));
        out.push_str(&format!(
            r#"<div class="commit-date"><span class="human-date">{ago}</span><span class="iso-date"> - {iso}</span></div>"#,
            ago = escape(&time_ago(commit.author_date, self.now)),
            iso = commit.author_date.to_rfc3339(),
        ));
        out.push_str(&format!(
            r#"<div class="commit-sha"><a href="{url}" target="_blank">{sha}</a></div>"#,
            url = escape(&commit.commit_url),
            sha = escape(&commit.sha),
        ));
        out.push_str(&format!(r#"<div class="commit-author">{author}</div>"#));
        out.push_str(&format!(
            r#"<div class="commit-message-wrapper"><span class="commit-message">{msg}</span></div></div>"#,
            msg = escape(&commit.message),
        ));
        out
    }

    fn render_small(&self, repo: &RepositoryRef, commit: &CommitSummary, key: &str) -> String {
        let mut out = format!(r#"<div id="{key}" class="repo-widget small">"#, key = escape(key));
        out.push_str(&self.title(repo, key));
        out.push_str(&format!(
            r#"<div class="commit-info"><span class="human-date">{ago}</span> - <a href="{url}" target="_blank">{sha}</a></div></div>"#,
            ago = escape(&time_ago(commit.author_date, self.now)),
            url = escape(&commit.commit_url),
            sha = escape(short_sha(&commit.sha)),
        ));
        out
    }

    fn render_text(&self, repo: &RepositoryRef, commit: &CommitSummary, key: &str) -> String {
        format!(
            concat!(
                r#"<li id="{key}" class="repo-text-list-item">"#,
                r#"<span class="repo-name"><a href="{repo_url}" target="_blank">{repo}</a></span>"#,
                r#" - <span class="commit-date"><a href="{commit_url}" target="_blank">{ago}</a></span>"#,
                r##" - <a href="#" data-remove-key="{key}">[X]</a></li>"##,
            ),
            key = escape(key),
            repo_url = escape(&self.repo_url(repo)),
            repo = escape(&repo.canonical_string()),
            commit_url = escape(&commit.commit_url),
            ago = escape(&time_ago(commit.author_date, self.now)),
        )
    }

    fn title(&self, repo: &RepositoryRef, key: &str) -> String {
        format!(
            r#"<div class="repo-title"><h3><a href="{url}" target="_blank">{repo}</a></h3><button data-remove-key="{key}">X</button></div>"#,
            url = escape(&self.repo_url(repo)),
            repo = escape(&repo.canonical_string()),
            key = escape(key),
        )
    }
}

impl Renderer for HtmlRenderer {
    fn render(&self, repo: &RepositoryRef, commit: &CommitSummary, style: StyleMode) -> Element {
        let key = repo.key();
        let markup = match style {
            StyleMode::Full => self.render_full(repo, commit, &key),
            StyleMode::Small => self.render_small(repo, commit, &key),
            StyleMode::Text => self.render_text(repo, commit, &key),
        };
        Element { key, markup }
    }

    fn compose(&self, view: &ViewConfig, elements: &[Element]) -> String {
        let tag = match view.style {
            StyleMode::Text => "ul",
            StyleMode::Full | StyleMode::Small => "div",
        };
        if view.collapsed {
            return format!(
                r#"<{tag} class="widget-container {style} collapsed" data-count="{count}"></{tag}>"#,
                style = view.style,
                count = elements.len(),
            );
        }

        let mut out = format!(r#"<{tag} class="widget-container {style}">"#, style = view.style);
        for element in elements {
            out.push_str(&element.markup);
        }
        out.push_str(&format!("</{tag}>"));
        out
    }
}

/// Escape text for HTML element content and double-quoted attributes.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
