//! Query-string encoding of [`BoardState`].
//!
//! Parameters: `repoList` (JSON array of `"owner/name"`), `style`
//! (`full|small|text`), `sort` (`none|date`), `collapsed` (`true|false`).
//! A missing or unreadable parameter decodes to its default; decoding never
//! fails.

use url::form_urlencoded;

use super::state::{BoardState, TrackedSet, ViewConfig};
use crate::error::Result;
use crate::repo::RepositoryRef;

pub const REPO_LIST_PARAM: &str = "repoList";
pub const STYLE_PARAM: &str = "style";
pub const SORT_PARAM: &str = "sort";
pub const COLLAPSED_PARAM: &str = "collapsed";

const OWNED_PARAMS: [&str; 4] = [REPO_LIST_PARAM, STYLE_PARAM, SORT_PARAM, COLLAPSED_PARAM];

/// Decode board state from a query string (with or without leading `?`).
pub fn decode(query: &str) -> BoardState {
    let mut state = BoardState::default();

    for (key, value) in form_urlencoded::parse(strip_question_mark(query).as_bytes()) {
        // Empty values behave like absent ones.
        if value.is_empty() {
            continue;
        }
        match &*key {
            REPO_LIST_PARAM => state.tracked = decode_repo_list(&value),
            STYLE_PARAM => match value.parse() {
                Ok(style) => state.view.style = style,
                Err(e) => tracing::warn!("ignoring persisted style: {}", e),
            },
            SORT_PARAM => match value.parse() {
                Ok(sort) => state.view.sort = sort,
                Err(e) => tracing::warn!("ignoring persisted sort: {}", e),
            },
            COLLAPSED_PARAM => state.view.collapsed = decode_collapsed(&value),
            _ => {}
        }
    }

    state
}

/// Encode `state` into `existing`, replacing the board's own parameters and
/// keeping any foreign ones in their original order.
pub fn encode(existing: &str, state: &BoardState) -> Result<String> {
    let mut serializer = form_urlencoded::Serializer::new(String::new());

    for (key, value) in form_urlencoded::parse(strip_question_mark(existing).as_bytes()) {
        if !OWNED_PARAMS.contains(&&*key) {
            serializer.append_pair(&key, &value);
        }
    }

    let repo_list = serde_json::to_string(&state.tracked.canonical_strings())?;
    serializer.append_pair(REPO_LIST_PARAM, &repo_list);
    append_view(&mut serializer, &state.view);

    Ok(serializer.finish())
}

fn append_view(serializer: &mut form_urlencoded::Serializer<'_, String>, view: &ViewConfig) {
    serializer.append_pair(STYLE_PARAM, view.style.as_str());
    serializer.append_pair(SORT_PARAM, view.sort.as_str());
    serializer.append_pair(COLLAPSED_PARAM, if view.collapsed { "true" } else { "false" });
}

fn strip_question_mark(query: &str) -> &str {
    query.strip_prefix('?').unwrap_or(query)
}

fn decode_repo_list(value: &str) -> TrackedSet {
    let entries: Vec<String> = match serde_json::from_str(value) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("persisted {} is not a JSON string array, starting empty: {}", REPO_LIST_PARAM, e);
            return TrackedSet::new();
        }
    };

    entries
        .iter()
        .filter_map(|entry| match RepositoryRef::parse(entry) {
            Ok(repo) => Some(repo),
            Err(e) => {
                tracing::warn!("dropping persisted repository: {}", e);
                None
            }
        })
        .collect()
}

fn decode_collapsed(value: &str) -> bool {
    match value {
        "true" => true,
        "false" => false,
        other => {
            tracing::warn!("ignoring persisted collapsed flag '{}'", other);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::store::{SortMode, StyleMode};

    fn tracked(repos: &[&str]) -> TrackedSet {
        repos.iter().map(|r| RepositoryRef::parse(r).unwrap()).collect()
    }

    #[test]
    fn test_empty_query_is_default() {
        assert_eq!(decode(""), BoardState::default());
        assert_eq!(decode("?"), BoardState::default());
    }

    #[test]
    fn test_encode_then_decode_preserves_order_and_view() -> Result<()> {
        let state = BoardState {
            tracked: tracked(&["zed-industries/zed", "octocat/Hello-World", "a/b"]),
            view: ViewConfig {
                style: StyleMode::Text,
                sort: SortMode::ByDate,
                collapsed: true,
            },
        };
        let query = encode("", &state)?;
        assert_eq!(decode(&query), state);
        Ok(())
    }

    #[test]
    fn test_decode_browser_style_query() {
        let state = decode(
            "?repoList=%5B%22octocat%2FHello-World%22%2C%22rust-lang%2Frust%22%5D&style=small&sort=date",
        );
        assert_eq!(
            state.tracked.canonical_strings(),
            vec!["octocat/Hello-World", "rust-lang/rust"]
        );
        assert_eq!(state.view.style, StyleMode::Small);
        assert_eq!(state.view.sort, SortMode::ByDate);
        assert!(!state.view.collapsed);
    }

    #[test]
    fn test_malformed_repo_list_is_empty() {
        let state = decode("repoList=not-json&style=text");
        assert!(state.tracked.is_empty());
        assert_eq!(state.view.style, StyleMode::Text);

        let state = decode("repoList=%7B%22a%22%3A1%7D");
        assert!(state.tracked.is_empty());
    }

    #[test]
    fn test_malformed_entries_and_duplicates_are_dropped() {
        let list = r#"["a/b","noslash","a/b","c/d"]"#;
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair(REPO_LIST_PARAM, list)
            .finish();
        assert_eq!(decode(&query).tracked.canonical_strings(), vec!["a/b", "c/d"]);
    }

    #[test]
    fn test_unknown_modes_fall_back_to_defaults() {
        let state = decode("style=huge&sort=random&collapsed=maybe");
        assert_eq!(state.view, ViewConfig::default());
    }

    #[test]
    fn test_encode_keeps_foreign_params() -> Result<()> {
        let state = BoardState {
            tracked: tracked(&["a/b"]),
            view: ViewConfig::default(),
        };
        let query = encode("?theme=dark&style=text&utm=x", &state)?;
        assert!(query.starts_with("theme=dark&utm=x&"));
        assert_eq!(query.matches("style=").count(), 1);
        assert_eq!(decode(&query), state);
        Ok(())
    }
}
