use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::repo::RepositoryRef;

/// Visual density of each rendered element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StyleMode {
    #[default]
    Full,
    Small,
    Text,
}

/// Ordering applied to successful lookups before rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Keep tracked-set order.
    #[default]
    None,
    /// Oldest author date first.
    ByDate,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {kind} '{value}'")]
pub struct ParseModeError {
    kind: &'static str,
    value: String,
}

impl StyleMode {
    pub const ALL: [StyleMode; 3] = [StyleMode::Full, StyleMode::Small, StyleMode::Text];

    pub fn as_str(self) -> &'static str {
        match self {
            StyleMode::Full => "full",
            StyleMode::Small => "small",
            StyleMode::Text => "text",
        }
    }
}

impl FromStr for StyleMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(StyleMode::Full),
            "small" => Ok(StyleMode::Small),
            "text" => Ok(StyleMode::Text),
            other => Err(ParseModeError {
                kind: "style",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for StyleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SortMode {
    /// Persisted form; `ByDate` is stored as `date`.
    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::None => "none",
            SortMode::ByDate => "date",
        }
    }
}

impl FromStr for SortMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(SortMode::None),
            "date" => Ok(SortMode::ByDate),
            other => Err(ParseModeError {
                kind: "sort mode",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display settings persisted next to the tracked set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewConfig {
    pub style: StyleMode,
    pub sort: SortMode,
    pub collapsed: bool,
}

/// Ordered, deduplicated list of tracked repositories.
///
/// Membership is decided by canonical string equality, so no two entries ever
/// share an `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackedSet {
    repos: Vec<RepositoryRef>,
}

impl TrackedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `repo` unless it is already tracked. Returns whether it was added.
    pub fn insert(&mut self, repo: RepositoryRef) -> bool {
        if self.contains(&repo) {
            return false;
        }
        self.repos.push(repo);
        true
    }

    /// Returns whether `repo` was present.
    pub fn remove(&mut self, repo: &RepositoryRef) -> bool {
        let before = self.repos.len();
        self.repos.retain(|r| r != repo);
        self.repos.len() != before
    }

    /// Drop every entry in `repos`, returning how many were removed.
    pub fn remove_all<'a, I>(&mut self, repos: I) -> usize
    where
        I: IntoIterator<Item = &'a RepositoryRef>,
    {
        let doomed: Vec<&RepositoryRef> = repos.into_iter().collect();
        let before = self.repos.len();
        self.repos.retain(|r| !doomed.contains(&r));
        before - self.repos.len()
    }

    pub fn contains(&self, repo: &RepositoryRef) -> bool {
        self.repos.iter().any(|r| r == repo)
    }

    pub fn len(&self) -> usize {
        self.repos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RepositoryRef> {
        self.repos.iter()
    }

    /// Canonical strings in tracked order.
    pub fn canonical_strings(&self) -> Vec<String> {
        self.repos.iter().map(RepositoryRef::canonical_string).collect()
    }
}

impl FromIterator<RepositoryRef> for TrackedSet {
    fn from_iter<T: IntoIterator<Item = RepositoryRef>>(iter: T) -> Self {
        let mut set = TrackedSet::new();
        for repo in iter {
            set.insert(repo);
        }
        set
    }
}

impl<'a> IntoIterator for &'a TrackedSet {
    type Item = &'a RepositoryRef;
    type IntoIter = std::slice::Iter<'a, RepositoryRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.repos.iter()
    }
}

/// The complete persisted configuration. Always written as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoardState {
    pub tracked: TrackedSet,
    pub view: ViewConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(s: &str) -> RepositoryRef {
        RepositoryRef::parse(s).unwrap()
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut set = TrackedSet::new();
        assert!(set.insert(repo("a/one")));
        assert!(!set.insert(repo("a/one")));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_from_iter_dedups_and_keeps_first_position() {
        let set: TrackedSet = ["a/one", "b/two", "a/one", "c/three"]
            .into_iter()
            .map(repo)
            .collect();
        assert_eq!(set.canonical_strings(), vec!["a/one", "b/two", "c/three"]);
    }

    #[test]
    fn test_remove_all_preserves_order_of_survivors() {
        let mut set: TrackedSet = ["a/1", "b/2", "c/3", "d/4"].into_iter().map(repo).collect();
        let removed = set.remove_all(&[repo("b/2"), repo("d/4"), repo("z/9")]);
        assert_eq!(removed, 2);
        assert_eq!(set.canonical_strings(), vec!["a/1", "c/3"]);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut set: TrackedSet = [repo("a/1")].into_iter().collect();
        assert!(!set.remove(&repo("b/2")));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("small".parse::<StyleMode>(), Ok(StyleMode::Small));
        assert_eq!("date".parse::<SortMode>(), Ok(SortMode::ByDate));
        assert!("Full".parse::<StyleMode>().is_err());
        assert!("byDate".parse::<SortMode>().is_err());
        for style in StyleMode::ALL {
            assert_eq!(style.as_str().parse::<StyleMode>(), Ok(style));
        }
    }

    #[test]
    fn test_defaults() {
        let view = ViewConfig::default();
        assert_eq!(view.style, StyleMode::Full);
        assert_eq!(view.sort, SortMode::None);
        assert!(!view.collapsed);
    }
}
