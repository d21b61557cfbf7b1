//! Fetch, reconcile, sort and render the tracked repositories.
//!
//! One pass:
//! 1. read the tracked set and start one lookup per repository, all at once
//! 2. wait for every outcome
//! 3. drop failed repositories from the store with a single update
//! 4. order successes (tracked order, or oldest author date first)
//! 5. render every success and compose them into one container

use futures::future::join_all;

use crate::error::Result;
use crate::lookup::{CommitLookup, CommitSummary, FetchOutcome, LookupFailure};
use crate::render::{Element, Renderer};
use crate::repo::RepositoryRef;
use crate::store::{BoardState, SortMode, StateStore, TrackedSet, ViewConfig};

/// A successfully rendered repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardItem {
    pub repo: RepositoryRef,
    pub commit: CommitSummary,
    pub element: Element,
}

/// Output of one orchestrator pass, presented by the host as a single batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub view: ViewConfig,
    /// In display order.
    pub items: Vec<BoardItem>,
    /// Repositories dropped from the tracked set during this pass.
    pub removed: Vec<(RepositoryRef, LookupFailure)>,
    /// The composed container.
    pub markup: String,
}

impl Board {
    pub fn repos(&self) -> Vec<&RepositoryRef> {
        self.items.iter().map(|item| &item.repo).collect()
    }

    /// Drop one repository's element and recompose the container, without
    /// another lookup round. Returns whether the repository was shown.
    pub fn remove_item<R: Renderer>(&mut self, repo: &RepositoryRef, renderer: &R) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.repo != repo);
        if self.items.len() == before {
            return false;
        }

        let elements: Vec<Element> = self.items.iter().map(|item| item.element.clone()).collect();
        self.markup = renderer.compose(&self.view, &elements);
        true
    }
}

/// Run one full pass against the current store contents.
pub async fn refresh<S, L, R>(store: &S, lookup: &L, renderer: &R) -> Result<Board>
where
    S: StateStore,
    L: CommitLookup,
    R: Renderer,
{
    let state = store.read()?;
    let outcomes = fetch_all(lookup, &state.tracked).await;

    let (mut successes, failures) = partition(outcomes);

    let state = reconcile(store, &failures)?;

    // A repository removed by someone else while lookups were in flight is
    // not rendered either.
    successes.retain(|(repo, _)| state.tracked.contains(repo));

    order(&mut successes, state.view.sort);

    Ok(compose(renderer, state.view, successes, failures))
}

/// Start a lookup for every tracked repository and wait for all of them.
///
/// Outcomes come back in tracked order regardless of completion order. A
/// failing lookup has no effect on the others.
pub async fn fetch_all<L>(lookup: &L, tracked: &TrackedSet) -> Vec<(RepositoryRef, FetchOutcome)>
where
    L: CommitLookup,
{
    tracing::debug!("dispatching {} lookups", tracked.len());

    let lookups = tracked.iter().map(|repo| async move {
        let outcome = FetchOutcome::from(lookup.fetch_latest(repo).await);
        (repo.clone(), outcome)
    });

    join_all(lookups).await
}

fn partition(
    outcomes: Vec<(RepositoryRef, FetchOutcome)>,
) -> (Vec<(RepositoryRef, CommitSummary)>, Vec<(RepositoryRef, LookupFailure)>) {
    let mut successes = Vec::new();
    let mut failures = Vec::new();

    for (repo, outcome) in outcomes {
        match outcome {
            FetchOutcome::Success(commit) => successes.push((repo, commit)),
            FetchOutcome::Failure(failure) => {
                tracing::warn!("lookup for {} failed, removing it: {}", repo, failure);
                failures.push((repo, failure));
            }
        }
    }

    (successes, failures)
}

/// Remove every failed repository with one store update and return the
/// resulting state.
fn reconcile<S: StateStore>(store: &S, failures: &[(RepositoryRef, LookupFailure)]) -> Result<BoardState> {
    if failures.is_empty() {
        return store.read();
    }

    let mut removed = 0;
    let state = store.update(|state| {
        removed = state.tracked.remove_all(failures.iter().map(|(repo, _)| repo));
    })?;

    tracing::info!(
        "removed {} failed repositories, {} still tracked",
        removed,
        state.tracked.len()
    );
    Ok(state)
}

/// Stable ordering of successful lookups.
pub fn order(successes: &mut [(RepositoryRef, CommitSummary)], sort: SortMode) {
    match sort {
        SortMode::None => {}
        SortMode::ByDate => {
            successes.sort_by(|(_, a), (_, b)| a.author_date.cmp(&b.author_date));
        }
    }
}

fn compose<R: Renderer>(
    renderer: &R,
    view: ViewConfig,
    successes: Vec<(RepositoryRef, CommitSummary)>,
    removed: Vec<(RepositoryRef, LookupFailure)>,
) -> Board {
    let items: Vec<BoardItem> = successes
        .into_iter()
        .map(|(repo, commit)| {
            let element = renderer.render(&repo, &commit, view.style);
            BoardItem { repo, commit, element }
        })
        .collect();

    let elements: Vec<Element> = items.iter().map(|item| item.element.clone()).collect();
    let markup = renderer.compose(&view, &elements);

    Board {
        view,
        items,
        removed,
        markup,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{DateTime, NaiveDate, Utc};
    use pretty_assertions::assert_eq;
    use url::Url;

    use super::*;
    use crate::render::TerminalRenderer;
    use crate::store::AddressStore;

    /// Lookup answering from a fixed script, optionally after a delay.
    #[derive(Default)]
    pub(crate) struct ScriptedLookup {
        answers: HashMap<String, Result<Vec<CommitSummary>, LookupFailure>>,
        delays: HashMap<String, Duration>,
        pub(crate) events: RefCell<Vec<String>>,
    }

    impl ScriptedLookup {
        pub(crate) fn commit(mut self, repo: &str, sha: &str, date: &str) -> Self {
            self.answers.insert(repo.to_string(), Ok(vec![summary(sha, date)]));
            self
        }

        pub(crate) fn fail(mut self, repo: &str, failure: LookupFailure) -> Self {
            self.answers.insert(repo.to_string(), Err(failure));
            self
        }

        pub(crate) fn delay(mut self, repo: &str, millis: u64) -> Self {
            self.delays.insert(repo.to_string(), Duration::from_millis(millis));
            self
        }
    }

    #[async_trait(?Send)]
    impl CommitLookup for ScriptedLookup {
        async fn fetch_commits(&self, repo: &RepositoryRef) -> Result<Vec<CommitSummary>, LookupFailure> {
            let name = repo.canonical_string();
            self.events.borrow_mut().push(format!("start {}", name));
            if let Some(delay) = self.delays.get(&name) {
                tokio::time::sleep(*delay).await;
            }
            self.events.borrow_mut().push(format!("end {}", name));
            self.answers
                .get(&name)
                .cloned()
                .unwrap_or(Err(LookupFailure::HttpError { status: 404 }))
        }
    }

    /// Store wrapper counting writes.
    pub(crate) struct CountingStore<S> {
        inner: S,
        pub(crate) writes: Cell<usize>,
    }

    impl<S: StateStore> StateStore for CountingStore<S> {
        fn read(&self) -> Result<BoardState> {
            self.inner.read()
        }

        fn write(&self, state: &BoardState) -> Result<()> {
            self.writes.set(self.writes.get() + 1);
            self.inner.write(state)
        }
    }

    pub(crate) fn summary(sha: &str, date: &str) -> CommitSummary {
        let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        CommitSummary {
            sha: sha.to_string(),
            author_name: "Tester".to_string(),
            author_date: DateTime::<Utc>::from_naive_utc_and_offset(day.and_hms_opt(0, 0, 0).unwrap(), Utc),
            message: format!("commit {}", sha),
            commit_url: format!("https://github.com/commit/{}", sha),
            author_profile_url: None,
        }
    }

    fn store_with(repos: &[&str], sort: SortMode) -> CountingStore<AddressStore> {
        let inner = AddressStore::new(Url::parse("https://example.com/board/").unwrap());
        let mut state = BoardState::default();
        for repo in repos {
            state.tracked.insert(RepositoryRef::parse(repo).unwrap());
        }
        state.view.sort = sort;
        inner.write(&state).unwrap();
        CountingStore {
            inner,
            writes: Cell::new(0),
        }
    }

    fn renderer() -> TerminalRenderer {
        TerminalRenderer::new(Utc::now())
    }

    #[tokio::test]
    async fn test_failed_repository_is_removed_once() -> Result<()> {
        let store = store_with(&["octocat/Hello-World", "bad/doesnotexist"], SortMode::None);
        let lookup = ScriptedLookup::default()
            .commit("octocat/Hello-World", "abc123", "2024-01-01")
            .fail("bad/doesnotexist", LookupFailure::HttpError { status: 404 });

        let board = refresh(&store, &lookup, &renderer()).await?;

        assert_eq!(board.items.len(), 1);
        assert_eq!(board.items[0].commit.sha, "abc123");
        assert_eq!(board.removed.len(), 1);
        assert_eq!(board.removed[0].1, LookupFailure::HttpError { status: 404 });
        assert_eq!(store.read()?.tracked.canonical_strings(), vec!["octocat/Hello-World"]);
        assert_eq!(store.writes.get(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_many_failures_coalesce_into_one_write() -> Result<()> {
        let store = store_with(&["a/1", "b/2", "c/3", "d/4"], SortMode::None);
        let lookup = ScriptedLookup::default()
            .commit("c/3", "ccc", "2024-01-01")
            .fail("a/1", LookupFailure::EmptyHistory)
            .fail("b/2", LookupFailure::NetworkError("reset".into()));

        let board = refresh(&store, &lookup, &renderer()).await?;

        assert_eq!(board.removed.len(), 3);
        assert_eq!(store.read()?.tracked.canonical_strings(), vec!["c/3"]);
        assert_eq!(store.writes.get(), 1);
        Ok(())
    }

    /// Lookup that tracks another repository while its own request is in
    /// flight, the way a second tab or host action would.
    struct InterleavingLookup<'a> {
        store: &'a AddressStore,
        added: &'a str,
    }

    #[async_trait(?Send)]
    impl CommitLookup for InterleavingLookup<'_> {
        async fn fetch_commits(&self, repo: &RepositoryRef) -> Result<Vec<CommitSummary>, LookupFailure> {
            tokio::task::yield_now().await;
            match repo.canonical_string().as_str() {
                "bad/repo" => Err(LookupFailure::HttpError { status: 404 }),
                _ => {
                    let added = RepositoryRef::parse(self.added).unwrap();
                    self.store.add_repository(&added).unwrap();
                    Ok(vec![summary("aaa", "2024-01-01")])
                }
            }
        }
    }

    #[tokio::test]
    async fn test_repository_added_during_lookups_survives_reconcile() -> Result<()> {
        let store = store_with(&["good/repo", "bad/repo"], SortMode::None).inner;
        let lookup = InterleavingLookup {
            store: &store,
            added: "late/arrival",
        };

        let board = refresh(&store, &lookup, &renderer()).await?;

        assert_eq!(board.removed.len(), 1);
        assert_eq!(board.removed[0].0.canonical_string(), "bad/repo");
        assert_eq!(
            store.read()?.tracked.canonical_strings(),
            vec!["good/repo", "late/arrival"]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_no_failures_means_no_write() -> Result<()> {
        let store = store_with(&["a/1"], SortMode::None);
        let lookup = ScriptedLookup::default().commit("a/1", "aaa", "2024-01-01");

        refresh(&store, &lookup, &renderer()).await?;
        assert_eq!(store.writes.get(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_lookups_start_together_and_keep_tracked_order() -> Result<()> {
        let store = store_with(&["slow/one", "fast/two"], SortMode::None);
        let lookup = ScriptedLookup::default()
            .commit("slow/one", "111", "2024-01-01")
            .commit("fast/two", "222", "2023-01-01")
            .delay("slow/one", 30);

        let board = refresh(&store, &lookup, &renderer()).await?;

        let events = lookup.events.borrow().clone();
        assert_eq!(
            events,
            vec!["start slow/one", "start fast/two", "end fast/two", "end slow/one"]
        );
        let shas: Vec<_> = board.items.iter().map(|i| i.commit.sha.as_str()).collect();
        assert_eq!(shas, vec!["111", "222"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_sort_by_date_is_ascending() -> Result<()> {
        let store = store_with(&["a/1", "b/2", "c/3"], SortMode::ByDate);
        let lookup = ScriptedLookup::default()
            .commit("a/1", "first", "2023-01-01")
            .commit("b/2", "second", "2024-06-01")
            .commit("c/3", "third", "2023-06-15");

        let board = refresh(&store, &lookup, &renderer()).await?;
        let shas: Vec<_> = board.items.iter().map(|i| i.commit.sha.as_str()).collect();
        assert_eq!(shas, vec!["first", "third", "second"]);
        Ok(())
    }

    #[test]
    fn test_order_ties_keep_original_order() {
        let repo = |s: &str| RepositoryRef::parse(s).unwrap();
        let mut successes = vec![
            (repo("x/late"), summary("late", "2024-02-01")),
            (repo("x/tie-a"), summary("tie-a", "2024-01-01")),
            (repo("x/tie-b"), summary("tie-b", "2024-01-01")),
            (repo("x/tie-c"), summary("tie-c", "2024-01-01")),
        ];
        order(&mut successes, SortMode::ByDate);
        let names: Vec<_> = successes.iter().map(|(r, _)| r.name()).collect();
        assert_eq!(names, vec!["tie-a", "tie-b", "tie-c", "late"]);

        order(&mut successes, SortMode::None);
        let names: Vec<_> = successes.iter().map(|(r, _)| r.name()).collect();
        assert_eq!(names, vec!["tie-a", "tie-b", "tie-c", "late"]);
    }

    #[tokio::test]
    async fn test_empty_tracked_set() -> Result<()> {
        let store = store_with(&[], SortMode::None);
        let lookup = ScriptedLookup::default();
        let board = refresh(&store, &lookup, &renderer()).await?;
        assert!(board.items.is_empty());
        assert!(lookup.events.borrow().is_empty());
        assert_eq!(store.writes.get(), 0);
        Ok(())
    }
}
