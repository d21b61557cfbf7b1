//! User-facing operations on the board.
//!
//! Every mutation goes through the state store first and is then reflected by
//! re-running the orchestrator in process; nothing relies on a page reload.

use url::Url;

use crate::error::Result;
use crate::lookup::CommitLookup;
use crate::orchestrator::{self, Board};
use crate::render::Renderer;
use crate::repo::RepositoryRef;
use crate::store::{query, SortMode, StateStore, StyleMode};

pub struct Controls<S, L, R> {
    store: S,
    lookup: L,
    renderer: R,
    page_url: Url,
    board: Option<Board>,
}

impl<S, L, R> Controls<S, L, R>
where
    S: StateStore,
    L: CommitLookup,
    R: Renderer,
{
    /// `page_url` is the base of shareable links.
    pub fn new(store: S, lookup: L, renderer: R, page_url: Url) -> Self {
        Self {
            store,
            lookup,
            renderer,
            page_url,
            board: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The most recently presented board, if any pass has run.
    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    /// Re-run the orchestrator without changing anything.
    pub async fn reload(&mut self) -> Result<&Board> {
        let board = orchestrator::refresh(&self.store, &self.lookup, &self.renderer).await?;
        Ok(&*self.board.insert(board))
    }

    /// Parse `input` as `owner/name` and start tracking it.
    ///
    /// Malformed input is rejected before any state change or lookup.
    pub async fn add(&mut self, input: &str) -> Result<&Board> {
        let repo = RepositoryRef::parse(input)?;
        if self.store.add_repository(&repo)? {
            tracing::info!("tracking {}", repo);
        } else {
            tracing::info!("{} is already tracked", repo);
        }
        self.reload().await
    }

    /// Stop tracking `repo` and drop its element from the current board.
    /// The remaining elements are not fetched again.
    pub async fn remove(&mut self, repo: &RepositoryRef) -> Result<&Board> {
        if self.store.remove_repository(repo)? {
            tracing::info!("no longer tracking {}", repo);
        } else {
            tracing::info!("{} was not tracked", repo);
        }

        match self.board.take() {
            Some(mut board) => {
                board.remove_item(repo, &self.renderer);
                Ok(&*self.board.insert(board))
            }
            None => self.reload().await,
        }
    }

    /// Remove the repository behind an element key.
    pub async fn remove_by_key(&mut self, key: &str) -> Result<&Board> {
        let repo = RepositoryRef::from_key(key)?;
        self.remove(&repo).await
    }

    pub async fn set_style(&mut self, style: StyleMode) -> Result<&Board> {
        self.store.update(|state| state.view.style = style)?;
        self.reload().await
    }

    pub async fn set_sort(&mut self, sort: SortMode) -> Result<&Board> {
        self.store.update(|state| state.view.sort = sort)?;
        self.reload().await
    }

    pub async fn set_collapsed(&mut self, collapsed: bool) -> Result<&Board> {
        self.store.update(|state| state.view.collapsed = collapsed)?;
        self.reload().await
    }

    pub async fn toggle_collapsed(&mut self) -> Result<&Board> {
        self.store
            .update(|state| state.view.collapsed = !state.view.collapsed)?;
        self.reload().await
    }

    /// Link reproducing the current configuration.
    pub fn shareable_link(&self) -> Result<Url> {
        let state = self.store.read()?;
        let mut link = self.page_url.clone();
        let encoded = query::encode(link.query().unwrap_or(""), &state)?;
        link.set_query(Some(&encoded));
        Ok(link)
    }
}
