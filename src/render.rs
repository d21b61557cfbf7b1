//! Turning commit summaries into displayable elements.
//!
//! Renderers are pure: the clock they format relative dates against is fixed
//! at construction, and they never touch the network or the state store.

mod html;
mod terminal;

use crate::lookup::CommitSummary;
use crate::repo::RepositoryRef;
use crate::store::{StyleMode, ViewConfig};

pub use html::HtmlRenderer;
pub use terminal::TerminalRenderer;

/// One rendered repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// [`RepositoryRef::key`] of the repository. Hosts bind removal handlers
    /// to this key; renderers only expose it.
    pub key: String,
    pub markup: String,
}

pub trait Renderer {
    fn render(&self, repo: &RepositoryRef, commit: &CommitSummary, style: StyleMode) -> Element;

    /// Wrap a finished batch of elements, in order, into one container.
    fn compose(&self, view: &ViewConfig, elements: &[Element]) -> String;
}

/// First line of a commit message.
pub(crate) fn subject(message: &str) -> &str {
    message.lines().next().unwrap_or("")
}

/// Abbreviated sha for compact styles.
pub(crate) fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}
