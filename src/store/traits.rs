use crate::error::Result;
use crate::repo::RepositoryRef;

use super::BoardState;

/// Single source of truth for the board's configuration.
///
/// `write` always replaces the whole document. Multi-step operations must be
/// folded into one `update` (or one `write`) so that two logical changes
/// never interleave their read-modify-write cycles.
pub trait StateStore {
    /// Read the current state.
    /// Returns default state if none exists or it cannot be decoded.
    fn read(&self) -> Result<BoardState>;

    /// Replace the persisted state with `state`.
    fn write(&self, state: &BoardState) -> Result<()>;

    /// Read, apply `update_fn`, and write back in one step.
    /// The write is skipped when `update_fn` left the state unchanged.
    fn update<F>(&self, update_fn: F) -> Result<BoardState>
    where
        F: FnOnce(&mut BoardState),
    {
        let current = self.read()?;
        let mut next = current.clone();
        update_fn(&mut next);

        if next != current {
            self.write(&next)?;
        }

        Ok(next)
    }

    /// Track `repo`. Returns `false` (and writes nothing) if already tracked.
    fn add_repository(&self, repo: &RepositoryRef) -> Result<bool> {
        let mut added = false;
        self.update(|state| added = state.tracked.insert(repo.clone()))?;
        Ok(added)
    }

    /// Stop tracking `repo`. Returns `false` (and writes nothing) if absent.
    fn remove_repository(&self, repo: &RepositoryRef) -> Result<bool> {
        let mut removed = false;
        self.update(|state| removed = state.tracked.remove(repo))?;
        Ok(removed)
    }
}
