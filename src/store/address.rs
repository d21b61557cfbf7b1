use std::cell::RefCell;

use url::Url;

use super::{query, BoardState, StateStore};
use crate::error::Result;

/// State kept in the query of an in-process page address.
///
/// Writes rewrite the query in place; nothing navigates or reloads. Callers
/// re-run the orchestrator themselves after a mutation.
#[derive(Debug)]
pub struct AddressStore {
    address: RefCell<Url>,
}

impl AddressStore {
    pub fn new(address: Url) -> Self {
        Self {
            address: RefCell::new(address),
        }
    }

    /// Current address, including the encoded board state.
    pub fn address(&self) -> Url {
        self.address.borrow().clone()
    }
}

impl StateStore for AddressStore {
    fn read(&self) -> Result<BoardState> {
        Ok(query::decode(self.address.borrow().query().unwrap_or("")))
    }

    fn write(&self, state: &BoardState) -> Result<()> {
        let mut address = self.address.borrow_mut();
        let encoded = query::encode(address.query().unwrap_or(""), state)?;
        address.set_query(Some(&encoded));
        tracing::debug!("address query now {}", encoded);
        Ok(())
    }
}
