mod address;
mod filesystem;
pub mod query;
mod state;
mod traits;

pub use address::AddressStore;
pub use filesystem::FileStore;
pub use state::{BoardState, ParseModeError, SortMode, StyleMode, TrackedSet, ViewConfig};
pub use traits::StateStore;
