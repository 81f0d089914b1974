//! The `OciStore` contract: read-only access to the local content store.

mod error;
mod in_memory;
mod store;

pub use error::{Error, Result};
pub use in_memory::InMemoryStore;
pub use store::{ChangeEvent, Inventory, OciStore};
