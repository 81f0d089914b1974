//! Types and parsing for OCI Distribution v2 references.

mod digest;
mod error;
mod parser;
mod reference;

pub use digest::Digest;
pub use error::{Error, Result};
pub use parser::{any_reference, blob_reference, manifest_reference};
pub use reference::{RefKind, Reference};
