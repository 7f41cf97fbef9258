//! Core invoice types, computation, formatting, and local state.
//!
//! Everything here is synchronous and free of I/O except [`storage`],
//! which talks to a [`KeyValueStore`] the caller provides.

mod brand;
mod columns;
mod compute;
mod drafts;
mod error;
mod format;
mod identity;
mod invoice;
mod normalize;
pub mod numeric;
pub mod storage;
mod types;
mod words;

pub use brand::*;
pub use columns::*;
pub use compute::*;
pub use drafts::*;
pub use error::*;
pub use format::*;
pub use identity::*;
pub use invoice::*;
pub use normalize::*;
pub use storage::{KeyValueStore, MemoryStore, FileStore, Workspace};
pub use types::*;
pub use words::*;
