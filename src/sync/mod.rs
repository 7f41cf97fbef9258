//! Remote row store and local-first reconciliation.
//!
//! The remote store is a PostgREST-style HTTP API in which every row is
//! scoped by a `workspace_id` column. Each synced collection (books,
//! customers, drafts) gets its own [`Reconciler`]:
//!
//! ```text
//! Disabled                       (no URL or key)
//! Loading --load ok--> Idle <--> Syncing
//!    |                   |          |
//!    +------ failure ---> Error <---+   (next successful load/push recovers)
//! ```
//!
//! Local editing and PDF export never depend on the remote store: a
//! failed request only changes the collection's [`SyncStatus`].

mod config;
mod error;
mod reconciler;
mod record;
mod remote;
mod rest;
mod rows;

pub use config::{DEFAULT_WORKSPACE, ENV_PREFIX, SyncConfig};
pub use error::SyncError;
pub use reconciler::{BookSync, CustomerSync, DraftSync, PushOutcome, Reconciler, SyncStatus};
pub use record::{INVOICES_TABLE, InvoiceRecord, persist_invoice_record};
pub use remote::{Filter, FilterOp, Order, RemoteStore, SelectQuery};
pub use rest::{RestStore, encode_filter, error_message, select_params};
pub use rows::{BookRows, CONFLICT_TARGET, CustomerRows, DraftRows, RowMapper};
