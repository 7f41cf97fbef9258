//! Local-first reconciliation of one entity collection with the remote store.
//!
//! A [`Reconciler`] owns the identity baseline of the last load or push and
//! decides, on each observed local change, which rows to upsert and which
//! to delete. Remote wins at load time; afterwards every local change is
//! pushed wholesale (last write wins per row).

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::config::SyncConfig;
use super::error::SyncError;
use super::remote::{Filter, RemoteStore, SelectQuery};
use super::rest::RestStore;
use super::rows::{BookRows, CustomerRows, DraftRows, RowMapper};

const WORKSPACE_COLUMN: &str = "workspace_id";
const UID_COLUMN: &str = "uid";

/// Externally visible sync state of one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    /// Remote store not configured; the collection is local only.
    Disabled,
    Loading,
    Idle,
    Syncing,
    /// Last request failed with this message.
    Error(String),
}

impl SyncStatus {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    Disabled,
    /// Configured, never loaded.
    Unloaded,
    Loading,
    /// Loaded; an observation matching the loaded rows is the load's own write-back.
    AwaitingEcho,
    Idle,
    Syncing,
    Failed { message: String, loaded: bool },
}

impl Phase {
    fn loaded(&self) -> bool {
        match self {
            Self::AwaitingEcho | Self::Idle | Self::Syncing => true,
            Self::Failed { loaded, .. } => *loaded,
            Self::Disabled | Self::Unloaded | Self::Loading => false,
        }
    }
}

/// What an observed local change led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// Sync is disabled.
    Disabled,
    /// Nothing has been loaded yet, so there is no baseline to diff against.
    NotLoaded,
    /// The observation was the write-back of a load.
    EchoSuppressed,
    Pushed {
        upserted: usize,
        /// Identities that disappeared since the baseline.
        deleted: Vec<String>,
        /// All workspace rows were deleted because the collection is empty.
        cleared: bool,
    },
}

/// Reconciles one collection described by `M`.
pub struct Reconciler<M: RowMapper> {
    store: Option<Arc<dyn RemoteStore>>,
    mapper: M,
    workspace: String,
    phase: Phase,
    baseline: BTreeSet<String>,
    /// Rows of the last load, kept until the first observation after it.
    loaded_rows: Vec<Value>,
    last_synced_at: Option<DateTime<Utc>>,
}

pub type BookSync = Reconciler<BookRows>;
pub type CustomerSync = Reconciler<CustomerRows>;
pub type DraftSync = Reconciler<DraftRows>;

impl<M: RowMapper> std::fmt::Debug for Reconciler<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("table", &self.mapper.table())
            .field("workspace", &self.workspace)
            .field("phase", &self.phase)
            .field("baseline", &self.baseline.len())
            .finish()
    }
}

impl<M: RowMapper> Reconciler<M> {
    /// Reconciler over `store`, scoped to `workspace`.
    pub fn new(store: Arc<dyn RemoteStore>, workspace: impl Into<String>, mapper: M) -> Self {
        Self {
            store: Some(store),
            mapper,
            workspace: workspace.into(),
            phase: Phase::Unloaded,
            baseline: BTreeSet::new(),
            loaded_rows: Vec::new(),
            last_synced_at: None,
        }
    }

    /// A reconciler that never talks to a remote store.
    pub fn disabled(mapper: M) -> Self {
        Self {
            store: None,
            mapper,
            workspace: String::new(),
            phase: Phase::Disabled,
            baseline: BTreeSet::new(),
            loaded_rows: Vec::new(),
            last_synced_at: None,
        }
    }

    /// HTTP-backed reconciler, or a disabled one when `config` lacks a URL or key.
    pub fn from_config(config: &SyncConfig, mapper: M) -> Result<Self, SyncError> {
        if !config.is_configured() {
            return Ok(Self::disabled(mapper));
        }
        let store: Arc<dyn RemoteStore> = Arc::new(RestStore::new(config)?);
        Ok(Self::new(store, config.workspace.clone(), mapper))
    }

    pub fn status(&self) -> SyncStatus {
        match &self.phase {
            Phase::Disabled => SyncStatus::Disabled,
            Phase::Unloaded | Phase::Loading => SyncStatus::Loading,
            Phase::AwaitingEcho | Phase::Idle => SyncStatus::Idle,
            Phase::Syncing => SyncStatus::Syncing,
            Phase::Failed { message, .. } => SyncStatus::Error(message.clone()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    /// Identities known to exist remotely after the last load or push.
    pub fn baseline(&self) -> &BTreeSet<String> {
        &self.baseline
    }

    pub fn last_synced_at(&self) -> Option<DateTime<Utc>> {
        self.last_synced_at
    }

    pub fn workspace(&self) -> &str {
        &self.workspace
    }

    pub fn mapper(&self) -> &M {
        &self.mapper
    }

    /// Fetches every row of the workspace, in canonical order.
    ///
    /// The caller replaces its local collection with the result and then
    /// reports that replacement through [`observe`](Self::observe), which
    /// swallows it as long as it still matches what was loaded. Returns `Ok(None)` when sync is disabled. Rows that
    /// cannot be mapped are skipped.
    pub async fn load(&mut self) -> Result<Option<Vec<M::Entity>>, SyncError> {
        let Some(store) = self.store.clone() else {
            return Ok(None);
        };
        let was_loaded = self.phase.loaded();
        self.phase = Phase::Loading;

        let query = SelectQuery::new()
            .filter(Filter::eq(WORKSPACE_COLUMN, self.workspace.as_str()))
            .order(self.mapper.order());
        let table = self.mapper.table();

        match store.select(table, &query).await {
            Ok(rows) => {
                let entities: Vec<M::Entity> =
                    rows.iter().filter_map(|row| self.mapper.from_row(row)).collect();
                if entities.len() < rows.len() {
                    tracing::warn!(
                        table,
                        skipped = rows.len() - entities.len(),
                        "ignoring unreadable remote rows"
                    );
                }
                self.baseline = entities.iter().map(|e| self.mapper.identity(e)).collect();
                self.loaded_rows = entities.iter().map(|e| self.mapper.to_row(e)).collect();
                self.phase = Phase::AwaitingEcho;
                self.last_synced_at = Some(Utc::now());
                tracing::debug!(table, rows = entities.len(), "loaded remote collection");
                Ok(Some(entities))
            }
            Err(e) => {
                tracing::error!(table, workspace = %self.workspace, error = %e, "remote load failed");
                self.phase = Phase::Failed {
                    message: e.to_string(),
                    loaded: was_loaded,
                };
                Err(e)
            }
        }
    }

    /// Explicit retry: same as [`load`](Self::load).
    pub async fn refresh(&mut self) -> Result<Option<Vec<M::Entity>>, SyncError> {
        self.load().await
    }

    /// Reports the current local collection after a change.
    ///
    /// Upserts every entity, then deletes the identities that vanished
    /// since the baseline. When the collection has become empty, every row
    /// of the workspace is deleted in one request instead. On success the
    /// baseline becomes the current identity set.
    pub async fn observe(&mut self, entities: &[M::Entity]) -> Result<PushOutcome, SyncError> {
        match self.phase {
            Phase::Disabled => return Ok(PushOutcome::Disabled),
            Phase::AwaitingEcho => {
                self.phase = Phase::Idle;
                let loaded = std::mem::take(&mut self.loaded_rows);
                let observed: Vec<Value> = entities.iter().map(|e| self.mapper.to_row(e)).collect();
                if observed == loaded {
                    return Ok(PushOutcome::EchoSuppressed);
                }
            }
            _ if !self.phase.loaded() => return Ok(PushOutcome::NotLoaded),
            _ => {}
        }
        let Some(store) = self.store.clone() else {
            return Ok(PushOutcome::Disabled);
        };

        let current: BTreeSet<String> = entities.iter().map(|e| self.mapper.identity(e)).collect();
        let removed: Vec<String> = self.baseline.difference(&current).cloned().collect();
        let now = Utc::now();
        let rows: Vec<Value> = entities.iter().map(|e| self.row_for(e, now)).collect();

        self.phase = Phase::Syncing;
        match self.push(store.as_ref(), &rows, &removed).await {
            Ok(cleared) => {
                self.baseline = current;
                self.phase = Phase::Idle;
                self.last_synced_at = Some(now);
                Ok(PushOutcome::Pushed {
                    upserted: rows.len(),
                    deleted: removed,
                    cleared,
                })
            }
            Err(e) => {
                tracing::error!(
                    table = self.mapper.table(),
                    workspace = %self.workspace,
                    error = %e,
                    "remote push failed"
                );
                self.phase = Phase::Failed {
                    message: e.to_string(),
                    loaded: true,
                };
                Err(e)
            }
        }
    }

    async fn push(
        &self,
        store: &dyn RemoteStore,
        rows: &[Value],
        removed: &[String],
    ) -> Result<bool, SyncError> {
        let table = self.mapper.table();
        let workspace = Filter::eq(WORKSPACE_COLUMN, self.workspace.as_str());
        if rows.is_empty() {
            // an emptied collection also drops rows this session never saw
            if self.baseline.is_empty() {
                return Ok(false);
            }
            store.delete(table, &[workspace]).await?;
            return Ok(true);
        }
        store.upsert(table, rows, self.mapper.conflict_target()).await?;
        if !removed.is_empty() {
            let filters = [workspace, Filter::any_of(UID_COLUMN, removed.iter().cloned())];
            store.delete(table, &filters).await?;
        }
        Ok(false)
    }

    fn row_for(&self, entity: &M::Entity, now: DateTime<Utc>) -> Value {
        let mut row = self.mapper.to_row(entity);
        if let Value::Object(map) = &mut row {
            map.insert(WORKSPACE_COLUMN.into(), Value::String(self.workspace.clone()));
            if map.get("updated_at").is_none_or(Value::is_null) {
                map.insert("updated_at".into(), Value::String(now.to_rfc3339()));
            }
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Book, RawRow, normalize_book};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Fixed {
        rows: Vec<Value>,
        fail: bool,
        upserts: Mutex<Vec<Vec<Value>>>,
    }

    #[async_trait]
    impl RemoteStore for Fixed {
        async fn select(&self, _: &str, _: &SelectQuery) -> Result<Vec<Value>, SyncError> {
            if self.fail {
                return Err(SyncError::Network("offline".into()));
            }
            Ok(self.rows.clone())
        }

        async fn upsert(&self, _: &str, rows: &[Value], _: &str) -> Result<(), SyncError> {
            self.upserts.lock().unwrap().push(rows.to_vec());
            Ok(())
        }

        async fn delete(&self, _: &str, _: &[Filter]) -> Result<(), SyncError> {
            Ok(())
        }

        async fn insert(&self, _: &str, _: &[Value]) -> Result<(), SyncError> {
            Ok(())
        }
    }

    fn book(title: &str) -> Book {
        normalize_book(&RawRow::new().with("title", title))
    }

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(future)
    }

    #[test]
    fn status_follows_phases() {
        let store = Arc::new(Fixed::default());
        let mut sync = Reconciler::new(store.clone(), "w", BookRows);
        assert_eq!(sync.status(), SyncStatus::Loading);
        block_on(sync.load()).unwrap();
        assert_eq!(sync.status(), SyncStatus::Idle);
        assert!(sync.last_synced_at().is_some());
    }

    #[test]
    fn rows_are_stamped_with_workspace() {
        let store = Arc::new(Fixed::default());
        let mut sync = Reconciler::new(store.clone(), "shop", BookRows);
        block_on(async {
            sync.load().await.unwrap();
            sync.observe(&[]).await.unwrap();
            sync.observe(&[book("Kavya")]).await.unwrap();
        });
        let upserts = store.upserts.lock().unwrap();
        assert_eq!(upserts.len(), 1);
        assert_eq!(upserts[0][0]["workspace_id"], "shop");
        assert_eq!(upserts[0][0]["uid"], "kavya");
        assert!(upserts[0][0]["updated_at"].is_string());
    }

    #[test]
    fn only_an_unchanged_write_back_is_swallowed() {
        let store = Arc::new(Fixed {
            rows: vec![serde_json::json!({"uid": "a", "title": "A"})],
            ..Fixed::default()
        });
        let mut sync = Reconciler::new(store.clone(), "w", BookRows);
        block_on(async {
            let mut books = sync.load().await.unwrap().unwrap();
            books[0].title = "A, revised".into();
            assert!(matches!(
                sync.observe(&books).await.unwrap(),
                PushOutcome::Pushed { upserted: 1, .. }
            ));
        });
        assert_eq!(store.upserts.lock().unwrap()[0][0]["title"], "A, revised");
    }

    #[test]
    fn failed_first_load_blocks_pushes() {
        let store = Arc::new(Fixed {
            fail: true,
            ..Fixed::default()
        });
        let mut sync = Reconciler::new(store.clone(), "w", BookRows);
        block_on(async {
            assert!(sync.load().await.is_err());
            assert_eq!(
                sync.observe(&[book("A")]).await.unwrap(),
                PushOutcome::NotLoaded
            );
        });
        assert_eq!(sync.status(), SyncStatus::Error("network error: offline".into()));
        assert!(store.upserts.lock().unwrap().is_empty());
    }

    #[test]
    fn disabled_without_configuration() {
        let mut sync = Reconciler::from_config(&SyncConfig::default(), BookRows).unwrap();
        assert!(!sync.is_enabled());
        assert_eq!(sync.status(), SyncStatus::Disabled);
        block_on(async {
            assert_eq!(sync.load().await.unwrap(), None);
            assert_eq!(sync.observe(&[book("A")]).await.unwrap(), PushOutcome::Disabled);
        });
    }
}
