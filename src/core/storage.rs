//! Durable local state: a string-keyed JSON store and the workspace
//! snapshot persisted in it.
//!
//! Reads never fail: absent or corrupt values fall back to defaults.
//! Writes are best effort; [`Workspace::save`] logs and skips any key
//! that cannot be written.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::columns::ColumnPrefs;
use super::error::BillingError;
use super::invoice::DEFAULT_TAX_PCT;
use super::numeric::{Numeric, decimal_to_json, parse_numeric};
use super::types::{BatchLine, Book, Customer, Draft, LineItem};

pub const KEY_TAB: &str = "ui.tab";
pub const KEY_CATALOG: &str = "data.catalog";
pub const KEY_CUSTOMERS: &str = "data.customers";
pub const KEY_BATCH_ITEMS: &str = "data.batchItems";
pub const KEY_LINES: &str = "data.lines";
pub const KEY_DEFAULT_TAX: &str = "settings.defaultTaxPct";
pub const KEY_COLUMN_PREFS: &str = "settings.pdfColumnPrefs";
pub const KEY_FILTER: &str = "ui.filter";
pub const KEY_SELECTED_CUSTOMER: &str = "ui.selectedCustomer";
pub const KEY_DRAFTS: &str = "data.drafts";
pub const KEY_BRAND: &str = "settings.brand";

/// String-keyed store of serialized JSON values.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), BillingError>;

    fn remove(&mut self, key: &str) -> Result<(), BillingError>;
}

/// In-process store, mostly for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), BillingError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), BillingError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Use `dir`, creating it if needed.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, BillingError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .map_err(|e| BillingError::Storage(format!("{}: {e}", dir.display())))?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{file}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), BillingError> {
        let path = self.path_for(key);
        fs::write(&path, value)
            .map_err(|e| BillingError::Storage(format!("{}: {e}", path.display())))
    }

    fn remove(&mut self, key: &str) -> Result<(), BillingError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BillingError::Storage(format!("{}: {e}", path.display()))),
        }
    }
}

/// Read and deserialize `key`, or `None` if absent or corrupt.
pub fn load_json<T, S>(store: &S, key: &str) -> Option<T>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(key, error = %e, "ignoring unreadable stored value");
            None
        }
    }
}

/// Serialize and write `key`.
pub fn store_json<T, S>(store: &mut S, key: &str, value: &T) -> Result<(), BillingError>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let text = serde_json::to_string(value)?;
    store.set(key, &text)
}

/// Top-level screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Customers,
    Books,
    Invoice,
    Drafts,
}

/// Everything the operator's session keeps between runs.
#[derive(Debug, Clone, PartialEq)]
pub struct Workspace {
    pub tab: Tab,
    pub catalog: Vec<Book>,
    pub customers: Vec<Customer>,
    pub batch_items: Vec<BatchLine>,
    pub lines: Vec<LineItem>,
    pub default_tax_pct: Decimal,
    pub pdf_column_prefs: ColumnPrefs,
    pub filter: String,
    /// `uid` of the customer whose details fill the invoice header.
    pub selected_customer: Option<String>,
    pub drafts: Vec<Draft>,
    /// Key into the brand registry; `None` selects the default brand.
    pub brand: Option<String>,
}

impl Default for Workspace {
    fn default() -> Self {
        Self {
            tab: Tab::default(),
            catalog: Vec::new(),
            customers: Vec::new(),
            batch_items: Vec::new(),
            lines: Vec::new(),
            default_tax_pct: DEFAULT_TAX_PCT,
            pdf_column_prefs: ColumnPrefs::default(),
            filter: String::new(),
            selected_customer: None,
            drafts: Vec::new(),
            brand: None,
        }
    }
}

impl Workspace {
    /// Read every key, substituting defaults for anything absent or corrupt.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let defaults = Self::default();
        let default_tax_pct = match load_json::<Value, _>(store, KEY_DEFAULT_TAX)
            .as_ref()
            .map(parse_numeric)
        {
            Some(Numeric::Value(v)) => v,
            _ => defaults.default_tax_pct,
        };
        Self {
            tab: load_json(store, KEY_TAB).unwrap_or(defaults.tab),
            catalog: load_json(store, KEY_CATALOG).unwrap_or_default(),
            customers: load_json(store, KEY_CUSTOMERS).unwrap_or_default(),
            batch_items: load_json(store, KEY_BATCH_ITEMS).unwrap_or_default(),
            lines: load_json(store, KEY_LINES).unwrap_or_default(),
            default_tax_pct,
            pdf_column_prefs: load_json(store, KEY_COLUMN_PREFS).unwrap_or_default(),
            filter: load_json(store, KEY_FILTER).unwrap_or_default(),
            selected_customer: load_json::<Option<String>, _>(store, KEY_SELECTED_CUSTOMER)
                .flatten(),
            drafts: load_json(store, KEY_DRAFTS).unwrap_or_default(),
            brand: load_json::<Option<String>, _>(store, KEY_BRAND).flatten(),
        }
    }

    /// Write every key. Individual failures are logged and skipped;
    /// returns how many keys were written.
    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> usize {
        let results = [
            (KEY_TAB, store_json(store, KEY_TAB, &self.tab)),
            (KEY_CATALOG, store_json(store, KEY_CATALOG, &self.catalog)),
            (KEY_CUSTOMERS, store_json(store, KEY_CUSTOMERS, &self.customers)),
            (KEY_BATCH_ITEMS, store_json(store, KEY_BATCH_ITEMS, &self.batch_items)),
            (KEY_LINES, store_json(store, KEY_LINES, &self.lines)),
            (
                KEY_DEFAULT_TAX,
                store_json(store, KEY_DEFAULT_TAX, &decimal_to_json(self.default_tax_pct)),
            ),
            (KEY_COLUMN_PREFS, store_json(store, KEY_COLUMN_PREFS, &self.pdf_column_prefs)),
            (KEY_FILTER, store_json(store, KEY_FILTER, &self.filter)),
            (
                KEY_SELECTED_CUSTOMER,
                store_json(store, KEY_SELECTED_CUSTOMER, &self.selected_customer),
            ),
            (KEY_DRAFTS, store_json(store, KEY_DRAFTS, &self.drafts)),
            (KEY_BRAND, store_json(store, KEY_BRAND, &self.brand)),
        ];
        results
            .into_iter()
            .filter(|(key, result)| match result {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(key, error = %e, "dropped local storage write");
                    false
                }
            })
            .count()
    }

    /// The selected customer record, if it still exists.
    pub fn selected(&self) -> Option<&Customer> {
        let uid = self.selected_customer.as_deref()?;
        self.customers.iter().find(|c| c.uid == uid)
    }
}
