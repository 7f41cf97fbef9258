//! Loads the catalog from the configured remote store, adds a book, and
//! pushes the change back.
//!
//! ```text
//! BILLBOOK_URL=https://<project>.example BILLBOOK_API_KEY=<anon key> \
//!     cargo run --example sync_catalog
//! ```

use billbook::core::*;
use billbook::sync::{BookRows, PushOutcome, Reconciler, SyncConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match SyncConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return;
        }
    };
    let mut books = match Reconciler::from_config(&config, BookRows) {
        Ok(books) => books,
        Err(e) => {
            eprintln!("Could not create the remote client: {e}");
            return;
        }
    };

    let mut catalog = match books.load().await {
        Ok(Some(rows)) => rows,
        Ok(None) => {
            println!("Remote sync is not configured; set BILLBOOK_URL and BILLBOOK_API_KEY.");
            return;
        }
        Err(e) => {
            eprintln!("Load failed: {e}");
            return;
        }
    };
    println!("Loaded {} books for workspace {:?}", catalog.len(), books.workspace());
    let _ = books.observe(&catalog).await;

    let added = normalize_book(
        &RawRow::new()
            .with("sku", "DEMO-001")
            .with("title", "Sample Anthology")
            .with("mrp", 199),
    );
    upsert(&mut catalog, added);

    match books.observe(&catalog).await {
        Ok(PushOutcome::Pushed { upserted, deleted, .. }) => {
            println!("Pushed {upserted} rows, deleted {}", deleted.len());
        }
        Ok(other) => println!("Nothing pushed: {other:?}"),
        Err(e) => eprintln!("Push failed ({:?}): {e}", books.status()),
    }
}
