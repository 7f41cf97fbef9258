//! Saved, named snapshots of the working invoice.

use chrono::{DateTime, Utc};

use super::columns::ColumnPrefs;
use super::identity::random_uid;
use super::types::{Customer, Draft, LineItem};

/// Label used when neither a label nor an invoice number is given.
pub const UNTITLED_DRAFT: &str = "Untitled draft";

fn label_key(label: &str) -> String {
    label.trim().to_lowercase()
}

fn effective_label(label: &str, meta: &Customer) -> String {
    let label = label.trim();
    if !label.is_empty() {
        return label.to_string();
    }
    let invoice_no = meta.invoice_no.trim();
    if invoice_no.is_empty() {
        UNTITLED_DRAFT.to_string()
    } else {
        invoice_no.to_string()
    }
}

/// Save the working invoice under `label`, replacing a draft with the same
/// label (case-insensitive) or creating a new one. Keeps `drafts` sorted
/// newest-updated first and returns the saved draft's id.
pub fn save_draft(
    drafts: &mut Vec<Draft>,
    label: &str,
    meta: &Customer,
    lines: &[LineItem],
    prefs: ColumnPrefs,
    now: DateTime<Utc>,
) -> String {
    let label = effective_label(label, meta);
    let key = label_key(&label);
    let id = match drafts.iter_mut().find(|d| label_key(&d.label) == key) {
        Some(existing) => {
            existing.label = label;
            existing.meta = meta.clone();
            existing.lines = lines.to_vec();
            existing.pdf_column_prefs = prefs;
            existing.updated_at = now;
            existing.id.clone()
        }
        None => {
            let id = random_uid();
            drafts.push(Draft {
                id: id.clone(),
                label,
                meta: meta.clone(),
                lines: lines.to_vec(),
                pdf_column_prefs: prefs,
                created_at: now,
                updated_at: now,
            });
            id
        }
    };
    sort_drafts(drafts);
    id
}

/// Newest `updated_at` first.
pub fn sort_drafts(drafts: &mut [Draft]) {
    drafts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}

pub fn find_draft<'a>(drafts: &'a [Draft], id: &str) -> Option<&'a Draft> {
    drafts.iter().find(|d| d.id == id)
}

pub fn delete_draft(drafts: &mut Vec<Draft>, id: &str) -> Option<Draft> {
    let index = drafts.iter().position(|d| d.id == id)?;
    Some(drafts.remove(index))
}
