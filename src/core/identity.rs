//! Stable identity keys and upsert-by-identity.

use uuid::Uuid;

use super::types::{Book, Customer};

/// Lowercase alphanumeric runs of `text` joined by `-`, or `None` when
/// nothing alphanumeric remains.
pub fn slug_key(text: &str) -> Option<String> {
    let slug = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    (!slug.is_empty()).then_some(slug)
}

/// Book identity: slug of the SKU, else slug of the title.
pub fn book_key(sku: &str, title: &str) -> Option<String> {
    slug_key(sku).or_else(|| slug_key(title))
}

/// Customer identity: slug of invoice number, else GSTIN, else name.
pub fn customer_key(invoice_no: &str, gstin: &str, name: &str) -> Option<String> {
    slug_key(invoice_no)
        .or_else(|| slug_key(gstin))
        .or_else(|| slug_key(name))
}

pub(crate) fn random_uid() -> String {
    Uuid::new_v4().to_string()
}

/// A record with a stable identity that can be merged in place.
pub trait Identified {
    /// Assigned identity.
    fn uid(&self) -> &str;

    /// Identity derived from the record's own fields, if any.
    fn derived_key(&self) -> Option<String>;

    /// Take every field from `incoming`, keeping this record's identity.
    fn absorb(&mut self, incoming: Self);

    /// True if `other` denotes the same entity.
    fn same_entity(&self, other: &Self) -> bool {
        if self.uid() == other.uid() {
            return true;
        }
        matches!(
            (self.derived_key(), other.derived_key()),
            (Some(a), Some(b)) if a == b
        )
    }
}

impl Identified for Book {
    fn uid(&self) -> &str {
        &self.uid
    }

    fn derived_key(&self) -> Option<String> {
        book_key(&self.sku, &self.title)
    }

    fn absorb(&mut self, incoming: Self) {
        let uid = std::mem::take(&mut self.uid);
        let created_at = self.created_at.or(incoming.created_at);
        let updated_at = incoming.updated_at.or(self.updated_at);
        *self = Self {
            uid,
            created_at,
            updated_at,
            ..incoming
        };
    }
}

impl Identified for Customer {
    fn uid(&self) -> &str {
        &self.uid
    }

    fn derived_key(&self) -> Option<String> {
        customer_key(&self.invoice_no, &self.gstin, &self.customer_name)
    }

    fn absorb(&mut self, incoming: Self) {
        let uid = std::mem::take(&mut self.uid);
        *self = Self { uid, ..incoming };
    }
}

/// What [`upsert`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// Appended at this index.
    Inserted(usize),
    /// Merged into the existing entry at this index.
    Updated(usize),
}

/// Merge `candidate` into the matching entry of `collection`, or append it.
pub fn upsert<T: Identified>(collection: &mut Vec<T>, candidate: T) -> Upsert {
    match collection.iter().position(|existing| existing.same_entity(&candidate)) {
        Some(index) => {
            collection[index].absorb(candidate);
            Upsert::Updated(index)
        }
        None => {
            collection.push(candidate);
            Upsert::Inserted(collection.len() - 1)
        }
    }
}

/// Upsert every candidate in order.
pub fn upsert_all<T, I>(collection: &mut Vec<T>, candidates: I) -> Vec<Upsert>
where
    T: Identified,
    I: IntoIterator<Item = T>,
{
    candidates
        .into_iter()
        .map(|candidate| upsert(collection, candidate))
        .collect()
}
