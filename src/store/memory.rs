use parking_lot::RwLock;
use std::collections::HashMap;

use crate::model::{
    document_rev, new_document, new_relation_document, patch_document, replace_document,
    revision_matches, Attributes, Collection, Document, DocumentMeta, Id,
};
use crate::store::error::{StoreError, StoreResult};
use crate::store::traits::{require_endpoints, AdminStore, DocumentStore, Store};

/// In-process document store. Used when no database is configured and by
/// the test suite; all concurrency control is the `RwLock`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, HashMap<Id, Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn list(&self, collection: Collection) -> StoreResult<Vec<Document>> {
        let collections = self.collections.read();
        Ok(collections
            .get(&collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn save(&self, collection: Collection, attrs: Attributes) -> StoreResult<DocumentMeta> {
        let (doc, meta) = new_document(collection, attrs);
        self.insert_new(collection, doc, meta)
    }

    async fn save_relation(
        &self,
        collection: Collection,
        from: Option<&str>,
        to: Option<&str>,
        attrs: Attributes,
    ) -> StoreResult<DocumentMeta> {
        let (from, to) = require_endpoints(collection, from, to)?;
        let (doc, meta) = new_relation_document(collection, from, to, attrs);
        self.insert_new(collection, doc, meta)
    }

    async fn fetch(&self, collection: Collection, key: &str) -> StoreResult<Document> {
        let collections = self.collections.read();
        collections
            .get(&collection)
            .and_then(|docs| docs.get(key))
            .cloned()
            .ok_or_else(|| StoreError::not_found(collection, key))
    }

    async fn replace(
        &self,
        collection: Collection,
        key: &str,
        attrs: Attributes,
    ) -> StoreResult<DocumentMeta> {
        let mut collections = self.collections.write();
        let docs = collections.entry(collection).or_default();
        let existing = docs
            .get(key)
            .ok_or_else(|| StoreError::not_found(collection, key))?;
        if !revision_matches(&attrs, document_rev(existing).unwrap_or_default()) {
            return Err(StoreError::version_conflict(collection, key));
        }
        let (doc, meta) = replace_document(collection, existing, attrs);
        docs.insert(key.to_string(), doc);
        Ok(meta)
    }

    async fn patch(
        &self,
        collection: Collection,
        key: &str,
        partial: Attributes,
    ) -> StoreResult<()> {
        let mut collections = self.collections.write();
        let docs = collections.entry(collection).or_default();
        let existing = docs
            .get(key)
            .ok_or_else(|| StoreError::not_found(collection, key))?;
        if !revision_matches(&partial, document_rev(existing).unwrap_or_default()) {
            return Err(StoreError::version_conflict(collection, key));
        }
        let (doc, _) = patch_document(collection, existing, partial);
        docs.insert(key.to_string(), doc);
        Ok(())
    }

    async fn remove(&self, collection: Collection, key: &str) -> StoreResult<()> {
        let mut collections = self.collections.write();
        let removed = collections
            .get_mut(&collection)
            .and_then(|docs| docs.remove(key));
        match removed {
            Some(_) => Ok(()),
            None => Err(StoreError::not_found(collection, key)),
        }
    }
}

#[async_trait::async_trait]
impl AdminStore for MemoryStore {
    async fn drop_collection(&self, collection: Collection) -> StoreResult<()> {
        self.collections.write().remove(&collection);
        Ok(())
    }
}

impl Store for MemoryStore {}

impl MemoryStore {
    fn insert_new(
        &self,
        collection: Collection,
        doc: Document,
        meta: DocumentMeta,
    ) -> StoreResult<DocumentMeta> {
        let mut collections = self.collections.write();
        let docs = collections.entry(collection).or_default();
        if docs.contains_key(&meta.key) {
            return Err(StoreError::conflict(collection, &meta.key));
        }
        docs.insert(meta.key.clone(), doc);
        Ok(meta)
    }
}
