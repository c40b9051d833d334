use anyhow::anyhow;

use crate::model::{Attributes, Collection, Document, DocumentMeta};
use crate::store::error::{StoreError, StoreResult};

/// Uninterpreted pass-through to the backing document store. One
/// implementation per backend; the controller layer never sees anything
/// below this trait.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Unfiltered, unpaginated scan of the whole collection.
    async fn list(&self, collection: Collection) -> StoreResult<Vec<Document>>;

    /// Store a new document. Fails with `Conflict` when a supplied key
    /// already exists.
    async fn save(&self, collection: Collection, attrs: Attributes) -> StoreResult<DocumentMeta>;

    /// Relation variant of `save`, carrying the two endpoint references.
    /// Missing endpoints fail at this layer, not at validation time.
    async fn save_relation(
        &self,
        collection: Collection,
        from: Option<&str>,
        to: Option<&str>,
        attrs: Attributes,
    ) -> StoreResult<DocumentMeta>;

    async fn fetch(&self, collection: Collection, key: &str) -> StoreResult<Document>;

    /// Fully overwrite the stored attributes. Fails with `NotFound` for
    /// an absent key and `VersionConflict` on a stale `_rev`.
    async fn replace(
        &self,
        collection: Collection,
        key: &str,
        attrs: Attributes,
    ) -> StoreResult<DocumentMeta>;

    /// Shallow-merge `partial` into the stored document. Same failure
    /// modes as `replace`.
    async fn patch(
        &self,
        collection: Collection,
        key: &str,
        partial: Attributes,
    ) -> StoreResult<()>;

    async fn remove(&self, collection: Collection, key: &str) -> StoreResult<()>;
}

/// Administrative operations, outside the request-handling path.
#[async_trait::async_trait]
pub trait AdminStore: Send + Sync {
    async fn drop_collection(&self, collection: Collection) -> StoreResult<()>;
}

pub trait Store: DocumentStore + AdminStore + Send + Sync {}

/// Both endpoint references are required for a relation save to succeed.
pub(crate) fn require_endpoints<'a>(
    collection: Collection,
    from: Option<&'a str>,
    to: Option<&'a str>,
) -> StoreResult<(&'a str, &'a str)> {
    match (from, to) {
        (Some(from), Some(to)) => Ok((from, to)),
        _ => Err(StoreError::Other(anyhow!(
            "invalid edge attribute on {}: both _from and _to are required",
            collection
        ))),
    }
}
