use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::collection::Collection;
use crate::model::common::{
    generate_key, generate_rev, Id, FROM_FIELD, ID_FIELD, KEY_FIELD, REV_FIELD, TO_FIELD,
};

/// Caller-supplied attribute set, as parsed from a request body.
pub type Attributes = serde_json::Map<String, Value>;

/// A stored document: attributes plus the `_key`/`_id`/`_rev` system
/// fields (and `_from`/`_to` for relation collections).
pub type Document = serde_json::Map<String, Value>;

/// Store-assigned metadata returned by save/replace, merged into the
/// response body by the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMeta {
    #[serde(rename = "_key")]
    pub key: Id,
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(rename = "_rev")]
    pub rev: String,
}

impl DocumentMeta {
    fn assigned(collection: Collection, key: Id) -> Self {
        let id = collection.qualified_id(&key);
        Self {
            key,
            id,
            rev: generate_rev(),
        }
    }

    /// Write the system fields into `doc`, overwriting whatever the
    /// caller supplied for them.
    pub fn apply(&self, doc: &mut Document) {
        doc.insert(KEY_FIELD.to_string(), Value::String(self.key.clone()));
        doc.insert(ID_FIELD.to_string(), Value::String(self.id.clone()));
        doc.insert(REV_FIELD.to_string(), Value::String(self.rev.clone()));
    }
}

pub fn document_key(doc: &Document) -> Option<&str> {
    doc.get(KEY_FIELD).and_then(Value::as_str)
}

pub fn document_rev(doc: &Document) -> Option<&str> {
    doc.get(REV_FIELD).and_then(Value::as_str)
}

/// A write body without `_rev` always passes the revision check; a stale
/// `_rev` is a version conflict at the store layer.
pub fn revision_matches(attrs: &Attributes, current_rev: &str) -> bool {
    match attrs.get(REV_FIELD).and_then(Value::as_str) {
        Some(supplied) => supplied == current_rev,
        None => true,
    }
}

/// Build a fresh document from caller attributes. A supplied `_key` is
/// honored (uniqueness is the store's concern); `_id`/`_rev` from the
/// body are discarded.
pub fn new_document(collection: Collection, attrs: Attributes) -> (Document, DocumentMeta) {
    let key = attrs
        .get(KEY_FIELD)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_else(generate_key);
    let meta = DocumentMeta::assigned(collection, key);
    let mut doc = attrs;
    meta.apply(&mut doc);
    (doc, meta)
}

/// Relation variant of [`new_document`]: the endpoint references are
/// written as `_from`/`_to`.
pub fn new_relation_document(
    collection: Collection,
    from: &str,
    to: &str,
    attrs: Attributes,
) -> (Document, DocumentMeta) {
    let (mut doc, meta) = new_document(collection, attrs);
    doc.insert(FROM_FIELD.to_string(), Value::String(from.to_string()));
    doc.insert(TO_FIELD.to_string(), Value::String(to.to_string()));
    (doc, meta)
}

/// Full overwrite: `attrs` become the document's attributes, under the
/// existing key and a fresh revision. Relation endpoints persist when the
/// replacement body omits them and are overwritten when it supplies
/// string values.
pub fn replace_document(
    collection: Collection,
    existing: &Document,
    attrs: Attributes,
) -> (Document, DocumentMeta) {
    let key = document_key(existing).unwrap_or_default().to_string();
    let meta = DocumentMeta::assigned(collection, key);
    let mut doc = attrs;
    if collection.is_relation() {
        for field in [FROM_FIELD, TO_FIELD] {
            if !matches!(doc.get(field), Some(Value::String(_))) {
                doc.remove(field);
                if let Some(endpoint) = existing.get(field) {
                    doc.insert(field.to_string(), endpoint.clone());
                }
            }
        }
    }
    meta.apply(&mut doc);
    (doc, meta)
}

/// Shallow merge: provided fields overwrite, absent fields are untouched.
/// System fields never merge from the body.
pub fn patch_document(
    collection: Collection,
    existing: &Document,
    partial: Attributes,
) -> (Document, DocumentMeta) {
    let key = document_key(existing).unwrap_or_default().to_string();
    let meta = DocumentMeta::assigned(collection, key);
    let mut doc = existing.clone();
    for (field, value) in partial {
        if field == KEY_FIELD || field == ID_FIELD || field == REV_FIELD {
            continue;
        }
        doc.insert(field, value);
    }
    meta.apply(&mut doc);
    (doc, meta)
}
