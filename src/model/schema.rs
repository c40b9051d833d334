use serde_json::Value;
use thiserror::Error;

use crate::model::collection::Collection;
use crate::model::common::{FROM_FIELD, KEY_FIELD, TO_FIELD};
use crate::model::document::Attributes;

/// Shape violations found at request-body-parse time. Mapped to
/// `400 Bad Request` at the API boundary.
#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("request body must be a JSON object")]
    NotAnObject,
    #[error("attribute {0} must be a string")]
    NonStringSystemAttribute(&'static str),
    #[error("attribute {0} is not recognized on collection {1}")]
    EndpointOnDocumentCollection(&'static str, Collection),
}

/// Declarative shape for one collection's request bodies. Entities are
/// untyped attribute maps, so the schema only type-checks the system
/// attributes; everything else passes through. Endpoint presence on
/// relation create is deliberately NOT enforced here (absence surfaces
/// as a store-level error, not a validation error).
#[derive(Debug, Clone, Copy)]
pub struct EntitySchema {
    pub collection: Collection,
}

impl EntitySchema {
    pub const fn of(collection: Collection) -> Self {
        Self { collection }
    }

    /// Answers "does this candidate document have an acceptable shape
    /// for this collection", returning the accepted attribute map.
    pub fn validate(&self, body: &Value) -> Result<Attributes, ShapeError> {
        let Some(map) = body.as_object() else {
            return Err(ShapeError::NotAnObject);
        };
        for field in [KEY_FIELD, FROM_FIELD, TO_FIELD] {
            if let Some(value) = map.get(field) {
                if !value.is_string() {
                    return Err(ShapeError::NonStringSystemAttribute(field));
                }
            }
        }
        if !self.collection.is_relation() {
            for field in [FROM_FIELD, TO_FIELD] {
                if map.contains_key(field) {
                    return Err(ShapeError::EndpointOnDocumentCollection(
                        field,
                        self.collection,
                    ));
                }
            }
        }
        Ok(map.clone())
    }
}
