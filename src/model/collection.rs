use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two storage flavours: plain documents, and directed relations
/// carrying `_from`/`_to` endpoint references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Document,
    Relation,
}

/// The seven backing collections of the taxonomy graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Taxonomy,
    Nodes,
    NodeTypes,
    Fields,
    TaxonomyContains,
    Edges,
    HasField,
}

impl Collection {
    pub const ALL: [Collection; 7] = [
        Collection::Taxonomy,
        Collection::Nodes,
        Collection::NodeTypes,
        Collection::Fields,
        Collection::TaxonomyContains,
        Collection::Edges,
        Collection::HasField,
    ];

    /// Route segment and storage name for this collection.
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Taxonomy => "taxonomy",
            Collection::Nodes => "nodes",
            Collection::NodeTypes => "node_types",
            Collection::Fields => "fields",
            Collection::TaxonomyContains => "taxonomy_contains",
            Collection::Edges => "edges",
            Collection::HasField => "has_field",
        }
    }

    pub fn kind(&self) -> CollectionKind {
        match self {
            Collection::Taxonomy
            | Collection::Nodes
            | Collection::NodeTypes
            | Collection::Fields => CollectionKind::Document,
            Collection::TaxonomyContains | Collection::Edges | Collection::HasField => {
                CollectionKind::Relation
            }
        }
    }

    pub fn is_relation(&self) -> bool {
        self.kind() == CollectionKind::Relation
    }

    /// Fully-qualified identifier for a document in this collection.
    pub fn qualified_id(&self, key: &str) -> String {
        format!("{}/{}", self.name(), key)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| format!("unknown collection: {}", s))
    }
}
