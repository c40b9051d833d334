use anyhow::{Context, Result};
use serde_json::{json, Value};

use crate::model::{Attributes, Collection};
use crate::store::DocumentStore;

fn attrs(value: Value) -> Attributes {
    value.as_object().cloned().unwrap_or_default()
}

/// Insert a tiny demonstration taxonomy touching all seven collections.
/// Skipped when the node collection already holds data.
pub async fn load_seed_data<S: DocumentStore>(store: &S) -> Result<()> {
    if !store
        .list(Collection::Nodes)
        .await
        .context("Failed to inspect nodes collection")?
        .is_empty()
    {
        log::info!("seed data already present, skipping");
        return Ok(());
    }

    store
        .save(
            Collection::Taxonomy,
            attrs(json!({"_key": "animals", "name": "Animal Taxonomy"})),
        )
        .await
        .context("Failed to seed taxonomy")?;

    store
        .save(
            Collection::NodeTypes,
            attrs(json!({"_key": "class", "name": "class"})),
        )
        .await
        .context("Failed to seed node type")?;
    store
        .save(
            Collection::NodeTypes,
            attrs(json!({"_key": "species", "name": "species"})),
        )
        .await
        .context("Failed to seed node type")?;

    store
        .save(
            Collection::Nodes,
            attrs(json!({"_key": "animal", "name": "Animal"})),
        )
        .await
        .context("Failed to seed node")?;
    store
        .save(
            Collection::Nodes,
            attrs(json!({"_key": "dog", "name": "Dog"})),
        )
        .await
        .context("Failed to seed node")?;

    store
        .save(
            Collection::Fields,
            attrs(json!({"_key": "name", "name": "name", "type": "string"})),
        )
        .await
        .context("Failed to seed field")?;
    store
        .save(
            Collection::Fields,
            attrs(json!({"_key": "legs", "name": "legs", "type": "int"})),
        )
        .await
        .context("Failed to seed field")?;

    store
        .save_relation(
            Collection::TaxonomyContains,
            Some("taxonomy/animals"),
            Some("nodes/animal"),
            attrs(json!({})),
        )
        .await
        .context("Failed to seed taxonomy_contains relation")?;

    store
        .save_relation(
            Collection::Edges,
            Some("nodes/dog"),
            Some("nodes/animal"),
            attrs(json!({"label": "is_a"})),
        )
        .await
        .context("Failed to seed edge")?;

    store
        .save_relation(
            Collection::HasField,
            Some("node_types/species"),
            Some("fields/legs"),
            attrs(json!({})),
        )
        .await
        .context("Failed to seed has_field relation")?;

    Ok(())
}
