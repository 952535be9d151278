//! Sample bootcamps, courses, reviews and users for local development.

pub mod data;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::logic::refresh_rollup;
use crate::model::{to_document, Bootcamp, Course, Resource, Review, User};
use crate::store::DocumentStore;

/// Insert the sample dataset and compute the bootcamp rollups.
/// Documents that already exist are left untouched.
pub async fn load_seed_data<S: DocumentStore + ?Sized>(store: &S) -> Result<()> {
    let users = insert_all::<S, User>(store, data::users()).await?;
    let bootcamps = insert_all::<S, Bootcamp>(store, data::bootcamps()).await?;
    let courses = insert_all::<S, Course>(store, data::courses()).await?;
    let reviews = insert_all::<S, Review>(store, data::reviews()).await?;

    for bootcamp in data::bootcamps() {
        let Some(id) = bootcamp.get("_id").and_then(Value::as_str) else {
            continue;
        };
        refresh_children::<S, Course>(store, id).await?;
        refresh_children::<S, Review>(store, id).await?;
    }

    log::info!(
        "Seeded {} users, {} bootcamps, {} courses, {} reviews",
        users,
        bootcamps,
        courses,
        reviews
    );
    Ok(())
}

async fn insert_all<S: DocumentStore + ?Sized, R: Resource>(
    store: &S,
    records: Vec<Value>,
) -> Result<usize> {
    let mut inserted = 0;
    for record in records {
        let mut entity: R = serde_json::from_value(record)
            .with_context(|| format!("invalid seed {}", R::LABEL))?;
        entity.prepare();

        let problems = entity.validate();
        if !problems.is_empty() {
            anyhow::bail!("invalid seed {}: {}", R::LABEL, problems.join(", "));
        }

        let document = to_document(&entity)?;
        let id = crate::model::document_id(&document).unwrap_or_default().to_string();
        if store.find_by_id(R::COLLECTION, &id).await?.is_some() {
            continue;
        }
        store.insert(R::COLLECTION, document).await?;
        inserted += 1;
    }
    Ok(inserted)
}

async fn refresh_children<S: DocumentStore + ?Sized, R: Resource>(store: &S, parent_id: &str) -> Result<()> {
    if let (Some(parent), Some(rollup)) = (R::PARENT, R::rollup()) {
        refresh_rollup(store, R::COLLECTION, &parent, &rollup, parent_id).await?;
    }
    Ok(())
}
