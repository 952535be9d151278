use anyhow::Result;
use serde_json::{Number, Value};

use crate::model::{Document, FindQuery, Filter, Parent, Rollup};
use crate::store::DocumentStore;

/// Mean of a numeric field, rounded up to `round_up_to` when given.
pub fn mean_of(documents: &[Document], field: &str, round_up_to: Option<f64>) -> Option<f64> {
    let values: Vec<f64> = documents
        .iter()
        .filter_map(|document| document.get(field).and_then(Value::as_f64))
        .collect();
    if values.is_empty() {
        return None;
    }

    let mean = values.iter().sum::<f64>() / values.len() as f64;
    Some(match round_up_to {
        Some(step) if step > 0.0 => (mean / step).ceil() * step,
        _ => mean,
    })
}

/// Recompute `rollup.target_field` on the parent from all of its children.
/// A parent with no children loses the field.
pub async fn refresh_rollup<S: DocumentStore + ?Sized>(
    store: &S,
    child_collection: &str,
    parent: &Parent,
    rollup: &Rollup,
    parent_id: &str,
) -> Result<()> {
    let Some(mut target) = store.find_by_id(parent.collection, parent_id).await? else {
        return Ok(());
    };

    let children = store
        .find(
            child_collection,
            &FindQuery::new(Filter::eq(parent.field, Value::String(parent_id.to_string()))),
        )
        .await?;

    match mean_of(&children, rollup.source_field, rollup.round_up_to).and_then(Number::from_f64) {
        Some(number) => {
            target.insert(rollup.target_field.to_string(), Value::Number(number));
        }
        None => {
            target.remove(rollup.target_field);
        }
    }

    log::debug!(
        "Refreshed {}.{} for {} from {} {}",
        parent.collection,
        rollup.target_field,
        parent_id,
        children.len(),
        child_collection
    );
    store.replace(parent.collection, parent_id, target).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_mean_rounding() {
        let docs = vec![doc(json!({"tuition": 8000})), doc(json!({"tuition": 8005}))];
        assert_eq!(mean_of(&docs, "tuition", None), Some(8002.5));
        assert_eq!(mean_of(&docs, "tuition", Some(10.0)), Some(8010.0));
        assert_eq!(mean_of(&[], "tuition", Some(10.0)), None);
    }

    #[tokio::test]
    async fn test_refresh_sets_and_clears_target() {
        let store = MemoryStore::new();
        store.insert("bootcamps", doc(json!({"_id": "b1", "name": "A"}))).await.unwrap();
        store
            .insert("reviews", doc(json!({"_id": "r1", "rating": 8, "bootcamp": "b1"})))
            .await
            .unwrap();
        store
            .insert("reviews", doc(json!({"_id": "r2", "rating": 5, "bootcamp": "b1"})))
            .await
            .unwrap();

        let parent = Parent { field: "bootcamp", collection: "bootcamps", label: "Bootcamp" };
        let rollup = Rollup { source_field: "rating", target_field: "averageRating", round_up_to: None };

        refresh_rollup(&store, "reviews", &parent, &rollup, "b1").await.unwrap();
        let bootcamp = store.find_by_id("bootcamps", "b1").await.unwrap().unwrap();
        assert_eq!(bootcamp["averageRating"], json!(6.5));

        store.delete_many("reviews", &Filter::new()).await.unwrap();
        refresh_rollup(&store, "reviews", &parent, &rollup, "b1").await.unwrap();
        let bootcamp = store.find_by_id("bootcamps", "b1").await.unwrap().unwrap();
        assert!(bootcamp.get("averageRating").is_none());
    }
}
