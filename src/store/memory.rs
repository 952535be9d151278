use anyhow::{anyhow, Result};
use itertools::Itertools;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::logic::DocumentFilterEvaluator;
use crate::model::{document_id, Document, FindQuery, Filter};
use crate::store::traits::DocumentStore;

/// Process-local store. Collections keep insertion order, which is also the
/// tie-break for equal sort keys.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn find(&self, collection: &str, query: &FindQuery) -> Result<Vec<Document>> {
        let collections = self.collections.read();
        let Some(documents) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
        let take = query
            .limit
            .map(|limit| usize::try_from(limit).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);

        Ok(documents
            .iter()
            .filter(|document| DocumentFilterEvaluator::matches(document, &query.filter))
            .sorted_by(|a, b| DocumentFilterEvaluator::compare_documents(a, b, &query.sort))
            .skip(skip)
            .take(take)
            .map(|document| match &query.projection {
                Some(projection) => projection.apply(document),
                None => document.clone(),
            })
            .collect())
    }

    async fn count_documents(&self, collection: &str, filter: &Filter) -> Result<u64> {
        let collections = self.collections.read();
        let count = collections
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|document| DocumentFilterEvaluator::matches(document, filter))
                    .count()
            })
            .unwrap_or(0);
        Ok(count as u64)
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let collections = self.collections.read();
        Ok(collections
            .get(collection)
            .and_then(|documents| documents.iter().find(|d| document_id(d) == Some(id)))
            .cloned())
    }

    async fn insert(&self, collection: &str, document: Document) -> Result<()> {
        let id = document_id(&document)
            .ok_or_else(|| anyhow!("Document in {} has no _id", collection))?
            .to_string();

        let mut collections = self.collections.write();
        let documents = collections.entry(collection.to_string()).or_default();
        if documents.iter().any(|d| document_id(d) == Some(id.as_str())) {
            return Err(anyhow!("Document {} already exists in {}", id, collection));
        }
        documents.push(document);
        Ok(())
    }

    async fn replace(&self, collection: &str, id: &str, document: Document) -> Result<bool> {
        let mut collections = self.collections.write();
        let slot = collections
            .get_mut(collection)
            .and_then(|documents| documents.iter_mut().find(|d| document_id(d) == Some(id)));

        match slot {
            Some(existing) => {
                *existing = document;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool> {
        let mut collections = self.collections.write();
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let before = documents.len();
        documents.retain(|d| document_id(d) != Some(id));
        Ok(documents.len() < before)
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64> {
        let mut collections = self.collections.write();
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(0);
        };
        let before = documents.len();
        documents.retain(|d| !DocumentFilterEvaluator::matches(d, filter));
        Ok((before - documents.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Projection, SortKey};
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        for (id, name, cost) in [("1", "Alpha", 9000), ("2", "Beta", 7000), ("3", "Gamma", 8000)] {
            store
                .insert("bootcamps", doc(json!({"_id": id, "name": name, "averageCost": cost})))
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_find_sort_skip_limit_select() {
        let store = seeded().await;
        let query = FindQuery::new(Filter::new())
            .sort(vec![SortKey::asc("averageCost")])
            .skip(1)
            .limit(1)
            .select(Projection::parse("name"));

        let found = store.find("bootcamps", &query).await.unwrap();
        assert_eq!(found, vec![doc(json!({"_id": "3", "name": "Gamma"}))]);
    }

    #[tokio::test]
    async fn test_count_respects_filter() {
        let store = seeded().await;
        let filter = Filter::eq("name", json!("Beta"));

        assert_eq!(store.count_documents("bootcamps", &filter).await.unwrap(), 1);
        assert_eq!(store.count_documents("bootcamps", &Filter::new()).await.unwrap(), 3);
        assert_eq!(store.count_documents("missing", &Filter::new()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let store = seeded().await;
        let result = store.insert("bootcamps", doc(json!({"_id": "1"}))).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_replace_and_delete() {
        let store = seeded().await;

        assert!(store.replace("bootcamps", "2", doc(json!({"_id": "2", "name": "Beta II"}))).await.unwrap());
        assert!(!store.replace("bootcamps", "9", doc(json!({"_id": "9"}))).await.unwrap());
        let found = store.find_by_id("bootcamps", "2").await.unwrap().unwrap();
        assert_eq!(found["name"], "Beta II");

        assert!(store.delete("bootcamps", "2").await.unwrap());
        assert!(!store.delete("bootcamps", "2").await.unwrap());

        let removed = store
            .delete_many("bootcamps", &Filter::eq("name", json!("Alpha")))
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.count_documents("bootcamps", &Filter::new()).await.unwrap(), 1);
    }
}
