use crate::model::{Document, FindQuery, Filter};
use anyhow::Result;

/// Document persistence, one named collection per resource.
///
/// `find` applies the filter, sort, skip, limit and projection of the query.
/// Relation expansion is layered on top by `logic::populate`.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find(&self, collection: &str, query: &FindQuery) -> Result<Vec<Document>>;
    async fn count_documents(&self, collection: &str, filter: &Filter) -> Result<u64>;
    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>>;
    async fn insert(&self, collection: &str, document: Document) -> Result<()>;
    /// Replace the whole document; false when no document has this id.
    async fn replace(&self, collection: &str, id: &str, document: Document) -> Result<bool>;
    async fn delete(&self, collection: &str, id: &str) -> Result<bool>;
    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64>;
}
