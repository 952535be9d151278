use anyhow::Result;
use serde_json::Value;
use std::collections::HashMap;

use crate::logic::document_filter::lookup;
use crate::model::{CompareOp, Condition, Document, FindQuery, Filter, Relation};
use crate::store::DocumentStore;

/// Run a query and inline its relations, the way a list endpoint sees it.
pub async fn find_populated<S: DocumentStore + ?Sized>(
    store: &S,
    collection: &str,
    query: &FindQuery,
) -> Result<Vec<Document>> {
    let mut documents = store.find(collection, query).await?;
    for relation in &query.populate {
        populate(store, &mut documents, relation).await?;
    }
    Ok(documents)
}

/// Replace references (or fill virtual fields) for one relation, using one
/// lookup query regardless of the number of documents.
pub async fn populate<S: DocumentStore + ?Sized>(
    store: &S,
    documents: &mut [Document],
    relation: &Relation,
) -> Result<()> {
    let keys: Vec<Value> = documents
        .iter()
        .filter_map(|document| lookup(document, relation.local_field))
        .filter(|value| value.is_string())
        .cloned()
        .collect();

    if keys.is_empty() {
        if relation.many {
            for document in documents.iter_mut() {
                document.insert(relation.path.to_string(), Value::Array(Vec::new()));
            }
        }
        return Ok(());
    }

    let filter = Filter::new().with(
        relation.foreign_field,
        Condition::Compare(vec![(CompareOp::In, Value::Array(keys))]),
    );
    let related = store.find(relation.collection, &FindQuery::new(filter)).await?;
    let projection = relation.projection();

    let mut by_key: HashMap<String, Vec<Value>> = HashMap::new();
    for document in &related {
        let Some(key) = lookup(document, relation.foreign_field).and_then(Value::as_str) else {
            continue;
        };
        let shaped = match &projection {
            Some(projection) => projection.apply(document),
            None => document.clone(),
        };
        by_key.entry(key.to_string()).or_default().push(Value::Object(shaped));
    }

    for document in documents.iter_mut() {
        let key = lookup(document, relation.local_field)
            .and_then(Value::as_str)
            .map(str::to_string);

        if relation.many {
            let children = key.and_then(|k| by_key.get(&k).cloned()).unwrap_or_default();
            document.insert(relation.path.to_string(), Value::Array(children));
        } else if let Some(key) = key {
            let target = by_key
                .get(&key)
                .and_then(|found| found.first().cloned())
                .unwrap_or(Value::Null);
            document.insert(relation.path.to_string(), target);
        }
    }

    Ok(())
}
