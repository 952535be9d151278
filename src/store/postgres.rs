use anyhow::{Context, Result};
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool, Postgres, QueryBuilder, Row};

use crate::model::{document_id, CompareOp, Condition, Document, FindQuery, Filter, SortKey, Sphere};
use crate::store::traits::DocumentStore;

/// Documents live as JSONB rows in one `documents` table keyed by
/// `(collection, id)`. Filters and sorts are translated to JSONB path
/// expressions with every user-supplied value bound as a parameter.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Create the documents table and its indexes if they are missing
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                body JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                PRIMARY KEY (collection, id)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create documents table")?;

        sqlx::query("CREATE INDEX IF NOT EXISTS documents_body_idx ON documents USING GIN (body)")
            .execute(&self.pool)
            .await
            .context("Failed to create documents index")?;

        Ok(())
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn field_path(field: &str) -> Vec<String> {
    field.split('.').map(str::to_string).collect()
}

/// Text that Rust's `f64` parser reads as a finite number.
const NUMERIC_TEXT: &str = r"'^\s*[+-]?([0-9]+\.?[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+)?\s*$'";

/// Scalar text of the current array item; `NULL` for JSON null.
const ITEM_TEXT: &str = "(item.value #>> '{}')";

/// Numeric value of the item when it is a number or numeric-looking text.
fn item_number() -> String {
    format!(
        "(CASE WHEN jsonb_typeof(item.value) = 'number' \
         OR (jsonb_typeof(item.value) = 'string' AND {ITEM_TEXT} ~ {NUMERIC_TEXT}) \
         THEN {ITEM_TEXT}::numeric END)"
    )
}

/// Finite number a query operand reads as, matching the in-memory evaluator.
fn operand_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

/// `EXISTS` over the field value, or its elements when it is an array.
/// The caller pushes the item predicate and the closing parenthesis.
fn push_items(builder: &mut QueryBuilder<'_, Postgres>, path: &[String]) {
    builder.push("EXISTS (SELECT 1 FROM jsonb_array_elements(CASE WHEN jsonb_typeof(body #> ");
    builder.push_bind(path.to_vec());
    builder.push(") = 'array' THEN body #> ");
    builder.push_bind(path.to_vec());
    builder.push(" ELSE jsonb_build_array(body #> ");
    builder.push_bind(path.to_vec());
    builder.push(") END) AS item(value) WHERE ");
}

/// Equality of one item with a query value. Text operands also match
/// numbers and booleans that read the same.
fn push_item_equals(builder: &mut QueryBuilder<'_, Postgres>, expected: &Value) {
    let Value::String(text) = expected else {
        builder.push("item.value = ");
        builder.push_bind(Json(expected.clone()));
        return;
    };

    builder.push("(CASE jsonb_typeof(item.value) WHEN 'string' THEN ");
    builder.push(ITEM_TEXT);
    builder.push(" = ");
    builder.push_bind(text.clone());
    if let Some(number) = operand_number(expected) {
        builder.push(" WHEN 'number' THEN ");
        builder.push(ITEM_TEXT);
        builder.push("::numeric = ");
        builder.push_bind(number.to_string());
        builder.push("::numeric");
    }
    if let Ok(flag) = text.parse::<bool>() {
        builder.push(" WHEN 'boolean' THEN ");
        builder.push(ITEM_TEXT);
        builder.push("::boolean = ");
        builder.push_bind(flag);
    }
    builder.push(" ELSE FALSE END)");
}

fn push_equals(builder: &mut QueryBuilder<'_, Postgres>, path: Vec<String>, expected: &Value) {
    builder.push("(");
    if !expected.is_string() {
        // Whole-value equality, e.g. an array against an array.
        builder.push("body #> ");
        builder.push_bind(path.clone());
        builder.push(" = ");
        builder.push_bind(Json(expected.clone()));
        builder.push(" OR ");
    }
    push_items(builder, &path);
    push_item_equals(builder, expected);
    builder.push("))");
}

fn push_comparison(builder: &mut QueryBuilder<'_, Postgres>, path: Vec<String>, op: CompareOp, operand: &Value) {
    let symbol = match op {
        CompareOp::Gt => ">",
        CompareOp::Gte => ">=",
        CompareOp::Lt => "<",
        CompareOp::Lte => "<=",
        CompareOp::In => {
            let candidates = match operand {
                Value::Array(items) => items.clone(),
                single => vec![single.clone()],
            };
            push_items(builder, &path);
            builder.push("(FALSE");
            for candidate in &candidates {
                builder.push(" OR ");
                push_item_equals(builder, candidate);
            }
            builder.push("))");
            return;
        }
    };

    // Numeric when both sides read as numbers, byte-wise text for two strings.
    let number = operand_number(operand);
    let text = operand.as_str();
    push_items(builder, &path);
    if number.is_none() && text.is_none() {
        builder.push("FALSE)");
        return;
    }

    builder.push("(CASE");
    if let Some(number) = number {
        let item = item_number();
        builder.push(format!(" WHEN {item} IS NOT NULL THEN {item} {symbol} "));
        builder.push_bind(number.to_string());
        builder.push("::numeric");
    }
    if let Some(text) = text {
        builder.push(" WHEN jsonb_typeof(item.value) = 'string' THEN ");
        builder.push(ITEM_TEXT);
        builder.push(" COLLATE \"C\" ");
        builder.push(symbol);
        builder.push(" ");
        builder.push_bind(text.to_string());
    }
    builder.push(" ELSE FALSE END))");
}

fn push_prefix(builder: &mut QueryBuilder<'_, Postgres>, path: Vec<String>, prefix: &str) {
    push_items(builder, &path);
    builder.push("(CASE WHEN jsonb_typeof(item.value) = 'string' THEN left(lower(");
    builder.push(ITEM_TEXT);
    builder.push("), char_length(");
    builder.push_bind(prefix.to_string());
    builder.push(")) = ");
    builder.push_bind(prefix.to_string());
    builder.push(" ELSE FALSE END))");
}

/// Haversine distance from the sphere center, in radians, to a GeoJSON point.
fn push_within(builder: &mut QueryBuilder<'_, Postgres>, path: Vec<String>, sphere: &Sphere) {
    let mut lng_path = path.clone();
    lng_path.extend(["coordinates".to_string(), "0".to_string()]);
    let mut lat_path = path;
    lat_path.extend(["coordinates".to_string(), "1".to_string()]);
    let [center_lng, center_lat] = sphere.center;

    builder.push("(CASE WHEN jsonb_typeof(body #> ");
    builder.push_bind(lng_path.clone());
    builder.push(") = 'number' AND jsonb_typeof(body #> ");
    builder.push_bind(lat_path.clone());
    builder.push(") = 'number' THEN 2 * asin(LEAST(1.0, sqrt(power(sin((radians((body #>> ");
    builder.push_bind(lat_path.clone());
    builder.push(")::float8) - radians(");
    builder.push_bind(center_lat);
    builder.push(")) / 2), 2) + cos(radians(");
    builder.push_bind(center_lat);
    builder.push(")) * cos(radians((body #>> ");
    builder.push_bind(lat_path);
    builder.push(")::float8)) * power(sin((radians((body #>> ");
    builder.push_bind(lng_path);
    builder.push(")::float8) - radians(");
    builder.push_bind(center_lng);
    builder.push(")) / 2), 2)))) <= ");
    builder.push_bind(sphere.radius);
    builder.push(" ELSE FALSE END)");
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, collection: &str, filter: &Filter) {
    builder.push(" WHERE collection = ");
    builder.push_bind(collection.to_string());

    for (field, condition) in filter.iter() {
        builder.push(" AND ");
        let path = field_path(field);
        match condition {
            Condition::Equals(expected) => push_equals(builder, path, expected),
            Condition::Compare(ops) => {
                builder.push("(TRUE");
                for (op, operand) in ops {
                    builder.push(" AND ");
                    push_comparison(builder, path.clone(), *op, operand);
                }
                builder.push(")");
            }
            Condition::Prefix(prefix) => push_prefix(builder, path, prefix),
            Condition::Within(sphere) => push_within(builder, path, sphere),
        }
    }
}

/// Same total order as the in-memory store: missing/null, numbers, strings,
/// objects, arrays, booleans; strings compared byte-wise.
fn push_sort_key(builder: &mut QueryBuilder<'_, Postgres>, key: &SortKey) {
    let path = field_path(&key.field);
    let direction = if key.descending { " DESC, " } else { " ASC, " };

    builder.push("CASE jsonb_typeof(body #> ");
    builder.push_bind(path.clone());
    builder.push(
        ") WHEN 'number' THEN 1 WHEN 'string' THEN 2 WHEN 'object' THEN 3 \
         WHEN 'array' THEN 4 WHEN 'boolean' THEN 5 ELSE 0 END",
    );
    builder.push(direction);

    builder.push("CASE WHEN jsonb_typeof(body #> ");
    builder.push_bind(path.clone());
    builder.push(") = 'number' THEN (body #>> ");
    builder.push_bind(path.clone());
    builder.push(")::numeric END");
    builder.push(direction);

    builder.push("CASE WHEN jsonb_typeof(body #> ");
    builder.push_bind(path.clone());
    builder.push(") IN ('string', 'boolean') THEN body #>> ");
    builder.push_bind(path.clone());
    builder.push(" END COLLATE \"C\"");
    builder.push(direction);

    builder.push("body #> ");
    builder.push_bind(path);
    builder.push(direction);
}

fn into_document(body: Value) -> Result<Document> {
    match body {
        Value::Object(map) => Ok(map),
        other => Err(anyhow::anyhow!("Stored body is not an object: {}", other)),
    }
}

#[async_trait::async_trait]
impl DocumentStore for PostgresStore {
    async fn find(&self, collection: &str, query: &FindQuery) -> Result<Vec<Document>> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT body FROM documents");
        push_filter(&mut builder, collection, &query.filter);

        builder.push(" ORDER BY ");
        for key in &query.sort {
            push_sort_key(&mut builder, key);
        }
        builder.push("created_at, id");

        builder.push(" OFFSET ");
        builder.push_bind(i64::try_from(query.skip).unwrap_or(i64::MAX));
        if let Some(limit) = query.limit {
            builder.push(" LIMIT ");
            builder.push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Failed to query {}", collection))?;

        rows.into_iter()
            .map(|row| -> Result<Document> {
                let Json(body): Json<Value> = row.try_get("body")?;
                let document = into_document(body)?;
                Ok(match &query.projection {
                    Some(projection) => projection.apply(&document),
                    None => document,
                })
            })
            .collect()
    }

    async fn count_documents(&self, collection: &str, filter: &Filter) -> Result<u64> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) AS count FROM documents");
        push_filter(&mut builder, collection, filter);

        let row = builder
            .build()
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("Failed to count {}", collection))?;
        let count: i64 = row.try_get("count")?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let row = sqlx::query("SELECT body FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch document")?;

        let Some(row) = row else {
            return Ok(None);
        };
        let Json(body): Json<Value> = row.try_get("body")?;
        into_document(body).map(Some)
    }

    async fn insert(&self, collection: &str, document: Document) -> Result<()> {
        let id = document_id(&document)
            .context("Document has no _id")?
            .to_string();

        sqlx::query("INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(id)
            .bind(Json(Value::Object(document)))
            .execute(&self.pool)
            .await
            .context("Failed to insert document")?;

        Ok(())
    }

    async fn replace(&self, collection: &str, id: &str, document: Document) -> Result<bool> {
        let result = sqlx::query("UPDATE documents SET body = $3 WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .bind(Json(Value::Object(document)))
            .execute(&self.pool)
            .await
            .context("Failed to replace document")?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete document")?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64> {
        let mut builder = QueryBuilder::<Postgres>::new("DELETE FROM documents");
        push_filter(&mut builder, collection, filter);

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to delete from {}", collection))?;

        Ok(result.rows_affected())
    }
}
