use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::config::QueryConfig;
use crate::geocode::{Geocoder, OfflineGeocoder};
use crate::logic::{refresh_rollup, AdvancedResults, AllowList};
use crate::model::{
    document_id, generate_id, is_valid_id, timestamp_now, to_document, Bootcamp, Condition,
    DataEnvelope, Document, FindQuery, Filter, ListEnvelope, QueryRequest, Resource,
    ResultEnvelope, Sphere, CREATED_AT_FIELD, ID_FIELD,
};
use crate::store::DocumentStore;

/// Shared handler state: the store, the geocoder and the immutable query policy.
pub struct AppState<S> {
    pub store: Arc<S>,
    pub geocoder: Arc<dyn Geocoder>,
    pub query: QueryConfig,
}

impl<S> AppState<S> {
    /// State with an empty offline geocoder.
    pub fn new(store: Arc<S>, query: QueryConfig) -> Self {
        Self {
            store,
            geocoder: Arc::new(OfflineGeocoder::new()),
            query,
        }
    }

    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = geocoder;
        self
    }
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            geocoder: Arc::clone(&self.geocoder),
            query: self.query,
        }
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

fn adapter_for<R: Resource>(query: &QueryConfig) -> AdvancedResults {
    AdvancedResults::new(
        AllowList::new(R::ALLOW_LIST.iter().copied()),
        query.pagination_defaults(),
    )
    .with_populate(R::relations())
}

fn envelope_response(envelope: ResultEnvelope, query: &QueryConfig) -> Response {
    let status = if envelope.is_success() || !query.strict_status {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    (status, Json(envelope)).into_response()
}

// GET /api/v1/<resource>
pub async fn list_resources<S: DocumentStore + 'static, R: Resource>(
    State(state): State<AppState<S>>,
    request: QueryRequest,
) -> ApiResult<Response> {
    let envelope = adapter_for::<R>(&state.query)
        .run(state.store.as_ref(), R::COLLECTION, &request)
        .await?;
    Ok(envelope_response(envelope, &state.query))
}

// GET /api/v1/bootcamps/:id/<resource>
pub async fn list_children<S: DocumentStore + 'static, R: Resource>(
    State(state): State<AppState<S>>,
    Path(parent_id): Path<String>,
    request: QueryRequest,
) -> ApiResult<Response> {
    let mut adapter = adapter_for::<R>(&state.query);
    if let Some(parent) = R::PARENT {
        adapter = adapter.with_scope(parent.field, Value::String(parent_id));
    }

    let envelope = adapter
        .run(state.store.as_ref(), R::COLLECTION, &request)
        .await?;
    Ok(envelope_response(envelope, &state.query))
}

// GET /api/v1/bootcamps/radius/:zipcode/:distance
pub async fn bootcamps_in_radius<S: DocumentStore + 'static>(
    State(state): State<AppState<S>>,
    Path((zipcode, distance)): Path<(String, String)>,
) -> ApiResult<Json<ListEnvelope>> {
    let distance = parse_distance(&distance)?;
    let center = state.geocoder.geocode(&zipcode).await?;
    let center = center.ok_or(ApiError::UnknownLocation(zipcode))?;

    let sphere = Sphere::around(&center, distance);
    let query = FindQuery::new(Filter::new().with("location", Condition::Within(sphere)));
    let bootcamps = state.store.find(Bootcamp::COLLECTION, &query).await?;

    Ok(Json(ListEnvelope::new(bootcamps)))
}

/// Distance in kilometres; any finite, non-negative number.
fn parse_distance(raw: &str) -> ApiResult<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|distance| distance.is_finite() && *distance >= 0.0)
        .ok_or_else(|| ApiError::InvalidParameter(format!("Invalid distance: {raw}")))
}

// GET /api/v1/<resource>/:id
pub async fn get_resource<S: DocumentStore + 'static, R: Resource>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> ApiResult<Json<DataEnvelope<Document>>> {
    let document = load_existing::<S, R>(state.store.as_ref(), &id).await?;
    Ok(Json(DataEnvelope::new(document)))
}

// POST /api/v1/<resource>
pub async fn create_resource<S: DocumentStore + 'static, R: Resource>(
    State(state): State<AppState<S>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<DataEnvelope<Document>>)> {
    let document = create_document::<S, R>(&state, read_body(body)?, None).await?;
    Ok((StatusCode::CREATED, Json(DataEnvelope::new(document))))
}

// POST /api/v1/bootcamps/:id/<resource>
pub async fn create_child<S: DocumentStore + 'static, R: Resource>(
    State(state): State<AppState<S>>,
    Path(parent_id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<DataEnvelope<Document>>)> {
    let document = create_document::<S, R>(&state, read_body(body)?, Some(&parent_id)).await?;
    Ok((StatusCode::CREATED, Json(DataEnvelope::new(document))))
}

// PUT /api/v1/<resource>/:id
pub async fn update_resource<S: DocumentStore + 'static, R: Resource>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<DataEnvelope<Document>>> {
    let store = state.store.as_ref();
    let Value::Object(changes) = read_body(body)? else {
        return Err(ApiError::InvalidBody("Request body must be a JSON object".to_string()));
    };

    let existing = load_existing::<S, R>(store, &id).await?;
    let mut merged = existing.clone();
    for (field, value) in changes {
        if field == ID_FIELD || field == CREATED_AT_FIELD {
            continue;
        }
        merged.insert(field, value);
    }

    let mut entity = build_entity::<R>(merged)?;
    let previous = serde_json::from_value::<R>(Value::Object(existing.clone())).ok();
    locate(
        state.geocoder.as_ref(),
        &mut entity,
        previous.as_ref().and_then(R::address),
    )
    .await?;

    let document = to_document(&entity)?;
    ensure_parent_exists::<S, R>(store, &document).await?;
    ensure_unique::<S, R>(store, &document).await?;

    if !store.replace(R::COLLECTION, &id, document.clone()).await? {
        return Err(ApiError::not_found(R::LABEL, id));
    }

    refresh_parent::<S, R>(store, &existing).await?;
    if parent_id::<R>(&existing) != parent_id::<R>(&document) {
        refresh_parent::<S, R>(store, &document).await?;
    }

    log::info!("Updated {} {}", R::LABEL, id);
    Ok(Json(DataEnvelope::new(document)))
}

// DELETE /api/v1/<resource>/:id
pub async fn delete_resource<S: DocumentStore + 'static, R: Resource>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> ApiResult<Json<DataEnvelope<Value>>> {
    let store = state.store.as_ref();
    let existing = load_existing::<S, R>(store, &id).await?;

    for cascade in R::cascade() {
        let removed = store
            .delete_many(cascade.collection, &Filter::eq(cascade.field, Value::String(id.clone())))
            .await?;
        if removed > 0 {
            log::info!("Removed {} {} of {} {}", removed, cascade.collection, R::LABEL, id);
        }
    }

    if !store.delete(R::COLLECTION, &id).await? {
        return Err(ApiError::not_found(R::LABEL, id));
    }
    refresh_parent::<S, R>(store, &existing).await?;

    log::info!("Deleted {} {}", R::LABEL, id);
    Ok(Json(DataEnvelope::new(json!({}))))
}

fn read_body(body: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))
}

async fn load_existing<S: DocumentStore + ?Sized, R: Resource>(store: &S, id: &str) -> ApiResult<Document> {
    if !is_valid_id(id) {
        return Err(ApiError::not_found(R::LABEL, id));
    }
    store
        .find_by_id(R::COLLECTION, id)
        .await?
        .ok_or_else(|| ApiError::not_found(R::LABEL, id))
}

/// Deserialize, normalise and validate a candidate document.
fn build_entity<R: Resource>(fields: Document) -> ApiResult<R> {
    let mut entity: R = serde_json::from_value(Value::Object(fields))
        .map_err(|e| ApiError::InvalidBody(e.to_string()))?;
    entity.prepare();

    let problems = entity.validate();
    if problems.is_empty() {
        Ok(entity)
    } else {
        Err(ApiError::InvalidBody(problems.join(", ")))
    }
}

/// Resolve a new or changed address into a location. Removing the address
/// clears the location.
async fn locate<R: Resource>(
    geocoder: &dyn Geocoder,
    entity: &mut R,
    previous_address: Option<&str>,
) -> ApiResult<()> {
    let Some(address) = entity.address().map(str::to_string) else {
        if previous_address.is_some() {
            entity.set_location(None);
        }
        return Ok(());
    };
    if previous_address == Some(address.as_str()) {
        return Ok(());
    }

    let location = geocoder.geocode(&address).await?;
    if location.is_none() {
        log::warn!("No location found for {} address {:?}", R::LABEL, address);
    }
    entity.set_location(location);
    Ok(())
}

async fn create_document<S: DocumentStore + 'static, R: Resource>(
    state: &AppState<S>,
    body: Value,
    parent: Option<&str>,
) -> ApiResult<Document> {
    let store = state.store.as_ref();
    let Value::Object(mut fields) = body else {
        return Err(ApiError::InvalidBody("Request body must be a JSON object".to_string()));
    };

    let id = generate_id();
    fields.insert(ID_FIELD.to_string(), Value::String(id.clone()));
    fields.insert(CREATED_AT_FIELD.to_string(), Value::String(timestamp_now()));
    if let (Some(link), Some(parent_id)) = (R::PARENT, parent) {
        fields.insert(link.field.to_string(), Value::String(parent_id.to_string()));
    }

    let mut entity = build_entity::<R>(fields)?;
    locate(state.geocoder.as_ref(), &mut entity, None).await?;

    let document = to_document(&entity)?;
    ensure_parent_exists::<S, R>(store, &document).await?;
    ensure_unique::<S, R>(store, &document).await?;

    store.insert(R::COLLECTION, document.clone()).await?;
    refresh_parent::<S, R>(store, &document).await?;

    log::info!("Created {} {}", R::LABEL, id);
    Ok(document)
}

fn parent_id<R: Resource>(document: &Document) -> Option<&str> {
    R::PARENT.and_then(|parent| document.get(parent.field).and_then(Value::as_str))
}

async fn ensure_parent_exists<S: DocumentStore + ?Sized, R: Resource>(
    store: &S,
    document: &Document,
) -> ApiResult<()> {
    let (Some(parent), Some(id)) = (R::PARENT, parent_id::<R>(document)) else {
        return Ok(());
    };

    let exists = is_valid_id(id) && store.find_by_id(parent.collection, id).await?.is_some();
    if exists {
        Ok(())
    } else {
        Err(ApiError::not_found(parent.label, id))
    }
}

async fn ensure_unique<S: DocumentStore + ?Sized, R: Resource>(
    store: &S,
    document: &Document,
) -> ApiResult<()> {
    let own_id = document_id(document);
    for &field in R::UNIQUE_FIELDS {
        let Some(value) = document.get(field) else {
            continue;
        };

        let query = FindQuery::new(Filter::eq(field, value.clone())).limit(2);
        let clashes = store.find(R::COLLECTION, &query).await?;
        if clashes.iter().any(|other| document_id(other) != own_id) {
            return Err(ApiError::Duplicate { field });
        }
    }
    Ok(())
}

async fn refresh_parent<S: DocumentStore + ?Sized, R: Resource>(
    store: &S,
    document: &Document,
) -> ApiResult<()> {
    if let (Some(parent), Some(rollup), Some(id)) = (R::PARENT, R::rollup(), parent_id::<R>(document)) {
        refresh_rollup(store, R::COLLECTION, &parent, &rollup, id).await?;
    }
    Ok(())
}
