use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use std::path::Path;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::api::{handlers, request_log::log_requests, AppState};
use crate::config::ServerConfig;
use crate::model::{Bootcamp, Course, Resource, Review, User};
use crate::store::DocumentStore;

pub fn create_router<S: DocumentStore + 'static>() -> Router<AppState<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes::<S>())
}

fn api_routes<S: DocumentStore + 'static>() -> Router<AppState<S>> {
    Router::new()
        .merge(resource_routes::<S, Bootcamp>())
        .merge(resource_routes::<S, Course>())
        .merge(resource_routes::<S, Review>())
        .merge(resource_routes::<S, User>())
        .route(
            "/bootcamps/radius/:zipcode/:distance",
            get(handlers::bootcamps_in_radius::<S>),
        )
        // Children listed and created under their bootcamp
        .route(
            "/bootcamps/:id/courses",
            get(handlers::list_children::<S, Course>).post(handlers::create_child::<S, Course>),
        )
        .route(
            "/bootcamps/:id/reviews",
            get(handlers::list_children::<S, Review>).post(handlers::create_child::<S, Review>),
        )
}

/// `/<collection>` and `/<collection>/:id` for one resource.
fn resource_routes<S: DocumentStore + 'static, R: Resource>() -> Router<AppState<S>> {
    let collection = format!("/{}", R::COLLECTION);
    let member = format!("/{}/:id", R::COLLECTION);

    Router::new()
        .route(
            &collection,
            get(handlers::list_resources::<S, R>).post(handlers::create_resource::<S, R>),
        )
        .route(
            &member,
            get(handlers::get_resource::<S, R>)
                .put(handlers::update_resource::<S, R>)
                .delete(handlers::delete_resource::<S, R>),
        )
}

/// The full application: routes, CORS, static files and, in development,
/// the request log.
pub fn build_app<S: DocumentStore + 'static>(
    state: AppState<S>,
    server: &ServerConfig,
    log_each_request: bool,
) -> anyhow::Result<Router> {
    let cors = CorsLayer::new()
        .allow_origin(server.cors_origin.parse::<HeaderValue>()?)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let mut app = create_router::<S>().with_state(state);

    if let Some(dir) = server.static_dir.as_deref().filter(|dir| Path::new(dir).is_dir()) {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app = app.layer(ServiceBuilder::new().layer(cors));
    if log_each_request {
        app = app.layer(middleware::from_fn(log_requests));
    }

    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QueryConfig;
    use crate::geocode::OfflineGeocoder;
    use crate::model::Location;
    use crate::store::MemoryStore;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(query: QueryConfig) -> Router {
        create_router::<MemoryStore>().with_state(AppState::new(Arc::new(MemoryStore::new()), query))
    }

    async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = app.oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn bootcamp(name: &str) -> Value {
        json!({
            "name": name,
            "description": "Full stack web development",
            "careers": ["Web Development"],
        })
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(app(QueryConfig::default()), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_unknown_parameter_status_follows_policy() {
        let uri = "/api/v1/bootcamps?foo=bar";

        let (status, body) = send(app(QueryConfig::default()), Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"success": false, "data": {}}));

        let lenient = QueryConfig {
            strict_status: false,
            ..QueryConfig::default()
        };
        let (status, body) = send(app(lenient), Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": false, "data": {}}));
    }

    #[tokio::test]
    async fn test_create_then_fetch() {
        let app = app(QueryConfig::default());

        let (status, created) = send(
            app.clone(),
            Method::POST,
            "/api/v1/bootcamps",
            Some(bootcamp("Devworks Bootcamp")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["data"]["slug"], "devworks-bootcamp");

        let id = created["data"]["_id"].as_str().unwrap().to_string();
        let (status, fetched) =
            send(app, Method::GET, &format!("/api/v1/bootcamps/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["data"]["name"], "Devworks Bootcamp");
    }

    #[tokio::test]
    async fn test_malformed_id_is_not_found() {
        let (status, body) =
            send(app(QueryConfig::default()), Method::GET, "/api/v1/courses/not-an-id", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Course not found with id of not-an-id");
    }

    #[tokio::test]
    async fn test_invalid_json_body_uses_error_envelope() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/bootcamps")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app(QueryConfig::default()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let app = app(QueryConfig::default());
        let body = Some(bootcamp("Codemasters"));

        let (status, _) = send(app.clone(), Method::POST, "/api/v1/bootcamps", body.clone()).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, error) = send(app, Method::POST, "/api/v1/bootcamps", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["error"], "Duplicate field value entered");
    }

    #[tokio::test]
    async fn test_radius_route_wins_over_member_route() {
        let geocoder = OfflineGeocoder::new()
            .with_places([("02215".to_string(), Location::point(-71.105536, 42.350846))]);
        let state = AppState::new(Arc::new(MemoryStore::new()), QueryConfig::default())
            .with_geocoder(Arc::new(geocoder));
        let app = create_router::<MemoryStore>().with_state(state);

        let mut body = bootcamp("Devworks Bootcamp");
        body["address"] = json!("233 Bay State Rd Boston MA 02215");
        let (status, created) = send(app.clone(), Method::POST, "/api/v1/bootcamps", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["data"]["location"]["coordinates"], json!([-71.105536, 42.350846]));

        let (status, found) =
            send(app.clone(), Method::GET, "/api/v1/bootcamps/radius/02215/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(found["count"], 1);
        assert_eq!(found["data"][0]["name"], "Devworks Bootcamp");

        let (status, body) =
            send(app.clone(), Method::GET, "/api/v1/bootcamps/radius/99999/10", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "No location found for 99999");

        let (status, _) = send(app, Method::GET, "/api/v1/bootcamps/radius/02215/-5", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_build_app_rejects_bad_origin() {
        let server = ServerConfig {
            cors_origin: "bad\norigin".to_string(),
            ..ServerConfig::default()
        };
        let state = AppState::new(Arc::new(MemoryStore::new()), QueryConfig::default());
        assert!(build_app(state, &server, false).is_err());
    }
}
