use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};

use crate::api::error::ApiError;
use crate::model::QueryRequest;

/// Axum extractor building a [`QueryRequest`] from the URI query string.
///
/// Pairs are percent-decoded in order, so bracket notation and repeated
/// keys are folded by `QueryRequest::from_pairs`.
#[async_trait]
impl<S> FromRequestParts<S> for QueryRequest
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
            .map_err(|rejection| ApiError::MalformedQuery(rejection.body_text()))?;

        Ok(QueryRequest::from_pairs(pairs))
    }
}
