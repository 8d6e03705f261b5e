use crate::{assertion::AssertionValidator, error::RequestError, extract::ExtractAssertionToken, redirect};
use axum::{
    extract::{Query, State},
    http::{header::LOCATION, StatusCode},
    response::{IntoResponse, Response},
};
use axum::{routing::get, Router};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct Params {
    redirect: Option<String>,
}

pub fn router() -> Router<Arc<AssertionValidator>> {
    Router::new()
        .route("/", get(handler))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Verifies the assertion, then either follows `redirect` or echoes the identity.
///
/// The redirect target is only checked for the `https` scheme. A request without
/// a usable target gets `400` with `"{email} {sub}"` as the body.
pub async fn handler(
    ExtractAssertionToken(token): ExtractAssertionToken,
    State(validator): State<Arc<AssertionValidator>>,
    params: Option<Query<Params>>,
) -> Result<Response, RequestError> {
    let identity = validator.validate(token.as_deref()).await?;

    let location = params
        .and_then(|Query(params)| params.redirect)
        .filter(|target| redirect::is_valid_https_url(target))
        .and_then(|target| redirect::location(&target));

    if let Some(location) = location {
        return Ok((StatusCode::FOUND, [(LOCATION, location)]).into_response());
    }

    Ok((StatusCode::BAD_REQUEST, identity.to_string()).into_response())
}
