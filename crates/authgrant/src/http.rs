//! HTTP surface for the authorization server.
//!
//! Five endpoints plus a health check. Wire bodies follow the camelCase
//! shapes clients already depend on; error bodies are `{"error": code}` with
//! no internal detail.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use url::Url;

use crate::error::{Error, Result};
use crate::grant::{AuthorizeRequest, ExchangeRequest, GrantService, IssuedCode, RefreshRequest};
use crate::token::TokenPair;

/// Shared state for HTTP handlers.
pub struct AppState {
    pub grants: GrantService,
    /// Authenticated resource owner, resolved by an upstream collaborator.
    pub subject_id: String,
}

/// Create the HTTP router.
pub fn create_router(grants: GrantService, subject_id: String) -> Router {
    let state = Arc::new(AppState { grants, subject_id });

    Router::new()
        .route("/health", get(health_check))
        .route("/clients/register", post(handle_register))
        .route("/authorize", get(handle_authorize))
        .route("/token", post(handle_token))
        .route("/token/refresh", post(handle_refresh))
        .route("/resource", get(handle_resource))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "authgrant",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

// ─── Client registration ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    #[serde(default)]
    redirect_uris: Vec<String>,
    #[serde(default)]
    grants: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterResponse {
    client_id: String,
    client_secret: String,
}

/// `POST /clients/register`
async fn handle_register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Response {
    match state.grants.register_client(req.redirect_uris, req.grants).await {
        Ok(client) => Json(RegisterResponse {
            client_id: client.client_id,
            client_secret: client.client_secret,
        })
        .into_response(),
        Err(err) => error_response(&err),
    }
}

// ─── Authorization endpoint ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct AuthorizeParams {
    #[serde(default)]
    response_type: String,
    #[serde(default)]
    client_id: String,
    #[serde(default)]
    redirect_uri: String,
    state: Option<String>,
}

/// `GET /authorize`
///
/// Validates the request and redirects back to the client with a fresh
/// authorization code and the caller's opaque `state`.
async fn handle_authorize(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AuthorizeParams>,
) -> Response {
    let req = AuthorizeRequest {
        client_id: params.client_id,
        redirect_uri: params.redirect_uri,
        response_type: params.response_type,
        state: params.state,
    };

    let issued = match state.grants.authorize(&req, &state.subject_id).await {
        Ok(issued) => issued,
        Err(err) => return authorize_error(&err),
    };

    match redirect_location(&issued) {
        Ok(location) => (StatusCode::FOUND, [(header::LOCATION, location)]).into_response(),
        Err(err) => authorize_error(&err),
    }
}

fn redirect_location(issued: &IssuedCode) -> Result<String> {
    let mut url = Url::parse(&issued.redirect_uri).map_err(|_| Error::InvalidRedirectUri)?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("code", &issued.code);
        if let Some(ref opaque) = issued.state {
            pairs.append_pair("state", opaque);
        }
    }
    Ok(url.into())
}

// ─── Token endpoints ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct TokenBody {
    #[serde(default)]
    grant_type: String,
    #[serde(default)]
    code: String,
    #[serde(default)]
    redirect_uri: String,
    #[serde(default)]
    client_id: String,
    #[serde(default)]
    client_secret: String,
}

#[derive(Debug, Deserialize)]
struct RefreshBody {
    #[serde(default)]
    grant_type: String,
    #[serde(default)]
    refresh_token: String,
    #[serde(default)]
    client_id: String,
    #[serde(default)]
    client_secret: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
}

/// `POST /token` — exchange an authorization code for tokens.
async fn handle_token(State(state): State<Arc<AppState>>, Json(body): Json<TokenBody>) -> Response {
    let req = ExchangeRequest {
        grant_type: body.grant_type,
        code: body.code,
        redirect_uri: body.redirect_uri,
        client_id: body.client_id,
        client_secret: body.client_secret,
    };

    match state.grants.exchange(&req).await {
        Ok(pair) => token_success(&pair),
        Err(err) => error_response(&err),
    }
}

/// `POST /token/refresh` — rotate a refresh token into a new pair.
async fn handle_refresh(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RefreshBody>,
) -> Response {
    let req = RefreshRequest {
        grant_type: body.grant_type,
        refresh_token: body.refresh_token,
        client_id: body.client_id,
        client_secret: body.client_secret,
    };

    match state.grants.refresh(&req).await {
        Ok(pair) => token_success(&pair),
        Err(err) => error_response(&err),
    }
}

/// Token response with the cache headers RFC 6749 §5.1 requires.
fn token_success(pair: &TokenPair) -> Response {
    let mut response = Json(TokenResponse {
        access_token: pair.access_token.clone(),
        refresh_token: pair.refresh_token.clone(),
    })
    .into_response();

    let headers = response.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    response
}

// ─── Protected resource ──────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResourceResponse {
    message: String,
    subject_id: String,
}

/// `GET /resource`
async fn handle_resource(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
) -> Response {
    // An Authorization header that is present but not a Bearer credential is
    // a bad token, not a missing one.
    if bearer.is_none() && headers.contains_key(header::AUTHORIZATION) {
        return error_response(&Error::InvalidToken);
    }

    let token = bearer.as_ref().map(|TypedHeader(auth)| auth.token());

    match state.grants.verify_resource_access(token) {
        Ok(claims) => Json(ResourceResponse {
            message: "Access granted".to_string(),
            subject_id: claims.sub,
        })
        .into_response(),
        Err(err) => error_response(&err),
    }
}

// ─── Error mapping ───────────────────────────────────────────────────────────

fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::InvalidClient | Error::InvalidToken | Error::MissingToken => {
            StatusCode::UNAUTHORIZED
        }
        Error::Storage(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    }
}

fn error_body(status: StatusCode, err: &Error) -> Response {
    (status, Json(serde_json::json!({ "error": err.error_code() }))).into_response()
}

fn error_response(err: &Error) -> Response {
    let status = status_for(err);
    if status.is_server_error() {
        tracing::error!(error = %err, "request failed");
    }
    error_body(status, err)
}

/// `/authorize` reports every validation failure as 400; only infrastructure
/// failures surface as 5xx.
fn authorize_error(err: &Error) -> Response {
    match err {
        Error::Storage(_) | Error::Internal(_) => error_response(err),
        _ => error_body(StatusCode::BAD_REQUEST, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_location_appends_code_and_state() {
        let issued = IssuedCode {
            redirect_uri: "https://app/cb".into(),
            code: "c0de".into(),
            state: Some("abc xyz".into()),
        };
        let location = redirect_location(&issued).unwrap();
        let url = Url::parse(&location).unwrap();

        let pairs: Vec<(String, String)> =
            url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect();
        assert!(pairs.contains(&("code".into(), "c0de".into())));
        assert!(pairs.contains(&("state".into(), "abc xyz".into())));
    }

    #[test]
    fn test_redirect_location_without_state() {
        let issued = IssuedCode {
            redirect_uri: "https://app/cb?keep=1".into(),
            code: "c0de".into(),
            state: None,
        };
        let location = redirect_location(&issued).unwrap();
        assert!(location.contains("keep=1"));
        assert!(location.contains("code=c0de"));
        assert!(!location.contains("state="));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&Error::InvalidClient), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(&Error::MissingToken), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(&Error::InvalidToken), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(&Error::InvalidOrExpiredCode), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&Error::UnsupportedGrantType), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&Error::internal("x")), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
